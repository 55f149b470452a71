//! Cross-thread posting against a live sequencing loop.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use sched_abi::QueuePriority;
use sequencer::SequenceManager;
use task_queue::{PostError, PostedTask};

#[test]
fn posts_from_many_threads_all_execute() {
    let mut manager = SequenceManager::new();
    let handle = manager.create_queue("shared", QueuePriority::P1);
    let counter = Arc::new(AtomicUsize::new(0));

    let producers: Vec<_> = (0..4)
        .map(|_| {
            let handle = handle.clone();
            let counter = Arc::clone(&counter);
            thread::spawn(move || {
                for _ in 0..25 {
                    let counter = Arc::clone(&counter);
                    handle
                        .post(move || {
                            counter.fetch_add(1, Ordering::SeqCst);
                        })
                        .unwrap();
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    manager.run_until_idle();
    assert_eq!(counter.load(Ordering::SeqCst), 100);
}

#[test]
fn sleeping_loop_wakes_for_a_cross_thread_post() {
    let mut manager = SequenceManager::new();
    let handle = manager.create_queue("shared", QueuePriority::P1);
    let order: Arc<Mutex<Vec<&str>>> = Arc::new(Mutex::new(Vec::new()));

    // The delayed task parks the loop on its wake timer; the producer thread
    // interrupts that wait well before the timer fires.
    {
        let order = Arc::clone(&order);
        manager.post(
            handle.id(),
            PostedTask::new(move || order.lock().push("timer")).after(Duration::from_millis(150)),
        );
    }
    let producer = {
        let handle = handle.clone();
        let order = Arc::clone(&order);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            handle.post(move || order.lock().push("early")).unwrap();
        })
    };

    manager.run_until_idle();
    producer.join().unwrap();

    assert_eq!(*order.lock(), vec!["early", "timer"]);
}

#[test]
fn delayed_cross_thread_posts_run_after_their_delay() {
    let mut manager = SequenceManager::new();
    let handle = manager.create_queue("shared", QueuePriority::P1);
    let counter = Arc::new(AtomicUsize::new(0));

    let producer = {
        let handle = handle.clone();
        let counter = Arc::clone(&counter);
        thread::spawn(move || {
            handle
                .post_delayed(
                    move || {
                        counter.fetch_add(1, Ordering::SeqCst);
                    },
                    Duration::from_millis(10),
                )
                .unwrap();
        })
    };
    producer.join().unwrap();

    manager.run_until_idle();
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn posting_after_shutdown_reports_queue_closed() {
    let handle = {
        let mut manager = SequenceManager::new();
        manager.create_queue("doomed", QueuePriority::P1)
    };
    assert_eq!(handle.post(|| {}), Err(PostError::QueueClosed));
}
