//! End-to-end scheduling scenarios across the queue, domain, and loop layers.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use sched_abi::{DomainBoundQueue, QueueId, QueuePriority, SelectionReason, WakeUpResolution};
use sequencer::{SequenceManager, DEFAULT_TASK_BUDGET, STARVATION_THRESHOLD};
use task_queue::{PostedTask, Task, TaskQueue};
use testkit::{HostCall, RecordingHost};
use time_domain::TimeDomain;
use timebase::{LazyNow, ManualClock, TimeTicks};

fn ticks(nanos: u64) -> TimeTicks {
    TimeTicks::from_nanos(nanos)
}

fn manual_manager() -> (SequenceManager, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(ticks(0)));
    let manager = SequenceManager::with_clock(clock.clone());
    (manager, clock)
}

#[test]
fn delayed_tasks_run_in_due_time_order_across_queues() {
    let (mut manager, clock) = manual_manager();
    let q1 = manager.create_queue("first", QueuePriority::P1);
    let q2 = manager.create_queue("second", QueuePriority::P1);
    let order: Arc<Mutex<Vec<&str>>> = Arc::new(Mutex::new(Vec::new()));

    for (handle, label, delay) in [(&q1, "late", 300u64), (&q2, "early", 100)] {
        let order = Arc::clone(&order);
        manager.post(
            handle.id(),
            PostedTask::new(move || order.lock().push(label)).after(Duration::from_nanos(delay)),
        );
    }
    assert_eq!(manager.next_scheduled_run_time(), Some(ticks(100)));

    clock.set(ticks(150));
    let summary = manager.do_work(DEFAULT_TASK_BUDGET);
    assert_eq!(summary.tasks_run, 1);
    assert_eq!(summary.next_run_time, Some(ticks(300)));

    clock.set(ticks(300));
    let summary = manager.do_work(DEFAULT_TASK_BUDGET);
    assert_eq!(summary.tasks_run, 1);
    assert_eq!(summary.next_run_time, None);

    assert_eq!(*order.lock(), vec!["early", "late"]);
}

// The time domain drives real task queues: the rearm traffic recorded by the
// host must track only genuine changes of the global minimum.
#[test]
fn wake_up_rearm_tracks_real_queues() {
    let host = RecordingHost::new();
    let log = host.log();
    let mut domain = TimeDomain::new();
    domain.register_host(Box::new(host));
    let clock = ManualClock::new(ticks(0));

    let mut q1 = TaskQueue::new(QueueId(0), "first", QueuePriority::P1);
    let mut q2 = TaskQueue::new(QueueId(1), "second", QueuePriority::P1);

    let mut lazy_now = LazyNow::new(&clock);
    let wake_up = q1.schedule(Task::new(0, || {}), ticks(200), WakeUpResolution::Low);
    domain.set_next_wake_up(&q1, wake_up, &mut lazy_now);

    let mut lazy_now = LazyNow::new(&clock);
    let wake_up = q2.schedule(Task::new(1, || {}), ticks(100), WakeUpResolution::Low);
    domain.set_next_wake_up(&q2, wake_up, &mut lazy_now);

    // A third task behind q1's existing one changes nothing system-wide.
    let mut lazy_now = LazyNow::new(&clock);
    let wake_up = q1.schedule(Task::new(2, || {}), ticks(400), WakeUpResolution::Low);
    domain.set_next_wake_up(&q1, wake_up, &mut lazy_now);

    assert_eq!(
        log.snapshot(),
        vec![
            HostCall::SetNextDelayedDoWork {
                now: ticks(0),
                run_time: Some(ticks(200)),
            },
            HostCall::SetNextDelayedDoWork {
                now: ticks(0),
                run_time: Some(ticks(100)),
            },
        ]
    );

    clock.set(ticks(250));
    let mut lazy_now = LazyNow::new(&clock);
    let mut queues = [&mut q1, &mut q2];
    domain.move_ready_delayed_tasks(&mut lazy_now, |id, now| {
        queues[id.index() as usize].take_due_tasks(now)
    });

    assert_eq!(q1.work_len(), 1);
    assert_eq!(q2.work_len(), 1);
    assert_eq!(domain.next_scheduled_run_time(), Some(ticks(400)));
}

#[test]
fn starvation_relief_lets_background_work_through() {
    let (mut manager, _clock) = manual_manager();
    let critical = manager.create_queue("critical", QueuePriority::P0);
    let background = manager.create_queue("background", QueuePriority::P2);
    let order: Arc<Mutex<Vec<&str>>> = Arc::new(Mutex::new(Vec::new()));

    for _ in 0..(STARVATION_THRESHOLD + 4) {
        let order = Arc::clone(&order);
        manager.post(
            critical.id(),
            PostedTask::new(move || order.lock().push("crit")),
        );
    }
    {
        let order = Arc::clone(&order);
        manager.post(
            background.id(),
            PostedTask::new(move || order.lock().push("bg")),
        );
    }

    let summary = manager.do_work(DEFAULT_TASK_BUDGET);
    assert_eq!(summary.tasks_run, STARVATION_THRESHOLD as usize + 5);

    // The background task ran after exactly STARVATION_THRESHOLD critical
    // ones, not at the very end.
    let position = order.lock().iter().position(|&l| l == "bg").unwrap();
    assert_eq!(position, STARVATION_THRESHOLD as usize);
    assert_eq!(
        summary.selections[position].reason,
        SelectionReason::StarvationRelief
    );
    assert_eq!(summary.selections[position].queue, background.id());
    assert!(summary
        .selections
        .iter()
        .enumerate()
        .all(|(i, s)| i == position || s.reason == SelectionReason::PriorityBand));
}

#[test]
fn high_res_wake_ups_surface_until_promoted() {
    let (mut manager, clock) = manual_manager();
    let handle = manager.create_queue("precise", QueuePriority::P1);

    manager.post(
        handle.id(),
        PostedTask::new(|| {})
            .after(Duration::from_nanos(100))
            .high_resolution(),
    );
    assert_eq!(manager.snapshot().pending_high_res_wake_ups, 1);

    clock.set(ticks(100));
    manager.do_work(DEFAULT_TASK_BUDGET);
    assert_eq!(manager.snapshot().pending_high_res_wake_ups, 0);
}

#[test]
fn promotion_passes_are_idempotent() {
    let (mut manager, clock) = manual_manager();
    let handle = manager.create_queue("default", QueuePriority::P1);

    manager.post(
        handle.id(),
        PostedTask::new(|| {}).after(Duration::from_nanos(100)),
    );
    clock.set(ticks(100));

    assert_eq!(manager.do_work(DEFAULT_TASK_BUDGET).tasks_run, 1);
    // Nothing new became due; repeated passes are no-ops.
    assert_eq!(manager.do_work(DEFAULT_TASK_BUDGET).tasks_run, 0);
    assert_eq!(manager.do_work(DEFAULT_TASK_BUDGET).tasks_run, 0);
}
