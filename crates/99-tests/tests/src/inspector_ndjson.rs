//! Inspector snapshots serialized as NDJSON and read back.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use pretty_assertions::assert_eq;
use sched_abi::QueuePriority;
use sequencer::{SequenceManager, DEFAULT_TASK_BUDGET};
use task_queue::PostedTask;
use timebase::{ManualClock, TimeTicks};

fn manual_manager() -> (SequenceManager, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(TimeTicks::ZERO));
    let manager = SequenceManager::with_clock(clock.clone());
    (manager, clock)
}

#[test]
fn snapshot_serializes_queue_and_domain_state() -> Result<()> {
    let (mut manager, _clock) = manual_manager();
    let input = manager.create_queue("input", QueuePriority::P0);
    let background = manager.create_queue("background", QueuePriority::P2);

    manager.post(input.id(), PostedTask::new(|| {}));
    manager.post(
        background.id(),
        PostedTask::new(|| {})
            .after(Duration::from_nanos(500))
            .high_resolution(),
    );
    manager.set_queue_enabled(input.id(), false);

    let line = manager.snapshot().to_ndjson_line()?;
    assert!(line.ends_with('\n'));
    let value: serde_json::Value = serde_json::from_str(&line)?;

    assert_eq!(value["queues"][0]["name"], "input");
    assert_eq!(value["queues"][0]["priority"], "p0");
    assert_eq!(value["queues"][0]["enabled"], false);
    assert_eq!(value["queues"][0]["ready_tasks"], 1);
    assert_eq!(value["queues"][1]["name"], "background");
    assert_eq!(value["queues"][1]["delayed_tasks"], 1);
    assert_eq!(value["queues"][1]["next_wake_up_nanos"], 500);
    assert_eq!(value["next_run_time_nanos"], 500);
    assert_eq!(value["armed_run_time_nanos"], 500);
    assert_eq!(value["pending_high_res_wake_ups"], 1);
    Ok(())
}

#[test]
fn pass_by_pass_ndjson_log_tracks_the_drain() -> Result<()> {
    let (mut manager, clock) = manual_manager();
    let handle = manager.create_queue("work", QueuePriority::P1);

    manager.post(handle.id(), PostedTask::new(|| {}));
    manager.post(
        handle.id(),
        PostedTask::new(|| {}).after(Duration::from_nanos(200)),
    );

    let mut log = String::new();
    log.push_str(&manager.snapshot().to_ndjson_line()?);

    manager.do_work(DEFAULT_TASK_BUDGET);
    log.push_str(&manager.snapshot().to_ndjson_line()?);

    clock.set(TimeTicks::from_nanos(200));
    manager.do_work(DEFAULT_TASK_BUDGET);
    log.push_str(&manager.snapshot().to_ndjson_line()?);

    let lines: Vec<serde_json::Value> = log
        .lines()
        .map(serde_json::from_str)
        .collect::<serde_json::Result<_>>()?;
    assert_eq!(lines.len(), 3);

    assert_eq!(lines[0]["queues"][0]["ready_tasks"], 1);
    assert_eq!(lines[0]["queues"][0]["delayed_tasks"], 1);

    // After one pass the immediate task ran and the delayed one still waits.
    assert_eq!(lines[1]["queues"][0]["ready_tasks"], 0);
    assert_eq!(lines[1]["queues"][0]["delayed_tasks"], 1);
    assert_eq!(lines[1]["next_run_time_nanos"], 200);

    // After the due-time pass everything is drained.
    assert_eq!(lines[2]["queues"][0]["delayed_tasks"], 0);
    assert_eq!(lines[2]["next_run_time_nanos"], serde_json::Value::Null);
    Ok(())
}
