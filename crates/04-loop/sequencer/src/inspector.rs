use sched_abi::QueuePriority;
use serde::Serialize;

/// Point-in-time view of one task queue.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueueSnapshot {
    pub id: u32,
    pub name: &'static str,
    pub priority: &'static str,
    pub enabled: bool,
    pub ready_tasks: usize,
    pub delayed_tasks: usize,
    /// Due time of the queue's registered wake-up, if it carries one.
    pub next_wake_up_nanos: Option<u64>,
}

/// Point-in-time view of a whole sequencing context.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SequencerSnapshot {
    pub queues: Vec<QueueSnapshot>,
    /// System-wide minimum wake time tracked by the time domain.
    pub next_run_time_nanos: Option<u64>,
    /// Where the host wake timer is currently armed.
    pub armed_run_time_nanos: Option<u64>,
    pub immediate_pass_requested: bool,
    pub pending_high_res_wake_ups: usize,
}

impl SequencerSnapshot {
    /// Serializes to one newline-terminated NDJSON record.
    pub fn to_ndjson_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

pub(crate) fn priority_label(priority: QueuePriority) -> &'static str {
    match priority {
        QueuePriority::P0 => "p0",
        QueuePriority::P1 => "p1",
        QueuePriority::P2 => "p2",
    }
}
