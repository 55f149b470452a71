use log::debug;
use sched_abi::{QueueId, QueuePriority, SelectionReason};
use smallvec::SmallVec;

/// Consecutive higher-band selections allowed while a lower band waits,
/// before one lower-band queue is serviced.
pub const STARVATION_THRESHOLD: u32 = 8;

/// One selector decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub queue: QueueId,
    pub reason: SelectionReason,
}

/// Picks the next work queue to run.
///
/// Highest non-empty priority band wins, round-robin among that band's ready
/// queues. After [`STARVATION_THRESHOLD`] consecutive wins over a waiting
/// lower band, one queue from the highest waiting band runs instead and the
/// selection is reported as [`SelectionReason::StarvationRelief`].
#[derive(Debug, Default)]
pub struct QueueSelector {
    rotation: [u64; 3],
    starved_rounds: u32,
}

impl QueueSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chooses among `ready` queues, each tagged with its band.
    ///
    /// Callers must supply candidates in a stable order (the manager iterates
    /// its registry in creation order); round-robin within a band cycles over
    /// that order.
    pub fn select(
        &mut self,
        ready: impl IntoIterator<Item = (QueueId, QueuePriority)>,
    ) -> Option<Selection> {
        let mut bands: [SmallVec<[QueueId; 8]>; 3] = Default::default();
        for (queue, priority) in ready {
            bands[priority as usize].push(queue);
        }

        let top = bands.iter().position(|band| !band.is_empty())?;
        let waiting = bands
            .iter()
            .skip(top + 1)
            .position(|band| !band.is_empty())
            .map(|offset| top + 1 + offset);

        let (band, reason) = match waiting {
            Some(waiting) if self.starved_rounds >= STARVATION_THRESHOLD => {
                self.starved_rounds = 0;
                debug!("starvation relief: servicing band {waiting} over band {top}");
                (waiting, SelectionReason::StarvationRelief)
            }
            Some(_) => {
                self.starved_rounds += 1;
                (top, SelectionReason::PriorityBand)
            }
            None => {
                self.starved_rounds = 0;
                (top, SelectionReason::PriorityBand)
            }
        };

        let candidates = &bands[band];
        let slot = (self.rotation[band] % candidates.len() as u64) as usize;
        self.rotation[band] += 1;
        Some(Selection {
            queue: candidates[slot],
            reason,
        })
    }
}
