//! Deadlock detection.
//!
//! The check is advisory: nothing in the engine acts on it.  It only tells the
//! host that every train has been stuck long enough that no progress is
//! likely without intervention.

use log::{info, warn};

use rg_core::Tick;

use crate::{Train, TrainState};

/// `true` iff more than one train is active and every one of them has been
/// waiting for more than `threshold` consecutive ticks.
pub fn is_deadlocked(trains: &[Train], threshold: u32) -> bool {
    trains.len() > 1
        && trains
            .iter()
            .all(|t| t.state == TrainState::Waiting && t.waiting_ticks > threshold)
}

/// Re-evaluates [`is_deadlocked`] each tick and logs when the warning changes.
#[derive(Default, Debug)]
pub struct DeadlockMonitor {
    warning: bool,
}

impl DeadlockMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the warning from the post-tick train set and return it.
    pub fn update(&mut self, tick: Tick, trains: &[Train], threshold: u32) -> bool {
        let now = is_deadlocked(trains, threshold);
        match (self.warning, now) {
            (false, true) => warn!(
                "{tick}: possible deadlock, all {} trains waiting for more than {threshold} ticks",
                trains.len()
            ),
            (true, false) => info!("{tick}: deadlock cleared"),
            _ => {}
        }
        self.warning = now;
        now
    }

    pub fn warning(&self) -> bool {
        self.warning
    }

    pub fn reset(&mut self) {
        self.warning = false;
    }
}
