//! Plain data row types written by output backends.

use rg_core::TrainId;
use rg_sim::{TickReport, Train};

/// One train's state at a snapshot tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainSnapshotRow {
    pub tick:          u64,
    pub train_id:      u32,
    pub name:          String,
    pub state:         &'static str,
    /// Current cell as its `"x,y"` key.
    pub cell:          String,
    pub progress:      f32,
    pub priority:      u8,
    pub waiting_ticks: u32,
    pub from:          String,
    pub to:            String,
}

impl TrainSnapshotRow {
    pub fn from_train(tick: u64, train: &Train) -> Self {
        Self {
            tick,
            train_id:      train.id.0,
            name:          train.name.clone(),
            state:         train.state.as_str(),
            cell:          train.current_cell().to_string(),
            progress:      train.progress,
            priority:      train.priority,
            waiting_ticks: train.waiting_ticks,
            from:          train.from.to_string(),
            to:            train.to.to_string(),
        }
    }
}

/// Counts for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:         u64,
    pub elapsed_secs: u64,
    pub active:       u64,
    pub spawned:      u64,
    pub failed:       u64,
    pub removed:      u64,
    pub deadlock:     bool,
}

impl TickSummaryRow {
    pub fn from_report(report: &TickReport, elapsed_secs: u64) -> Self {
        let count = |ids: &[TrainId]| ids.len() as u64;
        Self {
            tick: report.tick.0,
            elapsed_secs,
            active: report.active as u64,
            spawned: count(&report.spawned),
            failed: report.failed.len() as u64,
            removed: count(&report.removed),
            deadlock: report.deadlock,
        }
    }
}
