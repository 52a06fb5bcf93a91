//! CSV output backend.
//!
//! Creates two files in the output directory:
//! - `train_snapshots.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{OutputResult, TickSummaryRow, TrainSnapshotRow};

pub const SNAPSHOT_HEADER: [&str; 10] = [
    "tick", "train_id", "name", "state", "cell", "progress", "priority", "waiting_ticks", "from", "to",
];

pub const SUMMARY_HEADER: [&str; 7] =
    ["tick", "elapsed_secs", "active", "spawned", "failed", "removed", "deadlock"];

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    snapshots: Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create the two CSV files in `dir` (which must exist) and write their
    /// headers.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut snapshots = Writer::from_path(dir.join("train_snapshots.csv"))?;
        snapshots.write_record(SNAPSHOT_HEADER)?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(SUMMARY_HEADER)?;

        Ok(Self { snapshots, summaries, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[TrainSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.tick.to_string(),
                row.train_id.to_string(),
                row.name.clone(),
                row.state.to_owned(),
                row.cell.clone(),
                format!("{:.3}", row.progress),
                row.priority.to_string(),
                row.waiting_ticks.to_string(),
                row.from.clone(),
                row.to.clone(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.elapsed_secs.to_string(),
            row.active.to_string(),
            row.spawned.to_string(),
            row.failed.to_string(),
            row.removed.to_string(),
            (row.deadlock as u8).to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
