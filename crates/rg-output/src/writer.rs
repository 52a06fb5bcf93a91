//! The `OutputWriter` trait.

use crate::{OutputResult, TickSummaryRow, TrainSnapshotRow};

/// A sink for simulation output rows.
///
/// Errors are returned here and stored by [`SimOutputObserver`][crate::SimOutputObserver],
/// since observer hooks cannot fail.
pub trait OutputWriter {
    fn write_snapshots(&mut self, rows: &[TrainSnapshotRow]) -> OutputResult<()>;

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush everything.  Safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
