//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use log::warn;

use rg_core::{SimConfig, Tick};
use rg_sim::{SimObserver, TickReport, Train};

use crate::row::{TickSummaryRow, TrainSnapshotRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes train snapshots and tick summaries to an
/// [`OutputWriter`].
///
/// Observer hooks cannot fail, so the first write error is kept and the
/// rest are dropped.  Check [`take_error`][Self::take_error] after the run.
pub struct SimOutputObserver<W: OutputWriter> {
    writer:             W,
    tick_duration_secs: u32,
    last_error:         Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W, config: &SimConfig) -> Self {
        Self {
            writer,
            tick_duration_secs: config.tick_duration_secs,
            last_error:         None,
        }
    }

    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Flush the writer.  Bounded runs do this from `on_sim_end`; call it
    /// directly when driving the sim with `step` or `pump`.
    pub fn finish(&mut self) {
        let result = self.writer.finish();
        self.store_err(result);
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                warn!("output write failed, later errors are dropped: {e}");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, report: &TickReport) {
        let elapsed = tick.0 * self.tick_duration_secs as u64;
        let result = self.writer.write_tick_summary(&TickSummaryRow::from_report(report, elapsed));
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, trains: &[Train]) {
        if trains.is_empty() {
            return;
        }
        let rows: Vec<TrainSnapshotRow> =
            trains.iter().map(|t| TrainSnapshotRow::from_train(tick.0, t)).collect();
        let result = self.writer.write_snapshots(&rows);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        self.finish();
    }
}
