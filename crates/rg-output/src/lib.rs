//! `rg-output`: simulation output for the railgrid simulator.
//!
//! | Backend | Files created                               |
//! |---------|---------------------------------------------|
//! | CSV     | `train_snapshots.csv`, `tick_summaries.csv` |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `rg_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use rg_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer, &sim.config);
//! sim.run_until_idle(10_000, &mut obs);
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{TickSummaryRow, TrainSnapshotRow};
pub use writer::OutputWriter;
