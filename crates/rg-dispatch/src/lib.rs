//! `rg-dispatch`: dispatch requests, the dispatch queue, and schedule loading.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                                  |
//! |-------------|---------------------------------------------------------------------------|
//! | [`request`] | `DispatchRequest`, `RequestKind`, `ScheduleItem`, `BatchItem`, validation |
//! | [`queue`]   | `DispatchQueue`: pending schedule and batch items keyed by tick           |
//! | [`loader`]  | `load_schedule_csv`, `load_schedule_reader`, `parse_schedule_json`        |
//! | [`batch`]   | `random_batch`: seeded random station-pair batches                        |
//! | [`error`]   | `DispatchError`, `DispatchResult<T>`                                      |
//!
//! # Request lifecycle
//!
//! ```text
//! loader / generator ──► DispatchQueue ──drain_due(now)──► DispatchRequest ──► rg-sim
//! ```
//!
//! Manual requests skip the queue: `rg-sim` validates and routes them
//! immediately and hands any failure straight back to the caller.  Queued
//! requests that fail are reported in the tick summary instead.

pub mod batch;
pub mod error;
pub mod loader;
pub mod queue;
pub mod request;


pub use batch::random_batch;
pub use error::{DispatchError, DispatchResult};
pub use loader::{
    load_schedule_csv, load_schedule_reader, parse_schedule_json, RejectedRecord, ScheduleLoad,
    ScheduleRecord,
};
pub use queue::DispatchQueue;
pub use request::{
    resolve_endpoints, validate_priority, BatchItem, DispatchRequest, RequestKind, ScheduleItem,
    MAX_PRIORITY, MIN_PRIORITY,
};
