//! `rg-sim`: tick engine and simulation control for the railgrid simulator.
//!
//! # Tick loop
//!
//! ```text
//! for each tick:
//!   ① Engine   : stable-sort trains by descending priority; each train in
//!                 turn claims cells in a fresh reservation set, reroutes
//!                 when blocked, moves, arrives, or dwells.
//!   ② Dispatch : drain requests due this tick, route them against one
//!                 snapshot (parallel with the `parallel` feature), append
//!                 new trains; failures go into the TickReport.
//!   ③ Deadlock : advisory check over the post-tick train set.
//!   ④ Observers: on_tick_end, then on_snapshot every output interval.
//! ```
//!
//! # Crate layout
//!
//! | Module          | Contents                                        |
//! |-----------------|-------------------------------------------------|
//! | [`train`]       | `Train`, `TrainState`                           |
//! | [`engine`]      | `TickEngine`: per-tick conflict resolution      |
//! | [`reservation`] | `Reservations`, `Occupancy`                     |
//! | [`deadlock`]    | `is_deadlocked`, `DeadlockMonitor`              |
//! | [`scheduler`]   | `TickScheduler`: wall-clock time → ticks        |
//! | [`sim`]         | `Sim`: context, control, editor guard, dispatch |
//! | [`builder`]     | `SimBuilder`                                    |
//! | [`observer`]    | `SimObserver`, `NoopObserver`, `TickReport`     |
//! | [`error`]       | `SimError`, `SimResult<T>`                      |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Routes a tick's due dispatches on Rayon's thread pool. |
//! | `fx-hash`  | FxHash for reservation and occupancy sets.             |
//! | `serde`    | Serde derives on `Train` and `TrainState`.             |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use rg_core::SimConfig;
//! use rg_sim::{NoopObserver, SimBuilder};
//! use rg_spatial::{AStarPathfinder, Grid};
//!
//! let grid = Grid::from_ascii("A###B")?;
//! let mut sim = SimBuilder::new(SimConfig::default(), grid, AStarPathfinder::default())
//!     .build()?;
//! sim.dispatch_manual("A", "B", 5, false)?;
//! sim.run_until_idle(500, &mut NoopObserver);
//! ```

pub mod builder;
pub mod deadlock;
pub mod engine;
pub mod error;
pub mod observer;
pub mod reservation;
pub mod scheduler;
pub mod sim;
pub mod train;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use deadlock::{is_deadlocked, DeadlockMonitor};
pub use engine::{TickEngine, TickOutcome};
pub use error::{SimError, SimResult};
pub use observer::{DispatchFailure, NoopObserver, SimObserver, TickReport};
pub use reservation::{Occupancy, Reservations};
pub use scheduler::TickScheduler;
pub use sim::Sim;
pub use train::{Train, TrainState};
