//! `rg-core`: foundational types for the `railgrid` train simulator.
//!
//! This crate is a dependency of every other `rg-*` crate.  It has no `rg-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                             |
//! |------------|------------------------------------------------------|
//! | [`ids`]    | `TrainId`                                            |
//! | [`cell`]   | `CellId` (grid coordinate + stable key), `Direction` |
//! | [`time`]   | `Tick`, `SimClock`                                   |
//! | [`config`] | `SimConfig`: every simulation tunable                |
//! | [`rng`]    | `SimRng` (seeded, reproducible)                      |
//! | [`error`]  | `CoreError`, `CoreResult`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod cell;
pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cell::{CellId, Direction};
pub use config::SimConfig;
pub use error::{CoreError, CoreResult};
pub use ids::TrainId;
pub use rng::SimRng;
pub use time::{SimClock, Tick};
