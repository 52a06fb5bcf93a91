//! `rg-spatial`: grid map, priority queue, and pathfinding.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                    |
//! |----------------|-------------------------------------------------------------|
//! | [`grid`]       | `Grid`, `Cell`, `CellKind`: cells, stations, editing        |
//! | [`heap`]       | `MinHeap`: binary min-heap used as the A* open set          |
//! | [`pathfinder`] | `Pathfinder` trait, `AStarPathfinder`, `PathQuery`, `Route` |
//! | [`hash`]       | `CellSet`, `FastMap`, `FastSet` aliases                     |
//! | [`error`]      | `SpatialError`, `SpatialResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                             |
//! |-----------|----------------------------------------------------|
//! | `serde`   | Derives `Serialize`/`Deserialize` on public types. |
//! | `fx-hash` | FxHash for cell sets and search maps.              |

pub mod error;
pub mod grid;
pub mod hash;
pub mod heap;
pub mod pathfinder;


pub use error::{SpatialError, SpatialResult};
pub use grid::{Cell, CellKind, Grid};
pub use hash::{CellSet, FastMap, FastSet};
pub use heap::MinHeap;
pub use pathfinder::{
    AStarPathfinder, Occupant, PathCosts, PathQuery, Pathfinder, ReservationMode, Route,
};
