//! Per-train state.

use std::fmt;

use rg_core::{CellId, TrainId};
use rg_spatial::{Occupant, Route};

/// Lifecycle of a train.
///
/// ```text
///            window clear                progress ≥ 1
///  Waiting ───────────────► Moving ───────────────────► Waiting
///     │ at last cell
///     ▼
///  Arrived ──(cyclic)──► Dwelling ──return path found──► Waiting (endpoints swapped)
///     │ non-cyclic
///     ▼
///  removed
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrainState {
    Waiting,
    Moving,
    Arrived,
    Dwelling,
}

impl TrainState {
    pub fn as_str(self) -> &'static str {
        match self {
            TrainState::Waiting => "waiting",
            TrainState::Moving => "moving",
            TrainState::Arrived => "arrived",
            TrainState::Dwelling => "dwelling",
        }
    }
}

impl fmt::Display for TrainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One train on the network.
///
/// Invariants held by the tick engine:
///
/// - `path` is non-empty, `path[0]` is the trip origin and `path.last()` the
///   trip destination, and consecutive cells are 4-adjacent.
/// - `path_index < path.len()`.
/// - `progress ∈ [0, 1)`; it is non-zero only while `Moving`.
/// - `waiting_ticks` counts consecutive ticks spent `Waiting` and is 0 while
///   `Moving`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Train {
    pub id:              TrainId,
    /// Display name.
    pub name:            String,
    /// Trip origin.  Swapped with `to` when a cyclic train turns back.
    pub from:            CellId,
    pub to:              CellId,
    pub path:            Vec<CellId>,
    pub path_index:      usize,
    pub progress:        f32,
    pub state:           TrainState,
    /// Higher is served first.
    pub priority:        u8,
    pub cyclic:          bool,
    pub waiting_ticks:   u32,
    pub dwell_remaining: u32,
}

impl Train {
    /// A new train standing at the start of `route`, ready to depart.
    pub fn new(id: TrainId, name: String, route: Route, priority: u8, cyclic: bool) -> Self {
        let cells = route.cells;
        let from = cells.first().copied().unwrap_or_default();
        let to = cells.last().copied().unwrap_or(from);
        Self {
            id,
            name,
            from,
            to,
            path: cells,
            path_index: 0,
            progress: 0.0,
            state: TrainState::Waiting,
            priority,
            cyclic,
            waiting_ticks: 0,
            dwell_remaining: 0,
        }
    }

    /// The cell the train stands on.
    #[inline]
    pub fn current_cell(&self) -> CellId {
        self.path.get(self.path_index).copied().unwrap_or(self.to)
    }

    /// The cell after the current one on the path, if any.
    #[inline]
    pub fn next_cell(&self) -> Option<CellId> {
        self.path.get(self.path_index + 1).copied()
    }

    /// `true` once the current index is the last path cell.
    #[inline]
    pub fn at_destination(&self) -> bool {
        self.path_index + 1 >= self.path.len()
    }

    /// Up to `k` path cells after the current one.
    pub fn lookahead(&self, k: usize) -> &[CellId] {
        let start = (self.path_index + 1).min(self.path.len());
        let end = (self.path_index + 1 + k).min(self.path.len());
        &self.path[start..end]
    }

    /// This train's position as seen by the pathfinder and conflict checks.
    /// Only a moving train lays claim to its next cell.
    pub fn occupant(&self) -> Occupant {
        Occupant {
            train: self.id,
            cell:  self.current_cell(),
            next:  match self.state {
                TrainState::Moving => self.next_cell(),
                _ => None,
            },
        }
    }

    /// Replace the remainder of the path with `route`, which must start at
    /// the current cell.
    pub fn splice(&mut self, route: Route) {
        self.path.truncate(self.path_index);
        self.path.extend(route.cells);
    }

    /// Start the return trip of a cyclic train along `route`.
    pub(crate) fn turn_back(&mut self, route: Route) {
        std::mem::swap(&mut self.from, &mut self.to);
        self.path = route.cells;
        self.path_index = 0;
        self.progress = 0.0;
        self.waiting_ticks = 0;
        self.dwell_remaining = 0;
        self.state = TrainState::Waiting;
    }
}
