//! Dispatch requests and the items that produce them.
//!
//! Every train starts life as a [`DispatchRequest`]: a pair of station names,
//! a priority, and a cyclic flag.  Requests come from three places:
//!
//! | Kind        | Source                                 | On failure               |
//! |-------------|----------------------------------------|--------------------------|
//! | `Manual`    | the host calls `Sim::dispatch_manual`  | error returned to caller |
//! | `Scheduled` | a [`ScheduleItem`] whose time has come | reported in tick summary |
//! | `Batch`     | a [`BatchItem`] whose tick has come    | reported in tick summary |
//!
//! Station names are resolved against the grid only when the request is
//! dispatched, so a schedule may be loaded before the map is finished.

use std::fmt;

use rg_core::{CellId, Tick};
use rg_spatial::Grid;

use crate::{DispatchError, DispatchResult};

/// Lowest valid train priority.
pub const MIN_PRIORITY: u8 = 1;
/// Highest valid train priority.
pub const MAX_PRIORITY: u8 = 10;

// ── RequestKind ───────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RequestKind {
    Manual,
    Scheduled,
    Batch,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequestKind::Manual => "manual",
            RequestKind::Scheduled => "scheduled",
            RequestKind::Batch => "batch",
        })
    }
}

// ── DispatchRequest ───────────────────────────────────────────────────────────

/// One request to put a train on the network.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatchRequest {
    pub from:     String,
    pub to:       String,
    pub priority: u8,
    pub cyclic:   bool,
    pub kind:     RequestKind,
    /// The tick the request was due.  Equal to the dispatch tick for manual
    /// requests.
    pub target:   Tick,
}

impl DispatchRequest {
    pub fn manual(from: &str, to: &str, priority: u8, cyclic: bool, now: Tick) -> Self {
        Self {
            from: from.to_owned(),
            to: to.to_owned(),
            priority,
            cyclic,
            kind: RequestKind::Manual,
            target: now,
        }
    }

    /// Check the priority and resolve both station names on `grid`.
    ///
    /// Returns the origin and destination cells.
    pub fn resolve(&self, grid: &Grid) -> DispatchResult<(CellId, CellId)> {
        validate_priority(self.priority as i64)?;
        resolve_endpoints(grid, &self.from, &self.to)
    }
}

impl fmt::Display for DispatchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}→{} p{}", self.kind, self.from, self.to, self.priority)?;
        if self.cyclic {
            f.write_str(" cyclic")?;
        }
        Ok(())
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

/// Accept priorities in `MIN_PRIORITY..=MAX_PRIORITY`.
pub fn validate_priority(priority: i64) -> DispatchResult<u8> {
    if (MIN_PRIORITY as i64..=MAX_PRIORITY as i64).contains(&priority) {
        Ok(priority as u8)
    } else {
        Err(DispatchError::InvalidPriority(priority))
    }
}

/// Resolve `from` and `to` to station cells.  Fails on unknown names or when
/// both name the same station.
pub fn resolve_endpoints(grid: &Grid, from: &str, to: &str) -> DispatchResult<(CellId, CellId)> {
    let a = grid
        .station(from)
        .ok_or_else(|| DispatchError::UnknownStation(from.trim().to_owned()))?;
    let b = grid
        .station(to)
        .ok_or_else(|| DispatchError::UnknownStation(to.trim().to_owned()))?;
    if a == b {
        return Err(DispatchError::SameEndpoints(from.trim().to_owned()));
    }
    Ok((a, b))
}

// ── Queue items ───────────────────────────────────────────────────────────────

/// A timetabled dispatch.  Stays in the queue after firing with
/// `dispatched = true`.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleItem {
    pub from:       String,
    pub to:         String,
    pub target:     Tick,
    pub priority:   u8,
    pub cyclic:     bool,
    pub dispatched: bool,
}

impl ScheduleItem {
    pub fn new(from: &str, to: &str, target: Tick, priority: u8, cyclic: bool) -> Self {
        Self {
            from: from.to_owned(),
            to: to.to_owned(),
            target,
            priority,
            cyclic,
            dispatched: false,
        }
    }

    pub(crate) fn to_request(&self) -> DispatchRequest {
        DispatchRequest {
            from:     self.from.clone(),
            to:       self.to.clone(),
            priority: self.priority,
            cyclic:   self.cyclic,
            kind:     RequestKind::Scheduled,
            target:   self.target,
        }
    }
}

/// One entry of a generated batch.  Removed from the queue when it fires.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchItem {
    pub from:     String,
    pub to:       String,
    pub priority: u8,
    pub cyclic:   bool,
}

impl BatchItem {
    pub fn new(from: &str, to: &str, priority: u8, cyclic: bool) -> Self {
        Self { from: from.to_owned(), to: to.to_owned(), priority, cyclic }
    }

    pub(crate) fn into_request(self, target: Tick) -> DispatchRequest {
        DispatchRequest {
            from: self.from,
            to: self.to,
            priority: self.priority,
            cyclic: self.cyclic,
            kind: RequestKind::Batch,
            target,
        }
    }
}
