//! The per-tick conflict resolver.
//!
//! # One tick
//!
//! ```text
//! 1. stable-sort trains by descending priority
//! 2. snapshot positions (cell + next cell of moving trains)
//! 3. reservations = ∅
//! 4. for each train in order:
//!      non-cyclic & arrived → removed
//!      dwelling → count down; at 0 route back and turn round
//!      arrived  → cyclic: start dwelling
//!      moving   → reserve window; progress += speed; at 1.0 step a cell
//!      waiting  → arrive, or claim the window (rerouting if blocked)
//! ```
//!
//! The window of a train at index `i` is `path[i+1 ..= min(i+K, last)]`.  It
//! is clear when every cell in it is traversable, unreserved, and not held by
//! another train in the snapshot.  The trip destination is a platform and is
//! exempt from the occupancy test, though not from reservations.
//!
//! Trains are emitted in processing order, which keeps the relative order of
//! equal-priority trains stable across ticks.

use log::debug;

use rg_core::{CellId, SimConfig, TrainId};
use rg_spatial::{Grid, Occupant, PathQuery, Pathfinder, ReservationMode, Route};

use crate::reservation::{Occupancy, Reservations};
use crate::{Train, TrainState};

/// Trains after one tick, and those that left the network.
#[derive(Debug, Default)]
pub struct TickOutcome {
    pub trains:  Vec<Train>,
    pub removed: Vec<TrainId>,
}

/// Advances a train set by one tick against a read-only grid.
pub struct TickEngine<'a, P: Pathfinder> {
    pub grid:       &'a Grid,
    pub pathfinder: &'a P,
    pub config:     &'a SimConfig,
    /// Speed multiplier applied on top of `config.train_speed`.
    pub speed:      f64,
}

/// Read-only per-tick context shared by every train's update.
struct Snapshot<'s> {
    occupants: &'s [Occupant],
    occupancy: Occupancy,
}

impl<'a, P: Pathfinder> TickEngine<'a, P> {
    pub fn new(grid: &'a Grid, pathfinder: &'a P, config: &'a SimConfig, speed: f64) -> Self {
        Self { grid, pathfinder, config, speed }
    }

    pub fn advance(&self, mut trains: Vec<Train>) -> TickOutcome {
        trains.sort_by(|a, b| b.priority.cmp(&a.priority));

        let occupants: Vec<Occupant> = trains.iter().map(Train::occupant).collect();
        let snap = Snapshot {
            occupants: &occupants,
            occupancy: Occupancy::from_occupants(&occupants),
        };
        let mut reservations = Reservations::new();
        let mut out = TickOutcome {
            trains:  Vec::with_capacity(trains.len()),
            removed: Vec::new(),
        };

        for mut train in trains {
            match train.state {
                TrainState::Arrived if !train.cyclic => {
                    debug!("{} ({}) left the network", train.id, train.name);
                    out.removed.push(train.id);
                    continue;
                }
                TrainState::Arrived => {
                    train.state = TrainState::Dwelling;
                    train.dwell_remaining = self.config.dwell_ticks;
                }
                TrainState::Dwelling => self.step_dwelling(&mut train, &snap),
                TrainState::Moving => self.step_moving(&mut train, &mut reservations),
                TrainState::Waiting => self.step_waiting(&mut train, &snap, &mut reservations),
            }
            out.trains.push(train);
        }
        out
    }

    // ── State handlers ────────────────────────────────────────────────────

    fn step_dwelling(&self, train: &mut Train, snap: &Snapshot<'_>) {
        train.dwell_remaining = train.dwell_remaining.saturating_sub(1);
        if train.dwell_remaining > 0 {
            return;
        }
        let query = PathQuery::new(train.to, train.from)
            .occupants(snap.occupants)
            .excluding(train.id);
        match self.pathfinder.find_path(self.grid, &query) {
            Some(route) => {
                debug!("{} turning back towards {}", train.id, train.from);
                train.turn_back(route);
            }
            None => {
                debug!("{} has no return path, retrying in {} ticks", train.id, self.config.dwell_retry_ticks);
                train.dwell_remaining = self.config.dwell_retry_ticks;
            }
        }
    }

    fn step_moving(&self, train: &mut Train, reservations: &mut Reservations) {
        reservations.reserve_all(train.lookahead(self.config.lookahead_cells));

        train.progress += self.progress_per_tick();
        if train.progress >= 1.0 {
            train.progress = 0.0;
            train.path_index = (train.path_index + 1).min(train.path.len().saturating_sub(1));
            train.state = TrainState::Waiting;
        }
    }

    fn step_waiting(&self, train: &mut Train, snap: &Snapshot<'_>, reservations: &mut Reservations) {
        if train.at_destination() {
            debug!("{} arrived at {}", train.id, train.to);
            train.state = TrainState::Arrived;
            train.waiting_ticks = 0;
            return;
        }

        if !self.window_clear(train, snap, reservations) {
            if let Some(route) = self.reroute(train, snap, reservations, ReservationMode::Strict) {
                debug!("{} rerouted around reserved track", train.id);
                train.splice(route);
            } else if train.waiting_ticks > 0
                && train.waiting_ticks % self.config.soft_reroute_interval.max(1) == 0
            {
                if let Some(route) = self.reroute(train, snap, reservations, ReservationMode::Soft) {
                    debug!("{} took a soft reroute after {} ticks", train.id, train.waiting_ticks);
                    train.splice(route);
                }
            }
        }

        if self.window_clear(train, snap, reservations) {
            reservations.reserve_all(train.lookahead(self.config.lookahead_cells));
            train.state = TrainState::Moving;
            train.waiting_ticks = 0;
        } else {
            reservations.reserve(train.current_cell());
            train.waiting_ticks += 1;
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    #[inline]
    fn progress_per_tick(&self) -> f32 {
        (self.config.train_speed as f64 * self.speed) as f32
    }

    fn window_clear(&self, train: &Train, snap: &Snapshot<'_>, reservations: &Reservations) -> bool {
        train
            .lookahead(self.config.lookahead_cells)
            .iter()
            .all(|&cell| self.cell_free(cell, train, snap, reservations))
    }

    fn cell_free(&self, cell: CellId, train: &Train, snap: &Snapshot<'_>, reservations: &Reservations) -> bool {
        self.grid.is_traversable(cell)
            && !reservations.is_reserved(cell)
            && (cell == train.to || !snap.occupancy.blocked_for(cell, train.id))
    }

    fn reroute(
        &self,
        train:        &Train,
        snap:         &Snapshot<'_>,
        reservations: &Reservations,
        mode:         ReservationMode,
    ) -> Option<Route> {
        let query = PathQuery::new(train.current_cell(), train.to)
            .occupants(snap.occupants)
            .excluding(train.id)
            .reserved(reservations.cells(), mode);
        self.pathfinder.find_path(self.grid, &query)
    }
}
