//! The `Sim` struct: simulation context, control surface, and tick loop.

use std::mem;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

use log::{debug, info, warn};

use rg_core::{CellId, SimClock, SimConfig, SimRng, Tick, TrainId};
use rg_dispatch::{
    load_schedule_csv, parse_schedule_json, random_batch, BatchItem, DispatchError,
    DispatchQueue, DispatchRequest, DispatchResult, ScheduleItem, ScheduleLoad,
};
use rg_spatial::{Grid, Occupant, PathQuery, Pathfinder, Route};

use crate::deadlock::DeadlockMonitor;
use crate::engine::TickEngine;
use crate::{DispatchFailure, SimError, SimObserver, SimResult, TickReport, TickScheduler, Train};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The simulation context.
///
/// Owns the grid, the active trains, the dispatch queue, and the control
/// state.  One call to [`step`](Self::step) runs one tick:
///
/// 1. **Engine**: trains are updated in descending priority order against
///    the start-of-tick snapshot (see [`crate::engine`]).
/// 2. **Dispatch**: queued requests due at this tick are routed and appended
///    as new trains; failures go into the tick report.
/// 3. **Deadlock**: the monitor re-evaluates the post-tick train set.
/// 4. **Observers**: `on_tick_end`, then `on_snapshot` at the output interval.
///
/// The grid can only be edited while the simulation is stopped.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<P: Pathfinder> {
    /// Engine tunables.
    pub config: SimConfig,

    /// Simulation clock.
    pub clock: SimClock,

    pub(crate) grid:          Grid,
    pub(crate) trains:        Vec<Train>,
    pub(crate) dispatch:      DispatchQueue,
    pub(crate) pathfinder:    P,
    pub(crate) scheduler:     TickScheduler,
    pub(crate) deadlock:      DeadlockMonitor,
    pub(crate) rng:           SimRng,
    pub(crate) next_train_id: TrainId,
    pub(crate) running:       bool,
    pub(crate) speed:         f64,
}

/// An initial route computed for a request before its train exists.
struct Planned {
    request: DispatchRequest,
    route:   DispatchResult<Route>,
}

impl<P: Pathfinder> Sim<P> {
    // ── Read access ───────────────────────────────────────────────────────

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Active trains in the order they were last processed.
    pub fn trains(&self) -> &[Train] {
        &self.trains
    }

    pub fn train(&self, id: TrainId) -> Option<&Train> {
        self.trains.iter().find(|t| t.id == id)
    }

    pub fn dispatch_queue(&self) -> &DispatchQueue {
        &self.dispatch
    }

    pub fn pathfinder(&self) -> &P {
        &self.pathfinder
    }

    pub fn now(&self) -> Tick {
        self.clock.current_tick
    }

    pub fn deadlock_warning(&self) -> bool {
        self.deadlock.warning()
    }

    // ── Control ───────────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        if !self.running {
            info!("simulation started at {}", self.clock);
            self.running = true;
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            info!("simulation stopped at {}", self.clock);
            self.running = false;
        }
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Set the speed multiplier.  It scales how far trains move per tick and
    /// divides the wall-clock interval between ticks.
    pub fn set_speed(&mut self, speed: f64) -> SimResult<()> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(SimError::InvalidSpeed(speed));
        }
        info!("speed multiplier {} → {}", self.speed, speed);
        self.speed = speed;
        self.scheduler.set_speed(speed);
        Ok(())
    }

    /// Stop, and clear trains, queues, and the clock.  The grid is kept.
    pub fn reset(&mut self) {
        self.running = false;
        self.trains.clear();
        self.dispatch.clear();
        self.clock.reset();
        self.scheduler.reset();
        self.deadlock.reset();
        self.next_train_id = TrainId(0);
        info!("simulation reset");
    }

    // ── Map editing ───────────────────────────────────────────────────────

    /// Mutable grid access, only while stopped.
    pub fn grid_mut(&mut self) -> SimResult<&mut Grid> {
        if self.running {
            return Err(SimError::EditWhileRunning);
        }
        Ok(&mut self.grid)
    }

    pub fn set_track(&mut self, cell: CellId) -> SimResult<()> {
        Ok(self.grid_mut()?.set_track(cell)?)
    }

    pub fn set_station(&mut self, cell: CellId, name: &str) -> SimResult<()> {
        Ok(self.grid_mut()?.set_station(cell, name)?)
    }

    pub fn erase(&mut self, cell: CellId) -> SimResult<()> {
        Ok(self.grid_mut()?.erase(cell)?)
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    /// Create a train now.  Fails without side effects if the request is
    /// invalid or no route exists.
    pub fn dispatch_manual(
        &mut self,
        from:     &str,
        to:       &str,
        priority: u8,
        cyclic:   bool,
    ) -> SimResult<TrainId> {
        let request = DispatchRequest::manual(from, to, priority, cyclic, self.now());
        let occupants = self.occupants();
        let route = plan_route(&self.grid, &self.pathfinder, &request, &occupants)?;
        Ok(self.spawn(&request, route))
    }

    pub fn enqueue_schedule(&mut self, item: ScheduleItem) {
        self.dispatch.push_schedule(item);
    }

    pub fn enqueue_batch(&mut self, tick: Tick, item: BatchItem) {
        self.dispatch.push_batch(tick, item);
    }

    /// Queue the accepted records of `load`, offset from the current tick.
    pub fn enqueue_records(&mut self, load: &ScheduleLoad) {
        let now = self.now();
        for record in &load.records {
            self.dispatch.push_schedule(record.to_item(&self.clock, now));
        }
        for rejected in &load.rejected {
            warn!("schedule record {} rejected: {}", rejected.index, rejected.error);
        }
        info!(
            "schedule loaded: {} records queued, {} rejected",
            load.records.len(),
            load.rejected.len()
        );
    }

    /// Parse a JSON schedule and queue its valid records.  The returned load
    /// lists what was accepted and rejected.
    pub fn load_schedule_json(&mut self, text: &str) -> SimResult<ScheduleLoad> {
        let load = parse_schedule_json(text, &self.grid)?;
        self.enqueue_records(&load);
        Ok(load)
    }

    /// Like [`load_schedule_json`](Self::load_schedule_json) for a CSV file.
    pub fn load_schedule_csv(&mut self, path: &Path) -> SimResult<ScheduleLoad> {
        let load = load_schedule_csv(path, &self.grid)?;
        self.enqueue_records(&load);
        Ok(load)
    }

    /// Queue `count` random trips between the grid's stations, the first one
    /// at the current tick and then one every `spacing` ticks.
    pub fn generate_batch(
        &mut self,
        count:      usize,
        spacing:    u64,
        priorities: RangeInclusive<u8>,
    ) -> SimResult<usize> {
        let now = self.now();
        let stations: Vec<&str> = self.grid.stations().map(|(name, _)| name).collect();
        let items = random_batch(&mut self.rng, &stations, count, now, spacing, priorities)?;
        let n = items.len();
        for (tick, item) in items {
            self.dispatch.push_batch(tick, item);
        }
        info!("queued a random batch of {n} trains");
        Ok(n)
    }

    // ── Tick loop ─────────────────────────────────────────────────────────

    /// Run one tick.  Works whether or not the simulation is started.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> TickReport {
        let now = self.now();
        observer.on_tick_start(now);

        let outcome = TickEngine::new(&self.grid, &self.pathfinder, &self.config, self.speed)
            .advance(mem::take(&mut self.trains));
        self.trains = outcome.trains;

        let mut report = TickReport { tick: now, removed: outcome.removed, ..TickReport::default() };
        self.spawn_due(now, &mut report);

        report.deadlock =
            self.deadlock.update(now, &self.trains, self.config.deadlock_threshold_ticks);
        report.active = self.trains.len();

        observer.on_tick_end(now, &report);
        let interval = self.config.output_interval_ticks;
        if interval > 0 && now.0.is_multiple_of(interval) {
            observer.on_snapshot(now, &self.trains);
        }

        self.clock.advance();
        report
    }

    /// Run exactly `n` ticks.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.step(observer);
        }
    }

    /// Step until no trains are active and nothing is queued, or until
    /// `max_ticks` ticks have run.  Returns the number of ticks run.
    pub fn run_until_idle<O: SimObserver>(&mut self, max_ticks: u64, observer: &mut O) -> u64 {
        let mut ran = 0;
        while ran < max_ticks && !(self.trains.is_empty() && self.dispatch.is_empty()) {
            self.step(observer);
            ran += 1;
        }
        observer.on_sim_end(self.now());
        ran
    }

    /// Feed wall-clock time to the tick scheduler and run the ticks that are
    /// due.  Does nothing while stopped.  Returns the number of ticks run.
    pub fn pump<O: SimObserver>(&mut self, elapsed: Duration, observer: &mut O) -> u32 {
        if !self.running {
            return 0;
        }
        let due = self.scheduler.advance(elapsed);
        for _ in 0..due {
            self.step(observer);
        }
        due
    }

    // ── Internals ─────────────────────────────────────────────────────────

    pub(crate) fn occupants(&self) -> Vec<Occupant> {
        self.trains.iter().map(Train::occupant).collect()
    }

    fn spawn_due(&mut self, now: Tick, report: &mut TickReport) {
        let requests = self.dispatch.drain_due(now);
        if requests.is_empty() {
            return;
        }
        let occupants = self.occupants();
        for planned in self.plan_all(requests, &occupants) {
            match planned.route {
                Ok(route) => report.spawned.push(self.spawn(&planned.request, route)),
                Err(error) => {
                    warn!("{now}: dispatch {} failed: {error}", planned.request);
                    report.failed.push(DispatchFailure { request: planned.request, error });
                }
            }
        }
    }

    /// Route every request against the same snapshot.  Order is preserved.
    fn plan_all(&self, requests: Vec<DispatchRequest>, occupants: &[Occupant]) -> Vec<Planned> {
        let (grid, pathfinder) = (&self.grid, &self.pathfinder);

        #[cfg(not(feature = "parallel"))]
        {
            requests
                .into_iter()
                .map(|request| {
                    let route = plan_route(grid, pathfinder, &request, occupants);
                    Planned { request, route }
                })
                .collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            requests
                .into_par_iter()
                .map(|request| {
                    let route = plan_route(grid, pathfinder, &request, occupants);
                    Planned { request, route }
                })
                .collect()
        }
    }

    fn spawn(&mut self, request: &DispatchRequest, route: Route) -> TrainId {
        let id = self.next_train_id;
        self.next_train_id = id.next();
        let name = format!("{}→{} #{}", request.from.trim(), request.to.trim(), id.0);
        debug!("{} dispatched ({}), {} cells", id, request, route.len());
        self.trains.push(Train::new(id, name, route, request.priority, request.cyclic));
        id
    }
}

/// Validate `request` and find its initial route from origin to destination.
fn plan_route<P: Pathfinder>(
    grid:       &Grid,
    pathfinder: &P,
    request:    &DispatchRequest,
    occupants:  &[Occupant],
) -> DispatchResult<Route> {
    let (from, to) = request.resolve(grid)?;
    let query = PathQuery::new(from, to).occupants(occupants);
    pathfinder.find_path(grid, &query).ok_or_else(|| DispatchError::NoRoute {
        from: request.from.trim().to_owned(),
        to:   request.to.trim().to_owned(),
    })
}
