//! Fluent builder for constructing a [`Sim`].

use rg_core::{SimConfig, SimRng, Tick, TrainId};
use rg_dispatch::{BatchItem, DispatchQueue, ScheduleItem};
use rg_spatial::{Grid, Pathfinder};

use crate::deadlock::DeadlockMonitor;
use crate::{Sim, SimError, SimResult, TickScheduler};

/// Fluent builder for [`Sim<P>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: engine tunables, validated in [`build`](Self::build)
/// - [`Grid`]: the map
/// - `P: Pathfinder`: the routing engine (e.g. [`rg_spatial::AStarPathfinder`])
///
/// # Optional inputs (have defaults)
///
/// | Method         | Default |
/// |----------------|---------|
/// | `.schedule(v)` | empty   |
/// | `.batch(v)`    | empty   |
/// | `.speed(x)`    | `1.0`   |
///
/// # Example
///
/// ```rust,ignore
/// let grid = Grid::from_ascii("A###B")?;
/// let mut sim = SimBuilder::new(SimConfig::default(), grid, AStarPathfinder::default())
///     .speed(2.0)
///     .build()?;
/// sim.dispatch_manual("A", "B", 5, false)?;
/// sim.run_until_idle(1_000, &mut NoopObserver);
/// ```
pub struct SimBuilder<P: Pathfinder> {
    config:     SimConfig,
    grid:       Grid,
    pathfinder: P,
    schedule:   Vec<ScheduleItem>,
    batch:      Vec<(Tick, BatchItem)>,
    speed:      f64,
}

impl<P: Pathfinder> SimBuilder<P> {
    pub fn new(config: SimConfig, grid: Grid, pathfinder: P) -> Self {
        Self {
            config,
            grid,
            pathfinder,
            schedule: Vec::new(),
            batch:    Vec::new(),
            speed:    1.0,
        }
    }

    /// Timetabled dispatches queued before the first tick.
    pub fn schedule(mut self, items: Vec<ScheduleItem>) -> Self {
        self.schedule = items;
        self
    }

    /// Batch dispatches queued before the first tick.
    pub fn batch(mut self, items: Vec<(Tick, BatchItem)>) -> Self {
        self.batch = items;
        self
    }

    /// Initial speed multiplier.
    pub fn speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Validate inputs and return a stopped [`Sim`] at tick 0.
    pub fn build(self) -> SimResult<Sim<P>> {
        self.config.validate()?;
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(SimError::InvalidSpeed(self.speed));
        }

        let mut dispatch = DispatchQueue::new();
        for item in self.schedule {
            dispatch.push_schedule(item);
        }
        for (tick, item) in self.batch {
            dispatch.push_batch(tick, item);
        }

        let mut scheduler =
            TickScheduler::new(self.config.tick_interval_ms, self.config.max_catch_up_ticks);
        scheduler.set_speed(self.speed);

        Ok(Sim {
            clock:         self.config.make_clock(),
            rng:           SimRng::new(self.config.seed),
            config:        self.config,
            grid:          self.grid,
            trains:        Vec::new(),
            dispatch,
            pathfinder:    self.pathfinder,
            scheduler,
            deadlock:      DeadlockMonitor::new(),
            next_train_id: TrainId(0),
            running:       false,
            speed:         self.speed,
        })
    }
}
