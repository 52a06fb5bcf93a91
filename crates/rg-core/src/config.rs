//! Simulation configuration.
//!
//! Every tunable of the tick engine, dispatcher, and tick scheduler lives in
//! [`SimConfig`].  Applications typically start from `SimConfig::default()`
//! and override a handful of fields, or (with the `serde` feature) load a
//! partial JSON/TOML document; missing fields fall back to the defaults.

use crate::{CoreError, CoreResult, SimClock};

/// Top-level simulation configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Simulated seconds per tick.  Schedule offsets are converted with this.
    /// Default: 1.
    pub tick_duration_secs: u32,

    /// Wall-clock milliseconds between ticks at speed multiplier 1.0.
    /// Default: 100.
    pub tick_interval_ms: u64,

    /// Fraction of a path cell a moving train covers per tick at speed 1.0.
    /// Default: 0.25 (four ticks per cell).
    pub train_speed: f32,

    /// Number of path cells beyond the current one a train must control
    /// before it may advance.  Default: 3.
    pub lookahead_cells: usize,

    /// Ticks a cyclic train dwells at a terminus before its return trip.
    /// Default: 20.
    pub dwell_ticks: u32,

    /// Dwell countdown restarted when no return path exists.  Default: 10.
    pub dwell_retry_ticks: u32,

    /// A blocked train with no strict reroute tries a soft reroute every this
    /// many waiting ticks.  Default: 10.
    pub soft_reroute_interval: u32,

    /// The deadlock warning requires every active train to have waited more
    /// than this many consecutive ticks.  Default: 20.
    pub deadlock_threshold_ticks: u32,

    /// Upper bound on ticks run by one scheduler pump, so a long host stall
    /// does not trigger an unbounded catch-up burst.  Default: 10.
    pub max_catch_up_ticks: u32,

    /// Observer snapshot every N ticks.  0 disables snapshots.  Default: 1.
    pub output_interval_ticks: u64,

    /// Master RNG seed (random batch generation).  Default: 42.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_duration_secs:       1,
            tick_interval_ms:         100,
            train_speed:              0.25,
            lookahead_cells:          3,
            dwell_ticks:              20,
            dwell_retry_ticks:        10,
            soft_reroute_interval:    10,
            deadlock_threshold_ticks: 20,
            max_catch_up_ticks:       10,
            output_interval_ticks:    1,
            seed:                     42,
        }
    }
}

impl SimConfig {
    /// Check that every field is within its usable range.
    pub fn validate(&self) -> CoreResult<()> {
        if self.tick_duration_secs == 0 {
            return Err(CoreError::Config("tick_duration_secs must be at least 1".into()));
        }
        if self.tick_interval_ms == 0 {
            return Err(CoreError::Config("tick_interval_ms must be at least 1".into()));
        }
        if !self.train_speed.is_finite() || self.train_speed <= 0.0 {
            return Err(CoreError::Config(format!(
                "train_speed must be a positive finite number, got {}",
                self.train_speed
            )));
        }
        if self.lookahead_cells == 0 {
            return Err(CoreError::Config("lookahead_cells must be at least 1".into()));
        }
        if self.dwell_retry_ticks == 0 {
            return Err(CoreError::Config("dwell_retry_ticks must be at least 1".into()));
        }
        if self.soft_reroute_interval == 0 {
            return Err(CoreError::Config("soft_reroute_interval must be at least 1".into()));
        }
        if self.max_catch_up_ticks == 0 {
            return Err(CoreError::Config("max_catch_up_ticks must be at least 1".into()));
        }
        Ok(())
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.tick_duration_secs)
    }
}
