//! Fixed-step tick scheduler.
//!
//! Converts wall-clock time handed in by the host into a whole number of
//! simulation ticks.  The interval between ticks is
//! `tick_interval_ms / speed`; time that does not fill a whole interval is
//! carried over to the next call, so the tick rate does not drift with frame
//! jitter.
//!
//! After a long stall (debugger break, window drag) the backlog could be
//! hundreds of ticks.  At most `max_catch_up` ticks are returned per call and
//! any further backlog is dropped.

use std::time::Duration;

#[derive(Clone, Debug)]
pub struct TickScheduler {
    base_interval: Duration,
    speed:         f64,
    accumulated:   Duration,
    max_catch_up:  u32,
}

impl TickScheduler {
    pub fn new(tick_interval_ms: u64, max_catch_up: u32) -> Self {
        Self {
            base_interval: Duration::from_millis(tick_interval_ms.max(1)),
            speed:         1.0,
            accumulated:   Duration::ZERO,
            max_catch_up:  max_catch_up.max(1),
        }
    }

    /// Set the speed multiplier.  The caller validates that it is positive and
    /// finite.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Wall-clock time between ticks at the current speed.
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.base_interval.as_secs_f64() / self.speed)
            .unwrap_or(Duration::MAX)
            .max(Duration::from_nanos(1))
    }

    /// Add `elapsed` wall-clock time and return how many ticks are now due.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulated += elapsed;
        let interval = self.interval();
        let due = self.accumulated.as_nanos() / interval.as_nanos();
        if due > self.max_catch_up as u128 {
            self.accumulated = Duration::ZERO;
            return self.max_catch_up;
        }
        let due = due as u32;
        self.accumulated -= interval * due;
        due
    }

    /// Time carried towards the next tick.
    pub fn pending(&self) -> Duration {
        self.accumulated
    }

    /// Drop any carried time.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
    }
}
