//! Simulation observer trait and the per-tick report.

use rg_core::{Tick, TrainId};
use rg_dispatch::{DispatchError, DispatchRequest};

use crate::Train;

/// A queued dispatch that could not be turned into a train.
#[derive(Debug)]
pub struct DispatchFailure {
    pub request: DispatchRequest,
    pub error:   DispatchError,
}

/// Summary of one tick, returned by [`Sim::step`][crate::Sim::step] and
/// passed to [`SimObserver::on_tick_end`].
#[derive(Debug, Default)]
pub struct TickReport {
    pub tick:     Tick,
    /// Trains created from queued dispatches this tick.
    pub spawned:  Vec<TrainId>,
    /// Queued dispatches that failed this tick.
    pub failed:   Vec<DispatchFailure>,
    /// Trains that left the network this tick.
    pub removed:  Vec<TrainId>,
    /// Deadlock warning after this tick.
    pub deadlock: bool,
    /// Active trains after this tick.
    pub active:   usize,
}

/// Callbacks invoked by [`Sim`][crate::Sim] at key points in the tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: deadlock alarm
///
/// ```rust,ignore
/// struct Alarm;
///
/// impl SimObserver for Alarm {
///     fn on_tick_end(&mut self, tick: Tick, report: &TickReport) {
///         if report.deadlock {
///             eprintln!("{tick}: all trains stuck");
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after the tick's trains are updated and dispatches spawned.
    fn on_tick_end(&mut self, _tick: Tick, _report: &TickReport) {}

    /// Called every `config.output_interval_ticks` ticks with the full train
    /// set, in processing order.
    fn on_snapshot(&mut self, _tick: Tick, _trains: &[Train]) {}

    /// Called once when a bounded run finishes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
