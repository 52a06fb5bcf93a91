//! `DispatchQueue`: pending timetabled and batch dispatches.
//!
//! Two stores with different retention:
//!
//! - **schedule**: a `Vec<ScheduleItem>` in insertion order.  Firing an item
//!   only flips its `dispatched` flag, so the host can still list the whole
//!   timetable afterwards.  Fired items are kept until
//!   [`DispatchQueue::prune_dispatched`] or [`DispatchQueue::clear`]; a
//!   separate count of unfired items keeps `len()` O(1).
//! - **batch**: a `BTreeMap<Tick, Vec<BatchItem>>`.  Due ticks are split off
//!   the front of the map and their items are consumed.
//!
//! [`DispatchQueue::drain_due`] returns every request whose target tick is at
//! or before `now`, schedule items first (in insertion order), then batch
//! items (in tick order, then insertion order).  A target in the past fires on
//! the next drain, so nothing is lost if the host skips ticks.

use std::collections::BTreeMap;
use std::mem;

use rg_core::Tick;

use crate::{BatchItem, DispatchRequest, ScheduleItem};

#[derive(Default, Debug)]
pub struct DispatchQueue {
    schedule:         Vec<ScheduleItem>,
    /// Schedule items with `dispatched == false`.
    schedule_pending: usize,
    batch:            BTreeMap<Tick, Vec<BatchItem>>,
    /// Cached batch item count for O(1) `len()`.
    batch_total:      usize,
}

impl DispatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_schedule(&mut self, item: ScheduleItem) {
        self.schedule_pending += usize::from(!item.dispatched);
        self.schedule.push(item);
    }

    /// Queue `item` to fire at `tick`.
    pub fn push_batch(&mut self, tick: Tick, item: BatchItem) {
        self.batch.entry(tick).or_default().push(item);
        self.batch_total += 1;
    }

    /// Take every request due at or before `now`.
    pub fn drain_due(&mut self, now: Tick) -> Vec<DispatchRequest> {
        let mut due: Vec<DispatchRequest> = self
            .schedule
            .iter_mut()
            .filter(|item| !item.dispatched && item.target <= now)
            .map(|item| {
                item.dispatched = true;
                item.to_request()
            })
            .collect();
        self.schedule_pending -= due.len();

        let later = self.batch.split_off(&(now + 1));
        for (tick, items) in mem::replace(&mut self.batch, later) {
            self.batch_total -= items.len();
            due.extend(items.into_iter().map(|item| item.into_request(tick)));
        }
        due
    }

    /// The earliest tick with a pending item, or `None` if nothing is pending.
    pub fn next_due(&self) -> Option<Tick> {
        let sched = self
            .schedule
            .iter()
            .filter(|item| !item.dispatched)
            .map(|item| item.target)
            .min();
        let batch = self.batch.keys().next().copied();
        match (sched, batch) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// All schedule items, dispatched ones included.
    pub fn schedule(&self) -> &[ScheduleItem] {
        &self.schedule
    }

    /// Pending batch items in firing order.
    pub fn batch(&self) -> impl Iterator<Item = (Tick, &BatchItem)> + '_ {
        self.batch
            .iter()
            .flat_map(|(&tick, items)| items.iter().map(move |item| (tick, item)))
    }

    /// Number of items that have not fired yet.
    pub fn len(&self) -> usize {
        self.schedule_pending + self.batch_total
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop schedule items that have already fired.  Returns how many were
    /// removed.
    pub fn prune_dispatched(&mut self) -> usize {
        let before = self.schedule.len();
        self.schedule.retain(|item| !item.dispatched);
        before - self.schedule.len()
    }

    pub fn clear(&mut self) {
        self.schedule.clear();
        self.schedule_pending = 0;
        self.batch.clear();
        self.batch_total = 0;
    }
}
