//! Seeded random batch generation.

use std::ops::RangeInclusive;

use rg_core::{SimRng, Tick};

use crate::{validate_priority, BatchItem, DispatchError, DispatchResult};

/// Generate `count` batch items between random distinct station pairs.
///
/// Item `i` fires at `start + i * spacing`.  Priorities are drawn uniformly
/// from `priorities`, which must lie inside 1–10.  The same `rng` state always
/// yields the same batch.
pub fn random_batch<S: AsRef<str>>(
    rng: &mut SimRng,
    stations: &[S],
    count: usize,
    start: Tick,
    spacing: u64,
    priorities: RangeInclusive<u8>,
) -> DispatchResult<Vec<(Tick, BatchItem)>> {
    if stations.len() < 2 {
        return Err(DispatchError::NotEnoughStations(stations.len()));
    }
    let (lo, hi) = (*priorities.start(), *priorities.end());
    validate_priority(lo as i64)?;
    validate_priority(hi as i64)?;
    if lo > hi {
        return Err(DispatchError::InvalidPriority(lo as i64));
    }

    let n = stations.len();
    let items = (0..count)
        .map(|i| {
            let a = rng.gen_range(0..n);
            // Draw from the other n-1 stations.
            let mut b = rng.gen_range(0..n - 1);
            if b >= a {
                b += 1;
            }
            let priority = rng.gen_range(lo..=hi);
            let tick = start + i as u64 * spacing;
            (tick, BatchItem::new(stations[a].as_ref(), stations[b].as_ref(), priority, false))
        })
        .collect();
    Ok(items)
}
