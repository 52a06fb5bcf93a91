//! Per-tick reservation set and occupancy snapshot.

use rg_core::{CellId, TrainId};
use rg_spatial::{CellSet, FastMap, Occupant};

/// Cells claimed so far in the current tick.
///
/// Built empty at the start of every tick and filled in priority order, so a
/// train only ever sees claims made by trains processed before it.
#[derive(Default, Debug)]
pub struct Reservations {
    cells: CellSet,
}

impl Reservations {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn reserve(&mut self, cell: CellId) {
        self.cells.insert(cell);
    }

    pub fn reserve_all(&mut self, cells: &[CellId]) {
        self.cells.extend(cells.iter().copied());
    }

    #[inline]
    pub fn is_reserved(&self, cell: CellId) -> bool {
        self.cells.contains(&cell)
    }

    /// The underlying set, for pathfinder queries.
    pub fn cells(&self) -> &CellSet {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Start-of-tick map from cell to the trains standing on it or moving into it.
#[derive(Default, Debug)]
pub struct Occupancy {
    by_cell: FastMap<CellId, Vec<TrainId>>,
}

impl Occupancy {
    pub fn from_occupants(occupants: &[Occupant]) -> Self {
        let mut by_cell: FastMap<CellId, Vec<TrainId>> = FastMap::default();
        for occ in occupants {
            by_cell.entry(occ.cell).or_default().push(occ.train);
            if let Some(next) = occ.next {
                by_cell.entry(next).or_default().push(occ.train);
            }
        }
        Self { by_cell }
    }

    /// `true` if a train other than `me` stands on or is moving into `cell`.
    pub fn blocked_for(&self, cell: CellId, me: TrainId) -> bool {
        self.by_cell
            .get(&cell)
            .is_some_and(|trains| trains.iter().any(|&t| t != me))
    }
}
