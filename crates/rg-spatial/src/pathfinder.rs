//! Pathfinding trait and the default weighted A* implementation.
//!
//! # Pluggability
//!
//! `rg-sim` routes trains through the [`Pathfinder`] trait, so applications
//! can swap in a different search without touching the tick engine.  The
//! default [`AStarPathfinder`] is a weighted A* over the 4-connected grid.
//!
//! # Cost model
//!
//! Costs are integers.  Entering a cell costs `PathCosts::step`, plus:
//!
//! | Surcharge    | Applies when                                            |
//! |--------------|---------------------------------------------------------|
//! | `occupied`   | another train stands on the cell (never on the goal)    |
//! | `reserved`   | the cell is reserved and the query is soft (never goal) |
//! | `congestion` | the cell neighbours another train's position            |
//! | `turn`       | the move changes direction                              |
//!
//! A strict query drops reserved cells (other than the goal) from the search
//! instead of pricing them.
//!
//! The heuristic is Manhattan distance × `step`.  Surcharges are never
//! negative, so it stays admissible and consistent.  Because the turn
//! surcharge depends on how a cell was entered, search states are
//! `(cell, incoming direction)` rather than bare cells.

use rg_core::{CellId, Direction, TrainId};

use crate::{CellSet, FastMap, Grid, MinHeap};

// ── Query types ───────────────────────────────────────────────────────────────

/// The position of one train as seen by the pathfinder.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Occupant {
    pub train: TrainId,
    /// The cell the train currently stands on.
    pub cell:  CellId,
    /// The cell it is moving into, if it is between cells.
    pub next:  Option<CellId>,
}

/// How reserved cells are treated.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum ReservationMode {
    /// Reserved cells are excluded from the search.
    Strict,
    /// Reserved cells carry `PathCosts::reserved`.
    #[default]
    Soft,
}

/// One routing request.
#[derive(Clone, Debug)]
pub struct PathQuery<'a> {
    pub start:     CellId,
    pub goal:      CellId,
    /// Current train positions.
    pub occupants: &'a [Occupant],
    /// The requesting train; its own position is ignored.
    pub exclude:   Option<TrainId>,
    /// Cells already claimed this tick.
    pub reserved:  Option<&'a CellSet>,
    pub mode:      ReservationMode,
}

impl<'a> PathQuery<'a> {
    /// A query on an otherwise empty network.
    pub fn new(start: CellId, goal: CellId) -> Self {
        Self {
            start,
            goal,
            occupants: &[],
            exclude:   None,
            reserved:  None,
            mode:      ReservationMode::Soft,
        }
    }

    pub fn occupants(mut self, occupants: &'a [Occupant]) -> Self {
        self.occupants = occupants;
        self
    }

    pub fn excluding(mut self, train: TrainId) -> Self {
        self.exclude = Some(train);
        self
    }

    pub fn reserved(mut self, reserved: &'a CellSet, mode: ReservationMode) -> Self {
        self.reserved = Some(reserved);
        self.mode = mode;
        self
    }
}

/// A found path: cells from start to goal inclusive, and its total cost.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub cells: Vec<CellId>,
    pub cost:  u64,
}

impl Route {
    /// Number of cells, endpoints included.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// `true` if start and goal are the same cell.
    pub fn is_trivial(&self) -> bool {
        self.cells.len() <= 1
    }
}

// ── Pathfinder trait ──────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// Implementations must be `Send + Sync` so route planning for a batch of
/// dispatches can run on worker threads.
pub trait Pathfinder: Send + Sync {
    /// Find a path for `query` over `grid`, or `None` if the goal is
    /// unreachable under the query's constraints.
    fn find_path(&self, grid: &Grid, query: &PathQuery<'_>) -> Option<Route>;
}

// ── PathCosts ─────────────────────────────────────────────────────────────────

/// Weights of the A* cost model.
///
/// The defaults keep each surcharge well above every smaller one combined:
/// a route through an occupied cell is only chosen when no free route of
/// fewer than ~1 000 cells exists, and a soft-reserved cell only when every
/// alternative is occupied or far longer still.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PathCosts {
    pub step:       u64,
    pub turn:       u64,
    pub congestion: u64,
    pub occupied:   u64,
    pub reserved:   u64,
}

impl Default for PathCosts {
    fn default() -> Self {
        Self {
            step:       10,
            turn:       1,
            congestion: 25,
            occupied:   10_000,
            reserved:   1_000_000,
        }
    }
}

// ── AStarPathfinder ───────────────────────────────────────────────────────────

/// Weighted A* over the 4-connected traversable cells of a [`Grid`].
#[derive(Clone, Debug, Default)]
pub struct AStarPathfinder {
    pub costs: PathCosts,
}

impl AStarPathfinder {
    pub fn new(costs: PathCosts) -> Self {
        Self { costs }
    }
}

impl Pathfinder for AStarPathfinder {
    fn find_path(&self, grid: &Grid, query: &PathQuery<'_>) -> Option<Route> {
        astar(grid, query, &self.costs)
    }
}

// ── A* internals ──────────────────────────────────────────────────────────────

/// A search state: a cell and the direction it was entered from.
type State = (CellId, Option<Direction>);

/// Per-query cost lookups, built once before the search.
struct CostField<'a> {
    costs:     &'a PathCosts,
    goal:      CellId,
    occupied:  CellSet,
    congested: CellSet,
    reserved:  Option<&'a CellSet>,
    mode:      ReservationMode,
}

impl<'a> CostField<'a> {
    fn new(query: &PathQuery<'a>, costs: &'a PathCosts) -> Self {
        let mut occupied = CellSet::default();
        let mut congested = CellSet::default();
        for occ in query.occupants {
            if Some(occ.train) == query.exclude {
                continue;
            }
            occupied.insert(occ.cell);
            congested.extend(occ.cell.neighbors());
        }
        Self {
            costs,
            goal: query.goal,
            occupied,
            congested,
            reserved: query.reserved,
            mode: query.mode,
        }
    }

    /// Cost of entering `cell` by moving `dir` after arriving via `prev`.
    /// `None` if the cell is excluded from the search.
    fn enter_cost(&self, cell: CellId, prev: Option<Direction>, dir: Direction) -> Option<u64> {
        let mut cost = self.costs.step;

        if cell != self.goal {
            if self.reserved.is_some_and(|r| r.contains(&cell)) {
                match self.mode {
                    ReservationMode::Strict => return None,
                    ReservationMode::Soft => cost += self.costs.reserved,
                }
            }
            if self.occupied.contains(&cell) {
                cost += self.costs.occupied;
            }
        }
        if self.congested.contains(&cell) {
            cost += self.costs.congestion;
        }
        if prev.is_some_and(|p| p != dir) {
            cost += self.costs.turn;
        }
        Some(cost)
    }
}

fn astar(grid: &Grid, query: &PathQuery<'_>, costs: &PathCosts) -> Option<Route> {
    let (start, goal) = (query.start, query.goal);
    if !grid.is_traversable(start) || !grid.is_traversable(goal) {
        return None;
    }
    if start == goal {
        return Some(Route { cells: vec![start], cost: 0 });
    }

    let field = CostField::new(query, costs);
    let h = |cell: CellId| cell.manhattan(goal) as u64 * costs.step;

    // best_g[s] = cheapest known cost to reach state s.
    let mut best_g: FastMap<State, u64> = FastMap::default();
    let mut parent: FastMap<State, State> = FastMap::default();
    let mut open: MinHeap<(State, u64)> = MinHeap::new();

    let origin: State = (start, None);
    best_g.insert(origin, 0);
    open.push(h(start), (origin, 0));

    while let Some((_f, (state, g))) = open.pop() {
        // Skip stale entries: a cheaper path to this state was recorded
        // after this one was pushed.
        if best_g.get(&state).is_some_and(|&best| g > best) {
            continue;
        }

        let (cell, came_by) = state;
        if cell == goal {
            return Some(Route { cells: reconstruct(&parent, state), cost: g });
        }

        for dir in Direction::ALL {
            let next = cell.step(dir);
            if !grid.is_traversable(next) {
                continue;
            }
            let Some(step_cost) = field.enter_cost(next, came_by, dir) else {
                continue;
            };
            let next_state: State = (next, Some(dir));
            let next_g = g.saturating_add(step_cost);

            if best_g.get(&next_state).is_none_or(|&best| next_g < best) {
                best_g.insert(next_state, next_g);
                parent.insert(next_state, state);
                open.push(next_g.saturating_add(h(next)), (next_state, next_g));
            }
        }
    }

    None
}

fn reconstruct(parent: &FastMap<State, State>, goal: State) -> Vec<CellId> {
    let mut cells = vec![goal.0];
    let mut cur = goal;
    while let Some(&prev) = parent.get(&cur) {
        cells.push(prev.0);
        cur = prev;
    }
    cells.reverse();
    cells
}
