//! The grid map: cells, stations, and editing.
//!
//! # Data layout
//!
//! Cells are stored densely in row-major order (`y * width + x`), so looking
//! up a `CellId` is a bounds check plus one index.  Identities outside the
//! `width × height` rectangle are simply absent.
//!
//! Connectivity is implicit: two cells are adjacent iff they are 4-neighbours
//! and both are traversable (track or station).  There is no edge list to keep
//! in sync when the map is edited.
//!
//! Station names are unique.  A `BTreeMap` name index gives O(log n) lookup by
//! name and a stable, sorted iteration order for dispatch generators.

use std::collections::BTreeMap;

use rg_core::CellId;

use crate::{SpatialError, SpatialResult};

// ── Cell ──────────────────────────────────────────────────────────────────────

/// What occupies a grid cell.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellKind {
    #[default]
    Empty,
    Track,
    Station,
}

impl CellKind {
    /// `true` for track and station cells.
    #[inline]
    pub fn is_traversable(self) -> bool {
        matches!(self, CellKind::Track | CellKind::Station)
    }
}

/// One grid cell.  `label` is `Some` exactly when `kind == Station`.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub id:    CellId,
    pub kind:  CellKind,
    pub label: Option<String>,
}

impl Cell {
    fn empty(id: CellId) -> Self {
        Self { id, kind: CellKind::Empty, label: None }
    }
}

// ── Grid ──────────────────────────────────────────────────────────────────────

/// A fixed-size rectangular map of cells.
#[derive(Clone, Debug)]
pub struct Grid {
    width:    u32,
    height:   u32,
    cells:    Vec<Cell>,
    stations: BTreeMap<String, CellId>,
}

impl Grid {
    /// Create a `width × height` grid with every cell empty.
    pub fn new(width: u32, height: u32) -> Self {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                cells.push(Cell::empty(CellId::new(x, y)));
            }
        }
        Self { width, height, cells, stations: BTreeMap::new() }
    }

    /// Build a grid from an ASCII map, one text line per row.
    ///
    /// | Char        | Cell                         |
    /// |-------------|------------------------------|
    /// | `.` / space | empty                        |
    /// | `#`         | track                        |
    /// | letter      | station named by that letter |
    ///
    /// Leading and trailing blank lines are ignored; rows may be ragged (the
    /// grid is as wide as the longest row).
    pub fn from_ascii(map: &str) -> SpatialResult<Self> {
        let rows: Vec<&str> = map
            .lines()
            .skip_while(|l| l.trim().is_empty())
            .collect();
        let last = rows.iter().rposition(|l| !l.trim().is_empty()).map_or(0, |i| i + 1);
        let rows = &rows[..last];

        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut grid = Grid::new(width as u32, rows.len() as u32);

        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let id = CellId::new(x as i32, y as i32);
                match ch {
                    '.' | ' ' => {}
                    '#' => grid.set_track(id)?,
                    c if c.is_alphabetic() => grid.set_station(id, &c.to_string())?,
                    other => {
                        return Err(SpatialError::Parse(format!(
                            "unexpected character {other:?} at {id}"
                        )));
                    }
                }
            }
        }
        Ok(grid)
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `true` if `id` lies inside the grid rectangle.
    #[inline]
    pub fn contains(&self, id: CellId) -> bool {
        id.x >= 0 && id.y >= 0 && (id.x as u32) < self.width && (id.y as u32) < self.height
    }

    #[inline]
    fn index(&self, id: CellId) -> Option<usize> {
        self.contains(id)
            .then(|| id.y as usize * self.width as usize + id.x as usize)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// The cell at `id`, or `None` outside the grid.
    #[inline]
    pub fn cell_at(&self, id: CellId) -> Option<&Cell> {
        self.index(id).map(|i| &self.cells[i])
    }

    /// `true` iff `id` is inside the grid and is track or station.
    #[inline]
    pub fn is_traversable(&self, id: CellId) -> bool {
        self.cell_at(id).is_some_and(|c| c.kind.is_traversable())
    }

    /// Traversable 4-neighbours of `id`.
    ///
    /// Yields nothing if `id` itself is not traversable: an empty cell has no
    /// connections.
    pub fn neighbors(&self, id: CellId) -> impl Iterator<Item = CellId> + '_ {
        let from_ok = self.is_traversable(id);
        id.neighbors()
            .into_iter()
            .filter(move |&n| from_ok && self.is_traversable(n))
    }

    /// Cell of the station called `name`.
    pub fn station(&self, name: &str) -> Option<CellId> {
        self.stations.get(name.trim()).copied()
    }

    /// Name of the station at `id`, if `id` is a station.
    pub fn station_name(&self, id: CellId) -> Option<&str> {
        self.cell_at(id).and_then(|c| c.label.as_deref())
    }

    /// All stations, sorted by name.
    pub fn stations(&self) -> impl Iterator<Item = (&str, CellId)> + '_ {
        self.stations.iter().map(|(name, &id)| (name.as_str(), id))
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    /// Number of track and station cells.
    pub fn traversable_count(&self) -> usize {
        self.cells.iter().filter(|c| c.kind.is_traversable()).count()
    }

    // ── Editing ───────────────────────────────────────────────────────────

    /// Lay track on `id`.  A station previously at `id` loses its name.
    pub fn set_track(&mut self, id: CellId) -> SpatialResult<()> {
        self.replace(id, CellKind::Track, None)
    }

    /// Make `id` a station called `name` (trimmed).
    ///
    /// Re-labelling an existing station frees its old name.  Fails if the
    /// name is empty or already used by a different cell.
    pub fn set_station(&mut self, id: CellId, name: &str) -> SpatialResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SpatialError::EmptyStationName);
        }
        if let Some(&existing) = self.stations.get(name) {
            if existing != id {
                return Err(SpatialError::DuplicateStation { name: name.to_owned(), existing });
            }
        }
        self.replace(id, CellKind::Station, Some(name.to_owned()))
    }

    /// Clear `id` back to empty.
    pub fn erase(&mut self, id: CellId) -> SpatialResult<()> {
        self.replace(id, CellKind::Empty, None)
    }

    fn replace(&mut self, id: CellId, kind: CellKind, label: Option<String>) -> SpatialResult<()> {
        let i = self.index(id).ok_or(SpatialError::OutOfBounds(id))?;
        let cell = &mut self.cells[i];
        if let Some(old) = cell.label.take() {
            self.stations.remove(&old);
        }
        if let Some(name) = &label {
            self.stations.insert(name.clone(), id);
        }
        cell.kind = kind;
        cell.label = label;
        Ok(())
    }
}
