//! Grid coordinates.
//!
//! A `CellId` is the identity of one grid cell.  It is derived directly from
//! the integer coordinate pair, so two cells can never share an identity and
//! the same coordinates always produce the same id.
//!
//! The stable text key is `"x,y"` (no whitespace).  `Display` produces it and
//! `FromStr` parses it back; with the `serde` feature the key is also the
//! serialized form, which keeps `CellId` usable as a JSON object key.

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

// ── Direction ─────────────────────────────────────────────────────────────────

/// One of the four axis-aligned moves of 4-connectivity.
///
/// `y` grows downwards (row index), so `North` is `y - 1`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All four directions in a fixed expansion order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// `(dx, dy)` unit offset of this direction.
    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East  => (1, 0),
            Direction::South => (0, 1),
            Direction::West  => (-1, 0),
        }
    }

    /// The opposite direction.
    #[inline]
    pub fn reverse(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East  => Direction::West,
            Direction::South => Direction::North,
            Direction::West  => Direction::East,
        }
    }
}

// ── CellId ────────────────────────────────────────────────────────────────────

/// Identity of a grid cell: its `(x, y)` coordinate pair.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
pub struct CellId {
    pub x: i32,
    pub y: i32,
}

impl CellId {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one step in `dir`.
    #[inline]
    pub fn step(self, dir: Direction) -> CellId {
        let (dx, dy) = dir.delta();
        CellId::new(self.x + dx, self.y + dy)
    }

    /// The four 4-connected neighbours, in [`Direction::ALL`] order.
    ///
    /// Neighbours are returned regardless of bounds or traversability; the
    /// grid filters them.
    #[inline]
    pub fn neighbors(self) -> [CellId; 4] {
        Direction::ALL.map(|d| self.step(d))
    }

    /// Manhattan (L1) distance to `other`.
    #[inline]
    pub fn manhattan(self, other: CellId) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// `true` iff `other` differs by exactly one unit along a single axis.
    #[inline]
    pub fn is_adjacent(self, other: CellId) -> bool {
        self.manhattan(other) == 1
    }

    /// Direction of the single step from `self` to `other`, or `None` if the
    /// two cells are not 4-adjacent.
    pub fn direction_to(self, other: CellId) -> Option<Direction> {
        match (other.x - self.x, other.y - self.y) {
            (0, -1) => Some(Direction::North),
            (1, 0)  => Some(Direction::East),
            (0, 1)  => Some(Direction::South),
            (-1, 0) => Some(Direction::West),
            _ => None,
        }
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for CellId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| CoreError::Parse(format!("invalid cell key {s:?}: expected \"x,y\"")))?;
        let parse = |part: &str| {
            part.parse::<i32>()
                .map_err(|_| CoreError::Parse(format!("invalid cell key {s:?}: {part:?} is not an integer")))
        };
        Ok(CellId::new(parse(x)?, parse(y)?))
    }
}

impl From<(i32, i32)> for CellId {
    #[inline]
    fn from((x, y): (i32, i32)) -> Self {
        CellId::new(x, y)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for CellId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for CellId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        key.parse().map_err(serde::de::Error::custom)
    }
}
