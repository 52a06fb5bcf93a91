//! Spatial-subsystem error type.

use thiserror::Error;

use rg_core::CellId;

/// Errors produced by `rg-spatial`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpatialError {
    #[error("cell {0} is outside the grid")]
    OutOfBounds(CellId),

    #[error("station name must not be empty")]
    EmptyStationName,

    #[error("station {name:?} already exists at {existing}")]
    DuplicateStation { name: String, existing: CellId },

    #[error("map parse error: {0}")]
    Parse(String),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
