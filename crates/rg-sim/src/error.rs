use thiserror::Error;

use rg_core::CoreError;
use rg_dispatch::DispatchError;
use rg_spatial::SpatialError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("speed multiplier must be positive and finite, got {0}")]
    InvalidSpeed(f64),

    #[error("the map cannot be edited while the simulation is running")]
    EditWhileRunning,

    #[error("map error: {0}")]
    Spatial(#[from] SpatialError),

    #[error("dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
}

pub type SimResult<T> = Result<T, SimError>;
