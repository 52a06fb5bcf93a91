use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown station {0:?}")]
    UnknownStation(String),

    #[error("origin and destination are both {0:?}")]
    SameEndpoints(String),

    #[error("priority {0} is outside 1..=10")]
    InvalidPriority(i64),

    #[error("no route from {from:?} to {to:?}")]
    NoRoute { from: String, to: String },

    #[error("random batches need at least two stations, found {0}")]
    NotEnoughStations(usize),

    #[error("schedule parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
