//! Error taxonomy for the solver's boundary.
//!
//! The CFR recursion itself is total over well-formed states — errors only
//! arise at the edges: parsing cards and ranges, validating a `GameConfig`,
//! and loading a `SolveRequest` from JSON.

use std::fmt;

/// Errors surfaced at the library boundary.
#[derive(Debug)]
pub enum SolverError {
    /// A two-character card string did not parse (e.g. bad rank/suit char,
    /// wrong length).
    BadCardFormat(String),
    /// A range contained no hands with positive weight.
    EmptyRange,
    /// The board contained a duplicate card, or had a card count other than
    /// 0, 3, 4, or 5.
    ConflictingBoard(String),
    /// A `GameConfig` value was invalid (non-positive bet size, negative
    /// cap, non-positive `min_raise_fraction`, ...).
    InvalidConfig(String),
    /// Failed to read a config/request file from disk.
    Io(std::io::Error),
    /// Failed to deserialize a config/request file.
    Json(serde_json::Error),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::BadCardFormat(s) => write!(f, "bad card format: {:?}", s),
            SolverError::EmptyRange => write!(f, "range has no hands with positive weight"),
            SolverError::ConflictingBoard(s) => write!(f, "invalid board: {}", s),
            SolverError::InvalidConfig(s) => write!(f, "invalid config: {}", s),
            SolverError::Io(e) => write!(f, "I/O error: {}", e),
            SolverError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for SolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolverError::Io(e) => Some(e),
            SolverError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SolverError {
    fn from(e: std::io::Error) -> Self {
        SolverError::Io(e)
    }
}

impl From<serde_json::Error> for SolverError {
    fn from(e: serde_json::Error) -> Self {
        SolverError::Json(e)
    }
}

/// Convenience alias used throughout the crate's boundary functions.
pub type SolverResult<T> = Result<T, SolverError>;
