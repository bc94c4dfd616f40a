//! Core error types (deterministic only)

use core::fmt;

/// Errors from the pure algebra layer (no I/O, no external failures).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A relation index outside `0..7`.
    InvalidRelationIndex(usize),
    /// An operator surface form absent from the closed catalog.
    UnknownOperator(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidRelationIndex(idx) => {
                write!(f, "invalid natural logic relation index: {idx}")
            }
            CoreError::UnknownOperator(form) => {
                write!(f, "surface form not in the operator catalog: {form:?}")
            }
        }
    }
}

impl std::error::Error for CoreError {}

/// Result type for core operations
pub type Result<T> = core::result::Result<T, CoreError>;
