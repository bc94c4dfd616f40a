//! Layered error types
//!
//! The engine wraps the deterministic core errors and adds the failure modes
//! that only exist at this layer: structural graph violations, bad external
//! weight data, and I/O.

use natlog_core::CoreError;
use thiserror::Error;

/// Engine-level errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Core algebra error
    #[error("core algebra error: {0}")]
    Core(#[from] CoreError),

    /// A structural invariant of the dependency graph was violated
    #[error("graph invariant violated: {reason}")]
    InvalidGraph {
        /// What was wrong with the graph
        reason: String,
    },

    /// An edge referenced a vertex that is not in the graph
    #[error("vertex {index} is not in the graph")]
    MissingVertex {
        /// The 1-based token index that was missing
        index: usize,
    },

    /// A vertex index was added twice
    #[error("vertex {index} is already in the graph")]
    DuplicateVertex {
        /// The 1-based token index that collided
        index: usize,
    },

    /// The classifier produced a label index outside the 3-way label set.
    /// This is a programming error in the classifier, not recoverable input.
    #[error("unrecognized clause classifier label index: {index}")]
    InvalidClassifierLabel {
        /// The out-of-range label index
        index: usize,
    },

    /// A weights file line could not be parsed
    #[error("malformed weights file {path} at line {line}: {reason}")]
    WeightsFormat {
        /// Path of the offending file
        path: String,
        /// 1-based line number
        line: usize,
        /// What failed to parse
        reason: String,
    },

    /// I/O error while loading external weight data
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
