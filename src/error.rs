//! Error types for evo-opt
//!
//! Precondition violations (e.g. asking a bounded-only optimizer for an
//! unbounded search) panic. Everything the search engine can report at
//! runtime is an [`OptError`].

use thiserror::Error;

/// Error type for optimizer and engine operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OptError {
    /// The engine parameters are inconsistent
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A vector does not match the problem dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The search distribution degenerated
    #[error("Numerical instability: {0}")]
    Numerical(String),

    /// The engine stopped before evaluating a single candidate
    #[error("Search finished without evaluating any candidate")]
    EmptyRun,
}

/// Result type alias for optimizer operations
pub type OptResult<T> = Result<T, OptError>;
