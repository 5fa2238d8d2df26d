//! Error types for rustrefl-core.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for reflection data structures.
#[derive(Error, Debug)]
pub enum Error {
    /// Backing data length does not match the declared shape.
    #[error("profile shape mismatch: shape {shape:?} implies {expected} values, got {actual}")]
    ShapeMismatch {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },
}
