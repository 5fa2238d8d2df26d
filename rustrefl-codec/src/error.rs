//! Codec error types.

use thiserror::Error;

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Codec error types.
///
/// Decoding fails for exactly two format reasons: an unrecognized version
/// tag or a buffer shorter than the layout requires. Both are fatal; no
/// partial record is ever returned. The remaining variants belong to the
/// file persistence layer.
#[derive(Error, Debug)]
pub enum Error {
    /// The buffer was written with an unsupported format version.
    #[error("unsupported format version {found} (supported: {supported})")]
    VersionMismatch { found: u32, supported: u32 },

    /// The buffer ends before the layout does.
    #[error("buffer underrun: needed {needed} more bytes, {remaining} remaining")]
    BufferUnderrun { needed: usize, remaining: usize },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Core library error.
    #[error("core error: {0}")]
    Core(#[from] rustrefl_core::Error),
}
