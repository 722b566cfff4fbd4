//! Error types for the diff crate.

use std::io;

use sidediff_types::Side;

/// Errors that can occur while comparing two payloads.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// Reading one of the payloads failed.
    #[error("failed to read {side} part: {source}")]
    Io {
        side: Side,
        #[source]
        source: io::Error,
    },
}

impl DiffError {
    pub(crate) fn io(side: Side) -> impl FnOnce(io::Error) -> DiffError {
        move |source| DiffError::Io { side, source }
    }
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
