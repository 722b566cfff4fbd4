use sidediff_types::{ComparisonId, Side};

/// Errors from comparison store and staging operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store has been shut down and accepts no more writes.
    #[error("comparison store is shut down")]
    Closed,

    /// The slot no longer holds the location the caller staged against.
    ///
    /// Happens when the record expired or was recreated between the caller's
    /// lookup and its commit. The caller should retry from a fresh lookup.
    #[error("stale {side} slot for comparison {id}")]
    StaleSlot { id: ComparisonId, side: Side },

    /// I/O error from the staging directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
