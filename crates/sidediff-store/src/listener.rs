use std::fmt;

use sidediff_types::ComparisonRecord;

/// Why a record left the store through the eviction path.
///
/// Explicit [`remove`](crate::ComparisonStore::remove) calls never reach the
/// listener, so there is no variant for them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemovalCause {
    /// The record's TTL elapsed without a refreshing write.
    Expired,
    /// The store was shut down with the record still resident.
    Shutdown,
}

impl fmt::Display for RemovalCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalCause::Expired => f.write_str("expired"),
            RemovalCause::Shutdown => f.write_str("shutdown"),
        }
    }
}

/// Receives records evicted from a [`ComparisonStore`](crate::ComparisonStore).
///
/// Called exactly once per evicted record, outside the store's table lock, so
/// implementations may block on file I/O. Implementations must not panic;
/// failures are theirs to log.
pub trait EvictionListener: Send + Sync {
    fn on_evict(&self, record: ComparisonRecord, cause: RemovalCause);
}

impl<F> EvictionListener for F
where
    F: Fn(ComparisonRecord, RemovalCause) + Send + Sync,
{
    fn on_evict(&self, record: ComparisonRecord, cause: RemovalCause) {
        self(record, cause)
    }
}
