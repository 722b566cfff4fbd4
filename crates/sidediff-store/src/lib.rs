//! Staging storage for sidediff.
//!
//! Submitted payloads are written to files in a staging directory and the
//! [`ComparisonStore`] remembers, per [`ComparisonId`](sidediff_types::ComparisonId),
//! which files hold the left and right halves. Records expire a fixed time
//! after their last write; expired records are handed to an
//! [`EvictionListener`], normally the [`StagingArea`] that created the files,
//! which deletes them.
//!
//! # Design Rules
//!
//! 1. The record table is the only shared mutable state.
//! 2. No file I/O and no listener call happens while the table lock is held.
//! 3. Every staged file is deleted exactly once: on expiry, on shutdown, or by
//!    the caller that displaced it.
//! 4. Cleanup failures are logged, never propagated.

pub mod error;
pub mod listener;
pub mod reaper;
pub mod staging;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use listener::{EvictionListener, RemovalCause};
pub use reaper::Reaper;
pub use staging::StagingArea;
pub use store::{ComparisonStore, DEFAULT_TTL};
