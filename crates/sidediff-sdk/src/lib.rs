//! High-level API for sidediff.
//!
//! [`DiffCoordinator`] is the single entry point transports talk to: it
//! stages each submitted side through the staging area, tracks the pair in
//! the expiring comparison store, and runs the diff engine once both sides
//! are present.

pub mod coordinator;
pub mod error;

pub use coordinator::DiffCoordinator;
pub use error::{SdkError, SdkResult};

// Re-export key types
pub use sidediff_store::{ComparisonStore, Reaper, StagingArea, DEFAULT_TTL};
pub use sidediff_types::{
    ComparisonId, ComparisonRecord, DiffOutcome, DiffReport, LineRun, PartLocation, PartSlot, Side,
};
