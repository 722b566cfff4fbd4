//! Foundation types for sidediff.
//!
//! Every other sidediff crate depends on `sidediff-types`. The types here
//! carry no behavior beyond display and serialization.
//!
//! # Key Types
//!
//! - [`ComparisonId`] -- Identifier shared by the two submitters of a comparison
//! - [`Side`] -- Which half of a comparison a payload belongs to
//! - [`PartLocation`] / [`PartSlot`] -- Where a staged payload lives, if anywhere
//! - [`ComparisonRecord`] -- The two slots staged under one id
//! - [`DiffReport`] / [`LineRun`] / [`DiffOutcome`] -- Result of a comparison

pub mod id;
pub mod record;
pub mod report;

pub use id::{ComparisonId, Side};
pub use record::{ComparisonRecord, PartLocation, PartSlot};
pub use report::{DiffOutcome, DiffReport, LineRun};
