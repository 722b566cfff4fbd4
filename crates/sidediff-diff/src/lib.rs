//! Diff engine for sidediff.
//!
//! Compares two staged payloads of equal length position by position and
//! reports, per line, the spans of characters that differ. There is no
//! alignment or edit-distance step: line `n` of the left payload is always
//! compared against line `n` of the right one.
//!
//! # Key Items
//!
//! - [`diff_parts`] / [`diff_bytes`] -- Full comparison of two payloads
//! - [`scan_lines`] -- Lockstep line walk over two streams
//! - [`contents_equal`] -- Streaming byte equality
//! - [`LineReader`] -- Lazy line iterator over any `BufRead`
//! - [`scan_line`] / [`RunScanner`] -- Per-line mismatch run detection

pub mod engine;
pub mod error;
pub mod lines;
pub mod scan;

pub use engine::{contents_equal, diff_bytes, diff_parts, scan_lines};
pub use error::{DiffError, DiffResult};
pub use lines::LineReader;
pub use scan::{scan_line, RunScanner};
