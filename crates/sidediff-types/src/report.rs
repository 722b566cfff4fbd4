use std::fmt;

use serde::{Deserialize, Serialize};

/// A maximal span of mismatching characters within one line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineRun {
    /// 0-based line number.
    pub line: usize,
    /// 0-based character index where the span starts.
    pub offset: usize,
    /// Number of mismatching characters in the span.
    pub length: usize,
}

impl LineRun {
    pub const fn new(line: usize, offset: usize, length: usize) -> Self {
        Self {
            line,
            offset,
            length,
        }
    }
}

/// How a comparison concluded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffOutcome {
    /// Both payloads are byte-for-byte identical.
    Identical,
    /// Payload lengths differ; no positional comparison was attempted.
    SizeMismatch,
    /// Same length, different content; runs were computed.
    Calculated,
}

impl DiffOutcome {
    /// The user-facing message for this outcome.
    pub fn message(&self) -> &'static str {
        match self {
            DiffOutcome::Identical => "Data is exactly the same",
            DiffOutcome::SizeMismatch => "Data is NOT the same size",
            DiffOutcome::Calculated => "Diff successfully calculated",
        }
    }
}

impl fmt::Display for DiffOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of comparing the two halves of a comparison.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffReport {
    pub outcome: DiffOutcome,
    /// Runs in discovery order: line-major, offset-ascending.
    pub runs: Vec<LineRun>,
}

impl DiffReport {
    pub fn identical() -> Self {
        Self {
            outcome: DiffOutcome::Identical,
            runs: Vec::new(),
        }
    }

    pub fn size_mismatch() -> Self {
        Self {
            outcome: DiffOutcome::SizeMismatch,
            runs: Vec::new(),
        }
    }

    pub fn calculated(runs: Vec<LineRun>) -> Self {
        Self {
            outcome: DiffOutcome::Calculated,
            runs,
        }
    }

    pub fn message(&self) -> &'static str {
        self.outcome.message()
    }

    /// Total number of mismatching characters across all runs.
    pub fn mismatched_chars(&self) -> usize {
        self.runs.iter().map(|run| run.length).sum()
    }

    /// Number of distinct lines with at least one run.
    pub fn lines_affected(&self) -> usize {
        let mut lines: Vec<usize> = self.runs.iter().map(|run| run.line).collect();
        lines.dedup();
        lines.len()
    }
}
