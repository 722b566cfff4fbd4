//! Per-line mismatch run detection.
//!
//! Two lines are compared character by character at equal indices. Each
//! maximal span of mismatching indices becomes one [`LineRun`].

use sidediff_types::LineRun;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Idle,
    InRun { start: usize, length: usize },
}

/// State machine that turns a sequence of match/mismatch observations for one
/// line into runs.
#[derive(Debug)]
pub struct RunScanner {
    line: usize,
    state: State,
    runs: Vec<LineRun>,
}

impl RunScanner {
    pub fn new(line: usize) -> Self {
        Self {
            line,
            state: State::Idle,
            runs: Vec::new(),
        }
    }

    /// Record whether the characters at `index` matched.
    ///
    /// Indices must be fed in ascending order without gaps.
    pub fn observe(&mut self, index: usize, matched: bool) {
        self.state = match (self.state, matched) {
            (State::Idle, true) => State::Idle,
            (State::Idle, false) => State::InRun {
                start: index,
                length: 1,
            },
            (State::InRun { start, length }, false) => State::InRun {
                start,
                length: length + 1,
            },
            (State::InRun { start, length }, true) => {
                self.runs.push(LineRun::new(self.line, start, length));
                State::Idle
            }
        };
    }

    /// End of the line: a run still open reaches the last compared character.
    pub fn finish(mut self) -> Vec<LineRun> {
        if let State::InRun { start, length } = self.state {
            self.runs.push(LineRun::new(self.line, start, length));
        }
        self.runs
    }
}

/// Find the mismatch runs between two lines.
///
/// Comparison is by `char` and bounded by the shorter line; characters past
/// the end of the shorter line are not reported.
pub fn scan_line(line: usize, left: &str, right: &str) -> Vec<LineRun> {
    let mut scanner = RunScanner::new(line);
    for (index, (l, r)) in left.chars().zip(right.chars()).enumerate() {
        scanner.observe(index, l == r);
    }
    scanner.finish()
}
