//! Payload-level comparison: equality, size check, then line scanning.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Seek};
use std::path::Path;

use sidediff_types::{DiffReport, LineRun, Side};
use tracing::debug;

use crate::error::{DiffError, DiffResult};
use crate::lines::LineReader;
use crate::scan::scan_line;

/// Compare two staged payload files.
///
/// 1. Byte-identical files report [`DiffOutcome::Identical`](sidediff_types::DiffOutcome::Identical).
/// 2. Files of different length report
///    [`DiffOutcome::SizeMismatch`](sidediff_types::DiffOutcome::SizeMismatch)
///    without looking at their content further.
/// 3. Otherwise both files are streamed line by line and the mismatch runs
///    of each line pair are collected.
///
/// Each file is opened once and every step reads through that handle, so a
/// file replaced by rename mid-diff is still seen as one version.
pub fn diff_parts(left: &Path, right: &Path) -> DiffResult<DiffReport> {
    let mut left_file = File::open(left).map_err(DiffError::io(Side::Left))?;
    let mut right_file = File::open(right).map_err(DiffError::io(Side::Right))?;

    if files_equal(&mut left_file, &mut right_file)? {
        debug!(left = %left.display(), right = %right.display(), "parts are identical");
        return Ok(DiffReport::identical());
    }
    if file_len(&left_file, Side::Left)? != file_len(&right_file, Side::Right)? {
        debug!(left = %left.display(), right = %right.display(), "parts differ in size");
        return Ok(DiffReport::size_mismatch());
    }

    left_file.rewind().map_err(DiffError::io(Side::Left))?;
    right_file.rewind().map_err(DiffError::io(Side::Right))?;
    let runs = scan_lines(BufReader::new(left_file), BufReader::new(right_file))?;
    debug!(runs = runs.len(), "diff calculated");
    Ok(DiffReport::calculated(runs))
}

/// Compare two in-memory payloads with the same rules as [`diff_parts`].
pub fn diff_bytes(left: &[u8], right: &[u8]) -> DiffResult<DiffReport> {
    if left == right {
        return Ok(DiffReport::identical());
    }
    if left.len() != right.len() {
        return Ok(DiffReport::size_mismatch());
    }
    let runs = scan_lines(Cursor::new(left), Cursor::new(right))?;
    Ok(DiffReport::calculated(runs))
}

/// Full streaming byte comparison of two files.
pub fn contents_equal(left: &Path, right: &Path) -> DiffResult<bool> {
    let mut left_file = File::open(left).map_err(DiffError::io(Side::Left))?;
    let mut right_file = File::open(right).map_err(DiffError::io(Side::Right))?;
    files_equal(&mut left_file, &mut right_file)
}

fn files_equal(left: &mut File, right: &mut File) -> DiffResult<bool> {
    if file_len(left, Side::Left)? != file_len(right, Side::Right)? {
        return Ok(false);
    }
    readers_equal(BufReader::new(left), BufReader::new(right))
}

fn readers_equal(mut left: impl BufRead, mut right: impl BufRead) -> DiffResult<bool> {
    loop {
        let (len, same) = {
            let l = left.fill_buf().map_err(DiffError::io(Side::Left))?;
            let r = right.fill_buf().map_err(DiffError::io(Side::Right))?;
            let len = l.len().min(r.len());
            if len == 0 {
                return Ok(l.is_empty() && r.is_empty());
            }
            (len, l[..len] == r[..len])
        };
        if !same {
            return Ok(false);
        }
        left.consume(len);
        right.consume(len);
    }
}

/// Walk two streams line by line in lockstep, collecting mismatch runs.
///
/// Line numbers start at 0. Scanning stops as soon as either stream runs out
/// of lines; whatever remains in the longer one is not visited.
pub fn scan_lines(left: impl BufRead, right: impl BufRead) -> DiffResult<Vec<LineRun>> {
    let mut runs = Vec::new();
    let pairs = LineReader::new(left).zip(LineReader::new(right));
    for (line, (l, r)) in pairs.enumerate() {
        let l = l.map_err(DiffError::io(Side::Left))?;
        let r = r.map_err(DiffError::io(Side::Right))?;
        runs.extend(scan_line(line, &l, &r));
    }
    Ok(runs)
}

fn file_len(file: &File, side: Side) -> DiffResult<u64> {
    file.metadata()
        .map(|meta| meta.len())
        .map_err(DiffError::io(side))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sidediff_types::DiffOutcome;
    use std::io::Write;
    use std::path::PathBuf;

    fn stage(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content).unwrap();
        path
    }

    fn diff(left: &[u8], right: &[u8]) -> DiffReport {
        let dir = tempfile::tempdir().unwrap();
        let l = stage(&dir, "left", left);
        let r = stage(&dir, "right", right);
        diff_parts(&l, &r).unwrap()
    }

    // -----------------------------------------------------------------------
    // Short-circuit outcomes
    // -----------------------------------------------------------------------

    #[test]
    fn identical_payloads() {
        let report = diff(b"aaaaaaa", b"aaaaaaa");
        assert_eq!(report.outcome, DiffOutcome::Identical);
        assert_eq!(report.message(), "Data is exactly the same");
        assert!(report.runs.is_empty());
    }

    #[test]
    fn empty_payloads_are_identical() {
        assert_eq!(diff(b"", b"").outcome, DiffOutcome::Identical);
    }

    #[test]
    fn different_sizes() {
        let report = diff(b"aaaaaaa", b"aaaaaaabbbbbbb");
        assert_eq!(report.outcome, DiffOutcome::SizeMismatch);
        assert_eq!(report.message(), "Data is NOT the same size");
        assert!(report.runs.is_empty());
    }

    // -----------------------------------------------------------------------
    // Run detection
    // -----------------------------------------------------------------------

    #[test]
    fn single_character_difference() {
        let report = diff(b"aaaaaaa", b"abaaaaa");
        assert_eq!(report.outcome, DiffOutcome::Calculated);
        assert_eq!(report.message(), "Diff successfully calculated");
        assert_eq!(report.runs, vec![LineRun::new(0, 1, 1)]);
    }

    #[test]
    fn runs_across_lines() {
        let left = b"{\n  \"name\": \"alpha\",\n  \"size\": 10\n}\n";
        let right = b"{\n  \"name\": \"omega\",\n  \"size\": 99\n}\n";
        let report = diff(left, right);
        assert_eq!(
            report.runs,
            vec![
                LineRun::new(1, 11, 4),
                LineRun::new(2, 10, 2),
            ]
        );
    }

    #[test]
    fn crlf_and_lf_lines_are_paired() {
        // Same size, but the left's "\r\n" lines up with "x\n" on the right.
        // The extra 'x' lies past the end of the left line and is not reported.
        let report = diff(b"ab\r\ncd", b"abx\ncd");
        assert_eq!(report.outcome, DiffOutcome::Calculated);
        assert!(report.runs.is_empty());
    }

    #[test]
    fn scanning_stops_at_shorter_line_count() {
        // Equal size, but the right side has a single line.
        let report = diff(b"ab\nzz", b"abXzz");
        assert_eq!(report.outcome, DiffOutcome::Calculated);
        assert!(report.runs.is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let l = stage(&dir, "left", b"abc");
        let err = diff_parts(&l, &dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, DiffError::Io { side: Side::Right, .. }));
    }

    #[test]
    fn contents_equal_streams_large_files() {
        let dir = tempfile::tempdir().unwrap();
        let big = vec![b'x'; 200_000];
        let mut other = big.clone();
        other[150_000] = b'y';
        let a = stage(&dir, "a", &big);
        let b = stage(&dir, "b", &big);
        let c = stage(&dir, "c", &other);
        assert!(contents_equal(&a, &b).unwrap());
        assert!(!contents_equal(&a, &c).unwrap());
    }

    #[test]
    fn diff_bytes_matches_file_diff() {
        let left = b"line one\nline two\n";
        let right = b"line One\nlime two\n";
        assert_eq!(diff_bytes(left, right).unwrap(), diff(left, right));
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    proptest! {
        #[test]
        fn identical_content_is_always_identical(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let report = diff_bytes(&data, &data).unwrap();
            prop_assert_eq!(report, DiffReport::identical());
        }

        #[test]
        fn different_lengths_never_scan(
            data in proptest::collection::vec(any::<u8>(), 0..256),
            extra in proptest::collection::vec(any::<u8>(), 1..64),
        ) {
            let mut longer = data.clone();
            longer.extend_from_slice(&extra);
            prop_assert_eq!(diff_bytes(&data, &longer).unwrap(), DiffReport::size_mismatch());
        }

        #[test]
        fn single_substitution_is_one_run(
            line in "[a-z]{1,40}",
            index in any::<prop::sample::Index>(),
        ) {
            let pos = index.index(line.len());
            let mut changed = line.clone().into_bytes();
            changed[pos] = b'#';
            let report = diff_bytes(line.as_bytes(), &changed).unwrap();
            prop_assert_eq!(report.runs, vec![LineRun::new(0, pos, 1)]);
        }

        #[test]
        fn runs_are_disjoint_and_ordered(
            left in "[ab\n]{0,80}",
            flips in proptest::collection::vec(any::<bool>(), 80),
        ) {
            // Swap a/b at flipped positions; newlines stay put so lines align.
            let right: String = left
                .chars()
                .zip(flips.iter())
                .map(|(c, flip)| match (c, *flip) {
                    ('a', true) => 'b',
                    ('b', true) => 'a',
                    (c, _) => c,
                })
                .collect();
            let report = diff_bytes(left.as_bytes(), right.as_bytes()).unwrap();
            for pair in report.runs.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                prop_assert!(a.line < b.line || (a.line == b.line && a.offset + a.length < b.offset));
            }
            let flipped = left
                .chars()
                .zip(flips.iter())
                .filter(|(c, flip)| **flip && *c != '\n')
                .count();
            prop_assert_eq!(report.mismatched_chars(), flipped);
        }
    }
}
