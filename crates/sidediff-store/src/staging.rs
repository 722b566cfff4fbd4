//! Staging area: the directory holding submitted payloads.
//!
//! Each payload lives in its own file named by a fresh UUID. A side that is
//! resubmitted keeps its file name, so its location never changes for the
//! lifetime of the record. Replacements are renamed into place, never
//! written through the live file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use sidediff_types::{ComparisonRecord, PartLocation};
use tempfile::NamedTempFile;
use tracing::{debug, error, info};

use crate::listener::{EvictionListener, RemovalCause};

/// Writes payloads into, and deletes them from, one staging directory.
#[derive(Clone, Debug)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    /// Use `dir` as the staging directory. The directory is not touched.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Use `dir` as the staging directory, creating it if necessary.
    pub fn create(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist `data`, replacing `existing` or staging a new file.
    ///
    /// A replacement is written to a temporary file in the staging directory
    /// and renamed over `existing`, so readers and concurrent writers only
    /// ever see one whole payload. It never creates a location: if `existing`
    /// was already cleaned up the call fails with [`io::ErrorKind::NotFound`].
    /// A new file that could not be fully written is removed before the error
    /// is returned.
    pub fn write(&self, existing: Option<&PartLocation>, data: &[u8]) -> io::Result<PartLocation> {
        match existing {
            Some(location) => {
                fs::metadata(location.path())?;
                let mut replacement = NamedTempFile::new_in(&self.dir)?;
                write_all(replacement.as_file_mut(), data)?;
                replacement
                    .persist(location.path())
                    .map_err(|err| err.error)?;
                debug!(path = %location, bytes = data.len(), "replaced staged part");
                Ok(location.clone())
            }
            None => {
                let location = PartLocation::new(self.dir.join(uuid::Uuid::now_v7().to_string()));
                let mut file = OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(location.path())?;
                if let Err(err) = write_all(&mut file, data) {
                    drop(file);
                    let _ = fs::remove_file(location.path());
                    return Err(err);
                }
                debug!(path = %location, bytes = data.len(), "staged new part");
                Ok(location)
            }
        }
    }

    /// Delete one staged file.
    pub fn discard(&self, location: &PartLocation) -> io::Result<()> {
        fs::remove_file(location.path())
    }

    /// Delete every file `record` references, logging each outcome.
    ///
    /// Returns how many files were deleted. Failures are logged and skipped.
    pub fn discard_record(&self, record: &ComparisonRecord, cause: RemovalCause) -> usize {
        let mut removed = 0;
        for (side, location) in record.staged() {
            match self.discard(location) {
                Ok(()) => {
                    removed += 1;
                    info!(id = %record.id, %side, path = %location, %cause, "removed staged part");
                }
                Err(err) => {
                    error!(id = %record.id, %side, path = %location, %cause, error = %err,
                        "failed to remove staged part");
                }
            }
        }
        removed
    }
}

fn write_all(file: &mut File, data: &[u8]) -> io::Result<()> {
    file.write_all(data)?;
    file.flush()
}

impl EvictionListener for StagingArea {
    fn on_evict(&self, record: ComparisonRecord, cause: RemovalCause) {
        self.discard_record(&record, cause);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidediff_types::{ComparisonId, Side};

    fn temp_area() -> (tempfile::TempDir, StagingArea) {
        let dir = tempfile::tempdir().unwrap();
        let area = StagingArea::new(dir.path());
        (dir, area)
    }

    #[test]
    fn new_write_creates_unique_files() {
        let (_dir, area) = temp_area();
        let a = area.write(None, b"left").unwrap();
        let b = area.write(None, b"left").unwrap();
        assert_ne!(a, b);
        assert!(a.path().starts_with(area.dir()));
        assert_eq!(fs::read(a.path()).unwrap(), b"left");
        assert_eq!(fs::read(b.path()).unwrap(), b"left");
    }

    #[test]
    fn overwrite_keeps_location_and_drops_old_tail() {
        let (_dir, area) = temp_area();
        let location = area.write(None, b"a much longer first payload").unwrap();
        let again = area.write(Some(&location), b"short").unwrap();
        assert_eq!(again, location);
        assert_eq!(fs::read(location.path()).unwrap(), b"short");
    }

    #[test]
    fn overwrite_leaves_no_temporary_files() {
        let (dir, area) = temp_area();
        let location = area.write(None, b"first").unwrap();
        area.write(Some(&location), b"second").unwrap();
        area.write(Some(&location), b"third and longest").unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
        assert_eq!(fs::read(location.path()).unwrap(), b"third and longest");
    }

    #[cfg(unix)]
    #[test]
    fn overwrite_does_not_touch_open_readers() {
        use std::io::Read;

        let (_dir, area) = temp_area();
        let location = area.write(None, b"old payload").unwrap();
        let mut reader = File::open(location.path()).unwrap();

        area.write(Some(&location), b"new").unwrap();

        let mut seen = Vec::new();
        reader.read_to_end(&mut seen).unwrap();
        assert_eq!(seen, b"old payload");
        assert_eq!(fs::read(location.path()).unwrap(), b"new");
    }

    #[test]
    fn racing_overwrites_never_mix_payloads() {
        use std::sync::{Arc, Barrier};
        use std::thread;

        let (_dir, area) = temp_area();
        let location = area.write(None, b"seed").unwrap();
        let long = vec![b'a'; 1024 * 1024];
        let short = b"bbbb".to_vec();

        for _ in 0..50 {
            let barrier = Arc::new(Barrier::new(2));
            let handles: Vec<_> = [long.clone(), short.clone()]
                .into_iter()
                .map(|payload| {
                    let area = area.clone();
                    let location = location.clone();
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        area.write(Some(&location), &payload).unwrap();
                    })
                })
                .collect();
            for h in handles {
                h.join().expect("thread should not panic");
            }

            let content = fs::read(location.path()).unwrap();
            assert!(content == long || content == short, "mixed {} bytes", content.len());
        }
    }

    #[test]
    fn overwrite_of_cleaned_up_location_fails() {
        let (_dir, area) = temp_area();
        let location = area.write(None, b"data").unwrap();
        area.discard(&location).unwrap();

        let err = area.write(Some(&location), b"again").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!location.path().exists());
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let area = StagingArea::new(dir.path().join("does-not-exist"));
        assert!(area.write(None, b"data").is_err());
    }

    #[test]
    fn create_makes_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let area = StagingArea::create(&nested).unwrap();
        assert!(nested.is_dir());
        area.write(None, b"x").unwrap();
    }

    #[test]
    fn empty_payload_is_staged() {
        let (_dir, area) = temp_area();
        let location = area.write(None, b"").unwrap();
        assert_eq!(fs::metadata(location.path()).unwrap().len(), 0);
    }

    #[test]
    fn eviction_deletes_all_staged_files() {
        let (_dir, area) = temp_area();
        let mut record = ComparisonRecord::new(ComparisonId::new(1));
        let left = area.write(None, b"left").unwrap();
        let right = area.write(None, b"right").unwrap();
        record.stage(Side::Left, left.clone());
        record.stage(Side::Right, right.clone());

        area.on_evict(record, RemovalCause::Expired);
        assert!(!left.path().exists());
        assert!(!right.path().exists());
    }

    #[test]
    fn eviction_tolerates_missing_files() {
        let (_dir, area) = temp_area();
        let mut record = ComparisonRecord::new(ComparisonId::new(2));
        let left = area.write(None, b"left").unwrap();
        record.stage(Side::Left, left.clone());
        record.stage(Side::Right, PartLocation::new(area.dir().join("gone")));

        assert_eq!(area.discard_record(&record, RemovalCause::Shutdown), 1);
        assert!(!left.path().exists());
    }
}
