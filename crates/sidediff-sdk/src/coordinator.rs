use std::io;
use std::sync::Arc;
use std::time::Duration;

use sidediff_store::{ComparisonStore, StagingArea, StoreError};
use sidediff_types::{ComparisonId, ComparisonRecord, DiffReport, PartLocation, Side};
use tracing::{debug, info, warn};

use crate::error::{SdkError, SdkResult};

/// How many times a submission is retried when its record vanishes mid-write.
const MAX_STAGE_ATTEMPTS: usize = 5;

/// Glue between the staging area, the comparison store and the diff engine.
///
/// All methods block on file I/O; async callers should run them on a
/// blocking thread.
#[derive(Debug)]
pub struct DiffCoordinator {
    staging: StagingArea,
    store: Arc<ComparisonStore>,
}

impl DiffCoordinator {
    /// Create a coordinator whose expired records are cleaned up from
    /// `staging`.
    pub fn new(staging: StagingArea, ttl: Duration) -> Self {
        let store = Arc::new(ComparisonStore::new(ttl, Arc::new(staging.clone())));
        Self { staging, store }
    }

    /// Stage `data` as the `side` half of comparison `id`.
    ///
    /// A resubmitted side replaces its existing file atomically and keeps its
    /// location. The record's TTL restarts. If staging fails, the record is
    /// left as it was.
    pub fn submit_part(&self, id: ComparisonId, side: Side, data: &[u8]) -> SdkResult<PartLocation> {
        for attempt in 1..=MAX_STAGE_ATTEMPTS {
            let prior = self
                .store
                .get(id)
                .and_then(|record| record.slot(side).location().cloned());

            let location = self.stage(id, side, prior.as_ref(), data)?;

            match self
                .store
                .commit_side(id, side, prior.as_ref(), location.clone())
            {
                Ok(displaced) => {
                    if let Some(displaced) = displaced {
                        self.discard(id, side, &displaced);
                    }
                    info!(%id, %side, path = %location, bytes = data.len(), "part staged");
                    return Ok(location);
                }
                Err(StoreError::StaleSlot { .. }) => {
                    // Nothing references `location` any more. An overwrite
                    // may even have renamed it back after eviction deleted it.
                    debug!(%id, %side, attempt, "record changed while staging, retrying");
                    self.discard(id, side, &location);
                }
                Err(err) => {
                    self.discard(id, side, &location);
                    return Err(err.into());
                }
            }
        }

        warn!(%id, %side, attempts = MAX_STAGE_ATTEMPTS, "giving up on contended part");
        Err(SdkError::Contended {
            id,
            side,
            attempts: MAX_STAGE_ATTEMPTS,
        })
    }

    /// Write `data` over `prior`, or into a fresh file when there is no prior
    /// file or it has vanished.
    fn stage(
        &self,
        id: ComparisonId,
        side: Side,
        prior: Option<&PartLocation>,
        data: &[u8],
    ) -> SdkResult<PartLocation> {
        let written = match self.staging.write(prior, data) {
            Err(err) if prior.is_some() && err.kind() == io::ErrorKind::NotFound => {
                debug!(%id, %side, "staged part vanished before overwrite, staging a new file");
                self.staging.write(None, data)
            }
            written => written,
        };
        written.map_err(|err| {
            warn!(%id, %side, error = %err, "failed to stage part");
            SdkError::Io(err)
        })
    }

    /// Diff the two staged halves of comparison `id`.
    pub fn compute_diff(&self, id: ComparisonId) -> SdkResult<DiffReport> {
        let record = self.store.get(id).ok_or(SdkError::NotFound(id))?;
        let (left, right) = record
            .staged_pair()
            .map_err(|missing| SdkError::Incomplete { id, missing })?;

        let report = sidediff_diff::diff_parts(left.path(), right.path())?;
        info!(%id, outcome = ?report.outcome, runs = report.runs.len(), "diff computed");
        Ok(report)
    }

    /// The live record for `id`, if any.
    pub fn lookup(&self, id: ComparisonId) -> Option<ComparisonRecord> {
        self.store.get(id)
    }

    /// Number of comparisons that have not expired.
    pub fn live_comparisons(&self) -> usize {
        self.store.live_count()
    }

    /// Evict every record and delete its files. Blocks until done.
    pub fn shutdown(&self) -> usize {
        self.store.shutdown()
    }

    pub fn ttl(&self) -> Duration {
        self.store.ttl()
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// Shared handle to the store, for driving a [`Reaper`](sidediff_store::Reaper).
    pub fn store(&self) -> Arc<ComparisonStore> {
        Arc::clone(&self.store)
    }

    /// Delete a part no record owns. It may already be gone.
    fn discard(&self, id: ComparisonId, side: Side, location: &PartLocation) {
        match self.staging.discard(location) {
            Ok(()) => debug!(%id, %side, path = %location, "removed unowned part"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                warn!(%id, %side, path = %location, error = %err, "failed to remove unowned part")
            }
        }
    }
}
