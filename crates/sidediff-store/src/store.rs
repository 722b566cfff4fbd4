use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use sidediff_types::{ComparisonId, ComparisonRecord, PartLocation, PartSlot, Side};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::listener::{EvictionListener, RemovalCause};

/// Time-to-live applied when no other value is configured.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

struct Entry {
    record: ComparisonRecord,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Expiring table of comparison records.
///
/// Every write resets the record's deadline to `now + ttl`. Records whose
/// deadline has passed are invisible to [`get`](Self::get) immediately and
/// are physically removed by [`sweep`](Self::sweep) (usually driven by a
/// [`Reaper`](crate::Reaper)), at which point the injected
/// [`EvictionListener`] receives them.
///
/// The table sits behind a `RwLock`; the listener is always invoked after the
/// lock is released.
pub struct ComparisonStore {
    entries: RwLock<HashMap<ComparisonId, Entry>>,
    ttl: Duration,
    listener: Arc<dyn EvictionListener>,
    closed: AtomicBool,
}

impl ComparisonStore {
    /// Create an empty store whose evicted records go to `listener`.
    pub fn new(ttl: Duration, listener: Arc<dyn EvictionListener>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            listener,
            closed: AtomicBool::new(false),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a live record.
    pub fn get(&self, id: ComparisonId) -> Option<ComparisonRecord> {
        self.get_at(id, Instant::now())
    }

    fn get_at(&self, id: ComparisonId, now: Instant) -> Option<ComparisonRecord> {
        let table = self.read_table();
        table
            .get(&id)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.record.clone())
    }

    /// Insert or replace a record, restarting its TTL.
    ///
    /// If the replaced entry had already expired, its files that the new
    /// record does not reference are handed to the listener.
    pub fn put(&self, record: ComparisonRecord) -> StoreResult<()> {
        let now = Instant::now();
        let stale = {
            let mut table = self.write_table();
            if self.is_closed() {
                return Err(StoreError::Closed);
            }
            let stale = table
                .remove(&record.id)
                .filter(|entry| entry.is_expired(now))
                .map(|entry| unshared(entry.record, &record));
            table.insert(
                record.id,
                Entry {
                    record,
                    expires_at: now + self.ttl,
                },
            );
            stale
        };

        if let Some(stale) = stale {
            self.evict(stale, RemovalCause::Expired);
        }
        Ok(())
    }

    /// Stage `location` on one side of a record, creating the record if needed.
    ///
    /// `prior` is the location the caller found in the slot before writing
    /// (and overwrote), or `None` if it staged a fresh file. The commit only
    /// succeeds if the slot still agrees with `prior`; otherwise the record
    /// was reaped or recreated in between and [`StoreError::StaleSlot`] is
    /// returned.
    ///
    /// When `prior` is `None` and another writer staged this side first, its
    /// location is replaced and returned so the caller can discard the file.
    pub fn commit_side(
        &self,
        id: ComparisonId,
        side: Side,
        prior: Option<&PartLocation>,
        location: PartLocation,
    ) -> StoreResult<Option<PartLocation>> {
        let now = Instant::now();
        let mut stale = None;
        let result = {
            let mut table = self.write_table();
            if self.is_closed() {
                return Err(StoreError::Closed);
            }
            if table.get(&id).is_some_and(|entry| entry.is_expired(now)) {
                stale = table.remove(&id).map(|entry| entry.record);
            }

            let current = table
                .get(&id)
                .and_then(|entry| entry.record.slot(side).location());
            let agrees = match prior {
                Some(prior) => current == Some(prior),
                None => true,
            };

            if agrees {
                let entry = table.entry(id).or_insert_with(|| Entry {
                    record: ComparisonRecord::new(id),
                    expires_at: now,
                });
                entry.expires_at = now + self.ttl;
                match entry.record.stage(side, location) {
                    PartSlot::Staged(old) if !entry.record.references(&old) => Ok(Some(old)),
                    _ => Ok(None),
                }
            } else {
                Err(StoreError::StaleSlot { id, side })
            }
        };

        if let Some(stale) = stale {
            self.evict(stale, RemovalCause::Expired);
        }
        result
    }

    /// Remove a record without notifying the listener.
    ///
    /// The caller takes over responsibility for the record's files.
    pub fn remove(&self, id: ComparisonId) -> Option<ComparisonRecord> {
        self.write_table().remove(&id).map(|entry| entry.record)
    }

    /// Evict every expired record. Returns how many were evicted.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&self, now: Instant) -> usize {
        let expired: Vec<ComparisonRecord> = {
            let mut table = self.write_table();
            let ids: Vec<ComparisonId> = table
                .iter()
                .filter(|(_, entry)| entry.is_expired(now))
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| table.remove(&id))
                .map(|entry| entry.record)
                .collect()
        };

        let count = expired.len();
        for record in expired {
            self.evict(record, RemovalCause::Expired);
        }
        count
    }

    /// Close the store and evict every resident record.
    ///
    /// Runs the listener synchronously for each record before returning, so
    /// the caller can rely on cleanup having finished. Later writes fail with
    /// [`StoreError::Closed`]. Calling it again is a no-op.
    pub fn shutdown(&self) -> usize {
        let drained: Vec<ComparisonRecord> = {
            let mut table = self.write_table();
            self.closed.store(true, Ordering::SeqCst);
            table.drain().map(|(_, entry)| entry.record).collect()
        };

        let count = drained.len();
        info!(count, "shutting down comparison store");
        for record in drained {
            self.evict(record, RemovalCause::Shutdown);
        }
        count
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of resident records, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.read_table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_table().is_empty()
    }

    /// Number of records that have not expired.
    pub fn live_count(&self) -> usize {
        let now = Instant::now();
        self.read_table()
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    fn evict(&self, record: ComparisonRecord, cause: RemovalCause) {
        debug!(id = %record.id, %cause, "evicting comparison record");
        self.listener.on_evict(record, cause);
    }

    fn read_table(&self) -> RwLockReadGuard<'_, HashMap<ComparisonId, Entry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_table(&self) -> RwLockWriteGuard<'_, HashMap<ComparisonId, Entry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Drop every slot of `stale` that `replacement` still references.
fn unshared(mut stale: ComparisonRecord, replacement: &ComparisonRecord) -> ComparisonRecord {
    for side in Side::BOTH {
        let shared = stale
            .slot(side)
            .location()
            .is_some_and(|location| replacement.references(location));
        if shared {
            *stale.slot_mut(side) = PartSlot::Absent;
        }
    }
    stale
}

impl std::fmt::Debug for ComparisonStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparisonStore")
            .field("record_count", &self.len())
            .field("ttl", &self.ttl)
            .field("closed", &self.is_closed())
            .finish()
    }
}
