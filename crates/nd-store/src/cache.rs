//! Single-flight refresh around the snapshot store.

use std::sync::{Mutex, MutexGuard, TryLockError};

use chrono::{DateTime, Utc};
use nd_core::{AnalysisReport, ContentItem, NarrativeEngine};

use crate::error::{Result, StoreError};
use crate::store::{Snapshot, SnapshotStore};

/// Owns the snapshot store and serializes refreshes.
///
/// A refresh runs the analysis and persists the result in one transaction.
/// A refresh attempted while another is running is rejected rather than
/// queued, and a failed refresh leaves the last good snapshot in place.
pub struct SnapshotCache {
    store: Mutex<SnapshotStore>,
    refresh: Mutex<()>,
}

impl SnapshotCache {
    pub fn new(store: SnapshotStore) -> Self {
        Self {
            store: Mutex::new(store),
            refresh: Mutex::new(()),
        }
    }

    fn store(&self) -> MutexGuard<'_, SnapshotStore> {
        // Only a panic mid-save poisons the lock; the connection itself stays usable.
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Analyze `items` as of `now` and persist the report.
    pub fn refresh(
        &self,
        engine: &NarrativeEngine,
        items: &[ContentItem],
        now: DateTime<Utc>,
    ) -> Result<Snapshot> {
        self.refresh_with(|| Ok(engine.analyze(items, now)))
    }

    /// Produce a report with `analyze` and persist it, unless a refresh is
    /// already running.
    pub fn refresh_with<F>(&self, analyze: F) -> Result<Snapshot>
    where
        F: FnOnce() -> Result<AnalysisReport>,
    {
        let _guard = match self.refresh.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(e)) => e.into_inner(),
            Err(TryLockError::WouldBlock) => {
                tracing::warn!("refresh rejected: another refresh is in progress");
                return Err(StoreError::RefreshInProgress);
            }
        };

        let report = analyze().inspect_err(|e| {
            tracing::warn!("refresh failed, keeping previous snapshot: {e}");
        })?;
        let record = self.store().save(&report)?;
        Ok(Snapshot { record, report })
    }

    pub fn latest(&self) -> Result<Option<Snapshot>> {
        self.store().latest()
    }

    pub fn at(&self, refreshed_at: &str) -> Result<Option<Snapshot>> {
        self.store().at(refreshed_at)
    }

    pub fn into_store(self) -> SnapshotStore {
        self.store.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}
