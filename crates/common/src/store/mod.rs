//! Versioned dataset store
//!
//! Holds exactly one published [`Snapshot`] at a time. Readers clone the
//! current `Arc<Snapshot>` and work on it without further coordination;
//! publishing swaps the pointer in one step, so a reader sees either the old
//! or the new dataset, never a mix.
//!
//! Writers are serialized through an [`IngestionPermit`]: at most one exists
//! at any moment and publishing consumes it. A second writer is turned away
//! with [`AppError::IngestionInProgress`] instead of queuing.

use crate::errors::{AppError, Result};
use crate::model::RecordModel;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, RwLock};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;
use uuid::Uuid;

/// An immutable, published dataset
#[derive(Debug)]
pub struct Snapshot {
    pub version: u64,
    pub id: Uuid,
    pub loaded_at: DateTime<Utc>,
    /// Name of the file the dataset came from, if any
    pub source: Option<String>,
    pub model: RecordModel,
}

impl Snapshot {
    fn initial() -> Self {
        Self {
            version: 0,
            id: Uuid::nil(),
            loaded_at: Utc::now(),
            source: None,
            model: RecordModel::empty(),
        }
    }

    pub fn info(&self) -> SnapshotInfo {
        SnapshotInfo {
            version: self.version,
            id: self.id,
            loaded_at: self.loaded_at,
            source: self.source.clone(),
            countries: self.model.country_count(),
            universities: self.model.university_count(),
            authors: self.model.author_count(),
            papers: self.model.paper_count(),
        }
    }
}

/// Serializable description of a snapshot
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotInfo {
    pub version: u64,
    pub id: Uuid,
    pub loaded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub countries: usize,
    pub universities: usize,
    pub authors: usize,
    pub papers: usize,
}

/// Exclusive right to publish the next snapshot
#[derive(Debug)]
pub struct IngestionPermit {
    _guard: OwnedMutexGuard<()>,
}

/// Process-wide holder of the current dataset
#[derive(Debug)]
pub struct DatasetStore {
    current: RwLock<Arc<Snapshot>>,
    writer: Arc<Mutex<()>>,
}

impl Default for DatasetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetStore {
    /// A store holding the empty-but-valid dataset
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::initial())),
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// The currently published snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        // The lock only guards the pointer clone; a poisoned lock still holds
        // a complete snapshot.
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Claim the single writer slot, failing fast if it is taken
    pub fn begin_ingestion(&self) -> Result<IngestionPermit> {
        Arc::clone(&self.writer)
            .try_lock_owned()
            .map(|guard| IngestionPermit { _guard: guard })
            .map_err(|_| AppError::IngestionInProgress)
    }

    /// Publish `model` as the new current dataset, releasing the permit
    pub fn publish(&self, permit: IngestionPermit, model: RecordModel, source: Option<String>) -> Arc<Snapshot> {
        let mut slot = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let snapshot = Arc::new(Snapshot {
            version: slot.version + 1,
            id: Uuid::new_v4(),
            loaded_at: Utc::now(),
            source,
            model,
        });
        *slot = Arc::clone(&snapshot);
        drop(slot);
        drop(permit);

        info!(
            version = snapshot.version,
            snapshot_id = %snapshot.id,
            papers = snapshot.model.paper_count(),
            authors = snapshot.model.author_count(),
            "Dataset snapshot published"
        );
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_starts_empty() {
        let store = DatasetStore::new();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.version, 0);
        assert!(snapshot.model.is_empty());
    }

    #[test]
    fn test_second_writer_is_rejected() {
        let store = DatasetStore::new();
        let permit = store.begin_ingestion().unwrap();
        assert!(matches!(store.begin_ingestion(), Err(AppError::IngestionInProgress)));

        store.publish(permit, RecordModel::empty(), None);
        assert!(store.begin_ingestion().is_ok());
    }

    #[test]
    fn test_readers_keep_their_snapshot_across_publish() {
        let store = DatasetStore::new();
        let before = store.snapshot();

        let permit = store.begin_ingestion().unwrap();
        let published = store.publish(permit, RecordModel::empty(), Some("papers.csv".into()));

        assert_eq!(before.version, 0);
        assert_eq!(published.version, 1);
        assert_eq!(store.snapshot().version, 1);
        assert_eq!(store.snapshot().info().source.as_deref(), Some("papers.csv"));
    }

    #[test]
    fn test_dropped_permit_frees_writer_slot() {
        let store = DatasetStore::new();
        {
            let _permit = store.begin_ingestion().unwrap();
        }
        assert!(store.begin_ingestion().is_ok());
        assert_eq!(store.snapshot().version, 0);
    }

    #[tokio::test]
    async fn test_concurrent_ingestions_have_one_winner() {
        let store = Arc::new(DatasetStore::new());
        let permit = store.begin_ingestion().unwrap();

        let contenders: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.begin_ingestion().is_ok() })
            })
            .collect();
        for contender in contenders {
            assert!(!contender.await.unwrap());
        }

        store.publish(permit, RecordModel::empty(), None);
        assert_eq!(store.snapshot().version, 1);
    }
}
