//! Pull-based snapshot refresh.
//!
//! Each refresh replaces the whole snapshot; there is no delta contract. The
//! last snapshot received is the one shown, and a failed refresh leaves the
//! last good snapshot in place.

use super::import::{SnapshotImportError, SnapshotImporter, SnapshotRecord};
use super::item::QueueItem;
use super::normalizer::{normalize_all, Normalizable};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Which slice of the backend a snapshot covers. The token is opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueScope {
    AssignedTo(String),
    Team(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("snapshot source unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Import(#[from] SnapshotImportError),
}

/// Fetches the full set of rows visible to a scope.
pub trait SnapshotSource: Send + Sync {
    type Record: Normalizable + Send;

    fn fetch(&self, scope: &QueueScope) -> Result<Vec<Self::Record>, SourceError>;
}

/// Reads a snapshot file on every fetch.
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotSource for FileSnapshotSource {
    type Record = SnapshotRecord;

    fn fetch(&self, scope: &QueueScope) -> Result<Vec<SnapshotRecord>, SourceError> {
        let records = SnapshotImporter::from_path(&self.path)?;
        Ok(match scope {
            QueueScope::Team(_) => records,
            QueueScope::AssignedTo(token) => records
                .into_iter()
                .filter(|record| assigned_to(&record.normalize(), token))
                .collect(),
        })
    }
}

fn assigned_to(item: &QueueItem, token: &str) -> bool {
    item.assignee.as_ref().is_some_and(|assignee| {
        assignee.id.as_deref() == Some(token) || assignee.name == token
    })
}

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Bumped on every successful replace; 0 means nothing loaded yet.
    pub sequence: u64,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub items: Arc<Vec<QueueItem>>,
}

/// Shared holder of the last good snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<RwLock<Snapshot>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Snapshot {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace(&self, items: Vec<QueueItem>, refreshed_at: DateTime<Utc>) -> u64 {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.sequence += 1;
        guard.refreshed_at = Some(refreshed_at);
        guard.items = Arc::new(items);
        guard.sequence
    }

    /// Fetches and normalizes a fresh snapshot, returning its sequence number.
    pub fn refresh<S>(&self, source: &S, scope: &QueueScope) -> Result<u64, SourceError>
    where
        S: SnapshotSource + ?Sized,
    {
        match source.fetch(scope) {
            Ok(records) => {
                let items = normalize_all(&records);
                let count = items.len();
                let sequence = self.replace(items, Utc::now());
                tracing::debug!(sequence, items = count, "queue snapshot refreshed");
                Ok(sequence)
            }
            Err(err) => {
                tracing::warn!(error = %err, "queue refresh failed, keeping last good snapshot");
                Err(err)
            }
        }
    }
}

/// Refreshes the store on a fixed interval until the task is aborted. The
/// first refresh happens immediately.
pub fn spawn_refresh_loop<S>(
    store: SnapshotStore,
    source: Arc<S>,
    scope: QueueScope,
    interval: Duration,
) -> JoinHandle<()>
where
    S: SnapshotSource + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let store = store.clone();
            let source = Arc::clone(&source);
            let scope = scope.clone();
            let outcome =
                tokio::task::spawn_blocking(move || store.refresh(source.as_ref(), &scope)).await;
            if let Err(err) = outcome {
                tracing::warn!(error = %err, "queue refresh task did not complete");
            }
        }
    })
}
