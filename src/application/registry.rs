use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::domain::{DownloadId, DownloadRecord, RecordPatch, RegistryError};

/// Immutable view of the registry, newest record first.
pub type Snapshot = Arc<Vec<DownloadRecord>>;

/// Session-lifetime store of download records.
///
/// Cloning yields another handle to the same store. Every mutation publishes
/// a fresh [`Snapshot`] to all subscribers and returns it to the caller;
/// mutations run under the channel lock so each update is atomic per record.
#[derive(Clone)]
pub struct DownloadRegistry {
    sender: Arc<watch::Sender<Snapshot>>,
}

impl Default for DownloadRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadRegistry {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Snapshot::default());
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn insert(&self, record: DownloadRecord) -> Result<Snapshot, RegistryError> {
        let id = record.id;
        let mut duplicate = false;

        self.sender.send_if_modified(|snapshot| {
            if snapshot.iter().any(|r| r.id == id) {
                duplicate = true;
                return false;
            }
            Arc::make_mut(snapshot).insert(0, record);
            true
        });

        if duplicate {
            return Err(RegistryError::DuplicateId(id));
        }
        debug!("Registered {}", id);
        Ok(self.list())
    }

    /// Apply `patch` to the record with `id`. Missing ids are ignored: the
    /// user may have removed the record while its transfer was running.
    pub fn update(&self, id: DownloadId, patch: RecordPatch) -> Snapshot {
        self.sender.send_if_modified(|snapshot| {
            let Some(index) = snapshot.iter().position(|r| r.id == id) else {
                return false;
            };

            let mut record = snapshot[index].clone();
            let status = record.status;
            if !record.apply(patch) {
                if status.is_terminal() {
                    warn!("Ignoring update to {} after it reached {}", id, status);
                }
                return false;
            }
            Arc::make_mut(snapshot)[index] = record;
            true
        });

        self.list()
    }

    pub fn remove(&self, id: DownloadId) -> Snapshot {
        self.sender.send_if_modified(|snapshot| {
            let Some(index) = snapshot.iter().position(|r| r.id == id) else {
                return false;
            };
            Arc::make_mut(snapshot).remove(index);
            true
        });

        self.list()
    }

    pub fn list(&self) -> Snapshot {
        self.sender.borrow().clone()
    }

    pub fn get(&self, id: DownloadId) -> Option<DownloadRecord> {
        self.sender.borrow().iter().find(|r| r.id == id).cloned()
    }

    /// Receiver that wakes on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        DownloadRequest, DownloadStatus, MediaFormat, MediaQuality, Metadata, Platform,
    };

    fn record() -> DownloadRecord {
        let request = DownloadRequest::new(
            "https://www.youtube.com/watch?v=abc123",
            Platform::YouTube,
            MediaFormat::Audio,
            MediaQuality::High,
        );
        DownloadRecord::pending(DownloadId::generate(), &request)
    }

    #[test]
    fn test_insert_prepends() {
        let registry = DownloadRegistry::new();
        let first = record();
        let second = record();
        registry.insert(first.clone()).unwrap();
        let snapshot = registry.insert(second.clone()).unwrap();

        let ids: Vec<_> = snapshot.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let registry = DownloadRegistry::new();
        let record = record();
        registry.insert(record.clone()).unwrap();

        assert_eq!(
            registry.insert(record.clone()),
            Err(RegistryError::DuplicateId(record.id))
        );
        assert_eq!(registry.list().len(), 1);
    }

    #[test]
    fn test_update_missing_id_is_noop() {
        let registry = DownloadRegistry::new();
        let snapshot = registry.update(DownloadId::generate(), RecordPatch::progress(50));
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_update_applies_patch() {
        let registry = DownloadRegistry::new();
        let record = record();
        registry.insert(record.clone()).unwrap();

        registry.update(
            record.id,
            RecordPatch::downloading(
                Metadata {
                    title: "Test Song".to_string(),
                    thumbnail_url: None,
                },
                10,
            ),
        );

        let updated = registry.get(record.id).unwrap();
        assert_eq!(updated.status, DownloadStatus::Downloading);
        assert_eq!(updated.title, "Test Song");
        assert_eq!(updated.progress, 10);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let registry = DownloadRegistry::new();
        let record = record();
        registry.insert(record.clone()).unwrap();

        assert!(registry.remove(record.id).is_empty());
        assert!(registry.remove(record.id).is_empty());
        assert!(registry.remove(DownloadId::generate()).is_empty());
    }

    #[test]
    fn test_old_snapshots_are_not_mutated() {
        let registry = DownloadRegistry::new();
        let record = record();
        let before = registry.insert(record.clone()).unwrap();

        registry.update(record.id, RecordPatch::failed("boom"));

        assert_eq!(before[0].status, DownloadStatus::Pending);
        assert_eq!(registry.list()[0].status, DownloadStatus::Error);
    }

    #[tokio::test]
    async fn test_subscribers_see_every_mutation() {
        let registry = DownloadRegistry::new();
        let mut rx = registry.subscribe();
        let record = record();

        registry.insert(record.clone()).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        registry.remove(record.id);
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let registry = DownloadRegistry::new();
        let handle = registry.clone();
        handle.insert(record()).unwrap();
        assert_eq!(registry.list().len(), 1);
    }
}
