use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    error::{AppError, AppResult},
    models::Snapshot,
};

/// Creates the single-writer slot the refresher publishes snapshots into
pub fn snapshot_channel() -> (SnapshotPublisher, SnapshotReader) {
    let (tx, rx) = watch::channel(None);
    (SnapshotPublisher { tx }, SnapshotReader { rx })
}

/// Write side of the snapshot slot. Not cloneable: there is one writer.
pub struct SnapshotPublisher {
    tx: watch::Sender<Option<Arc<Snapshot>>>,
}

impl SnapshotPublisher {
    /// Replaces the published snapshot in one step
    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.tx.send_replace(Some(Arc::clone(&snapshot)));
        snapshot
    }

    pub fn subscribe(&self) -> SnapshotReader {
        SnapshotReader {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read side of the snapshot slot.
///
/// Readers take their own `Arc` to the current snapshot and keep using it
/// for the whole call, so a publication mid-request has no effect on it.
#[derive(Clone)]
pub struct SnapshotReader {
    rx: watch::Receiver<Option<Arc<Snapshot>>>,
}

impl SnapshotReader {
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.rx.borrow().clone()
    }

    /// The current snapshot, or `SnapshotUnavailable` before the first publication
    pub fn require(&self) -> AppResult<Arc<Snapshot>> {
        self.current().ok_or(AppError::SnapshotUnavailable)
    }

    /// Waits for the next publication
    pub async fn changed(&mut self) -> AppResult<()> {
        self.rx
            .changed()
            .await
            .map_err(|_| AppError::Internal("snapshot publisher dropped".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IdIndex, UserItemMatrix};
    use crate::services::cosine_pairwise;
    use crate::services::features::FeatureMatrix;
    use chrono::Utc;

    fn empty_snapshot() -> Snapshot {
        let users = cosine_pairwise(&FeatureMatrix::zeros(0, 0), IdIndex::new()).unwrap();
        let sessions = cosine_pairwise(&FeatureMatrix::zeros(0, 0), IdIndex::new()).unwrap();
        let items = UserItemMatrix::zeros(IdIndex::new(), IdIndex::new());
        Snapshot::new(users, sessions, items, Utc::now()).unwrap()
    }

    #[test]
    fn test_nothing_published_initially() {
        let (_publisher, reader) = snapshot_channel();
        assert!(reader.current().is_none());
        assert!(matches!(reader.require(), Err(AppError::SnapshotUnavailable)));
    }

    #[test]
    fn test_publish_replaces_current() {
        let (publisher, reader) = snapshot_channel();
        let first = publisher.publish(empty_snapshot());
        let held = reader.require().unwrap();
        assert!(Arc::ptr_eq(&first, &held));

        let second = publisher.publish(empty_snapshot());
        assert!(Arc::ptr_eq(&second, &reader.require().unwrap()));
        // earlier readers keep their own reference
        assert!(Arc::ptr_eq(&first, &held));
    }

    #[test]
    fn test_subscribers_share_the_slot() {
        let (publisher, _reader) = snapshot_channel();
        let late = publisher.subscribe();
        let published = publisher.publish(empty_snapshot());
        assert!(Arc::ptr_eq(&published, &late.require().unwrap()));
    }

    #[tokio::test]
    async fn test_changed_wakes_on_publish() {
        let (publisher, mut reader) = snapshot_channel();
        let waiter = tokio::spawn(async move {
            reader.changed().await.unwrap();
            reader.current().is_some()
        });
        publisher.publish(empty_snapshot());
        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn test_changed_fails_when_publisher_dropped() {
        let (publisher, mut reader) = snapshot_channel();
        drop(publisher);
        assert!(reader.changed().await.is_err());
    }
}
