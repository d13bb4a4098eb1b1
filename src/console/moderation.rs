//! Approval queue actions for event moderators.

use std::sync::Arc;

use super::backend::{Backend, ConsoleError};
use super::object_storage::{ObjectStorage, StorageError};
use crate::domain::{EventId, Media, MediaId};

/// Moderation actions over the backend and object storage.
#[derive(Debug, Clone)]
pub struct Moderation {
    backend: Arc<dyn Backend>,
    storage: Arc<dyn ObjectStorage>,
}

impl Moderation {
    /// Creates the moderation helper.
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { backend, storage }
    }

    /// Media of `event_id` waiting for approval.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn pending(&self, event_id: &EventId) -> Result<Vec<Media>, ConsoleError> {
        self.backend.pending_media(event_id).await
    }

    /// Approves a media record.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn approve(&self, id: &MediaId) -> Result<Media, ConsoleError> {
        self.backend.approve_media(id).await
    }

    /// Rejects a media record, leaving the stored file in place.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn reject(&self, id: &MediaId) -> Result<(), ConsoleError> {
        self.backend.reject_media(id).await
    }

    /// Deletes the stored file, then the media record. A file that is
    /// already gone does not block the record deletion.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Storage`] when the file cannot be deleted,
    /// or the backend error.
    pub async fn delete_with_file(&self, media: &Media) -> Result<(), ConsoleError> {
        match self.storage.delete(&media.file_url).await {
            Ok(()) | Err(StorageError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
        self.backend.reject_media(&media.id).await?;
        tracing::info!(media_id = %media.id, "media deleted with file");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::console::{LocalObjectStorage, MockBackend};
    use crate::identity::{AccountRegistry, IdentityProvider, LocalIdentityProvider};

    fn moderation(root: &std::path::Path) -> (Moderation, Arc<LocalObjectStorage>) {
        let identity: Arc<dyn IdentityProvider> = Arc::new(LocalIdentityProvider::new(Arc::new(
            AccountRegistry::new(Duration::from_secs(60)),
        )));
        let backend = Arc::new(MockBackend::with_demo_data(identity));
        let storage = Arc::new(LocalObjectStorage::new(root, "http://files"));
        (
            Moderation::new(backend, Arc::clone(&storage) as Arc<dyn ObjectStorage>),
            storage,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn approve_and_reject_drain_queue() {
        let root = std::env::temp_dir().join("guestlens-moderation-queue");
        let (moderation, _) = moderation(&root);
        let event_id = EventId::new("event-1");
        let Ok(pending) = moderation.pending(&event_id).await else {
            panic!("pending failed");
        };
        assert_eq!(pending.len(), 1);

        assert!(moderation.reject(&MediaId::new("media-2")).await.is_ok());
        let Ok(pending) = moderation.pending(&event_id).await else {
            panic!("pending failed");
        };
        assert!(pending.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn delete_with_file_removes_both() {
        let root = std::env::temp_dir().join(format!(
            "guestlens-moderation-{}",
            uuid::Uuid::new_v4().simple()
        ));
        let (moderation, storage) = moderation(&root);
        let Ok(url) = storage.upload("events/event-1/qr-1/x_a.jpg", b"img", None).await else {
            panic!("upload failed");
        };
        let Ok(mut media) = moderation.approve(&MediaId::new("media-1")).await else {
            panic!("approve failed");
        };
        media.file_url = url;

        assert!(moderation.delete_with_file(&media).await.is_ok());
        assert!(!root.join("events/event-1/qr-1/x_a.jpg").exists());
        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}
