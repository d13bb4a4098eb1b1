//! Concurrent multi-file upload with per-file progress.
//!
//! Each file runs in its own task: store the bytes, then record the media
//! through the backend. Progress lives in a shared `watch` list keyed by
//! file name. A failing file is marked `error` and its siblings continue.
//! In-flight uploads are not cancellable.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;

use super::backend::{Backend, ConsoleError};
use super::object_storage::{ObjectStorage, object_path};
use crate::api::dto::CreateMediaRequest;
use crate::domain::{
    EventId, FileType, Media, QrCodeId, QrToken, UploadProgress, UploadStatus, UploaderDetails,
};

/// A file picked for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Original file name.
    pub file_name: String,
    /// MIME type, used to tell images from videos.
    pub mime_type: String,
    /// Content.
    pub data: Arc<[u8]>,
}

impl UploadFile {
    /// Creates a file entry.
    #[must_use]
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// QR code the files are uploaded through.
#[derive(Debug, Clone)]
pub struct UploadTarget {
    /// Owning event.
    pub event_id: EventId,
    /// QR code.
    pub qr_code_id: QrCodeId,
    /// Guest token presented with the upload.
    pub token: QrToken,
}

/// Result for one file.
#[derive(Debug)]
pub struct FileOutcome {
    /// File name.
    pub file_name: String,
    /// Recorded media or the failure.
    pub result: Result<Media, ConsoleError>,
}

/// Result of [`MediaUploader::upload_all`], in input order.
#[derive(Debug, Default)]
pub struct UploadReport {
    /// One entry per file that ran to completion.
    pub outcomes: Vec<FileOutcome>,
}

impl UploadReport {
    /// Returns `true` when every file was stored and recorded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Media records created.
    pub fn media(&self) -> impl Iterator<Item = &Media> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }
}

/// Uploads files through a QR code.
#[derive(Debug, Clone)]
pub struct MediaUploader {
    backend: Arc<dyn Backend>,
    storage: Arc<dyn ObjectStorage>,
    progress: Arc<watch::Sender<Vec<UploadProgress>>>,
}

impl MediaUploader {
    /// Creates an uploader.
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, storage: Arc<dyn ObjectStorage>) -> Self {
        let (progress, _) = watch::channel(Vec::new());
        Self {
            backend,
            storage,
            progress: Arc::new(progress),
        }
    }

    /// Subscribes to the progress list.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<UploadProgress>> {
        self.progress.subscribe()
    }

    /// Current progress list.
    #[must_use]
    pub fn progress(&self) -> Vec<UploadProgress> {
        self.progress.borrow().clone()
    }

    /// Empties the progress list.
    pub fn clear_progress(&self) {
        let _ = self.progress.send_replace(Vec::new());
    }

    /// Uploads every file concurrently and waits for all of them.
    pub async fn upload_all(
        &self,
        target: &UploadTarget,
        files: Vec<UploadFile>,
        details: &UploaderDetails,
    ) -> UploadReport {
        self.clear_progress();
        let details = details.clone().normalized();
        let mut tasks = JoinSet::new();

        for (index, file) in files.into_iter().enumerate() {
            let backend = Arc::clone(&self.backend);
            let storage = Arc::clone(&self.storage);
            let progress = Arc::clone(&self.progress);
            let target = target.clone();
            let details = details.clone();
            tasks.spawn(async move {
                let file_name = file.file_name.clone();
                let result =
                    upload_one(backend.as_ref(), storage, &progress, &target, file, details).await;
                (index, FileOutcome { file_name, result })
            });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => tracing::error!(error = %e, "upload task failed"),
            }
        }
        outcomes.sort_by_key(|(index, _)| *index);

        let report = UploadReport {
            outcomes: outcomes.into_iter().map(|(_, o)| o).collect(),
        };
        tracing::info!(
            files = report.outcomes.len(),
            all_succeeded = report.all_succeeded(),
            "upload batch finished"
        );
        report
    }
}

fn publish(progress: &watch::Sender<Vec<UploadProgress>>, entry: UploadProgress) {
    progress.send_modify(|list| {
        match list.iter_mut().find(|p| p.file_name == entry.file_name) {
            Some(existing) => *existing = entry,
            None => list.push(entry),
        }
    });
}

async fn upload_one(
    backend: &dyn Backend,
    storage: Arc<dyn ObjectStorage>,
    progress: &watch::Sender<Vec<UploadProgress>>,
    target: &UploadTarget,
    file: UploadFile,
    details: UploaderDetails,
) -> Result<Media, ConsoleError> {
    let mut entry = UploadProgress::started(&file.file_name);
    publish(progress, entry.clone());

    let path = object_path(&target.event_id, &target.qr_code_id, &file.file_name);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let data = Arc::clone(&file.data);
    let store = async move {
        let stored = storage.upload(&path, &data, Some(&tx)).await;
        drop(tx);
        stored
    };
    let forward = async {
        let mut last = entry.clone();
        while let Some(transfer) = rx.recv().await {
            last.progress = transfer.percent();
            publish(progress, last.clone());
        }
    };
    let (stored, ()) = tokio::join!(store, forward);

    let recorded = match stored {
        Ok(file_url) => {
            let req = CreateMediaRequest {
                event_id: target.event_id.clone(),
                qr_code_id: target.qr_code_id.clone(),
                file_name: file.file_name.clone(),
                file_url,
                file_type: FileType::from_mime(&file.mime_type),
                file_size: file.data.len() as u64,
                uploaded_by: details.name,
                uploaded_by_phone: details.phone,
                uploaded_by_token: Some(target.token.clone()),
            };
            backend.create_media(req).await
        }
        Err(e) => Err(e.into()),
    };

    match &recorded {
        Ok(media) => {
            entry.progress = 100.0;
            entry.status = UploadStatus::Success;
            tracing::debug!(media_id = %media.id, file = %file.file_name, "file uploaded");
        }
        Err(e) => {
            entry.status = UploadStatus::Error;
            entry.error = Some(e.to_string());
            tracing::warn!(file = %file.file_name, error = %e, "file upload failed");
        }
    }
    publish(progress, entry);
    recorded
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;
    use crate::console::{LocalObjectStorage, MockBackend};
    use crate::domain::{EventBus, RecordStore};
    use crate::identity::{AccountRegistry, IdentityProvider, LocalIdentityProvider};
    use crate::persistence::seed::demo_records;

    fn setup(name: &str) -> (MediaUploader, PathBuf) {
        let identity: Arc<dyn IdentityProvider> = Arc::new(LocalIdentityProvider::new(Arc::new(
            AccountRegistry::new(Duration::from_secs(60)),
        )));
        let store = Arc::new(RecordStore::from_records(demo_records(), None));
        let backend = Arc::new(MockBackend::new(store, EventBus::new(16), identity, Duration::ZERO));
        let root = std::env::temp_dir().join(format!(
            "guestlens-uploader-{name}-{}",
            uuid::Uuid::new_v4().simple()
        ));
        let storage = Arc::new(LocalObjectStorage::new(&root, "http://files").with_chunk_size(2));
        (MediaUploader::new(backend, storage), root)
    }

    fn target(qr: &str) -> UploadTarget {
        UploadTarget {
            event_id: EventId::new("event-1"),
            qr_code_id: QrCodeId::new(qr),
            token: QrToken::new("token-123"),
        }
    }

    fn guest() -> UploaderDetails {
        UploaderDetails {
            name: Some("Ana".into()),
            phone: None,
        }
    }

    #[tokio::test]
    async fn uploads_all_files_and_tracks_progress() {
        let (uploader, root) = setup("ok");
        let files = vec![
            UploadFile::new("a.jpg", "image/jpeg", b"abcdef".to_vec()),
            UploadFile::new("b.mp4", "video/mp4", b"0123".to_vec()),
        ];
        let report = uploader.upload_all(&target("qr-1"), files, &guest()).await;
        assert!(report.all_succeeded());
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(
            report.outcomes.first().map(|o| o.file_name.as_str()),
            Some("a.jpg")
        );
        let types: Vec<FileType> = report.media().map(|m| m.file_type).collect();
        assert_eq!(types, vec![FileType::Image, FileType::Video]);

        let progress = uploader.progress();
        assert_eq!(progress.len(), 2);
        assert!(progress.iter().all(|p| p.status == UploadStatus::Success));
        assert!(progress.iter().all(|p| (p.progress - 100.0).abs() < f64::EPSILON));
        let _ = tokio::fs::remove_dir_all(&root).await;
    }

    #[tokio::test]
    async fn failing_record_marks_only_that_file() {
        let (uploader, root) = setup("fail");
        let files = vec![UploadFile::new("a.jpg", "image/jpeg", b"abc".to_vec())];
        let report = uploader.upload_all(&target("qr-404"), files, &guest()).await;
        assert!(!report.all_succeeded());

        let progress = uploader.progress();
        assert_eq!(progress.first().map(|p| p.status), Some(UploadStatus::Error));
        assert!(progress.first().and_then(|p| p.error.clone()).is_some());
        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}
