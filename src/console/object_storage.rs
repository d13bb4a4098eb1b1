//! Object storage for uploaded files.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use crate::domain::{EventId, QrCodeId};

/// Bytes written per progress report.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Object storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The object path escapes the storage root or is empty.
    #[error("invalid object path: {0}")]
    InvalidPath(String),
    /// No object at the path.
    #[error("object not found: {0}")]
    NotFound(String),
    /// Filesystem failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Transfer state reported while an object is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes written so far.
    pub bytes_transferred: u64,
    /// Object size.
    pub total_bytes: u64,
}

impl TransferProgress {
    /// Percentage in `0..=100`. An empty object counts as complete.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 100.0;
        }
        self.bytes_transferred as f64 / self.total_bytes as f64 * 100.0
    }
}

/// Builds `events/{eventId}/{qrCodeId}/{fileId}_{fileName}`. Path
/// separators in the file name are replaced.
#[must_use]
pub fn object_path(event_id: &EventId, qr_code_id: &QrCodeId, file_name: &str) -> String {
    let nonce: String = uuid::Uuid::new_v4().simple().to_string().chars().take(7).collect();
    let file_id = format!("{}_{nonce}", Utc::now().timestamp_millis());
    let safe_name = file_name.replace(['/', '\\'], "_");
    format!("events/{event_id}/{qr_code_id}/{file_id}_{safe_name}")
}

/// Blob store with download URLs.
#[async_trait]
pub trait ObjectStorage: Send + Sync + fmt::Debug {
    /// Stores `data` at `path` and returns its download URL. Progress is
    /// sent after each chunk when `progress` is given.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidPath`] or [`StorageError::Io`].
    async fn upload(
        &self,
        path: &str,
        data: &[u8],
        progress: Option<&mpsc::UnboundedSender<TransferProgress>>,
    ) -> Result<String, StorageError>;

    /// Deletes an object by path or download URL.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] when nothing is stored there.
    async fn delete(&self, path_or_url: &str) -> Result<(), StorageError>;
}

/// [`ObjectStorage`] on the local filesystem, served by the gateway under
/// `public_base_url`.
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root: PathBuf,
    public_base_url: String,
    chunk_size: usize,
}

impl LocalObjectStorage {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Overrides the chunk size. Zero is treated as one byte.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Download URL of `path`.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{path}", self.public_base_url)
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        let clean = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if path.is_empty() || !clean {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload(
        &self,
        path: &str,
        data: &[u8],
        progress: Option<&mpsc::UnboundedSender<TransferProgress>>,
    ) -> Result<String, StorageError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(&target).await?;
        let total_bytes = data.len() as u64;
        let mut written = 0u64;

        if data.is_empty()
            && let Some(tx) = progress
        {
            let _ = tx.send(TransferProgress {
                bytes_transferred: 0,
                total_bytes,
            });
        }
        for chunk in data.chunks(self.chunk_size) {
            file.write_all(chunk).await?;
            written += chunk.len() as u64;
            if let Some(tx) = progress {
                let _ = tx.send(TransferProgress {
                    bytes_transferred: written,
                    total_bytes,
                });
            }
        }
        file.flush().await?;

        tracing::debug!(path, bytes = total_bytes, "object stored");
        Ok(self.url_for(path))
    }

    async fn delete(&self, path_or_url: &str) -> Result<(), StorageError> {
        let path = path_or_url
            .strip_prefix(&self.public_base_url)
            .map_or(path_or_url, |rest| rest.trim_start_matches('/'));
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => {
                tracing::debug!(path, "object deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn temp_root(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("guestlens-storage-{name}-{}", uuid::Uuid::new_v4().simple()))
    }

    #[test]
    fn object_path_layout() {
        let path = object_path(&EventId::new("event-1"), &QrCodeId::new("qr-1"), "a/b.jpg");
        assert!(path.starts_with("events/event-1/qr-1/"));
        assert!(path.ends_with("_a_b.jpg"));
    }

    #[tokio::test]
    async fn upload_reports_each_chunk_and_returns_url() {
        let root = temp_root("upload");
        let storage = LocalObjectStorage::new(&root, "http://localhost:3000/files/").with_chunk_size(4);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let Ok(url) = storage.upload("events/e/q/f_x.jpg", b"0123456789", Some(&tx)).await else {
            panic!("upload failed");
        };
        drop(tx);
        assert_eq!(url, "http://localhost:3000/files/events/e/q/f_x.jpg");

        let mut reports = Vec::new();
        while let Some(p) = rx.recv().await {
            reports.push(p);
        }
        assert_eq!(reports.len(), 3);
        assert_eq!(reports.last().map(TransferProgress::percent), Some(100.0));

        let stored = tokio::fs::read(root.join("events/e/q/f_x.jpg")).await.unwrap_or_default();
        assert_eq!(stored, b"0123456789");
        let _ = tokio::fs::remove_dir_all(&root).await;
    }

    #[tokio::test]
    async fn delete_accepts_url_and_reports_missing() {
        let root = temp_root("delete");
        let storage = LocalObjectStorage::new(&root, "http://files");
        let Ok(url) = storage.upload("a/b.png", b"x", None).await else {
            panic!("upload failed");
        };
        assert!(storage.delete(&url).await.is_ok());
        assert!(matches!(
            storage.delete("a/b.png").await,
            Err(StorageError::NotFound(_))
        ));
        let _ = tokio::fs::remove_dir_all(&root).await;
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let storage = LocalObjectStorage::new(temp_root("traversal"), "http://files");
        assert!(matches!(
            storage.upload("../escape", b"x", None).await,
            Err(StorageError::InvalidPath(_))
        ));
    }
}
