//! File-backed snapshot store.

use std::path::{Path, PathBuf};

use chrono::Utc;

use super::models::{RecordSet, SNAPSHOT_VERSION, Snapshot};
use crate::error::GalleryError;

/// Reads and writes the record-set snapshot at a fixed path.
///
/// Writes go to a sibling temporary file first and are then renamed over
/// the snapshot, so a crash mid-write never leaves a truncated file.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Creates a store for the snapshot file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the snapshot file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the snapshot. Returns `Ok(None)` when no snapshot exists yet.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::PersistenceError`] if the file cannot be read
    /// or is not a valid snapshot.
    pub async fn load(&self) -> Result<Option<RecordSet>, GalleryError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(GalleryError::PersistenceError(e.to_string())),
        };
        let snapshot: Snapshot = serde_json::from_slice(&bytes)
            .map_err(|e| GalleryError::PersistenceError(format!("corrupt snapshot: {e}")))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(GalleryError::PersistenceError(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        tracing::debug!(path = %self.path.display(), "snapshot loaded");
        Ok(Some(snapshot.records))
    }

    /// Replaces the snapshot with `records`.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::PersistenceError`] on serialization or I/O
    /// failure.
    pub async fn save(&self, records: &RecordSet) -> Result<(), GalleryError> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            records: records.clone(),
        };
        let json = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| GalleryError::PersistenceError(e.to_string()))?;

        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| GalleryError::PersistenceError(e.to_string()))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| GalleryError::PersistenceError(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| GalleryError::PersistenceError(e.to_string()))?;
        Ok(())
    }
}
