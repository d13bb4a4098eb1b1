//! Guest-uploaded media and per-file upload progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EventId, MediaId, QrCodeId, QrToken, UserId};

/// Bytes per GB used for storage accounting.
pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Kind of uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Still image.
    Image,
    /// Anything that is not an image is treated as video.
    Video,
}

impl FileType {
    /// Classifies a MIME type: `image/*` is an image, everything else video.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("image/") {
            Self::Image
        } else {
            Self::Video
        }
    }
}

/// Media record. Approval is monotonic: pending → approved, or pending →
/// deleted on rejection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    /// Media identifier.
    pub id: MediaId,
    /// Owning event.
    pub event_id: EventId,
    /// QR code the upload came through.
    pub qr_code_id: QrCodeId,
    /// Original file name.
    pub file_name: String,
    /// Download URL from object storage.
    pub file_url: String,
    /// Image or video.
    pub file_type: FileType,
    /// Size in bytes.
    pub file_size: u64,
    /// Guest name, when given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<String>,
    /// Guest phone, when given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_by_phone: Option<String>,
    /// QR token used for the upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_by_token: Option<QrToken>,
    /// Whether the media is visible in the guest gallery.
    pub is_approved: bool,
    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
    /// Approval timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    /// Moderator who approved the media.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<UserId>,
}

impl Media {
    /// File size expressed in GB for storage counters.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn size_gb(&self) -> f64 {
        self.file_size as f64 / BYTES_PER_GB
    }
}

/// Upload state of a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    /// Bytes are still being transferred.
    Uploading,
    /// Stored and recorded by the backend.
    Success,
    /// Failed; siblings are unaffected.
    Error,
}

/// Progress of one file in a multi-file upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadProgress {
    /// File being uploaded; progress entries are keyed by it.
    pub file_name: String,
    /// Percentage, 0 to 100.
    pub progress: f64,
    /// Current state.
    pub status: UploadStatus,
    /// Failure reason when `status` is [`UploadStatus::Error`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadProgress {
    /// A fresh entry at 0 %.
    #[must_use]
    pub fn started(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            progress: 0.0,
            status: UploadStatus::Uploading,
            error: None,
        }
    }

    /// Returns `true` once the file reached a terminal state.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.status, UploadStatus::Success | UploadStatus::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_classification() {
        assert_eq!(FileType::from_mime("image/jpeg"), FileType::Image);
        assert_eq!(FileType::from_mime("video/mp4"), FileType::Video);
        assert_eq!(FileType::from_mime("application/octet-stream"), FileType::Video);
    }

    #[test]
    fn progress_lifecycle() {
        let mut p = UploadProgress::started("a.jpg");
        assert!(!p.is_finished());
        p.status = UploadStatus::Error;
        assert!(p.is_finished());
    }
}
