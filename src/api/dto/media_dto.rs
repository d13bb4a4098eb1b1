//! Media DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EventId, FileType, QrCodeId, QrToken, UploaderDetails};

/// Request body for `POST /media`: metadata of a file already placed in
/// object storage.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMediaRequest {
    /// Event the file belongs to.
    pub event_id: EventId,
    /// QR code the guest scanned.
    pub qr_code_id: QrCodeId,
    /// Original file name.
    pub file_name: String,
    /// Download URL returned by object storage.
    pub file_url: String,
    /// Image or video.
    pub file_type: FileType,
    /// Size in bytes.
    pub file_size: u64,
    /// Guest name, when given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<String>,
    /// Guest phone number, when given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_by_phone: Option<String>,
    /// Token of the scanned QR code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_by_token: Option<QrToken>,
}

impl CreateMediaRequest {
    /// Uploader details carried by the request.
    #[must_use]
    pub fn uploader(&self) -> UploaderDetails {
        UploaderDetails {
            name: self.uploaded_by.clone(),
            phone: self.uploaded_by_phone.clone(),
        }
        .normalized()
    }
}
