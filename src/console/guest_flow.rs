//! Guest experience opened from a scanned QR code.

use std::sync::Arc;

use super::backend::{Backend, ConsoleError};
use super::uploader::{MediaUploader, UploadFile, UploadReport, UploadTarget};
use crate::domain::{GuestAccessError, GuestTab, GuestView, Media, QrCode, QrToken, UploaderDetails};

/// Errors shown on the guest page.
#[derive(Debug, thiserror::Error)]
pub enum GuestFlowError {
    /// No token in the link.
    #[error("Invalid QR code token")]
    MissingToken,
    /// The token does not resolve to a QR code.
    #[error("Invalid or expired QR code")]
    InvalidQrCode,
    /// The rules forbid what was attempted.
    #[error(transparent)]
    Access(#[from] GuestAccessError),
    /// Upload attempted on a gallery-only code.
    #[error("uploads are not enabled for this QR code")]
    UploadDisabled,
    /// Gallery requested on an upload-only code.
    #[error("the gallery is not enabled for this QR code")]
    GalleryDisabled,
    /// Backend failure after the QR code was loaded.
    #[error(transparent)]
    Backend(#[from] ConsoleError),
}

/// A resolved guest session for one QR code.
#[derive(Debug)]
pub struct GuestFlow {
    backend: Arc<dyn Backend>,
    qr_code: QrCode,
    view: GuestView,
}

impl GuestFlow {
    /// Loads the QR code behind `token` and resolves the guest view.
    ///
    /// # Errors
    ///
    /// Returns [`GuestFlowError::MissingToken`] for a blank token,
    /// [`GuestFlowError::InvalidQrCode`] when the lookup fails, and
    /// [`GuestFlowError::Access`] when the code enables nothing.
    pub async fn open(backend: Arc<dyn Backend>, token: &str) -> Result<Self, GuestFlowError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(GuestFlowError::MissingToken);
        }
        let qr_code = match backend.qr_code_by_token(&QrToken::new(token)).await {
            Ok(qr) => qr,
            Err(e) => {
                tracing::debug!(error = %e, "guest token lookup failed");
                return Err(GuestFlowError::InvalidQrCode);
            }
        };
        let view = GuestView::resolve(&qr_code.rules)?;
        tracing::debug!(qr_code_id = %qr_code.id, ?view, "guest view resolved");
        Ok(Self {
            backend,
            qr_code,
            view,
        })
    }

    /// Loaded QR code.
    #[must_use]
    pub fn qr_code(&self) -> &QrCode {
        &self.qr_code
    }

    /// Resolved view.
    #[must_use]
    pub fn view(&self) -> GuestView {
        self.view
    }

    /// Tab on screen.
    #[must_use]
    pub fn current_tab(&self) -> GuestTab {
        self.view.current_tab()
    }

    /// Switches tabs; a no-op when the rules grant a single feature.
    pub fn switch_to(&mut self, tab: GuestTab) {
        self.view.switch_to(tab);
    }

    /// Approved media of the event.
    ///
    /// # Errors
    ///
    /// Returns [`GuestFlowError::GalleryDisabled`] when viewing is not
    /// allowed, or the backend error.
    pub async fn gallery(&self) -> Result<Vec<Media>, GuestFlowError> {
        if !self.view.shows_gallery() {
            return Err(GuestFlowError::GalleryDisabled);
        }
        Ok(self.backend.qr_code_media(&self.qr_code.id).await?)
    }

    /// Uploads `files` after checking the uploader details against the
    /// rules.
    ///
    /// # Errors
    ///
    /// Returns [`GuestFlowError::UploadDisabled`] when uploads are not
    /// allowed and [`GuestFlowError::Access`] for missing name or phone.
    /// Per-file failures are reported in the [`UploadReport`].
    pub async fn upload(
        &self,
        uploader: &MediaUploader,
        files: Vec<UploadFile>,
        details: UploaderDetails,
    ) -> Result<UploadReport, GuestFlowError> {
        if !self.view.shows_upload() {
            return Err(GuestFlowError::UploadDisabled);
        }
        let details = details.normalized();
        self.qr_code.rules.validate_uploader(&details)?;
        let target = UploadTarget {
            event_id: self.qr_code.event_id.clone(),
            qr_code_id: self.qr_code.id.clone(),
            token: self.qr_code.token.clone(),
        };
        Ok(uploader.upload_all(&target, files, &details).await)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::console::{LocalObjectStorage, MockBackend};
    use crate::domain::{EventBus, QrRules, RecordStore};
    use crate::identity::{AccountRegistry, IdentityProvider, LocalIdentityProvider};
    use crate::persistence::seed::demo_records;

    fn backend_with(rules: QrRules) -> Arc<dyn Backend> {
        let identity: Arc<dyn IdentityProvider> = Arc::new(LocalIdentityProvider::new(Arc::new(
            AccountRegistry::new(Duration::from_secs(60)),
        )));
        let mut records = demo_records();
        for qr in &mut records.qr_codes {
            qr.rules = rules;
        }
        let store = Arc::new(RecordStore::from_records(records, None));
        Arc::new(MockBackend::new(store, EventBus::new(16), identity, Duration::ZERO))
    }

    #[tokio::test]
    async fn blank_and_unknown_tokens() {
        let backend = backend_with(QrRules::default());
        let blank = GuestFlow::open(Arc::clone(&backend), "  ").await;
        assert_eq!(
            blank.err().map(|e| e.to_string()).as_deref(),
            Some("Invalid QR code token")
        );
        let unknown = GuestFlow::open(backend, "token-nope").await;
        assert_eq!(
            unknown.err().map(|e| e.to_string()).as_deref(),
            Some("Invalid or expired QR code")
        );
    }

    #[tokio::test]
    async fn both_features_start_on_gallery_and_switch() {
        let Ok(mut flow) = GuestFlow::open(backend_with(QrRules::default()), "token-123").await
        else {
            panic!("open failed");
        };
        assert_eq!(flow.current_tab(), GuestTab::Gallery);
        let Ok(gallery) = flow.gallery().await else {
            panic!("gallery failed");
        };
        assert_eq!(gallery.len(), 1);
        flow.switch_to(GuestTab::Upload);
        assert_eq!(flow.current_tab(), GuestTab::Upload);
    }

    #[tokio::test]
    async fn no_features_is_an_error() {
        let rules = QrRules {
            anyone_can_view_gallery: false,
            anyone_can_upload: false,
            ..QrRules::default()
        };
        let result = GuestFlow::open(backend_with(rules), "token-123").await;
        assert_eq!(
            result.err().map(|e| e.to_string()).as_deref(),
            Some("This QR code has no active features")
        );
    }

    #[tokio::test]
    async fn gallery_only_rejects_upload_and_switch() {
        let rules = QrRules {
            anyone_can_upload: false,
            ..QrRules::default()
        };
        let backend = backend_with(rules);
        let Ok(mut flow) = GuestFlow::open(Arc::clone(&backend), "token-123").await else {
            panic!("open failed");
        };
        flow.switch_to(GuestTab::Upload);
        assert_eq!(flow.view(), GuestView::GalleryOnly);

        let storage = Arc::new(LocalObjectStorage::new(std::env::temp_dir(), "http://files"));
        let uploader = MediaUploader::new(backend, storage);
        let result = flow.upload(&uploader, Vec::new(), UploaderDetails::default()).await;
        assert!(matches!(result, Err(GuestFlowError::UploadDisabled)));
    }

    #[tokio::test]
    async fn missing_name_is_rejected_before_upload() {
        let rules = QrRules {
            anyone_can_view_gallery: false,
            ..QrRules::default()
        };
        let backend = backend_with(rules);
        let Ok(flow) = GuestFlow::open(Arc::clone(&backend), "token-123").await else {
            panic!("open failed");
        };
        assert!(matches!(flow.gallery().await, Err(GuestFlowError::GalleryDisabled)));

        let storage = Arc::new(LocalObjectStorage::new(std::env::temp_dir(), "http://files"));
        let uploader = MediaUploader::new(backend, storage);
        let details = UploaderDetails {
            name: Some("   ".into()),
            phone: None,
        };
        let result = flow.upload(&uploader, Vec::new(), details).await;
        assert!(matches!(
            result,
            Err(GuestFlowError::Access(GuestAccessError::NameRequired))
        ));
    }
}
