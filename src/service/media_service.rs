//! Media service: guest uploads and moderation.

use std::sync::Arc;

use chrono::Utc;

use crate::api::dto::CreateMediaRequest;
use crate::domain::{
    EventBus, EventId, GalleryEvent, Media, MediaId, QrCodeId, RecordStore, UserId,
};
use crate::error::GalleryError;

/// Orchestration layer for media records.
#[derive(Debug, Clone)]
pub struct MediaService {
    store: Arc<RecordStore>,
    event_bus: EventBus,
}

impl MediaService {
    /// Creates a new `MediaService`.
    #[must_use]
    pub fn new(store: Arc<RecordStore>, event_bus: EventBus) -> Self {
        Self { store, event_bus }
    }

    /// Returns the media record with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::MediaNotFound`] if absent.
    pub async fn get_media(&self, id: &MediaId) -> Result<Media, GalleryError> {
        self.store.media(id).await
    }

    /// Returns all media of an event, approved or not.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::EventNotFound`] if the event is absent.
    pub async fn list_media(&self, event_id: &EventId) -> Result<Vec<Media>, GalleryError> {
        let _ = self.store.event(event_id).await?;
        Ok(self.store.media_for_event(event_id).await)
    }

    /// Returns the approved media of an event.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::EventNotFound`] if the event is absent.
    pub async fn approved_media(&self, event_id: &EventId) -> Result<Vec<Media>, GalleryError> {
        let mut media = self.list_media(event_id).await?;
        media.retain(|m| m.is_approved);
        Ok(media)
    }

    /// Returns the media of an event still waiting for approval.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::EventNotFound`] if the event is absent.
    pub async fn pending_media(&self, event_id: &EventId) -> Result<Vec<Media>, GalleryError> {
        let mut media = self.list_media(event_id).await?;
        media.retain(|m| !m.is_approved);
        Ok(media)
    }

    /// Returns the approved media of the event a QR code belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::QrCodeNotFound`] if the QR code is absent.
    pub async fn media_for_qr_code(&self, qr_id: &QrCodeId) -> Result<Vec<Media>, GalleryError> {
        let qr = self.store.qr_code(qr_id).await?;
        self.approved_media(&qr.event_id).await
    }

    /// Records a guest upload.
    ///
    /// The QR code must exist, belong to the event, be active and allow
    /// uploads; the token, when present, must be the QR code's; the
    /// uploader details must satisfy the rules. The record starts approved
    /// unless the rules require moderation.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::QrCodeNotFound`], [`GalleryError::Forbidden`],
    /// [`GalleryError::InvalidRequest`] or [`GalleryError::GuestAccess`].
    pub async fn upload_media(&self, req: CreateMediaRequest) -> Result<Media, GalleryError> {
        let qr = self.store.qr_code(&req.qr_code_id).await?;
        if qr.event_id != req.event_id {
            return Err(GalleryError::InvalidRequest(format!(
                "QR code {} does not belong to event {}",
                qr.id, req.event_id
            )));
        }
        if !qr.is_active || !qr.rules.anyone_can_upload {
            return Err(GalleryError::Forbidden(
                "uploads are disabled for this QR code".into(),
            ));
        }
        if req.uploaded_by_token.as_ref().is_some_and(|t| t != &qr.token) {
            return Err(GalleryError::Forbidden("token does not match QR code".into()));
        }
        if req.file_name.trim().is_empty() {
            return Err(GalleryError::InvalidRequest("fileName must not be empty".into()));
        }
        let details = req.uploader();
        qr.rules.validate_uploader(&details)?;

        let now = Utc::now();
        let approved = !qr.rules.upload_requires_approval;
        let media = Media {
            id: MediaId::generate(),
            event_id: req.event_id,
            qr_code_id: req.qr_code_id,
            file_name: req.file_name,
            file_url: req.file_url,
            file_type: req.file_type,
            file_size: req.file_size,
            uploaded_by: details.name,
            uploaded_by_phone: details.phone,
            uploaded_by_token: req.uploaded_by_token,
            is_approved: approved,
            uploaded_at: now,
            approved_at: approved.then_some(now),
            approved_by: None,
        };
        let media = self.store.insert_media(media).await?;

        let _ = self.event_bus.publish(GalleryEvent::MediaUploaded {
            event_id: media.event_id.clone(),
            media_id: media.id.clone(),
            pending: !media.is_approved,
            timestamp: now,
        });
        tracing::info!(
            media_id = %media.id,
            event_id = %media.event_id,
            pending = !media.is_approved,
            "media uploaded"
        );
        Ok(media)
    }

    /// Approves a pending media record. Approving an approved record
    /// returns it unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::MediaNotFound`] if absent.
    pub async fn approve(
        &self,
        id: &MediaId,
        approved_by: Option<&UserId>,
    ) -> Result<Media, GalleryError> {
        let current = self.store.media(id).await?;
        if current.is_approved {
            return Ok(current);
        }
        let now = Utc::now();
        let media = self
            .store
            .update_media(id, |m| {
                m.is_approved = true;
                m.approved_at = Some(now);
                m.approved_by = approved_by.cloned();
            })
            .await?;

        let _ = self.event_bus.publish(GalleryEvent::MediaApproved {
            event_id: media.event_id.clone(),
            media_id: media.id.clone(),
            timestamp: now,
        });
        tracing::info!(media_id = %id, "media approved");
        Ok(media)
    }

    /// Removes a media record. Rejecting an id that does not exist
    /// succeeds without effect.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::PersistenceError`] if the snapshot write fails.
    pub async fn reject(&self, id: &MediaId) -> Result<(), GalleryError> {
        let Some(media) = self.store.remove_media(id).await? else {
            tracing::debug!(media_id = %id, "reject of absent media ignored");
            return Ok(());
        };
        let _ = self.event_bus.publish(GalleryEvent::MediaRejected {
            event_id: media.event_id,
            media_id: media.id,
            timestamp: Utc::now(),
        });
        tracing::info!(media_id = %id, "media rejected");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{FileType, GuestAccessError, QrRules, QrToken};
    use crate::persistence::seed::demo_records;

    fn make_service() -> MediaService {
        make_service_with_rules(QrRules::default())
    }

    fn make_service_with_rules(rules: QrRules) -> MediaService {
        let mut records = demo_records();
        for qr in &mut records.qr_codes {
            qr.rules = rules;
        }
        let store = Arc::new(RecordStore::from_records(records, None));
        MediaService::new(store, EventBus::new(64))
    }

    fn make_request() -> CreateMediaRequest {
        CreateMediaRequest {
            event_id: EventId::new("event-1"),
            qr_code_id: QrCodeId::new("qr-1"),
            file_name: "cake.jpg".into(),
            file_url: "http://localhost/files/cake.jpg".into(),
            file_type: FileType::Image,
            file_size: 2048,
            uploaded_by: Some("Ana".into()),
            uploaded_by_phone: None,
            uploaded_by_token: Some(QrToken::new("token-123")),
        }
    }

    #[tokio::test]
    async fn upload_is_auto_approved_by_default() {
        let svc = make_service();
        let Ok(media) = svc.upload_media(make_request()).await else {
            panic!("upload failed");
        };
        assert!(media.is_approved);
        assert!(media.approved_at.is_some());
        let Ok(approved) = svc.approved_media(&EventId::new("event-1")).await else {
            panic!("list failed");
        };
        assert_eq!(approved.len(), 2);
    }

    #[tokio::test]
    async fn upload_waits_for_approval_when_required() {
        let svc = make_service_with_rules(QrRules {
            upload_requires_approval: true,
            ..QrRules::default()
        });
        let Ok(media) = svc.upload_media(make_request()).await else {
            panic!("upload failed");
        };
        assert!(!media.is_approved);
        let Ok(pending) = svc.pending_media(&EventId::new("event-1")).await else {
            panic!("list failed");
        };
        assert_eq!(pending.len(), 2);
    }

    #[tokio::test]
    async fn upload_without_required_name_fails() {
        let svc = make_service();
        let mut req = make_request();
        req.uploaded_by = Some("  ".into());
        let result = svc.upload_media(req).await;
        assert!(matches!(
            result,
            Err(GalleryError::GuestAccess(GuestAccessError::NameRequired))
        ));
    }

    #[tokio::test]
    async fn upload_with_foreign_token_fails() {
        let svc = make_service();
        let mut req = make_request();
        req.uploaded_by_token = Some(QrToken::new("token-other"));
        assert!(matches!(
            svc.upload_media(req).await,
            Err(GalleryError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn upload_disabled_by_rules_fails() {
        let svc = make_service_with_rules(QrRules {
            anyone_can_upload: false,
            ..QrRules::default()
        });
        assert!(matches!(
            svc.upload_media(make_request()).await,
            Err(GalleryError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn approve_removes_from_pending() {
        let svc = make_service();
        let id = MediaId::new("media-2");
        let approver = UserId::new("user-2");
        let Ok(media) = svc.approve(&id, Some(&approver)).await else {
            panic!("approve failed");
        };
        assert!(media.is_approved);
        assert_eq!(media.approved_by, Some(approver));

        let Ok(pending) = svc.pending_media(&EventId::new("event-1")).await else {
            panic!("list failed");
        };
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn reject_twice_is_silent() {
        let svc = make_service();
        let id = MediaId::new("media-2");
        assert!(svc.reject(&id).await.is_ok());
        assert!(svc.reject(&id).await.is_ok());
        let Ok(all) = svc.list_media(&EventId::new("event-1")).await else {
            panic!("list failed");
        };
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn qr_gallery_returns_approved_media() {
        let svc = make_service();
        let Ok(media) = svc.media_for_qr_code(&QrCodeId::new("qr-1")).await else {
            panic!("lookup failed");
        };
        assert_eq!(media.len(), 1);
        assert!(media.iter().all(|m| m.is_approved));
    }
}
