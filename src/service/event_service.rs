//! Event service: events, their admin lists and their QR codes.

use std::sync::Arc;

use chrono::Utc;

use crate::api::dto::{CreateEventRequest, CreateQrCodeRequest};
use crate::domain::{
    Event, EventBus, EventId, GalleryEvent, QrCode, QrCodeId, QrToken, RecordStore, User,
    UserId,
};
use crate::error::GalleryError;

/// Orchestration layer for event and QR code operations.
///
/// Every mutation follows the same pattern: validate, write through the
/// [`RecordStore`], publish a [`GalleryEvent`], log, return the record.
#[derive(Debug, Clone)]
pub struct EventService {
    store: Arc<RecordStore>,
    event_bus: EventBus,
}

impl EventService {
    /// Creates a new `EventService`.
    #[must_use]
    pub fn new(store: Arc<RecordStore>, event_bus: EventBus) -> Self {
        Self { store, event_bus }
    }

    /// Returns every event, oldest first.
    pub async fn list_events(&self) -> Vec<Event> {
        self.store.events().await
    }

    /// Returns the events `user` may see: all of them for a super admin,
    /// owned ones for a platform admin, assigned ones for an event admin.
    pub async fn list_events_for(&self, user: &User) -> Vec<Event> {
        let mut events = self.store.events().await;
        events.retain(|e| e.is_visible_to(user));
        events
    }

    /// Returns the event when `user` may manage or moderate it.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::EventNotFound`] if absent and
    /// [`GalleryError::Forbidden`] when the event belongs to someone else.
    pub async fn ensure_access(&self, user: &User, id: &EventId) -> Result<Event, GalleryError> {
        let event = self.store.event(id).await?;
        if !event.is_visible_to(user) {
            tracing::debug!(user_id = %user.id, event_id = %id, "event outside caller scope");
            return Err(GalleryError::Forbidden(format!("no access to event {id}")));
        }
        Ok(event)
    }

    /// Returns the event with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::EventNotFound`] if absent.
    pub async fn get_event(&self, id: &EventId) -> Result<Event, GalleryError> {
        self.store.event(id).await
    }

    /// Creates an event owned by `req.platform_admin_id`, or by `caller`
    /// when the request names no owner.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::InvalidRequest`] for a blank name or a
    /// missing owner, and [`GalleryError::UserNotFound`] for an unknown one.
    pub async fn create_event(
        &self,
        req: CreateEventRequest,
        caller: Option<&UserId>,
    ) -> Result<Event, GalleryError> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(GalleryError::InvalidRequest(
                "event name must not be empty".into(),
            ));
        }
        let owner = req
            .platform_admin_id
            .or_else(|| caller.cloned())
            .ok_or_else(|| GalleryError::InvalidRequest("platformAdminId is required".into()))?;
        let _ = self.store.user(&owner).await?;

        let now = Utc::now();
        let event = Event {
            id: EventId::generate(),
            name: name.to_string(),
            description: req.description,
            platform_admin_id: owner,
            event_admin_ids: req.event_admin_ids,
            pricing_plan_id: req.pricing_plan_id,
            expires_at: req.expires_at,
            is_active: true,
            storage_used: 0.0,
            created_at: now,
            updated_at: now,
        };
        let event = self.store.insert_event(event).await?;

        let _ = self.event_bus.publish(GalleryEvent::EventCreated {
            event_id: event.id.clone(),
            name: event.name.clone(),
            platform_admin_id: event.platform_admin_id.clone(),
            timestamp: now,
        });
        tracing::info!(event_id = %event.id, owner = %event.platform_admin_id, "event created");
        Ok(event)
    }

    /// Deletes an event together with its QR codes and media.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::EventNotFound`] if absent.
    pub async fn delete_event(&self, id: &EventId) -> Result<(), GalleryError> {
        let _event = self.store.remove_event(id).await?;
        let _ = self.event_bus.publish(GalleryEvent::EventDeleted {
            event_id: id.clone(),
            timestamp: Utc::now(),
        });
        tracing::info!(event_id = %id, "event deleted");
        Ok(())
    }

    /// Adds `admin_id` to the event's admin list. Adding an admin twice
    /// leaves the list unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::EventNotFound`] or
    /// [`GalleryError::UserNotFound`].
    pub async fn assign_admin(
        &self,
        event_id: &EventId,
        admin_id: &UserId,
    ) -> Result<Event, GalleryError> {
        let _ = self.store.user(admin_id).await?;
        let event = self
            .store
            .update_event(event_id, |e| {
                if !e.event_admin_ids.contains(admin_id) {
                    e.event_admin_ids.push(admin_id.clone());
                }
            })
            .await?;
        self.publish_admins(&event);
        tracing::info!(%event_id, %admin_id, "event admin assigned");
        Ok(event)
    }

    /// Removes `admin_id` from the event's admin list.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::EventNotFound`] if absent.
    pub async fn remove_admin(
        &self,
        event_id: &EventId,
        admin_id: &UserId,
    ) -> Result<Event, GalleryError> {
        let event = self
            .store
            .update_event(event_id, |e| e.event_admin_ids.retain(|id| id != admin_id))
            .await?;
        self.publish_admins(&event);
        tracing::info!(%event_id, %admin_id, "event admin removed");
        Ok(event)
    }

    fn publish_admins(&self, event: &Event) {
        let _ = self.event_bus.publish(GalleryEvent::EventAdminsChanged {
            event_id: event.id.clone(),
            event_admin_ids: event.event_admin_ids.clone(),
            timestamp: Utc::now(),
        });
    }

    /// Returns the QR codes of an event.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::EventNotFound`] if the event is absent.
    pub async fn list_qr_codes(&self, event_id: &EventId) -> Result<Vec<QrCode>, GalleryError> {
        let _ = self.store.event(event_id).await?;
        Ok(self.store.qr_codes_for_event(event_id).await)
    }

    /// Creates a QR code with a fresh guest token.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::InvalidRequest`] for a blank name and
    /// [`GalleryError::EventNotFound`] if the event is absent.
    pub async fn create_qr_code(
        &self,
        event_id: &EventId,
        req: CreateQrCodeRequest,
    ) -> Result<QrCode, GalleryError> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(GalleryError::InvalidRequest(
                "QR code name must not be empty".into(),
            ));
        }
        let now = Utc::now();
        let qr = QrCode {
            id: QrCodeId::generate(),
            event_id: event_id.clone(),
            name: name.to_string(),
            token: QrToken::generate(),
            rules: req.rules,
            is_active: true,
            scan_count: 0,
            created_at: now,
            updated_at: now,
        };
        let qr = self.store.insert_qr_code(qr).await?;

        let _ = self.event_bus.publish(GalleryEvent::QrCodeCreated {
            event_id: event_id.clone(),
            qr_code_id: qr.id.clone(),
            timestamp: now,
        });
        tracing::info!(%event_id, qr_code_id = %qr.id, "QR code created");
        Ok(qr)
    }

    /// Resolves a guest token to its QR code and counts the scan.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::InvalidToken`] if no QR code carries it.
    pub async fn scan_token(&self, token: &QrToken) -> Result<QrCode, GalleryError> {
        let qr = self.store.scan_qr_code(token).await?;
        tracing::debug!(qr_code_id = %qr.id, scans = qr.scan_count, "QR code scanned");
        Ok(qr)
    }
}
