//! Domain events reflecting record-store mutations.
//!
//! Every mutation emits a [`GalleryEvent`] through the [`super::EventBus`].
//! Moderators connected to `/ws` receive the events of the events they
//! subscribed to.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{EventId, MediaId, PlanId, QrCodeId, UserId};

/// Domain event emitted after every state mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GalleryEvent {
    /// A new event was created.
    EventCreated {
        /// Event identifier.
        event_id: EventId,
        /// Event name.
        name: String,
        /// Owning platform admin.
        platform_admin_id: UserId,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An event and its QR codes and media were removed.
    EventDeleted {
        /// Event identifier.
        event_id: EventId,
        /// Removal timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The event-admin list of an event changed.
    EventAdminsChanged {
        /// Event identifier.
        event_id: EventId,
        /// Admin list after the change.
        event_admin_ids: Vec<UserId>,
        /// Change timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A QR code was created for an event.
    QrCodeCreated {
        /// Owning event.
        event_id: EventId,
        /// QR code identifier.
        qr_code_id: QrCodeId,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A guest uploaded media.
    MediaUploaded {
        /// Owning event.
        event_id: EventId,
        /// Media identifier.
        media_id: MediaId,
        /// `true` if the media awaits moderation.
        pending: bool,
        /// Upload timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A moderator approved pending media.
    MediaApproved {
        /// Owning event.
        event_id: EventId,
        /// Media identifier.
        media_id: MediaId,
        /// Approval timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Media was rejected and removed.
    MediaRejected {
        /// Owning event.
        event_id: EventId,
        /// Media identifier.
        media_id: MediaId,
        /// Removal timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A user record was created (admin-created or self-registered).
    UserRegistered {
        /// User identifier.
        user_id: UserId,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A user was enabled or disabled.
    UserStatusChanged {
        /// User identifier.
        user_id: UserId,
        /// New active flag.
        is_active: bool,
        /// Change timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A pricing plan was created, updated or deleted.
    PlanChanged {
        /// Plan identifier.
        plan_id: PlanId,
        /// `true` if the plan no longer exists.
        deleted: bool,
        /// Change timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl GalleryEvent {
    /// Returns the event this domain event belongs to, if any.
    #[must_use]
    pub fn event_id(&self) -> Option<&EventId> {
        match self {
            Self::EventCreated { event_id, .. }
            | Self::EventDeleted { event_id, .. }
            | Self::EventAdminsChanged { event_id, .. }
            | Self::QrCodeCreated { event_id, .. }
            | Self::MediaUploaded { event_id, .. }
            | Self::MediaApproved { event_id, .. }
            | Self::MediaRejected { event_id, .. } => Some(event_id),
            Self::UserRegistered { .. }
            | Self::UserStatusChanged { .. }
            | Self::PlanChanged { .. } => None,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::EventCreated { .. } => "event_created",
            Self::EventDeleted { .. } => "event_deleted",
            Self::EventAdminsChanged { .. } => "event_admins_changed",
            Self::QrCodeCreated { .. } => "qr_code_created",
            Self::MediaUploaded { .. } => "media_uploaded",
            Self::MediaApproved { .. } => "media_approved",
            Self::MediaRejected { .. } => "media_rejected",
            Self::UserRegistered { .. } => "user_registered",
            Self::UserStatusChanged { .. } => "user_status_changed",
            Self::PlanChanged { .. } => "plan_changed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_uploaded_serializes_with_tag() {
        let event = GalleryEvent::MediaUploaded {
            event_id: EventId::new("event-1"),
            media_id: MediaId::new("media-9"),
            pending: true,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("\"event_type\":\"media_uploaded\""));
        assert!(json.contains("media-9"));
    }

    #[test]
    fn user_events_have_no_event_id() {
        let event = GalleryEvent::UserRegistered {
            user_id: UserId::new("user-7"),
            timestamp: Utc::now(),
        };
        assert!(event.event_id().is_none());
        assert_eq!(event.event_type_str(), "user_registered");
    }
}
