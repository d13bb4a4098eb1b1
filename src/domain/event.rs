//! Events, their QR codes, and the guest rules carried by each QR code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EventId, PlanId, QrCodeId, QrToken, User, UserId, UserRole};

/// A photo-sharing event (e.g. a wedding) owned by a platform admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event identifier.
    pub id: EventId,
    /// Display name.
    pub name: String,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owning platform admin.
    pub platform_admin_id: UserId,
    /// Event admins allowed to moderate this event.
    #[serde(default)]
    pub event_admin_ids: Vec<UserId>,
    /// Pricing plan selected at creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_plan_id: Option<PlanId>,
    /// Optional expiry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Soft-disable flag.
    pub is_active: bool,
    /// Aggregate storage used by the event's media, in GB.
    #[serde(default)]
    pub storage_used: f64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Whether `user` may manage or moderate this event: super admins
    /// always, platform admins when they own it, event admins when they are
    /// assigned to it.
    #[must_use]
    pub fn is_visible_to(&self, user: &User) -> bool {
        match user.role {
            UserRole::SuperAdmin => true,
            UserRole::PlatformAdmin => self.platform_admin_id == user.id,
            UserRole::EventAdmin => self.event_admin_ids.contains(&user.id),
            UserRole::Guest => false,
        }
    }
}

/// Whether guests must leave a phone number when uploading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PhoneRequirement {
    /// The phone field is hidden.
    None,
    /// The phone field is shown but may be left blank.
    #[default]
    Optional,
    /// A phone number must be provided.
    Mandatory,
}

/// Guest capabilities granted by a QR code at scan time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QrRules {
    /// Guests may browse approved media.
    pub anyone_can_view_gallery: bool,
    /// Guests may upload media.
    pub anyone_can_upload: bool,
    /// Guest uploads stay pending until a moderator approves them.
    pub upload_requires_approval: bool,
    /// Guests must give their name when uploading.
    pub name_required: bool,
    /// Phone number policy for uploads.
    pub phone_required: PhoneRequirement,
    /// Guests may download media.
    pub download_allowed: bool,
}

impl Default for QrRules {
    fn default() -> Self {
        Self {
            anyone_can_view_gallery: true,
            anyone_can_upload: true,
            upload_requires_approval: false,
            name_required: true,
            phone_required: PhoneRequirement::Optional,
            download_allowed: true,
        }
    }
}

/// A QR code belonging to exactly one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QrCode {
    /// QR code identifier.
    pub id: QrCodeId,
    /// Owning event.
    pub event_id: EventId,
    /// Label shown to moderators (e.g. "Main Guest QR").
    pub name: String,
    /// Guest-facing token encoded in the QR image.
    pub token: QrToken,
    /// Guest capabilities.
    pub rules: QrRules,
    /// Soft-disable flag.
    pub is_active: bool,
    /// Number of successful token lookups.
    #[serde(default)]
    pub scan_count: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl QrCode {
    /// Guest URL path for this code, as encoded into the printed QR image.
    #[must_use]
    pub fn guest_path(&self) -> String {
        format!("/guest?token={}", urlencoding::encode(self.token.as_str()))
    }
}
