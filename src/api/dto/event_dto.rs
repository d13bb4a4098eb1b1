//! Event, event-admin and QR code DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Event, PlanId, QrRules, UserId};

/// Request body for `POST /events`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    /// Event name.
    pub name: String,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owning platform admin. Defaults to the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_admin_id: Option<UserId>,
    /// Event admins assigned at creation.
    #[serde(default)]
    pub event_admin_ids: Vec<UserId>,
    /// Pricing plan the event is billed under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_plan_id: Option<PlanId>,
    /// Point in time after which guests can no longer access the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreateEventRequest {
    /// Creates a request with only a name set.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            platform_admin_id: None,
            event_admin_ids: Vec::new(),
            pricing_plan_id: None,
            expires_at: None,
        }
    }
}

/// Response body for `GET /events`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventListResponse {
    /// Events visible to the caller.
    pub events: Vec<Event>,
}

/// Request body for `POST /events/{id}/admins`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignAdminRequest {
    /// User to add to the event's admin list.
    pub admin_id: UserId,
}

/// Request body for `POST /events/{id}/qr-codes`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQrCodeRequest {
    /// Label shown to moderators, e.g. "Table 4".
    pub name: String,
    /// Guest rules; the creation-form defaults apply when omitted.
    #[serde(default)]
    pub rules: QrRules,
}
