//! Application users and their roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{PlanId, UserId};

/// Fixed role enumeration. A user's role is assigned at creation and never
/// changed by any exposed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Operates the whole platform: users and pricing plans.
    SuperAdmin,
    /// Owns events and a storage quota.
    PlatformAdmin,
    /// Moderates the events they are assigned to.
    EventAdmin,
    /// Anonymous QR-code visitor.
    Guest,
}

impl UserRole {
    /// Returns the wire representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::PlatformAdmin => "platform_admin",
            Self::EventAdmin => "event_admin",
            Self::Guest => "guest",
        }
    }
}

/// Application user record as held by the user directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identity-provider subject id.
    pub id: UserId,
    /// Sign-in email.
    pub email: String,
    /// Role, fixed at creation.
    pub role: UserRole,
    /// Optional human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Soft-disable flag.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Storage consumed in GB (platform admins only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_used: Option<f64>,
    /// Storage quota in GB (platform admins only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_limit: Option<f64>,
    /// Subscribed pricing plan (platform admins only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<PlanId>,
}

impl User {
    /// Creates an active user with no quota fields.
    #[must_use]
    pub fn new(id: UserId, email: impl Into<String>, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id,
            email: email.into(),
            role,
            display_name: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            storage_used: None,
            storage_limit: None,
            plan_id: None,
        }
    }

    /// Returns `true` if the user holds `role`.
    #[must_use]
    pub fn has_role(&self, role: UserRole) -> bool {
        self.role == role
    }

    /// Platform admins and super admins may create events.
    #[must_use]
    pub fn can_create_events(&self) -> bool {
        matches!(self.role, UserRole::PlatformAdmin | UserRole::SuperAdmin)
    }

    /// Storage used in GB; zero for anyone but a platform admin.
    #[must_use]
    pub fn storage_used_gb(&self) -> f64 {
        if self.role == UserRole::PlatformAdmin {
            self.storage_used.unwrap_or(0.0)
        } else {
            0.0
        }
    }

    /// Storage limit in GB; zero for anyone but a platform admin.
    #[must_use]
    pub fn storage_limit_gb(&self) -> f64 {
        if self.role == UserRole::PlatformAdmin {
            self.storage_limit.unwrap_or(0.0)
        } else {
            0.0
        }
    }

    /// Percentage of the quota in use. Zero when no limit is set.
    #[must_use]
    pub fn storage_percentage(&self) -> f64 {
        let limit = self.storage_limit.unwrap_or(0.0);
        if limit <= 0.0 {
            return 0.0;
        }
        self.storage_used.unwrap_or(0.0) / limit * 100.0
    }
}
