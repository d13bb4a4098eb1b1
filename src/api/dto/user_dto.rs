//! User DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{PlanId, UserRole};

/// Request body for `POST /users`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Login email; must be unique.
    pub email: String,
    /// Role, fixed for the lifetime of the user.
    pub role: UserRole,
    /// Name shown in the console.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Storage quota in GB (platform admins).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_limit: Option<f64>,
    /// Subscribed plan (platform admins).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<PlanId>,
}

/// Request body for `POST /users/self-register`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelfRegisterRequest {
    /// Name entered at sign-up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}
