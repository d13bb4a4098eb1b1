//! Pricing plan DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::PricingPlan;

/// Request body for `POST /super-admin/pricing-plans`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    /// Plan name.
    pub name: String,
    /// Storage quota in GB.
    #[serde(rename = "storageLimitGB")]
    pub storage_limit_gb: f64,
    /// Monthly price. Defaults to 0.
    #[serde(default)]
    pub price: f64,
    /// ISO currency code. Defaults to `USD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Whether the plan is offered. Defaults to `true`.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Feature bullet points; the first one is the description.
    #[serde(default)]
    pub features: Vec<String>,
}

const fn default_active() -> bool {
    true
}

/// Request body for `PUT /super-admin/pricing-plans/{id}`. Absent fields
/// are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlanRequest {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New storage quota in GB.
    #[serde(
        default,
        rename = "storageLimitGB",
        skip_serializing_if = "Option::is_none"
    )]
    pub storage_limit_gb: Option<f64>,
    /// New price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// New currency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// New active flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// Replacement feature list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

/// Response body for `GET /super-admin/pricing-plans`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlanListResponse {
    /// All plans, active or not.
    pub plans: Vec<PricingPlan>,
}
