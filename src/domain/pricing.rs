//! Pricing plans: pure reference data managed by super admins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::PlanId;

fn default_currency() -> String {
    "USD".to_string()
}

/// A storage plan offered to platform admins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingPlan {
    /// Plan identifier.
    pub id: PlanId,
    /// Display name (e.g. "Pro").
    pub name: String,
    /// Storage allowance in GB.
    #[serde(rename = "storageLimitGB")]
    pub storage_limit_gb: f64,
    /// Price per billing period.
    #[serde(default)]
    pub price: f64,
    /// ISO currency code.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Only active plans are offered on event creation.
    pub is_active: bool,
    /// Feature bullet points; the first one doubles as the description.
    #[serde(default)]
    pub features: Vec<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl PricingPlan {
    /// Human-readable description, taken from the first feature.
    #[must_use]
    pub fn description(&self) -> &str {
        self.features.first().map_or("", String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backend_shape_with_defaults() {
        let json = r#"{
            "id": "plan-9",
            "name": "Trial",
            "storageLimitGB": 1,
            "isActive": true,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }"#;
        let plan: Result<PricingPlan, _> = serde_json::from_str(json);
        assert!(plan.is_ok());
        if let Ok(plan) = plan {
            assert_eq!(plan.currency, "USD");
            assert_eq!(plan.description(), "");
            assert_eq!(plan.price, 0.0);
        }
    }
}
