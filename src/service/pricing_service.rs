//! Pricing plan service.

use std::sync::Arc;

use chrono::Utc;

use crate::api::dto::{CreatePlanRequest, UpdatePlanRequest};
use crate::domain::{EventBus, GalleryEvent, PlanId, PricingPlan, RecordStore};
use crate::error::GalleryError;

/// Orchestration layer for pricing plans.
#[derive(Debug, Clone)]
pub struct PricingService {
    store: Arc<RecordStore>,
    event_bus: EventBus,
}

impl PricingService {
    /// Creates a new `PricingService`.
    #[must_use]
    pub fn new(store: Arc<RecordStore>, event_bus: EventBus) -> Self {
        Self { store, event_bus }
    }

    /// Returns every plan.
    pub async fn list_plans(&self) -> Vec<PricingPlan> {
        self.store.plans().await
    }

    /// Returns the plans offered on the event creation form.
    pub async fn active_plans(&self) -> Vec<PricingPlan> {
        let mut plans = self.store.plans().await;
        plans.retain(|p| p.is_active);
        plans
    }

    /// Returns the plan with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::PlanNotFound`] if absent.
    pub async fn get_plan(&self, id: &PlanId) -> Result<PricingPlan, GalleryError> {
        self.store.plan(id).await
    }

    /// Creates a plan.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::InvalidRequest`] for a blank name or a
    /// negative quota or price.
    pub async fn create_plan(&self, req: CreatePlanRequest) -> Result<PricingPlan, GalleryError> {
        validate(Some(&req.name), Some(req.storage_limit_gb), Some(req.price))?;
        let now = Utc::now();
        let plan = PricingPlan {
            id: PlanId::generate(),
            name: req.name.trim().to_string(),
            storage_limit_gb: req.storage_limit_gb,
            price: req.price,
            currency: req.currency.unwrap_or_else(|| "USD".to_string()),
            is_active: req.is_active,
            features: req.features,
            created_at: now,
            updated_at: now,
        };
        let plan = self.store.insert_plan(plan).await?;
        self.publish(&plan.id, false);
        tracing::info!(plan_id = %plan.id, name = %plan.name, "pricing plan created");
        Ok(plan)
    }

    /// Applies the fields present in `req` to a plan.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::PlanNotFound`] or
    /// [`GalleryError::InvalidRequest`].
    pub async fn update_plan(
        &self,
        id: &PlanId,
        req: UpdatePlanRequest,
    ) -> Result<PricingPlan, GalleryError> {
        validate(req.name.as_deref(), req.storage_limit_gb, req.price)?;
        let plan = self
            .store
            .update_plan(id, |p| {
                if let Some(name) = req.name {
                    p.name = name.trim().to_string();
                }
                if let Some(limit) = req.storage_limit_gb {
                    p.storage_limit_gb = limit;
                }
                if let Some(price) = req.price {
                    p.price = price;
                }
                if let Some(currency) = req.currency {
                    p.currency = currency;
                }
                if let Some(active) = req.is_active {
                    p.is_active = active;
                }
                if let Some(features) = req.features {
                    p.features = features;
                }
            })
            .await?;
        self.publish(id, false);
        tracing::info!(plan_id = %id, "pricing plan updated");
        Ok(plan)
    }

    /// Deletes a plan.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::PlanNotFound`] if absent.
    pub async fn delete_plan(&self, id: &PlanId) -> Result<(), GalleryError> {
        let _plan = self.store.remove_plan(id).await?;
        self.publish(id, true);
        tracing::info!(plan_id = %id, "pricing plan deleted");
        Ok(())
    }

    fn publish(&self, plan_id: &PlanId, deleted: bool) {
        let _ = self.event_bus.publish(GalleryEvent::PlanChanged {
            plan_id: plan_id.clone(),
            deleted,
            timestamp: Utc::now(),
        });
    }
}

fn validate(name: Option<&str>, limit: Option<f64>, price: Option<f64>) -> Result<(), GalleryError> {
    if name.is_some_and(|n| n.trim().is_empty()) {
        return Err(GalleryError::InvalidRequest("plan name must not be empty".into()));
    }
    if limit.is_some_and(|l| !l.is_finite() || l < 0.0) {
        return Err(GalleryError::InvalidRequest(
            "storageLimitGB must be a non-negative number".into(),
        ));
    }
    if price.is_some_and(|p| !p.is_finite() || p < 0.0) {
        return Err(GalleryError::InvalidRequest(
            "price must be a non-negative number".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::seed::demo_records;

    fn make_service() -> PricingService {
        let store = Arc::new(RecordStore::from_records(demo_records(), None));
        PricingService::new(store, EventBus::new(64))
    }

    #[tokio::test]
    async fn create_defaults_currency() {
        let svc = make_service();
        let req = CreatePlanRequest {
            name: "Studio".into(),
            storage_limit_gb: 100.0,
            price: 49.0,
            currency: None,
            is_active: true,
            features: vec!["For photographers".into()],
        };
        let Ok(plan) = svc.create_plan(req).await else {
            panic!("create failed");
        };
        assert_eq!(plan.currency, "USD");
        assert_eq!(plan.description(), "For photographers");
        assert_eq!(svc.list_plans().await.len(), 4);
    }

    #[tokio::test]
    async fn update_touches_only_given_fields() {
        let svc = make_service();
        let id = PlanId::new("plan-2");
        let req = UpdatePlanRequest {
            is_active: Some(false),
            ..UpdatePlanRequest::default()
        };
        let Ok(plan) = svc.update_plan(&id, req).await else {
            panic!("update failed");
        };
        assert!(!plan.is_active);
        assert_eq!(plan.name, "Pro");
        assert_eq!(svc.active_plans().await.len(), 2);
    }

    #[tokio::test]
    async fn negative_quota_is_rejected() {
        let svc = make_service();
        let req = UpdatePlanRequest {
            storage_limit_gb: Some(-1.0),
            ..UpdatePlanRequest::default()
        };
        let result = svc.update_plan(&PlanId::new("plan-1"), req).await;
        assert!(matches!(result, Err(GalleryError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let svc = make_service();
        let id = PlanId::new("plan-3");
        assert!(svc.delete_plan(&id).await.is_ok());
        assert!(matches!(
            svc.get_plan(&id).await,
            Err(GalleryError::PlanNotFound(_))
        ));
    }
}
