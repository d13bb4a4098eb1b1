//! Data behind the console dashboards.

use crate::domain::{Event, EventId, Media, PricingPlan, QrCode, User};

use super::backend::{Backend, ConsoleError};

/// Platform-admin landing view.
#[derive(Debug, Clone)]
pub struct PlatformDashboard {
    /// Events visible to the user.
    pub events: Vec<Event>,
    /// Events with the active flag set.
    pub active_events: usize,
    /// Quota in use, GB.
    pub storage_used_gb: f64,
    /// Quota, GB.
    pub storage_limit_gb: f64,
    /// Quota use in percent.
    pub storage_percentage: f64,
    /// Whether the create-event action is shown.
    pub can_create_events: bool,
}

impl PlatformDashboard {
    /// Loads the dashboard for `user`.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn load(backend: &dyn Backend, user: &User) -> Result<Self, ConsoleError> {
        let events = backend.list_events().await?;
        Ok(Self {
            active_events: events.iter().filter(|e| e.is_active).count(),
            events,
            storage_used_gb: user.storage_used_gb(),
            storage_limit_gb: user.storage_limit_gb(),
            storage_percentage: user.storage_percentage(),
            can_create_events: user.can_create_events(),
        })
    }
}

/// Super-admin landing view.
#[derive(Debug, Clone)]
pub struct SuperAdminDashboard {
    /// All users.
    pub users: Vec<User>,
    /// All pricing plans.
    pub plans: Vec<PricingPlan>,
}

impl SuperAdminDashboard {
    /// Loads users and plans.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn load(backend: &dyn Backend) -> Result<Self, ConsoleError> {
        let (users, plans) = tokio::try_join!(backend.list_users(), backend.list_plans())?;
        Ok(Self { users, plans })
    }

    /// Flips the active flag of `user` and refreshes the list entry.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn toggle_user(
        &mut self,
        backend: &dyn Backend,
        user: &User,
    ) -> Result<User, ConsoleError> {
        let updated = backend.set_user_active(&user.id, !user.is_active).await?;
        if let Some(slot) = self.users.iter_mut().find(|u| u.id == updated.id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }
}

/// Event management view.
#[derive(Debug, Clone)]
pub struct EventDashboard {
    /// The event.
    pub event: Event,
    /// Its QR codes.
    pub qr_codes: Vec<QrCode>,
    /// Approved media shown in the gallery tab.
    pub approved: Vec<Media>,
    /// Media awaiting approval.
    pub pending: Vec<Media>,
}

impl EventDashboard {
    /// Loads the event with its QR codes and media.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn load(backend: &dyn Backend, event_id: &EventId) -> Result<Self, ConsoleError> {
        let (event, qr_codes, approved, all) = tokio::try_join!(
            backend.get_event(event_id),
            backend.list_qr_codes(event_id),
            backend.approved_media(event_id),
            backend.list_media(event_id),
        )?;
        let pending = all.into_iter().filter(|m| !m.is_approved).collect();
        Ok(Self {
            event,
            qr_codes,
            approved,
            pending,
        })
    }
}

/// Active plans offered on the create-event form.
///
/// # Errors
///
/// Returns the backend error.
pub async fn plans_for_new_event(backend: &dyn Backend) -> Result<Vec<PricingPlan>, ConsoleError> {
    let plans = backend.list_plans().await?;
    Ok(plans.into_iter().filter(|p| p.is_active).collect())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::api::dto::UpdatePlanRequest;
    use crate::console::MockBackend;
    use crate::domain::{PlanId, UserId, UserRole};
    use crate::identity::{AccountRegistry, IdentityProvider, LocalIdentityProvider};

    fn backend() -> MockBackend {
        let identity: Arc<dyn IdentityProvider> = Arc::new(LocalIdentityProvider::new(Arc::new(
            AccountRegistry::new(Duration::from_secs(60)),
        )));
        MockBackend::with_demo_data(identity)
    }

    #[tokio::test(start_paused = true)]
    async fn platform_dashboard_reports_quota() {
        let backend = backend();
        let Ok(user) = backend.get_user(&UserId::new("user-2")).await else {
            panic!("lookup failed");
        };
        let Ok(dash) = PlatformDashboard::load(&backend, &user).await else {
            panic!("load failed");
        };
        assert_eq!(dash.active_events, 1);
        assert!(dash.can_create_events);
        assert!((dash.storage_percentage - 15.0).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn super_admin_toggle_updates_list() {
        let backend = backend();
        let Ok(mut dash) = SuperAdminDashboard::load(&backend).await else {
            panic!("load failed");
        };
        assert_eq!(dash.plans.len(), 3);
        let Some(target) = dash.users.iter().find(|u| u.role == UserRole::PlatformAdmin).cloned()
        else {
            panic!("seed platform admin missing");
        };
        let Ok(updated) = dash.toggle_user(&backend, &target).await else {
            panic!("toggle failed");
        };
        assert!(!updated.is_active);
        assert!(dash.users.iter().any(|u| u.id == target.id && !u.is_active));
    }

    #[tokio::test(start_paused = true)]
    async fn event_dashboard_splits_media() {
        let backend = backend();
        let Ok(dash) = EventDashboard::load(&backend, &EventId::new("event-1")).await else {
            panic!("load failed");
        };
        assert_eq!(dash.qr_codes.len(), 1);
        assert_eq!(dash.approved.len(), 1);
        assert_eq!(dash.pending.len(), 1);

        let req = UpdatePlanRequest {
            is_active: Some(false),
            ..UpdatePlanRequest::default()
        };
        let Ok(_) = backend.update_plan(&PlanId::new("plan-3"), req).await else {
            panic!("update failed");
        };
        let Ok(plans) = plans_for_new_event(&backend).await else {
            panic!("plans failed");
        };
        assert_eq!(plans.len(), 2);
    }
}
