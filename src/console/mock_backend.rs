//! In-process [`Backend`] for offline demos.
//!
//! Calls the service layer directly over its own [`RecordStore`] after a
//! fixed artificial latency. There is no authorization: the signed-in
//! identity is only used to stamp owners, approvers and self-registered
//! records.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::backend::{Backend, ConsoleError};
use crate::api::dto::{
    CreateEventRequest, CreateMediaRequest, CreatePlanRequest, CreateQrCodeRequest,
    CreateUserRequest, UpdatePlanRequest,
};
use crate::domain::{
    Event, EventBus, EventId, Media, MediaId, PlanId, PricingPlan, QrCode, QrCodeId, QrToken,
    RecordStore, User, UserId,
};
use crate::identity::{IdentityProvider, IdentitySession};
use crate::persistence::seed::demo_records;
use crate::service::{EventService, MediaService, PricingService, UserService};

/// Delay applied to every mock operation.
pub const DEFAULT_MOCK_LATENCY: Duration = Duration::from_millis(500);

/// Map-backed stand-in for the gateway.
#[derive(Debug)]
pub struct MockBackend {
    events: EventService,
    media: MediaService,
    users: UserService,
    pricing: PricingService,
    identity: Arc<dyn IdentityProvider>,
    latency: Duration,
}

impl MockBackend {
    /// Creates a mock over `store`.
    #[must_use]
    pub fn new(
        store: Arc<RecordStore>,
        event_bus: EventBus,
        identity: Arc<dyn IdentityProvider>,
        latency: Duration,
    ) -> Self {
        Self {
            events: EventService::new(Arc::clone(&store), event_bus.clone()),
            media: MediaService::new(Arc::clone(&store), event_bus.clone()),
            users: UserService::new(Arc::clone(&store), event_bus.clone()),
            pricing: PricingService::new(store, event_bus),
            identity,
            latency,
        }
    }

    /// Creates a mock over the demo records with [`DEFAULT_MOCK_LATENCY`].
    #[must_use]
    pub fn with_demo_data(identity: Arc<dyn IdentityProvider>) -> Self {
        let store = Arc::new(RecordStore::from_records(demo_records(), None));
        Self::new(store, EventBus::new(1024), identity, DEFAULT_MOCK_LATENCY)
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn session(&self) -> Result<IdentitySession, ConsoleError> {
        self.identity
            .current_session()
            .ok_or(ConsoleError::Unauthenticated)
    }

    fn subject(&self) -> Option<UserId> {
        self.identity.current_session().map(|s| s.user_id)
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn list_events(&self) -> Result<Vec<Event>, ConsoleError> {
        self.delay().await;
        Ok(self.events.list_events().await)
    }

    async fn get_event(&self, id: &EventId) -> Result<Event, ConsoleError> {
        self.delay().await;
        Ok(self.events.get_event(id).await?)
    }

    async fn create_event(&self, req: CreateEventRequest) -> Result<Event, ConsoleError> {
        self.delay().await;
        let caller = self.subject();
        Ok(self.events.create_event(req, caller.as_ref()).await?)
    }

    async fn delete_event(&self, id: &EventId) -> Result<(), ConsoleError> {
        self.delay().await;
        Ok(self.events.delete_event(id).await?)
    }

    async fn assign_admin(
        &self,
        event_id: &EventId,
        admin_id: &UserId,
    ) -> Result<Event, ConsoleError> {
        self.delay().await;
        Ok(self.events.assign_admin(event_id, admin_id).await?)
    }

    async fn remove_admin(
        &self,
        event_id: &EventId,
        admin_id: &UserId,
    ) -> Result<Event, ConsoleError> {
        self.delay().await;
        Ok(self.events.remove_admin(event_id, admin_id).await?)
    }

    async fn list_qr_codes(&self, event_id: &EventId) -> Result<Vec<QrCode>, ConsoleError> {
        self.delay().await;
        Ok(self.events.list_qr_codes(event_id).await?)
    }

    async fn create_qr_code(
        &self,
        event_id: &EventId,
        req: CreateQrCodeRequest,
    ) -> Result<QrCode, ConsoleError> {
        self.delay().await;
        Ok(self.events.create_qr_code(event_id, req).await?)
    }

    async fn qr_code_by_token(&self, token: &QrToken) -> Result<QrCode, ConsoleError> {
        self.delay().await;
        Ok(self.events.scan_token(token).await?)
    }

    async fn qr_code_media(&self, id: &QrCodeId) -> Result<Vec<Media>, ConsoleError> {
        self.delay().await;
        Ok(self.media.media_for_qr_code(id).await?)
    }

    async fn list_media(&self, event_id: &EventId) -> Result<Vec<Media>, ConsoleError> {
        self.delay().await;
        Ok(self.media.list_media(event_id).await?)
    }

    async fn approved_media(&self, event_id: &EventId) -> Result<Vec<Media>, ConsoleError> {
        self.delay().await;
        Ok(self.media.approved_media(event_id).await?)
    }

    async fn pending_media(&self, event_id: &EventId) -> Result<Vec<Media>, ConsoleError> {
        self.delay().await;
        Ok(self.media.pending_media(event_id).await?)
    }

    async fn create_media(&self, req: CreateMediaRequest) -> Result<Media, ConsoleError> {
        self.delay().await;
        Ok(self.media.upload_media(req).await?)
    }

    async fn approve_media(&self, id: &MediaId) -> Result<Media, ConsoleError> {
        self.delay().await;
        let approver = self.subject();
        Ok(self.media.approve(id, approver.as_ref()).await?)
    }

    async fn reject_media(&self, id: &MediaId) -> Result<(), ConsoleError> {
        self.delay().await;
        Ok(self.media.reject(id).await?)
    }

    async fn list_users(&self) -> Result<Vec<User>, ConsoleError> {
        self.delay().await;
        Ok(self.users.list_users().await)
    }

    async fn create_user(&self, req: CreateUserRequest) -> Result<User, ConsoleError> {
        self.delay().await;
        Ok(self.users.create_user(req).await?)
    }

    async fn platform_admins(&self) -> Result<Vec<User>, ConsoleError> {
        self.delay().await;
        Ok(self.users.platform_admins().await)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, ConsoleError> {
        self.delay().await;
        Ok(self.users.get_user(id).await?)
    }

    async fn set_user_active(&self, id: &UserId, active: bool) -> Result<User, ConsoleError> {
        self.delay().await;
        Ok(self.users.set_active(id, active).await?)
    }

    async fn self_register(&self, display_name: Option<String>) -> Result<User, ConsoleError> {
        self.delay().await;
        let session = self.session()?;
        let display_name = display_name.or(session.display_name);
        let (user, _created) = self
            .users
            .self_register(&session.user_id, &session.email, display_name)
            .await?;
        Ok(user)
    }

    async fn list_plans(&self) -> Result<Vec<PricingPlan>, ConsoleError> {
        self.delay().await;
        Ok(self.pricing.list_plans().await)
    }

    async fn get_plan(&self, id: &PlanId) -> Result<PricingPlan, ConsoleError> {
        self.delay().await;
        Ok(self.pricing.get_plan(id).await?)
    }

    async fn create_plan(&self, req: CreatePlanRequest) -> Result<PricingPlan, ConsoleError> {
        self.delay().await;
        Ok(self.pricing.create_plan(req).await?)
    }

    async fn update_plan(
        &self,
        id: &PlanId,
        req: UpdatePlanRequest,
    ) -> Result<PricingPlan, ConsoleError> {
        self.delay().await;
        Ok(self.pricing.update_plan(id, req).await?)
    }

    async fn delete_plan(&self, id: &PlanId) -> Result<(), ConsoleError> {
        self.delay().await;
        Ok(self.pricing.delete_plan(id).await?)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::identity::{AccountRegistry, LocalIdentityProvider};

    fn identity() -> Arc<dyn IdentityProvider> {
        Arc::new(LocalIdentityProvider::new(Arc::new(AccountRegistry::new(
            Duration::from_secs(60),
        ))))
    }

    #[tokio::test(start_paused = true)]
    async fn every_call_waits_the_latency() {
        let backend = MockBackend::with_demo_data(identity());
        let started = tokio::time::Instant::now();
        let Ok(events) = backend.list_events().await else {
            panic!("list failed");
        };
        assert_eq!(events.len(), 1);
        assert!(started.elapsed() >= DEFAULT_MOCK_LATENCY);
    }

    #[tokio::test(start_paused = true)]
    async fn created_event_shows_up_in_next_list() {
        let backend = MockBackend::with_demo_data(identity());
        let mut req = CreateEventRequest::named("Gala");
        req.platform_admin_id = Some(UserId::new("user-2"));
        let Ok(event) = backend.create_event(req).await else {
            panic!("create failed");
        };
        assert!(event.is_active);
        assert!(event.storage_used.abs() < f64::EPSILON);

        let Ok(events) = backend.list_events().await else {
            panic!("list failed");
        };
        assert!(events.iter().any(|e| e.id == event.id));
    }

    #[tokio::test(start_paused = true)]
    async fn approve_moves_media_out_of_pending() {
        let backend = MockBackend::with_demo_data(identity());
        let event_id = EventId::new("event-1");
        let Ok(media) = backend.approve_media(&MediaId::new("media-2")).await else {
            panic!("approve failed");
        };
        assert!(media.is_approved);
        assert!(media.approved_at.is_some());

        let Ok(pending) = backend.pending_media(&event_id).await else {
            panic!("pending failed");
        };
        assert!(pending.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn reject_of_absent_media_succeeds() {
        let backend = MockBackend::with_demo_data(identity());
        assert!(backend.reject_media(&MediaId::new("media-404")).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_user_is_not_found_and_self_register_needs_session() {
        let backend = MockBackend::with_demo_data(identity());
        let Err(err) = backend.get_user(&UserId::new("user-404")).await else {
            panic!("lookup should fail");
        };
        assert!(err.is_not_found());

        let result = backend.self_register(None).await;
        assert!(matches!(result, Err(ConsoleError::Unauthenticated)));
    }
}
