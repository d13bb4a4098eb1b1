//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::{EventBus, RecordStore};
use crate::identity::AccountRegistry;
use crate::service::{EventService, MediaService, PricingService, UserService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Events, admin lists and QR codes.
    pub event_service: Arc<EventService>,
    /// Guest uploads and moderation.
    pub media_service: Arc<MediaService>,
    /// User directory.
    pub user_service: Arc<UserService>,
    /// Pricing plans.
    pub pricing_service: Arc<PricingService>,
    /// Bearer token verification.
    pub accounts: Arc<AccountRegistry>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wires every service over one store and one bus.
    #[must_use]
    pub fn new(store: Arc<RecordStore>, event_bus: EventBus, accounts: Arc<AccountRegistry>) -> Self {
        Self {
            event_service: Arc::new(EventService::new(Arc::clone(&store), event_bus.clone())),
            media_service: Arc::new(MediaService::new(Arc::clone(&store), event_bus.clone())),
            user_service: Arc::new(UserService::new(Arc::clone(&store), event_bus.clone())),
            pricing_service: Arc::new(PricingService::new(store, event_bus.clone())),
            accounts,
            event_bus,
        }
    }
}
