//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single moderation connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::domain::{EventId, GalleryEvent, User, UserRole};
use crate::error::GalleryError;
use crate::service::{EventService, MediaService};

/// The moderator behind a connection, with the services that decide which
/// events they may follow.
#[derive(Debug, Clone)]
pub struct FeedScope {
    viewer: User,
    events: Arc<EventService>,
    media: Arc<MediaService>,
}

impl FeedScope {
    /// Creates the scope of `viewer`.
    #[must_use]
    pub fn new(viewer: User, events: Arc<EventService>, media: Arc<MediaService>) -> Self {
        Self {
            viewer,
            events,
            media,
        }
    }

    async fn check(&self, event_id: &EventId) -> Result<(), GalleryError> {
        self.events
            .ensure_access(&self.viewer, event_id)
            .await
            .map(|_| ())
    }

    /// Whether a bus event reaches this connection.
    async fn admits(&self, event: &GalleryEvent, subs: &SubscriptionManager) -> bool {
        if !subs.matches(event) {
            return false;
        }
        if self.viewer.role == UserRole::SuperAdmin {
            return true;
        }
        let Some(event_id) = event.event_id() else {
            return false;
        };
        match self.check(event_id).await {
            Ok(()) => true,
            // Deletion notices still reach clients that followed the event by id.
            Err(GalleryError::EventNotFound(_)) => subs.follows(event_id),
            Err(_) => false,
        }
    }
}

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards events from the [`broadcast::Receiver`] that match the
///   subscriptions and fall inside the viewer's scope.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<GalleryEvent>,
    scope: FeedScope,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs, &scope).await;
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(gallery_event) => {
                        if scope.admits(&gallery_event, &subs).await {
                            let msg = WsMessage::reply(
                                uuid::Uuid::new_v4().to_string(),
                                WsMessageType::Event,
                                serde_json::to_value(&gallery_event).unwrap_or_default(),
                            );
                            let json = serde_json::to_string(&msg).unwrap_or_default();
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

fn error(id: String, code: u16, message: &str) -> Option<String> {
    let msg = WsMessage::reply(
        id,
        WsMessageType::Error,
        serde_json::json!({ "code": code, "message": message }),
    );
    serde_json::to_string(&msg).ok()
}

fn split_ids(raw: &[String]) -> (Vec<EventId>, bool) {
    let wildcard = raw.iter().any(|s| s == "*");
    let ids = raw
        .iter()
        .filter(|s| s.as_str() != "*" && !s.trim().is_empty())
        .map(|s| EventId::new(s.trim()))
        .collect();
    (ids, wildcard)
}

/// Handles a text message from the client, returning an optional JSON response.
pub(crate) async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    scope: &FeedScope,
) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return error(String::new(), 400, "malformed JSON");
    };
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return error(msg.id, 404, "unknown command");
    };

    let payload = match command {
        WsCommand::Subscribe { event_ids } => {
            let (ids, wildcard) = split_ids(&event_ids);
            for id in &ids {
                if let Err(e) = scope.check(id).await {
                    return error(msg.id, e.status_code().as_u16(), &e.to_string());
                }
            }
            subs.subscribe(&ids, wildcard);
            serde_json::json!({
                "subscribed": ids,
                "count": subs.count(),
                "wildcard": subs.is_subscribed_all(),
            })
        }
        WsCommand::Unsubscribe { event_ids } => {
            let (ids, wildcard) = split_ids(&event_ids);
            subs.unsubscribe(&ids, wildcard);
            serde_json::json!({
                "unsubscribed": ids,
                "remaining_count": subs.count(),
                "wildcard": subs.is_subscribed_all(),
            })
        }
        WsCommand::Pending { event_id } => {
            let event_id = EventId::new(event_id);
            let pending = match scope.check(&event_id).await {
                Ok(()) => scope.media.pending_media(&event_id).await,
                Err(e) => Err(e),
            };
            match pending {
                Ok(media) => serde_json::json!({ "pending": media }),
                Err(e) => return error(msg.id, e.status_code().as_u16(), &e.to_string()),
            }
        }
    };

    let response = WsMessage::reply(msg.id, WsMessageType::Response, payload);
    serde_json::to_string(&response).ok()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{EventBus, MediaId, RecordStore, UserId};
    use crate::persistence::seed::demo_records;

    fn scope_for(id: &str, role: UserRole) -> FeedScope {
        let store = Arc::new(RecordStore::from_records(demo_records(), None));
        let bus = EventBus::new(8);
        FeedScope::new(
            User::new(UserId::new(id), format!("{id}@x.com"), role),
            Arc::new(EventService::new(Arc::clone(&store), bus.clone())),
            Arc::new(MediaService::new(store, bus)),
        )
    }

    fn owner() -> FeedScope {
        scope_for("user-2", UserRole::PlatformAdmin)
    }

    fn parse(reply: Option<String>) -> WsMessage {
        let Some(json) = reply else {
            panic!("expected a reply");
        };
        let Ok(msg) = serde_json::from_str::<WsMessage>(&json) else {
            panic!("reply is not a WsMessage");
        };
        msg
    }

    fn uploaded(event_id: &str) -> GalleryEvent {
        GalleryEvent::MediaUploaded {
            event_id: EventId::new(event_id),
            media_id: MediaId::new("media-9"),
            pending: true,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn subscribe_command_updates_filter() {
        let scope = owner();
        let mut subs = SubscriptionManager::new();
        let text = r#"{"id":"1","type":"command","payload":{"command":"subscribe","event_ids":["event-1"]}}"#;
        let reply = parse(handle_text_message(text, &mut subs, &scope).await);
        assert_eq!(reply.msg_type, WsMessageType::Response);
        assert_eq!(reply.id, "1");
        assert_eq!(subs.count(), 1);
    }

    #[tokio::test]
    async fn pending_command_lists_queue() {
        let scope = owner();
        let mut subs = SubscriptionManager::new();
        let text = r#"{"id":"2","type":"command","payload":{"command":"pending","event_id":"event-1"}}"#;
        let reply = parse(handle_text_message(text, &mut subs, &scope).await);
        let pending = reply.payload.get("pending").and_then(|v| v.as_array()).map(Vec::len);
        assert_eq!(pending, Some(1));
    }

    #[tokio::test]
    async fn foreign_events_are_refused() {
        let scope = scope_for("user-8", UserRole::PlatformAdmin);
        let mut subs = SubscriptionManager::new();

        let text = r#"{"id":"4","type":"command","payload":{"command":"subscribe","event_ids":["event-1"]}}"#;
        let reply = parse(handle_text_message(text, &mut subs, &scope).await);
        assert_eq!(reply.msg_type, WsMessageType::Error);
        assert_eq!(reply.payload.get("code").and_then(|c| c.as_u64()), Some(403));
        assert_eq!(subs.count(), 0);

        let text = r#"{"id":"5","type":"command","payload":{"command":"pending","event_id":"event-1"}}"#;
        let reply = parse(handle_text_message(text, &mut subs, &scope).await);
        assert_eq!(reply.msg_type, WsMessageType::Error);
    }

    #[tokio::test]
    async fn wildcard_only_delivers_visible_events() {
        let mut subs = SubscriptionManager::new();
        subs.subscribe(&[], true);

        assert!(owner().admits(&uploaded("event-1"), &subs).await);
        let rival = scope_for("user-8", UserRole::PlatformAdmin);
        assert!(!rival.admits(&uploaded("event-1"), &subs).await);

        let root = scope_for("user-1", UserRole::SuperAdmin);
        assert!(root.admits(&uploaded("event-1"), &subs).await);
        let registered = GalleryEvent::UserRegistered {
            user_id: UserId::new("user-3"),
            timestamp: Utc::now(),
        };
        assert!(root.admits(&registered, &subs).await);
        assert!(!owner().admits(&registered, &subs).await);
    }

    #[tokio::test]
    async fn deletion_reaches_explicit_followers() {
        let scope = owner();
        let mut subs = SubscriptionManager::new();
        subs.subscribe(&[EventId::new("event-1")], false);
        let Ok(()) = scope.events.delete_event(&EventId::new("event-1")).await else {
            panic!("delete failed");
        };
        let deleted = GalleryEvent::EventDeleted {
            event_id: EventId::new("event-1"),
            timestamp: Utc::now(),
        };
        assert!(scope.admits(&deleted, &subs).await);
    }

    #[tokio::test]
    async fn malformed_and_unknown_input_yield_errors() {
        let scope = owner();
        let mut subs = SubscriptionManager::new();
        let reply = parse(handle_text_message("{nope", &mut subs, &scope).await);
        assert_eq!(reply.msg_type, WsMessageType::Error);

        let text = r#"{"id":"3","type":"command","payload":{"command":"rename"}}"#;
        let reply = parse(handle_text_message(text, &mut subs, &scope).await);
        assert_eq!(reply.msg_type, WsMessageType::Error);
    }
}
