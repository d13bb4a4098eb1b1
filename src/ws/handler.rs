//! Axum WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use super::connection::{FeedScope, run_connection};
use crate::api::auth::MODERATORS;
use crate::app_state::AppState;
use crate::error::GalleryError;

/// Query string of the upgrade request. Browsers cannot set headers on a
/// WebSocket handshake, so the bearer token travels here.
#[derive(Debug, Deserialize)]
pub struct WsAuth {
    /// Bearer token issued at sign-in.
    #[serde(default)]
    pub token: Option<String>,
}

/// `GET /ws?token=…` — Upgrade HTTP connection to WebSocket.
///
/// Only active moderators are upgraded. The connection sees the events the
/// moderator may manage and nothing else.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(auth): Query<WsAuth>,
) -> Response {
    let Some(claims) = auth
        .token
        .as_deref()
        .and_then(|t| state.accounts.verify_token(t))
    else {
        return GalleryError::Unauthenticated("missing or invalid token".into()).into_response();
    };
    let viewer = match state.user_service.get_user(&claims.user_id).await {
        Ok(user) if user.is_active && MODERATORS.contains(&user.role) => user,
        Ok(_) => {
            return GalleryError::Forbidden("moderation feed requires a moderator".into())
                .into_response();
        }
        Err(e) => return e.into_response(),
    };
    tracing::debug!(user_id = %viewer.id, "moderation feed opened");

    let event_rx = state.event_bus.subscribe();
    let scope = FeedScope::new(
        viewer,
        Arc::clone(&state.event_service),
        Arc::clone(&state.media_service),
    );

    ws.on_upgrade(move |socket| run_connection(socket, event_rx, scope))
}
