//! REST endpoint handlers organized by resource.

pub mod events;
pub mod media;
pub mod pricing;
pub mod system;
pub mod users;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(events::routes())
        .merge(media::routes())
        .merge(users::routes())
        .merge(pricing::routes())
}
