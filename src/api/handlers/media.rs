//! Media handlers: guest-facing QR endpoints, uploads and moderation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::api::auth::{Caller, MODERATORS};
use crate::api::dto::CreateMediaRequest;
use crate::app_state::AppState;
use crate::domain::{EventId, Media, MediaId, QrCode, QrCodeId, QrToken};
use crate::error::{ErrorResponse, GalleryError};

/// `GET /qr-codes/token/{token}` — Resolve a guest token.
///
/// Public. Every successful lookup counts as a scan.
///
/// # Errors
///
/// Returns [`GalleryError::InvalidToken`] for an unknown token.
#[utoipa::path(
    get,
    path = "/api/v1/qr-codes/token/{token}",
    tag = "Guest",
    summary = "Resolve a guest token",
    params(("token" = String, Path, description = "Guest token printed in the QR code")),
    responses(
        (status = 200, description = "QR code", body = QrCode),
        (status = 404, description = "Unknown token", body = ErrorResponse),
    )
)]
pub async fn qr_code_by_token(
    State(state): State<AppState>,
    Path(token): Path<QrToken>,
) -> Result<impl IntoResponse, GalleryError> {
    let qr = state.event_service.scan_token(&token).await?;
    Ok(Json(qr))
}

/// `GET /qr-codes/{id}/media` — Guest gallery of a QR code.
///
/// # Errors
///
/// Returns [`GalleryError::QrCodeNotFound`] for an unknown QR code.
#[utoipa::path(
    get,
    path = "/api/v1/qr-codes/{id}/media",
    tag = "Guest",
    summary = "Guest gallery",
    description = "Returns the approved media of the event the QR code belongs to.",
    params(("id" = String, Path, description = "QR code id")),
    responses(
        (status = 200, description = "Approved media", body = Vec<Media>),
        (status = 404, description = "QR code not found", body = ErrorResponse),
    )
)]
pub async fn qr_code_media(
    State(state): State<AppState>,
    Path(id): Path<QrCodeId>,
) -> Result<impl IntoResponse, GalleryError> {
    let media = state.media_service.media_for_qr_code(&id).await?;
    Ok(Json(media))
}

/// `POST /media` — Record a guest upload.
///
/// # Errors
///
/// Returns [`GalleryError`] when the QR rules forbid the upload.
#[utoipa::path(
    post,
    path = "/api/v1/media",
    tag = "Guest",
    summary = "Record an upload",
    description = "Stores metadata of a file already placed in object storage. The record starts approved unless the QR rules require moderation.",
    request_body = CreateMediaRequest,
    responses(
        (status = 201, description = "Media recorded", body = Media),
        (status = 400, description = "Uploader details missing", body = ErrorResponse),
        (status = 403, description = "Uploads disabled", body = ErrorResponse),
    )
)]
pub async fn create_media(
    State(state): State<AppState>,
    Json(req): Json<CreateMediaRequest>,
) -> Result<impl IntoResponse, GalleryError> {
    let media = state.media_service.upload_media(req).await?;
    Ok((StatusCode::CREATED, Json(media)))
}

/// `GET /events/{id}/media` — All media of an event.
///
/// # Errors
///
/// Returns [`GalleryError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/media",
    tag = "Media",
    summary = "List media of an event",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Media", body = Vec<Media>),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn list_media(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<EventId>,
) -> Result<impl IntoResponse, GalleryError> {
    let _ = caller.require_event(&state, MODERATORS, &id).await?;
    Ok(Json(state.media_service.list_media(&id).await?))
}

/// `GET /events/{id}/media/approved` — Approved media of an event.
///
/// # Errors
///
/// Returns [`GalleryError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/media/approved",
    tag = "Media",
    summary = "List approved media",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Approved media", body = Vec<Media>),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn approved_media(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<impl IntoResponse, GalleryError> {
    Ok(Json(state.media_service.approved_media(&id).await?))
}

/// `GET /events/{id}/media/pending` — Media waiting for approval.
///
/// # Errors
///
/// Returns [`GalleryError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/media/pending",
    tag = "Media",
    summary = "List pending media",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Pending media", body = Vec<Media>),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn pending_media(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<EventId>,
) -> Result<impl IntoResponse, GalleryError> {
    let _ = caller.require_event(&state, MODERATORS, &id).await?;
    Ok(Json(state.media_service.pending_media(&id).await?))
}

/// `POST /media/{id}/approve` — Approve a pending upload.
///
/// # Errors
///
/// Returns [`GalleryError::MediaNotFound`] if the media does not exist.
#[utoipa::path(
    post,
    path = "/api/v1/media/{id}/approve",
    tag = "Media",
    summary = "Approve media",
    params(("id" = String, Path, description = "Media id")),
    responses(
        (status = 200, description = "Approved media", body = Media),
        (status = 403, description = "Media of an event outside the caller's scope", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse),
    )
)]
pub async fn approve_media(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<MediaId>,
) -> Result<impl IntoResponse, GalleryError> {
    let user = caller.require(&state, MODERATORS).await?;
    let current = state.media_service.get_media(&id).await?;
    let _ = state
        .event_service
        .ensure_access(&user, &current.event_id)
        .await?;
    let media = state.media_service.approve(&id, Some(&user.id)).await?;
    Ok(Json(media))
}

/// `DELETE /media/{id}` — Reject (remove) an upload.
///
/// Rejecting an id that does not exist succeeds.
///
/// # Errors
///
/// Returns [`GalleryError::Unauthenticated`] without a valid token.
#[utoipa::path(
    delete,
    path = "/api/v1/media/{id}",
    tag = "Media",
    summary = "Reject media",
    params(("id" = String, Path, description = "Media id")),
    responses(
        (status = 204, description = "Media removed or already absent"),
        (status = 403, description = "Media of an event outside the caller's scope", body = ErrorResponse),
    )
)]
pub async fn reject_media(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<MediaId>,
) -> Result<impl IntoResponse, GalleryError> {
    let user = caller.require(&state, MODERATORS).await?;
    match state.media_service.get_media(&id).await {
        Ok(media) => {
            let _ = state
                .event_service
                .ensure_access(&user, &media.event_id)
                .await?;
        }
        Err(GalleryError::MediaNotFound(_)) => {}
        Err(e) => return Err(e),
    }
    state.media_service.reject(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Media and guest routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/qr-codes/token/{token}", get(qr_code_by_token))
        .route("/qr-codes/{id}/media", get(qr_code_media))
        .route("/media", post(create_media))
        .route("/media/{id}", delete(reject_media))
        .route("/media/{id}/approve", post(approve_media))
        .route("/events/{id}/media", get(list_media))
        .route("/events/{id}/media/approved", get(approved_media))
        .route("/events/{id}/media/pending", get(pending_media))
}
