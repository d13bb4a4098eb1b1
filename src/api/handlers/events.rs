//! Event handlers: CRUD, event-admin assignment and QR codes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::api::auth::{Caller, EVENT_MANAGERS, MODERATORS};
use crate::api::dto::{AssignAdminRequest, CreateEventRequest, CreateQrCodeRequest, EventListResponse};
use crate::app_state::AppState;
use crate::domain::{Event, EventId, QrCode, UserId};
use crate::error::{ErrorResponse, GalleryError};

/// `GET /events` — Events visible to the caller.
///
/// # Errors
///
/// Returns [`GalleryError::Unauthenticated`] without a valid token.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    summary = "List events",
    description = "Super admins see every event, platform admins the events they own, event admins the events they are assigned to.",
    responses(
        (status = 200, description = "Visible events", body = EventListResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<impl IntoResponse, GalleryError> {
    let user = caller.require(&state, MODERATORS).await?;
    let events = state.event_service.list_events_for(&user).await;
    Ok(Json(EventListResponse { events }))
}

/// `POST /events` — Create an event.
///
/// # Errors
///
/// Returns [`GalleryError`] on validation failure or insufficient role.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Events",
    summary = "Create an event",
    description = "Creates an active event with zero storage used. The owner defaults to the caller.",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Caller may not create events", body = ErrorResponse),
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, GalleryError> {
    let user = caller.require(&state, EVENT_MANAGERS).await?;
    let event = state.event_service.create_event(req, Some(&user.id)).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// `GET /events/{id}` — Event details.
///
/// # Errors
///
/// Returns [`GalleryError::EventNotFound`] if the event does not exist and
/// [`GalleryError::Forbidden`] if the caller neither owns nor moderates it.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Get an event",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event", body = Event),
        (status = 403, description = "Event outside the caller's scope", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<EventId>,
) -> Result<impl IntoResponse, GalleryError> {
    let (_, event) = caller.require_event(&state, MODERATORS, &id).await?;
    Ok(Json(event))
}

/// `DELETE /events/{id}` — Delete an event with its QR codes and media.
///
/// # Errors
///
/// Returns [`GalleryError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Delete an event",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 403, description = "Event outside the caller's scope", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn delete_event(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<EventId>,
) -> Result<impl IntoResponse, GalleryError> {
    let _ = caller.require_event(&state, EVENT_MANAGERS, &id).await?;
    state.event_service.delete_event(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /events/{id}/admins` — Assign an event admin.
///
/// # Errors
///
/// Returns [`GalleryError::EventNotFound`] or [`GalleryError::UserNotFound`].
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/admins",
    tag = "Events",
    summary = "Assign an event admin",
    params(("id" = String, Path, description = "Event id")),
    request_body = AssignAdminRequest,
    responses(
        (status = 200, description = "Updated event", body = Event),
        (status = 404, description = "Event or user not found", body = ErrorResponse),
    )
)]
pub async fn assign_admin(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<EventId>,
    Json(req): Json<AssignAdminRequest>,
) -> Result<impl IntoResponse, GalleryError> {
    let _ = caller.require_event(&state, EVENT_MANAGERS, &id).await?;
    let event = state.event_service.assign_admin(&id, &req.admin_id).await?;
    Ok(Json(event))
}

/// `DELETE /events/{id}/admins/{admin_id}` — Remove an event admin.
///
/// # Errors
///
/// Returns [`GalleryError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}/admins/{admin_id}",
    tag = "Events",
    summary = "Remove an event admin",
    params(
        ("id" = String, Path, description = "Event id"),
        ("admin_id" = String, Path, description = "User id"),
    ),
    responses(
        (status = 200, description = "Updated event", body = Event),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn remove_admin(
    State(state): State<AppState>,
    caller: Caller,
    Path((id, admin_id)): Path<(EventId, UserId)>,
) -> Result<impl IntoResponse, GalleryError> {
    let _ = caller.require_event(&state, EVENT_MANAGERS, &id).await?;
    let event = state.event_service.remove_admin(&id, &admin_id).await?;
    Ok(Json(event))
}

/// `GET /events/{id}/qr-codes` — QR codes of an event.
///
/// # Errors
///
/// Returns [`GalleryError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/qr-codes",
    tag = "QR Codes",
    summary = "List QR codes of an event",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "QR codes", body = Vec<QrCode>),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn list_qr_codes(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<EventId>,
) -> Result<impl IntoResponse, GalleryError> {
    let _ = caller.require_event(&state, MODERATORS, &id).await?;
    let codes = state.event_service.list_qr_codes(&id).await?;
    Ok(Json(codes))
}

/// `POST /events/{id}/qr-codes` — Create a QR code.
///
/// # Errors
///
/// Returns [`GalleryError::EventNotFound`] or
/// [`GalleryError::InvalidRequest`].
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/qr-codes",
    tag = "QR Codes",
    summary = "Create a QR code",
    description = "Creates a QR code with a fresh, immutable guest token.",
    params(("id" = String, Path, description = "Event id")),
    request_body = CreateQrCodeRequest,
    responses(
        (status = 201, description = "QR code created", body = QrCode),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn create_qr_code(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<EventId>,
    Json(req): Json<CreateQrCodeRequest>,
) -> Result<impl IntoResponse, GalleryError> {
    let _ = caller.require_event(&state, MODERATORS, &id).await?;
    let qr = state.event_service.create_qr_code(&id, req).await?;
    Ok((StatusCode::CREATED, Json(qr)))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/{id}", get(get_event).delete(delete_event))
        .route("/events/{id}/admins", post(assign_admin))
        .route("/events/{id}/admins/{admin_id}", delete(remove_admin))
        .route(
            "/events/{id}/qr-codes",
            get(list_qr_codes).post(create_qr_code),
        )
}
