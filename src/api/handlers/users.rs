//! User handlers: directory, enable/disable and self-registration.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::auth::{Caller, PLATFORM_OPERATORS};
use crate::api::dto::{CreateUserRequest, SelfRegisterRequest};
use crate::app_state::AppState;
use crate::domain::{User, UserId};
use crate::error::{ErrorResponse, GalleryError};

/// `GET /users` — All users.
///
/// # Errors
///
/// Returns [`GalleryError::Forbidden`] unless the caller is a super admin.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    summary = "List users",
    responses(
        (status = 200, description = "Users", body = Vec<User>),
        (status = 403, description = "Not a super admin", body = ErrorResponse),
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<impl IntoResponse, GalleryError> {
    let _user = caller.require(&state, PLATFORM_OPERATORS).await?;
    Ok(Json(state.user_service.list_users().await))
}

/// `POST /users` — Create a user.
///
/// # Errors
///
/// Returns [`GalleryError::UserAlreadyExists`] for a taken email.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    summary = "Create a user",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 409, description = "Email already used", body = ErrorResponse),
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, GalleryError> {
    let _user = caller.require(&state, PLATFORM_OPERATORS).await?;
    let user = state.user_service.create_user(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/platform-admins` — Platform admins.
///
/// # Errors
///
/// Returns [`GalleryError::Forbidden`] unless the caller is a super admin.
#[utoipa::path(
    get,
    path = "/api/v1/users/platform-admins",
    tag = "Users",
    summary = "List platform admins",
    responses(
        (status = 200, description = "Platform admins", body = Vec<User>),
    )
)]
pub async fn platform_admins(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<impl IntoResponse, GalleryError> {
    let _user = caller.require(&state, PLATFORM_OPERATORS).await?;
    Ok(Json(state.user_service.platform_admins().await))
}

/// `GET /users/{id}` — One user. Callers may read their own record; super
/// admins may read any.
///
/// # Errors
///
/// Returns [`GalleryError::UserNotFound`] if the record does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    summary = "Get a user",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 403, description = "Not the caller's record", body = ErrorResponse),
        (status = 404, description = "User not found in database", body = ErrorResponse),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<UserId>,
) -> Result<impl IntoResponse, GalleryError> {
    if id != caller.user_id {
        let _user = caller.require(&state, PLATFORM_OPERATORS).await?;
    }
    Ok(Json(state.user_service.get_user(&id).await?))
}

/// `POST /users/{id}/enable` — Enable a user.
///
/// # Errors
///
/// Returns [`GalleryError::UserNotFound`] if the record does not exist.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/enable",
    tag = "Users",
    summary = "Enable a user",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn enable_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<UserId>,
) -> Result<impl IntoResponse, GalleryError> {
    let _user = caller.require(&state, PLATFORM_OPERATORS).await?;
    Ok(Json(state.user_service.set_active(&id, true).await?))
}

/// `POST /users/{id}/disable` — Disable a user.
///
/// # Errors
///
/// Returns [`GalleryError::UserNotFound`] if the record does not exist.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/disable",
    tag = "Users",
    summary = "Disable a user",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn disable_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<UserId>,
) -> Result<impl IntoResponse, GalleryError> {
    let user = caller.require(&state, PLATFORM_OPERATORS).await?;
    if user.id == id {
        return Err(GalleryError::InvalidRequest(
            "super admins cannot disable themselves".into(),
        ));
    }
    Ok(Json(state.user_service.set_active(&id, false).await?))
}

/// `POST /users/self-register` — Create the caller's own user record.
///
/// Idempotent: `201` with the new record, or `200` with the existing one.
/// New records get the `event_admin` role.
///
/// # Errors
///
/// Returns [`GalleryError::Unauthenticated`] without a valid token.
#[utoipa::path(
    post,
    path = "/api/v1/users/self-register",
    tag = "Users",
    summary = "Self-register",
    request_body = SelfRegisterRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 200, description = "User already existed", body = User),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn self_register(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> Result<impl IntoResponse, GalleryError> {
    let req: SelfRegisterRequest = if body.is_empty() {
        SelfRegisterRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| GalleryError::InvalidRequest(e.to_string()))?
    };
    let (user, created) = state
        .user_service
        .self_register(&caller.user_id, &caller.email, req.display_name)
        .await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(user)))
}

/// User routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/platform-admins", get(platform_admins))
        .route("/users/self-register", post(self_register))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/enable", post(enable_user))
        .route("/users/{id}/disable", post(disable_user))
}
