//! Gallery error types with HTTP status code mapping.
//!
//! [`GalleryError`] is the central error type of the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EventId, GuestAccessError, MediaId, PlanId, QrCodeId, QrToken, UserId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "event not found: event-42",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`GalleryError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category            | HTTP Status                  |
/// |-----------|---------------------|------------------------------|
/// | 1000–1999 | Validation          | 400 Bad Request              |
/// | 2000–2999 | Not Found/Conflict  | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server              | 500 Internal Server Error    |
/// | 4000–4999 | Authentication      | 401 Unauthorized / 403       |
#[derive(Debug, Clone, thiserror::Error)]
pub enum GalleryError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Guest rules of the QR code forbid the operation.
    #[error("guest access denied: {0}")]
    GuestAccess(#[from] GuestAccessError),

    /// Event with the given id does not exist.
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// QR code with the given id does not exist.
    #[error("QR code not found: {0}")]
    QrCodeNotFound(QrCodeId),

    /// No QR code carries the given guest token.
    #[error("invalid token: {0}")]
    InvalidToken(QrToken),

    /// Media with the given id does not exist.
    #[error("media not found: {0}")]
    MediaNotFound(MediaId),

    /// No application user record for the given subject.
    #[error("User not found in database: {0}")]
    UserNotFound(UserId),

    /// Pricing plan with the given id does not exist.
    #[error("pricing plan not found: {0}")]
    PlanNotFound(PlanId),

    /// A user with the same id or email already exists.
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),

    /// Snapshot persistence failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Request needs a valid bearer token.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Caller is authenticated but the account may not do this.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GalleryError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::GuestAccess(_) => 1002,
            Self::EventNotFound(_) => 2001,
            Self::QrCodeNotFound(_) => 2002,
            Self::InvalidToken(_) => 2003,
            Self::MediaNotFound(_) => 2004,
            Self::UserNotFound(_) => 2005,
            Self::PlanNotFound(_) => 2006,
            Self::UserAlreadyExists(_) => 2101,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::Unauthenticated(_) => 4001,
            Self::Forbidden(_) => 4003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::GuestAccess(_) => StatusCode::BAD_REQUEST,
            Self::EventNotFound(_)
            | Self::QrCodeNotFound(_)
            | Self::InvalidToken(_)
            | Self::MediaNotFound(_)
            | Self::UserNotFound(_)
            | Self::PlanNotFound(_) => StatusCode::NOT_FOUND,
            Self::UserAlreadyExists(_) => StatusCode::CONFLICT,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for GalleryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_variants_map_to_404() {
        let err = GalleryError::MediaNotFound(MediaId::new("media-x"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), 2004);
    }

    #[test]
    fn guest_rule_violations_are_validation_errors() {
        let err = GalleryError::from(GuestAccessError::NameRequired);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("name is required"));
    }

    #[test]
    fn into_response_sets_status() {
        let response = GalleryError::Unauthenticated("missing bearer token".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
