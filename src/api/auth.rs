//! Bearer-token authentication for REST handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::app_state::AppState;
use crate::domain::{Event, EventId, User, UserId, UserRole};
use crate::error::GalleryError;

/// Roles that manage events.
pub const EVENT_MANAGERS: &[UserRole] = &[UserRole::SuperAdmin, UserRole::PlatformAdmin];

/// Roles that moderate events.
pub const MODERATORS: &[UserRole] = &[
    UserRole::SuperAdmin,
    UserRole::PlatformAdmin,
    UserRole::EventAdmin,
];

/// Roles that operate the platform.
pub const PLATFORM_OPERATORS: &[UserRole] = &[UserRole::SuperAdmin];

/// Identity proven by the request's `Authorization: Bearer` header.
///
/// Extraction only checks the token. Whether a user record exists for the
/// subject is checked by [`Caller::require`], so that self-registration can
/// run before the record is created.
#[derive(Debug, Clone)]
pub struct Caller {
    /// Token subject.
    pub user_id: UserId,
    /// Email the token was issued for.
    pub email: String,
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = GalleryError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| GalleryError::Unauthenticated("missing bearer token".into()))?;
        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GalleryError::Unauthenticated("malformed authorization header".into()))?;
        let claims = state
            .accounts
            .verify_token(token)
            .ok_or_else(|| GalleryError::Unauthenticated("invalid or expired token".into()))?;
        Ok(Self {
            user_id: claims.user_id,
            email: claims.email,
        })
    }
}

impl Caller {
    /// Loads the caller's user record and checks it is active and holds
    /// one of `roles`.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::UserNotFound`] when the subject has no
    /// record, and [`GalleryError::Forbidden`] for a disabled user or a
    /// role outside `roles`.
    pub async fn require(&self, state: &AppState, roles: &[UserRole]) -> Result<User, GalleryError> {
        let user = state.user_service.get_user(&self.user_id).await?;
        if !user.is_active {
            return Err(GalleryError::Forbidden("account is disabled".into()));
        }
        if !roles.contains(&user.role) {
            tracing::debug!(user_id = %user.id, role = user.role.as_str(), "role not permitted");
            return Err(GalleryError::Forbidden(format!(
                "role {} may not perform this operation",
                user.role.as_str()
            )));
        }
        Ok(user)
    }

    /// [`Caller::require`], then checks that the caller owns or moderates
    /// `event_id`.
    ///
    /// # Errors
    ///
    /// Returns the [`Caller::require`] errors, [`GalleryError::EventNotFound`]
    /// for an unknown event and [`GalleryError::Forbidden`] for an event
    /// outside the caller's scope.
    pub async fn require_event(
        &self,
        state: &AppState,
        roles: &[UserRole],
        event_id: &EventId,
    ) -> Result<(User, Event), GalleryError> {
        let user = self.require(state, roles).await?;
        let event = state.event_service.ensure_access(&user, event_id).await?;
        Ok((user, event))
    }
}
