//! The console's view of the gallery backend.
//!
//! [`Backend`] has one method per REST operation. [`super::HttpBackend`]
//! talks to a live gateway; [`super::MockBackend`] answers in-process after
//! a fixed delay. Both report failures as [`ConsoleError`].

use std::fmt;

use async_trait::async_trait;

use crate::api::dto::{
    CreateEventRequest, CreateMediaRequest, CreatePlanRequest, CreateQrCodeRequest,
    CreateUserRequest, UpdatePlanRequest,
};
use crate::domain::{
    Event, EventId, Media, MediaId, PlanId, PricingPlan, QrCode, QrCodeId, QrToken, User, UserId,
};
use crate::error::GalleryError;
use crate::identity::AuthError;

/// Errors seen by console code.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// The backend answered with an error body.
    #[error("{message}")]
    Api {
        /// HTTP status.
        status: u16,
        /// Numeric gallery error code.
        code: u32,
        /// Human-readable message.
        message: String,
    },
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// No identity session, or the backend rejected the token.
    #[error("Not authenticated")]
    Unauthenticated,
    /// Identity provider failure.
    #[error(transparent)]
    Identity(#[from] AuthError),
    /// Object storage failure.
    #[error(transparent)]
    Storage(#[from] super::StorageError),
}

impl ConsoleError {
    /// Returns `true` when the record does not exist. A 403 counts too,
    /// since the directory answers unknown documents with it.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 403 | 404, .. })
    }

    /// HTTP status, when the backend answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<GalleryError> for ConsoleError {
    fn from(err: GalleryError) -> Self {
        match err {
            GalleryError::Unauthenticated(_) => Self::Unauthenticated,
            other => Self::Api {
                status: other.status_code().as_u16(),
                code: other.error_code(),
                message: other.to_string(),
            },
        }
    }
}

/// Gallery backend operations used by the console.
///
/// Every method fails with [`ConsoleError::Api`] when the backend rejects
/// the request, [`ConsoleError::Unauthenticated`] when it needs a session
/// and none is active, and [`ConsoleError::Transport`] on network errors.
#[async_trait]
pub trait Backend: Send + Sync + fmt::Debug {
    /// Events visible to the signed-in user.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn list_events(&self) -> Result<Vec<Event>, ConsoleError>;

    /// One event.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn get_event(&self, id: &EventId) -> Result<Event, ConsoleError>;

    /// Creates an event owned by the signed-in user unless the request
    /// names another owner.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn create_event(&self, req: CreateEventRequest) -> Result<Event, ConsoleError>;

    /// Deletes an event with its QR codes and media.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn delete_event(&self, id: &EventId) -> Result<(), ConsoleError>;

    /// Adds an event admin.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn assign_admin(&self, event_id: &EventId, admin_id: &UserId)
    -> Result<Event, ConsoleError>;

    /// Removes an event admin.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn remove_admin(&self, event_id: &EventId, admin_id: &UserId)
    -> Result<Event, ConsoleError>;

    /// QR codes of an event.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn list_qr_codes(&self, event_id: &EventId) -> Result<Vec<QrCode>, ConsoleError>;

    /// Creates a QR code.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn create_qr_code(
        &self,
        event_id: &EventId,
        req: CreateQrCodeRequest,
    ) -> Result<QrCode, ConsoleError>;

    /// Resolves a guest token. Counts as a scan.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn qr_code_by_token(&self, token: &QrToken) -> Result<QrCode, ConsoleError>;

    /// Approved media reachable through a QR code.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn qr_code_media(&self, id: &QrCodeId) -> Result<Vec<Media>, ConsoleError>;

    /// All media of an event.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn list_media(&self, event_id: &EventId) -> Result<Vec<Media>, ConsoleError>;

    /// Approved media of an event.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn approved_media(&self, event_id: &EventId) -> Result<Vec<Media>, ConsoleError>;

    /// Media waiting for approval.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn pending_media(&self, event_id: &EventId) -> Result<Vec<Media>, ConsoleError>;

    /// Records an uploaded file.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn create_media(&self, req: CreateMediaRequest) -> Result<Media, ConsoleError>;

    /// Approves a media record.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn approve_media(&self, id: &MediaId) -> Result<Media, ConsoleError>;

    /// Rejects (deletes) a media record. Absent ids succeed.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn reject_media(&self, id: &MediaId) -> Result<(), ConsoleError>;

    /// All users.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn list_users(&self) -> Result<Vec<User>, ConsoleError>;

    /// Creates a user.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn create_user(&self, req: CreateUserRequest) -> Result<User, ConsoleError>;

    /// Users with the platform-admin role.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn platform_admins(&self) -> Result<Vec<User>, ConsoleError>;

    /// Directory lookup by subject id.
    ///
    /// # Errors
    ///
    /// See the trait documentation. Unknown ids give an error for which
    /// [`ConsoleError::is_not_found`] holds.
    async fn get_user(&self, id: &UserId) -> Result<User, ConsoleError>;

    /// Enables or disables a user.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn set_user_active(&self, id: &UserId, active: bool) -> Result<User, ConsoleError>;

    /// Creates the directory record of the signed-in identity, or returns
    /// the existing one.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn self_register(&self, display_name: Option<String>) -> Result<User, ConsoleError>;

    /// All pricing plans.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn list_plans(&self) -> Result<Vec<PricingPlan>, ConsoleError>;

    /// One pricing plan.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn get_plan(&self, id: &PlanId) -> Result<PricingPlan, ConsoleError>;

    /// Creates a pricing plan.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn create_plan(&self, req: CreatePlanRequest) -> Result<PricingPlan, ConsoleError>;

    /// Updates the given fields of a pricing plan.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn update_plan(
        &self,
        id: &PlanId,
        req: UpdatePlanRequest,
    ) -> Result<PricingPlan, ConsoleError>;

    /// Deletes a pricing plan.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    async fn delete_plan(&self, id: &PlanId) -> Result<(), ConsoleError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_covers_403_and_404() {
        let err = ConsoleError::from(GalleryError::UserNotFound(UserId::new("user-x")));
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));

        let err = ConsoleError::from(GalleryError::Forbidden("no".into()));
        assert!(err.is_not_found());

        let err = ConsoleError::from(GalleryError::InvalidRequest("bad".into()));
        assert!(!err.is_not_found());
    }

    #[test]
    fn unauthenticated_maps_to_its_own_variant() {
        let err = ConsoleError::from(GalleryError::Unauthenticated("x".into()));
        assert!(matches!(err, ConsoleError::Unauthenticated));
        assert_eq!(err.status(), None);
    }
}
