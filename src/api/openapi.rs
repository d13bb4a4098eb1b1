//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto::{
    AssignAdminRequest, CreateEventRequest, CreateMediaRequest, CreatePlanRequest,
    CreateQrCodeRequest, CreateUserRequest, EventListResponse, PlanListResponse,
    SelfRegisterRequest, UpdatePlanRequest,
};
use super::handlers::{events, media, pricing, system, users};
use crate::domain::{
    Event, FileType, Media, PhoneRequirement, PricingPlan, QrCode, QrRules, User, UserRole,
};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI description, served by Swagger UI when the
/// `swagger-ui` feature is on.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "guestlens", description = "Event photo-sharing gateway"),
    paths(
        system::health_handler,
        events::list_events,
        events::create_event,
        events::get_event,
        events::delete_event,
        events::assign_admin,
        events::remove_admin,
        events::list_qr_codes,
        events::create_qr_code,
        media::qr_code_by_token,
        media::qr_code_media,
        media::create_media,
        media::list_media,
        media::approved_media,
        media::pending_media,
        media::approve_media,
        media::reject_media,
        users::list_users,
        users::create_user,
        users::platform_admins,
        users::get_user,
        users::enable_user,
        users::disable_user,
        users::self_register,
        pricing::list_plans,
        pricing::create_plan,
        pricing::get_plan,
        pricing::update_plan,
        pricing::delete_plan,
    ),
    components(schemas(
        Event,
        QrCode,
        QrRules,
        PhoneRequirement,
        Media,
        FileType,
        User,
        UserRole,
        PricingPlan,
        CreateEventRequest,
        EventListResponse,
        AssignAdminRequest,
        CreateQrCodeRequest,
        CreateMediaRequest,
        CreateUserRequest,
        SelfRegisterRequest,
        CreatePlanRequest,
        UpdatePlanRequest,
        PlanListResponse,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "System", description = "Health"),
        (name = "Events", description = "Event management"),
        (name = "QR Codes", description = "Guest QR codes"),
        (name = "Guest", description = "Public guest endpoints"),
        (name = "Media", description = "Moderation"),
        (name = "Users", description = "User directory"),
        (name = "Pricing", description = "Pricing plans"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_guest_endpoints() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/qr-codes/token/{token}"));
        assert!(doc.paths.paths.contains_key("/api/v1/users/self-register"));
    }
}
