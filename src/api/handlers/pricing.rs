//! Pricing plan handlers under `/super-admin/pricing-plans`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::auth::{Caller, MODERATORS, PLATFORM_OPERATORS};
use crate::api::dto::{CreatePlanRequest, PlanListResponse, UpdatePlanRequest};
use crate::app_state::AppState;
use crate::domain::{PlanId, PricingPlan};
use crate::error::{ErrorResponse, GalleryError};

/// `GET /super-admin/pricing-plans` — All plans.
///
/// Readable by every console role, since the event creation form offers
/// the active plans.
///
/// # Errors
///
/// Returns [`GalleryError::Unauthenticated`] without a valid token.
#[utoipa::path(
    get,
    path = "/api/v1/super-admin/pricing-plans",
    tag = "Pricing",
    summary = "List pricing plans",
    responses(
        (status = 200, description = "Plans", body = PlanListResponse),
    )
)]
pub async fn list_plans(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<impl IntoResponse, GalleryError> {
    let _user = caller.require(&state, MODERATORS).await?;
    let plans = state.pricing_service.list_plans().await;
    Ok(Json(PlanListResponse { plans }))
}

/// `POST /super-admin/pricing-plans` — Create a plan.
///
/// # Errors
///
/// Returns [`GalleryError::InvalidRequest`] on invalid fields.
#[utoipa::path(
    post,
    path = "/api/v1/super-admin/pricing-plans",
    tag = "Pricing",
    summary = "Create a pricing plan",
    request_body = CreatePlanRequest,
    responses(
        (status = 201, description = "Plan created", body = PricingPlan),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn create_plan(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<CreatePlanRequest>,
) -> Result<impl IntoResponse, GalleryError> {
    let _user = caller.require(&state, PLATFORM_OPERATORS).await?;
    let plan = state.pricing_service.create_plan(req).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// `GET /super-admin/pricing-plans/{id}` — One plan.
///
/// # Errors
///
/// Returns [`GalleryError::PlanNotFound`] if the plan does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/super-admin/pricing-plans/{id}",
    tag = "Pricing",
    summary = "Get a pricing plan",
    params(("id" = String, Path, description = "Plan id")),
    responses(
        (status = 200, description = "Plan", body = PricingPlan),
        (status = 404, description = "Plan not found", body = ErrorResponse),
    )
)]
pub async fn get_plan(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<PlanId>,
) -> Result<impl IntoResponse, GalleryError> {
    let _user = caller.require(&state, MODERATORS).await?;
    Ok(Json(state.pricing_service.get_plan(&id).await?))
}

/// `PUT /super-admin/pricing-plans/{id}` — Update a plan.
///
/// # Errors
///
/// Returns [`GalleryError::PlanNotFound`] or
/// [`GalleryError::InvalidRequest`].
#[utoipa::path(
    put,
    path = "/api/v1/super-admin/pricing-plans/{id}",
    tag = "Pricing",
    summary = "Update a pricing plan",
    params(("id" = String, Path, description = "Plan id")),
    request_body = UpdatePlanRequest,
    responses(
        (status = 200, description = "Updated plan", body = PricingPlan),
        (status = 404, description = "Plan not found", body = ErrorResponse),
    )
)]
pub async fn update_plan(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<PlanId>,
    Json(req): Json<UpdatePlanRequest>,
) -> Result<impl IntoResponse, GalleryError> {
    let _user = caller.require(&state, PLATFORM_OPERATORS).await?;
    Ok(Json(state.pricing_service.update_plan(&id, req).await?))
}

/// `DELETE /super-admin/pricing-plans/{id}` — Delete a plan.
///
/// # Errors
///
/// Returns [`GalleryError::PlanNotFound`] if the plan does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/super-admin/pricing-plans/{id}",
    tag = "Pricing",
    summary = "Delete a pricing plan",
    params(("id" = String, Path, description = "Plan id")),
    responses(
        (status = 204, description = "Plan deleted"),
        (status = 404, description = "Plan not found", body = ErrorResponse),
    )
)]
pub async fn delete_plan(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<PlanId>,
) -> Result<impl IntoResponse, GalleryError> {
    let _user = caller.require(&state, PLATFORM_OPERATORS).await?;
    state.pricing_service.delete_plan(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Pricing routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/super-admin/pricing-plans",
            get(list_plans).post(create_plan),
        )
        .route(
            "/super-admin/pricing-plans/{id}",
            get(get_plan).put(update_plan).delete(delete_plan),
        )
}
