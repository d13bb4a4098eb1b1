//! [`Backend`] over HTTP against a running gateway.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::backend::{Backend, ConsoleError};
use crate::api::dto::{
    AssignAdminRequest, CreateEventRequest, CreateMediaRequest, CreatePlanRequest,
    CreateQrCodeRequest, CreateUserRequest, EventListResponse, PlanListResponse,
    SelfRegisterRequest, UpdatePlanRequest,
};
use crate::domain::{
    Event, EventId, Media, MediaId, PlanId, PricingPlan, QrCode, QrCodeId, QrToken, User, UserId,
};
use crate::error::ErrorResponse;
use crate::identity::IdentityProvider;

/// REST client for the gallery gateway.
///
/// Every request carries `Authorization: Bearer <id token>` when the
/// identity provider has a session.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    identity: Arc<dyn IdentityProvider>,
}

impl HttpBackend {
    /// Creates a client for the gateway at `base_url` (e.g.
    /// `http://localhost:3000`).
    #[must_use]
    pub fn new(base_url: impl Into<String>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            identity,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/api/v1{path}", self.base_url);
        let builder = self.client.request(method, url);
        match self.identity.id_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ConsoleError> {
        let response = check(builder.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ConsoleError> {
        let _ = check(builder.send().await?).await?;
        Ok(())
    }
}

async fn check(response: Response) -> Result<Response, ConsoleError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ConsoleError::Unauthenticated);
    }
    let (code, message) = match response.json::<ErrorResponse>().await {
        Ok(body) => (body.error.code, body.error.message),
        Err(_) => (0, status.canonical_reason().unwrap_or("request failed").to_string()),
    };
    tracing::debug!(status = status.as_u16(), code, %message, "backend error");
    Err(ConsoleError::Api {
        status: status.as_u16(),
        code,
        message,
    })
}

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_events(&self) -> Result<Vec<Event>, ConsoleError> {
        let body: EventListResponse = self.send(self.request(Method::GET, "/events")).await?;
        Ok(body.events)
    }

    async fn get_event(&self, id: &EventId) -> Result<Event, ConsoleError> {
        let path = format!("/events/{}", segment(id.as_str()));
        self.send(self.request(Method::GET, &path)).await
    }

    async fn create_event(&self, req: CreateEventRequest) -> Result<Event, ConsoleError> {
        self.send(self.request(Method::POST, "/events").json(&req)).await
    }

    async fn delete_event(&self, id: &EventId) -> Result<(), ConsoleError> {
        let path = format!("/events/{}", segment(id.as_str()));
        self.send_empty(self.request(Method::DELETE, &path)).await
    }

    async fn assign_admin(
        &self,
        event_id: &EventId,
        admin_id: &UserId,
    ) -> Result<Event, ConsoleError> {
        let path = format!("/events/{}/admins", segment(event_id.as_str()));
        let body = AssignAdminRequest {
            admin_id: admin_id.clone(),
        };
        self.send(self.request(Method::POST, &path).json(&body)).await
    }

    async fn remove_admin(
        &self,
        event_id: &EventId,
        admin_id: &UserId,
    ) -> Result<Event, ConsoleError> {
        let path = format!(
            "/events/{}/admins/{}",
            segment(event_id.as_str()),
            segment(admin_id.as_str())
        );
        self.send(self.request(Method::DELETE, &path)).await
    }

    async fn list_qr_codes(&self, event_id: &EventId) -> Result<Vec<QrCode>, ConsoleError> {
        let path = format!("/events/{}/qr-codes", segment(event_id.as_str()));
        self.send(self.request(Method::GET, &path)).await
    }

    async fn create_qr_code(
        &self,
        event_id: &EventId,
        req: CreateQrCodeRequest,
    ) -> Result<QrCode, ConsoleError> {
        let path = format!("/events/{}/qr-codes", segment(event_id.as_str()));
        self.send(self.request(Method::POST, &path).json(&req)).await
    }

    async fn qr_code_by_token(&self, token: &QrToken) -> Result<QrCode, ConsoleError> {
        let path = format!("/qr-codes/token/{}", segment(token.as_str()));
        self.send(self.request(Method::GET, &path)).await
    }

    async fn qr_code_media(&self, id: &QrCodeId) -> Result<Vec<Media>, ConsoleError> {
        let path = format!("/qr-codes/{}/media", segment(id.as_str()));
        self.send(self.request(Method::GET, &path)).await
    }

    async fn list_media(&self, event_id: &EventId) -> Result<Vec<Media>, ConsoleError> {
        let path = format!("/events/{}/media", segment(event_id.as_str()));
        self.send(self.request(Method::GET, &path)).await
    }

    async fn approved_media(&self, event_id: &EventId) -> Result<Vec<Media>, ConsoleError> {
        let path = format!("/events/{}/media/approved", segment(event_id.as_str()));
        self.send(self.request(Method::GET, &path)).await
    }

    async fn pending_media(&self, event_id: &EventId) -> Result<Vec<Media>, ConsoleError> {
        let path = format!("/events/{}/media/pending", segment(event_id.as_str()));
        self.send(self.request(Method::GET, &path)).await
    }

    async fn create_media(&self, req: CreateMediaRequest) -> Result<Media, ConsoleError> {
        self.send(self.request(Method::POST, "/media").json(&req)).await
    }

    async fn approve_media(&self, id: &MediaId) -> Result<Media, ConsoleError> {
        let path = format!("/media/{}/approve", segment(id.as_str()));
        self.send(self.request(Method::POST, &path)).await
    }

    async fn reject_media(&self, id: &MediaId) -> Result<(), ConsoleError> {
        let path = format!("/media/{}", segment(id.as_str()));
        self.send_empty(self.request(Method::DELETE, &path)).await
    }

    async fn list_users(&self) -> Result<Vec<User>, ConsoleError> {
        self.send(self.request(Method::GET, "/users")).await
    }

    async fn create_user(&self, req: CreateUserRequest) -> Result<User, ConsoleError> {
        self.send(self.request(Method::POST, "/users").json(&req)).await
    }

    async fn platform_admins(&self) -> Result<Vec<User>, ConsoleError> {
        self.send(self.request(Method::GET, "/users/platform-admins")).await
    }

    async fn get_user(&self, id: &UserId) -> Result<User, ConsoleError> {
        let path = format!("/users/{}", segment(id.as_str()));
        self.send(self.request(Method::GET, &path)).await
    }

    async fn set_user_active(&self, id: &UserId, active: bool) -> Result<User, ConsoleError> {
        let action = if active { "enable" } else { "disable" };
        let path = format!("/users/{}/{action}", segment(id.as_str()));
        self.send(self.request(Method::POST, &path)).await
    }

    async fn self_register(&self, display_name: Option<String>) -> Result<User, ConsoleError> {
        let body = SelfRegisterRequest { display_name };
        self.send(self.request(Method::POST, "/users/self-register").json(&body))
            .await
    }

    async fn list_plans(&self) -> Result<Vec<PricingPlan>, ConsoleError> {
        let body: PlanListResponse = self
            .send(self.request(Method::GET, "/super-admin/pricing-plans"))
            .await?;
        Ok(body.plans)
    }

    async fn get_plan(&self, id: &PlanId) -> Result<PricingPlan, ConsoleError> {
        let path = format!("/super-admin/pricing-plans/{}", segment(id.as_str()));
        self.send(self.request(Method::GET, &path)).await
    }

    async fn create_plan(&self, req: CreatePlanRequest) -> Result<PricingPlan, ConsoleError> {
        self.send(self.request(Method::POST, "/super-admin/pricing-plans").json(&req))
            .await
    }

    async fn update_plan(
        &self,
        id: &PlanId,
        req: UpdatePlanRequest,
    ) -> Result<PricingPlan, ConsoleError> {
        let path = format!("/super-admin/pricing-plans/{}", segment(id.as_str()));
        self.send(self.request(Method::PUT, &path).json(&req)).await
    }

    async fn delete_plan(&self, id: &PlanId) -> Result<(), ConsoleError> {
        let path = format!("/super-admin/pricing-plans/{}", segment(id.as_str()));
        self.send_empty(self.request(Method::DELETE, &path)).await
    }
}
