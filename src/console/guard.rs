//! Route and role authorization gates.
//!
//! Both gates suspend when an identity session exists but the directory
//! record has not arrived yet, waiting on [`SessionState`] for at most the
//! configured session wait.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{User, UserRole};
use crate::identity::IdentityProvider;

use super::session_state::SessionState;

/// Default bound on waiting for the user record.
pub const DEFAULT_SESSION_WAIT: Duration = Duration::from_millis(2000);

/// Sign-in view.
pub const LOGIN_PATH: &str = "/login";

/// Landing view for users outside a route's roles.
pub const LANDING_PATH: &str = "/events";

/// Navigation target chosen by a gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Target path.
    pub path: String,
    /// Where to go after signing in.
    pub return_url: Option<String>,
}

impl Redirect {
    /// Sign-in redirect remembering `return_url`.
    #[must_use]
    pub fn to_login(return_url: &str) -> Self {
        Self {
            path: LOGIN_PATH.to_string(),
            return_url: Some(return_url.to_string()),
        }
    }

    /// Plain redirect.
    #[must_use]
    pub fn to(path: &str) -> Self {
        Self {
            path: path.to_string(),
            return_url: None,
        }
    }

    /// Target as a URL, e.g. `/login?returnUrl=%2Fevents%2Fevent-1`.
    #[must_use]
    pub fn to_url(&self) -> String {
        match &self.return_url {
            Some(url) => format!("{}?returnUrl={}", self.path, urlencoding::encode(url)),
            None => self.path.clone(),
        }
    }
}

/// Outcome of a gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Navigation may proceed.
    Admit,
    /// Navigation is replaced by a redirect.
    Redirect(Redirect),
}

impl GateDecision {
    /// Returns `true` for [`GateDecision::Admit`].
    #[must_use]
    pub const fn is_admitted(&self) -> bool {
        matches!(self, Self::Admit)
    }
}

/// Waits up to `wait` for a user record. The subscription is dropped on
/// return either way. At timeout the state is read once more.
async fn wait_for_user(session: &SessionState, wait: Duration) -> Option<User> {
    if let Some(user) = session.current() {
        return Some(user);
    }
    let mut rx = session.subscribe();
    let arrived = match tokio::time::timeout(wait, rx.wait_for(Option::is_some)).await {
        Ok(Ok(user)) => user.clone(),
        _ => None,
    };
    drop(rx);
    if arrived.is_none() {
        tracing::debug!(wait_ms = wait.as_millis(), "user record did not arrive in time");
    }
    arrived.or_else(|| session.current())
}

/// Admits navigation when an identity session and a user record exist.
#[derive(Debug, Clone)]
pub struct RouteGate {
    identity: Arc<dyn IdentityProvider>,
    session: SessionState,
    wait: Duration,
}

impl RouteGate {
    /// Creates a gate.
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityProvider>, session: SessionState, wait: Duration) -> Self {
        Self {
            identity,
            session,
            wait,
        }
    }

    /// Decides navigation to `url`.
    pub async fn check(&self, url: &str) -> GateDecision {
        if self.identity.current_session().is_none() {
            return GateDecision::Redirect(Redirect::to_login(url));
        }
        match wait_for_user(&self.session, self.wait).await {
            Some(_) => GateDecision::Admit,
            None => GateDecision::Redirect(Redirect::to_login(url)),
        }
    }
}

/// Admits navigation when the user holds one of the permitted roles.
#[derive(Debug, Clone)]
pub struct RoleGate {
    roles: Vec<UserRole>,
    identity: Arc<dyn IdentityProvider>,
    session: SessionState,
    wait: Duration,
}

impl RoleGate {
    /// Creates a gate for `roles`.
    #[must_use]
    pub fn new(
        roles: &[UserRole],
        identity: Arc<dyn IdentityProvider>,
        session: SessionState,
        wait: Duration,
    ) -> Self {
        Self {
            roles: roles.to_vec(),
            identity,
            session,
            wait,
        }
    }

    /// Decides navigation to `url`. Users outside the roles land on
    /// [`LANDING_PATH`], never on an error page.
    pub async fn check(&self, url: &str) -> GateDecision {
        if self.identity.current_session().is_none() {
            return GateDecision::Redirect(Redirect::to_login(url));
        }
        match wait_for_user(&self.session, self.wait).await {
            Some(user) if self.roles.contains(&user.role) => GateDecision::Admit,
            Some(user) => {
                tracing::debug!(user_id = %user.id, role = user.role.as_str(), url, "role not permitted");
                GateDecision::Redirect(Redirect::to(LANDING_PATH))
            }
            None => GateDecision::Redirect(Redirect::to_login(url)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use crate::identity::{AccountRegistry, LocalIdentityProvider};

    fn signed_in() -> Arc<dyn IdentityProvider> {
        let accounts = Arc::new(AccountRegistry::new(Duration::from_secs(3600)));
        let idp = LocalIdentityProvider::new(accounts);
        let Ok(_) = idp.sign_up("a@b.com", "secret1", None) else {
            panic!("sign-up failed");
        };
        Arc::new(idp)
    }

    fn signed_out() -> Arc<dyn IdentityProvider> {
        Arc::new(LocalIdentityProvider::new(Arc::new(AccountRegistry::new(
            Duration::from_secs(3600),
        ))))
    }

    fn user(role: UserRole) -> User {
        User::new(UserId::new("user-7"), "a@b.com", role)
    }

    #[tokio::test(start_paused = true)]
    async fn no_identity_redirects_with_return_url() {
        let gate = RouteGate::new(signed_out(), SessionState::new(), DEFAULT_SESSION_WAIT);
        let decision = gate.check("/events/event-1").await;
        let GateDecision::Redirect(redirect) = decision else {
            panic!("expected redirect");
        };
        assert_eq!(redirect.to_url(), "/login?returnUrl=%2Fevents%2Fevent-1");
    }

    #[tokio::test(start_paused = true)]
    async fn loaded_user_is_admitted_immediately() {
        let session = SessionState::new();
        session.set(Some(user(UserRole::EventAdmin)));
        let gate = RouteGate::new(signed_in(), session, DEFAULT_SESSION_WAIT);
        assert!(gate.check("/events").await.is_admitted());
    }

    #[tokio::test(start_paused = true)]
    async fn late_record_within_wait_is_admitted() {
        let session = SessionState::new();
        let gate = RouteGate::new(signed_in(), session.clone(), DEFAULT_SESSION_WAIT);
        let publisher = session.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            publisher.set(Some(user(UserRole::PlatformAdmin)));
        });
        assert!(gate.check("/events").await.is_admitted());
        assert_eq!(session.subscriber_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_redirects_to_login() {
        let session = SessionState::new();
        let gate = RouteGate::new(signed_in(), session.clone(), DEFAULT_SESSION_WAIT);
        let started = tokio::time::Instant::now();
        let decision = gate.check("/events").await;
        assert!(started.elapsed() >= DEFAULT_SESSION_WAIT);
        assert_eq!(decision, GateDecision::Redirect(Redirect::to_login("/events")));
        assert_eq!(session.subscriber_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn role_outside_set_lands_on_events() {
        let session = SessionState::new();
        session.set(Some(user(UserRole::EventAdmin)));
        let gate = RoleGate::new(
            &[UserRole::SuperAdmin],
            signed_in(),
            session,
            DEFAULT_SESSION_WAIT,
        );
        assert_eq!(
            gate.check("/super-admin").await,
            GateDecision::Redirect(Redirect::to("/events"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn role_gate_waits_then_checks_membership() {
        let session = SessionState::new();
        let gate = RoleGate::new(
            &[UserRole::PlatformAdmin, UserRole::EventAdmin],
            signed_in(),
            session.clone(),
            DEFAULT_SESSION_WAIT,
        );
        let publisher = session.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            publisher.set(Some(user(UserRole::PlatformAdmin)));
        });
        assert!(gate.check("/events").await.is_admitted());
    }

    #[tokio::test(start_paused = true)]
    async fn role_gate_timeout_without_user_goes_to_login() {
        let gate = RoleGate::new(
            &[UserRole::SuperAdmin],
            signed_in(),
            SessionState::new(),
            DEFAULT_SESSION_WAIT,
        );
        assert_eq!(
            gate.check("/super-admin/users").await,
            GateDecision::Redirect(Redirect::to_login("/super-admin/users"))
        );
    }
}
