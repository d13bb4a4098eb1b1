//! Console route table.
//!
//! Paths are matched segment by segment; `:name` segments capture a
//! parameter. Query strings are ignored for matching and kept in return
//! URLs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::UserRole;
use crate::identity::IdentityProvider;

use super::guard::{GateDecision, LOGIN_PATH, Redirect, RoleGate, RouteGate};
use super::session_state::SessionState;

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Anyone.
    Public,
    /// Always redirected.
    RedirectTo(&'static str),
    /// Signed-in users holding one of the roles.
    Roles(&'static [UserRole]),
}

/// A console view.
#[derive(Debug, Clone, Copy)]
pub struct Route {
    /// Path pattern without leading slash.
    pub pattern: &'static str,
    /// Gate configuration.
    pub access: RouteAccess,
}

const SUPER_ADMIN: &[UserRole] = &[UserRole::SuperAdmin];
const PLATFORM_ADMIN: &[UserRole] = &[UserRole::PlatformAdmin];
const EVENT_STAFF: &[UserRole] = &[UserRole::PlatformAdmin, UserRole::EventAdmin];

/// Every console view, in match order.
pub const ROUTES: &[Route] = &[
    Route {
        pattern: "",
        access: RouteAccess::RedirectTo(LOGIN_PATH),
    },
    Route {
        pattern: "login",
        access: RouteAccess::Public,
    },
    Route {
        pattern: "signup",
        access: RouteAccess::Public,
    },
    Route {
        pattern: "guest",
        access: RouteAccess::Public,
    },
    Route {
        pattern: "super-admin",
        access: RouteAccess::Roles(SUPER_ADMIN),
    },
    Route {
        pattern: "super-admin/pricing-plans",
        access: RouteAccess::Roles(SUPER_ADMIN),
    },
    Route {
        pattern: "super-admin/users",
        access: RouteAccess::Roles(SUPER_ADMIN),
    },
    Route {
        pattern: "platform-admin",
        access: RouteAccess::Roles(PLATFORM_ADMIN),
    },
    Route {
        pattern: "events",
        access: RouteAccess::Roles(EVENT_STAFF),
    },
    Route {
        pattern: "events/create",
        access: RouteAccess::Roles(PLATFORM_ADMIN),
    },
    Route {
        pattern: "events/:id",
        access: RouteAccess::Roles(EVENT_STAFF),
    },
    Route {
        pattern: "events/:eventId/qr/create",
        access: RouteAccess::Roles(EVENT_STAFF),
    },
];

/// A resolved path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Matched pattern; `None` for the catch-all.
    pub pattern: Option<&'static str>,
    /// Gate configuration.
    pub access: RouteAccess,
    /// Captured `:name` parameters.
    pub params: HashMap<String, String>,
}

/// Resolves `url` against [`ROUTES`]. Unknown paths fall through to a
/// sign-in redirect.
#[must_use]
pub fn resolve(url: &str) -> RouteMatch {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    for route in ROUTES {
        if let Some(params) = match_pattern(route.pattern, &segments) {
            return RouteMatch {
                pattern: Some(route.pattern),
                access: route.access,
                params,
            };
        }
    }
    RouteMatch {
        pattern: None,
        access: RouteAccess::RedirectTo(LOGIN_PATH),
        params: HashMap::new(),
    }
}

fn match_pattern(pattern: &str, segments: &[&str]) -> Option<HashMap<String, String>> {
    let parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    if parts.len() != segments.len() {
        return None;
    }
    let mut params = HashMap::new();
    for (part, segment) in parts.iter().zip(segments) {
        if let Some(name) = part.strip_prefix(':') {
            params.insert(name.to_string(), (*segment).to_string());
        } else if part != segment {
            return None;
        }
    }
    Some(params)
}

/// Runs the gates configured for a route.
#[derive(Debug, Clone)]
pub struct Navigator {
    identity: Arc<dyn IdentityProvider>,
    session: SessionState,
    wait: Duration,
}

impl Navigator {
    /// Creates a navigator.
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityProvider>, session: SessionState, wait: Duration) -> Self {
        Self {
            identity,
            session,
            wait,
        }
    }

    /// Decides navigation to `url`: route gate first, then role gate.
    pub async fn navigate(&self, url: &str) -> GateDecision {
        let url = if url.starts_with('/') {
            url.to_string()
        } else {
            format!("/{url}")
        };
        match resolve(&url).access {
            RouteAccess::Public => GateDecision::Admit,
            RouteAccess::RedirectTo(path) => GateDecision::Redirect(Redirect::to(path)),
            RouteAccess::Roles(roles) => {
                let route_gate =
                    RouteGate::new(Arc::clone(&self.identity), self.session.clone(), self.wait);
                let decision = route_gate.check(&url).await;
                if !decision.is_admitted() {
                    return decision;
                }
                RoleGate::new(roles, Arc::clone(&self.identity), self.session.clone(), self.wait)
                    .check(&url)
                    .await
            }
        }
    }
}
