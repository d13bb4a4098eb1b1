//! Sign-in flow: identity provider, user directory and session state.

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::backend::{Backend, ConsoleError};
use super::session_state::SessionState;
use crate::domain::{User, UserId, UserRole};
use crate::identity::{AuthError, IdentityProvider, IdentitySession};

/// Composes the identity provider, the backend directory and the session
/// state.
#[derive(Debug, Clone)]
pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
    backend: Arc<dyn Backend>,
    session: SessionState,
}

impl AuthService {
    /// Creates the service.
    #[must_use]
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        backend: Arc<dyn Backend>,
        session: SessionState,
    ) -> Self {
        Self {
            identity,
            backend,
            session,
        }
    }

    /// Session state updated by this service.
    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Identity provider in use.
    #[must_use]
    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.identity
    }

    /// Signs in and loads the directory record.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Identity`] for bad credentials, or the
    /// directory lookup error, in which case the identity session is ended.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, ConsoleError> {
        let session = self.run_identity(email, password, None, false).await?;
        let loaded = self.fetch_user(&session.user_id).await;
        self.settle(loaded)
    }

    /// Creates an identity, registers it in the directory and loads the
    /// record.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Identity`] for sign-up failures, or the
    /// registration and lookup errors, in which case the new identity is
    /// signed out again.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<User, ConsoleError> {
        let session = self
            .run_identity(email, password, display_name.map(str::to_string), true)
            .await?;
        let registered = match self
            .backend
            .self_register(display_name.map(str::to_string))
            .await
        {
            Ok(_) => self.fetch_user(&session.user_id).await,
            Err(e) => Err(e),
        };
        self.settle(registered)
    }

    /// Publishes the loaded record, or ends the identity session when no
    /// record could be loaded for it.
    fn settle(&self, loaded: Result<User, ConsoleError>) -> Result<User, ConsoleError> {
        match loaded {
            Ok(user) => {
                self.session.set(Some(user.clone()));
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "no directory record for identity, signing out");
                self.identity.sign_out();
                self.session.set(None);
                Err(e)
            }
        }
    }

    /// Ends the identity session and clears the session state.
    pub fn sign_out(&self) {
        self.identity.sign_out();
        self.session.set(None);
    }

    /// Password hashing is CPU bound; keep it off the async workers.
    async fn run_identity(
        &self,
        email: &str,
        password: &str,
        display_name: Option<String>,
        create: bool,
    ) -> Result<IdentitySession, ConsoleError> {
        let identity = Arc::clone(&self.identity);
        let email = email.to_string();
        let password = password.to_string();
        let result = tokio::task::spawn_blocking(move || {
            if create {
                identity.sign_up(&email, &password, display_name.as_deref())
            } else {
                identity.sign_in(&email, &password)
            }
        })
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?;
        Ok(result?)
    }

    /// Looks up the directory record of `id`. When it does not exist the
    /// signed-in identity self-registers once and the lookup is retried
    /// once.
    ///
    /// # Errors
    ///
    /// Returns the lookup error when it is not a not-found, and the
    /// registration or second lookup error otherwise.
    pub async fn fetch_user(&self, id: &UserId) -> Result<User, ConsoleError> {
        fetch_with_registration(self.backend.as_ref(), self.identity.as_ref(), id).await
    }

    /// Mirrors identity-session changes into the session state: each
    /// change triggers a directory lookup, and `None` is published when
    /// signed out or when the lookup fails.
    #[must_use]
    pub fn spawn_identity_sync(&self) -> JoinHandle<()> {
        let mut rx = self.identity.subscribe();
        let identity = Arc::clone(&self.identity);
        let backend = Arc::clone(&self.backend);
        let session = self.session.clone();
        tokio::spawn(async move {
            loop {
                let subject = rx.borrow_and_update().as_ref().map(|s| s.user_id.clone());
                let user = match subject {
                    Some(id) => {
                        match fetch_with_registration(backend.as_ref(), identity.as_ref(), &id)
                            .await
                        {
                            Ok(user) => Some(user),
                            Err(e) => {
                                tracing::warn!(user_id = %id, error = %e, "directory lookup failed");
                                None
                            }
                        }
                    }
                    None => None,
                };
                session.set(user);
                if rx.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    /// Returns `true` if the session user holds `role`.
    #[must_use]
    pub fn has_role(&self, role: UserRole) -> bool {
        self.session.current().is_some_and(|u| u.has_role(role))
    }

    /// Super-admin check.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.has_role(UserRole::SuperAdmin)
    }

    /// Platform-admin check.
    #[must_use]
    pub fn is_platform_admin(&self) -> bool {
        self.has_role(UserRole::PlatformAdmin)
    }

    /// Event-admin check.
    #[must_use]
    pub fn is_event_admin(&self) -> bool {
        self.has_role(UserRole::EventAdmin)
    }

    /// Returns `true` when both an identity session and a user record are
    /// present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.current_session().is_some() && self.session.current().is_some()
    }
}

async fn fetch_with_registration(
    backend: &dyn Backend,
    identity: &dyn IdentityProvider,
    id: &UserId,
) -> Result<User, ConsoleError> {
    match backend.get_user(id).await {
        Ok(user) => Ok(user),
        Err(e) if e.is_not_found() => {
            tracing::info!(user_id = %id, "no directory record; self-registering");
            let display_name = identity.current_session().and_then(|s| s.display_name);
            let _ = backend.self_register(display_name).await?;
            backend.get_user(id).await
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::console::MockBackend;
    use crate::domain::{EventBus, RecordStore};
    use crate::identity::{AccountRegistry, LocalIdentityProvider};
    use crate::persistence::SnapshotStore;
    use crate::persistence::seed::demo_records;

    fn setup() -> (AuthService, Arc<AccountRegistry>) {
        let accounts = Arc::new(AccountRegistry::new(Duration::from_secs(3600)));
        let identity: Arc<dyn IdentityProvider> =
            Arc::new(LocalIdentityProvider::new(Arc::clone(&accounts)));
        let store = Arc::new(RecordStore::from_records(demo_records(), None));
        let backend: Arc<dyn Backend> = Arc::new(MockBackend::new(
            store,
            EventBus::new(16),
            Arc::clone(&identity),
            Duration::ZERO,
        ));
        (
            AuthService::new(identity, backend, SessionState::new()),
            accounts,
        )
    }

    #[tokio::test]
    async fn failed_registration_ends_identity_session() {
        let accounts = Arc::new(AccountRegistry::new(Duration::from_secs(3600)));
        let identity: Arc<dyn IdentityProvider> =
            Arc::new(LocalIdentityProvider::new(Arc::clone(&accounts)));
        // A snapshot path below a regular file cannot be written.
        let unwritable = SnapshotStore::new("/dev/null/guestlens/snapshot.json");
        let store = Arc::new(RecordStore::from_records(demo_records(), Some(unwritable)));
        let backend: Arc<dyn Backend> = Arc::new(MockBackend::new(
            store,
            EventBus::new(16),
            Arc::clone(&identity),
            Duration::ZERO,
        ));
        let auth = AuthService::new(Arc::clone(&identity), backend, SessionState::new());

        let Err(err) = auth.sign_up("late@guest.com", "password123", None).await else {
            panic!("registration should fail");
        };
        assert_eq!(err.status(), Some(500));
        assert!(identity.current_session().is_none());
        assert!(auth.session().current().is_none());
        assert!(!auth.is_authenticated());
    }

    #[tokio::test]
    async fn sign_in_publishes_directory_record() {
        let (auth, accounts) = setup();
        let Ok(()) =
            accounts.register_with_id(UserId::new("user-1"), "super@admin.com", "password123", None)
        else {
            panic!("seed account failed");
        };
        let Ok(user) = auth.sign_in("super@admin.com", "password123").await else {
            panic!("sign-in failed");
        };
        assert_eq!(user.role, UserRole::SuperAdmin);
        assert!(auth.is_super_admin());
        assert!(auth.is_authenticated());

        auth.sign_out();
        assert!(auth.session().current().is_none());
        assert!(!auth.is_authenticated());
    }

    #[tokio::test]
    async fn sign_up_creates_event_admin() {
        let (auth, _) = setup();
        let Ok(user) = auth.sign_up("new@guest.com", "secret12", Some("New")).await else {
            panic!("sign-up failed");
        };
        assert_eq!(user.role, UserRole::EventAdmin);
        assert_eq!(user.display_name.as_deref(), Some("New"));
        assert!(auth.is_event_admin());
    }

    #[tokio::test]
    async fn fetch_user_self_registers_missing_record_once() {
        let (auth, accounts) = setup();
        let Ok(_) = accounts.register("late@guest.com", "secret12", Some("Late")) else {
            panic!("register failed");
        };
        let Ok(session) = auth.identity().sign_in("late@guest.com", "secret12") else {
            panic!("sign-in failed");
        };
        let Ok(user) = auth.fetch_user(&session.user_id).await else {
            panic!("fetch failed");
        };
        assert_eq!(user.id, session.user_id);
        assert_eq!(user.email, "late@guest.com");
    }

    #[tokio::test]
    async fn bad_credentials_surface_identity_error() {
        let (auth, _) = setup();
        let result = auth.sign_in("nobody@x.com", "whatever").await;
        assert!(matches!(
            result,
            Err(ConsoleError::Identity(AuthError::InvalidCredentials))
        ));
        assert!(auth.session().current().is_none());
    }

    #[tokio::test]
    async fn identity_sync_follows_sign_in_and_out() {
        let (auth, accounts) = setup();
        let Ok(()) = accounts.register_with_id(
            UserId::new("user-2"),
            "platform@admin.com",
            "password123",
            None,
        ) else {
            panic!("seed account failed");
        };
        let mut rx = auth.session().subscribe();
        let task = auth.spawn_identity_sync();

        let Ok(_) = auth.identity().sign_in("platform@admin.com", "password123") else {
            panic!("sign-in failed");
        };
        let Ok(user) = rx.wait_for(Option::is_some).await.map(|u| u.clone()) else {
            panic!("session never populated");
        };
        assert_eq!(user.map(|u| u.id), Some(UserId::new("user-2")));

        auth.identity().sign_out();
        assert!(rx.wait_for(Option::is_none).await.is_ok());
        task.abort();
    }
}
