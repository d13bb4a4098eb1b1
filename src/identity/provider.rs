//! Identity provider boundary used by the console.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use super::{AccountRegistry, AuthError, IdentitySession};

/// Email/password identity provider.
///
/// Implementations keep the current session and notify subscribers on
/// every sign-in or sign-out.
pub trait IdentityProvider: Send + Sync + fmt::Debug {
    /// Signs in with existing credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] on a mismatch.
    fn sign_in(&self, email: &str, password: &str) -> Result<IdentitySession, AuthError>;

    /// Creates an account and signs it in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEmail`], [`AuthError::WeakPassword`] or
    /// [`AuthError::EmailInUse`].
    fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<IdentitySession, AuthError>;

    /// Ends the current session, if any.
    fn sign_out(&self);

    /// Returns the current session.
    fn current_session(&self) -> Option<IdentitySession>;

    /// Subscribes to session changes.
    fn subscribe(&self) -> watch::Receiver<Option<IdentitySession>>;

    /// Returns a valid bearer token for the current session, refreshing an
    /// expired one.
    fn id_token(&self) -> Option<String>;
}

/// [`IdentityProvider`] over an in-process [`AccountRegistry`].
#[derive(Debug)]
pub struct LocalIdentityProvider {
    accounts: Arc<AccountRegistry>,
    session: watch::Sender<Option<IdentitySession>>,
}

impl LocalIdentityProvider {
    /// Creates a signed-out provider.
    #[must_use]
    pub fn new(accounts: Arc<AccountRegistry>) -> Self {
        let (session, _) = watch::channel(None);
        Self { accounts, session }
    }
}

impl IdentityProvider for LocalIdentityProvider {
    fn sign_in(&self, email: &str, password: &str) -> Result<IdentitySession, AuthError> {
        let session = self.accounts.authenticate(email, password)?;
        tracing::info!(user_id = %session.user_id, "signed in");
        let _ = self.session.send_replace(Some(session.clone()));
        Ok(session)
    }

    fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<IdentitySession, AuthError> {
        let session = self.accounts.register(email, password, display_name)?;
        tracing::info!(user_id = %session.user_id, "signed up");
        let _ = self.session.send_replace(Some(session.clone()));
        Ok(session)
    }

    fn sign_out(&self) {
        if let Some(previous) = self.session.send_replace(None) {
            self.accounts.revoke(&previous.token);
            tracing::info!(user_id = %previous.user_id, "signed out");
        }
    }

    fn current_session(&self) -> Option<IdentitySession> {
        self.session.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<IdentitySession>> {
        self.session.subscribe()
    }

    fn id_token(&self) -> Option<String> {
        let session = self.current_session()?;
        if self.accounts.verify_token(&session.token).is_some() {
            return Some(session.token);
        }
        let fresh = self.accounts.refresh(&session).ok()?;
        let token = fresh.token.clone();
        // Token rotation is not a session change; subscribers stay quiet.
        self.session.send_if_modified(|current| {
            if let Some(current) = current.as_mut() {
                *current = fresh;
            }
            false
        });
        Some(token)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn provider() -> LocalIdentityProvider {
        LocalIdentityProvider::new(Arc::new(AccountRegistry::new(Duration::from_secs(60))))
    }

    #[test]
    fn sign_up_notifies_subscribers() {
        let idp = provider();
        let mut rx = idp.subscribe();
        assert!(idp.current_session().is_none());

        let Ok(session) = idp.sign_up("a@b.com", "secret1", Some("A")) else {
            panic!("sign-up failed");
        };
        assert!(rx.has_changed().unwrap_or_default());
        assert_eq!(
            rx.borrow_and_update().as_ref().map(|s| s.user_id.clone()),
            Some(session.user_id)
        );
    }

    #[test]
    fn sign_out_clears_session_and_token() {
        let idp = provider();
        let Ok(session) = idp.sign_up("a@b.com", "secret1", None) else {
            panic!("sign-up failed");
        };
        assert_eq!(idp.id_token(), Some(session.token.clone()));

        idp.sign_out();
        assert!(idp.current_session().is_none());
        assert!(idp.id_token().is_none());
        assert!(idp.accounts.verify_token(&session.token).is_none());
    }

    #[test]
    fn failed_sign_in_keeps_previous_state() {
        let idp = provider();
        let _ = idp.sign_up("a@b.com", "secret1", None);
        idp.sign_out();
        assert_eq!(
            idp.sign_in("a@b.com", "wrong-password"),
            Err(AuthError::InvalidCredentials)
        );
        assert!(idp.current_session().is_none());
    }
}
