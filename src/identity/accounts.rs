//! Local account registry: Argon2 password hashes and bearer tokens.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use base64::Engine;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use password_hash::{PasswordHash, SaltString};

use crate::domain::UserId;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Errors raised by the identity layer. Messages are shown to the user
/// as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The email is not a plausible address.
    #[error("Invalid email address.")]
    InvalidEmail,
    /// The password is shorter than [`MIN_PASSWORD_LEN`].
    #[error("Password is too weak. Please use a stronger password.")]
    WeakPassword,
    /// Another account already uses the email.
    #[error("This email is already registered. Please sign in instead.")]
    EmailInUse,
    /// Unknown email or wrong password.
    #[error("Invalid email or password.")]
    InvalidCredentials,
    /// No identity session is active.
    #[error("Not authenticated")]
    NotAuthenticated,
    /// Hashing or randomness failure.
    #[error("identity provider failure: {0}")]
    Internal(String),
}

/// An authenticated identity with its current bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySession {
    /// Subject id, shared with the application user record.
    pub user_id: UserId,
    /// Login email.
    pub email: String,
    /// Name given at sign-up.
    pub display_name: Option<String>,
    /// Opaque bearer token.
    pub token: String,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
}

/// What a valid bearer token proves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject id.
    pub user_id: UserId,
    /// Login email.
    pub email: String,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
}

struct Account {
    user_id: UserId,
    email: String,
    display_name: Option<String>,
    password_hash: String,
}

/// Email/password accounts and the tokens issued for them.
///
/// Shared between the gateway, which verifies bearer headers, and the
/// console's [`super::LocalIdentityProvider`], which signs users in.
pub struct AccountRegistry {
    accounts: RwLock<HashMap<String, Account>>,
    tokens: RwLock<HashMap<String, TokenClaims>>,
    token_ttl: chrono::Duration,
}

impl fmt::Debug for AccountRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountRegistry")
            .field("accounts", &self.accounts.read().len())
            .field("tokens", &self.tokens.read().len())
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl AccountRegistry {
    /// Creates an empty registry issuing tokens valid for `token_ttl`.
    #[must_use]
    pub fn new(token_ttl: Duration) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            tokens: RwLock::new(HashMap::new()),
            token_ttl: chrono::Duration::from_std(token_ttl)
                .unwrap_or_else(|_| chrono::Duration::hours(1)),
        }
    }

    /// Creates an account with a fresh subject id and signs it in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEmail`], [`AuthError::WeakPassword`] or
    /// [`AuthError::EmailInUse`].
    pub fn register(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<IdentitySession, AuthError> {
        let user_id = UserId::generate();
        self.register_with_id(user_id, email, password, display_name)?;
        self.authenticate(email, password)
    }

    /// Creates an account for a known subject id, used to provision the
    /// demo accounts of seeded users.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEmail`], [`AuthError::WeakPassword`] or
    /// [`AuthError::EmailInUse`].
    pub fn register_with_id(
        &self,
        user_id: UserId,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<(), AuthError> {
        let key = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }
        if self.accounts.read().contains_key(&key) {
            return Err(AuthError::EmailInUse);
        }
        let password_hash = hash_password(password)?;

        let mut accounts = self.accounts.write();
        if accounts.contains_key(&key) {
            return Err(AuthError::EmailInUse);
        }
        tracing::info!(%user_id, email = %key, "identity account created");
        accounts.insert(
            key.clone(),
            Account {
                user_id,
                email: key,
                display_name: display_name
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string),
                password_hash,
            },
        );
        Ok(())
    }

    /// Checks credentials and issues a token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown email or a
    /// wrong password.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<IdentitySession, AuthError> {
        let key = normalize_email(email).map_err(|_| AuthError::InvalidCredentials)?;
        let (user_id, email, display_name, password_hash) = {
            let accounts = self.accounts.read();
            let account = accounts.get(&key).ok_or(AuthError::InvalidCredentials)?;
            (
                account.user_id.clone(),
                account.email.clone(),
                account.display_name.clone(),
                account.password_hash.clone(),
            )
        };
        if !verify_password(&password_hash, password) {
            tracing::debug!(email = %key, "sign-in rejected");
            return Err(AuthError::InvalidCredentials);
        }
        let (claims, token) = self.issue_claims(user_id, email)?;
        Ok(IdentitySession {
            user_id: claims.user_id,
            email: claims.email,
            display_name,
            token,
            expires_at: claims.expires_at,
        })
    }

    /// Issues a fresh token for an existing session whose token expired.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotAuthenticated`] if the account is gone.
    pub fn refresh(&self, session: &IdentitySession) -> Result<IdentitySession, AuthError> {
        let key = normalize_email(&session.email).map_err(|_| AuthError::NotAuthenticated)?;
        if !self.accounts.read().contains_key(&key) {
            return Err(AuthError::NotAuthenticated);
        }
        self.revoke(&session.token);
        let (claims, token) = self.issue_claims(session.user_id.clone(), key)?;
        Ok(IdentitySession {
            token,
            expires_at: claims.expires_at,
            ..session.clone()
        })
    }

    /// Issues a token and drops every expired one.
    fn issue_claims(&self, user_id: UserId, email: String) -> Result<(TokenClaims, String), AuthError> {
        let token = random_token()?;
        let now = Utc::now();
        let claims = TokenClaims {
            user_id,
            email,
            expires_at: now + self.token_ttl,
        };
        let mut tokens = self.tokens.write();
        let before = tokens.len();
        tokens.retain(|_, c| c.expires_at > now);
        let purged = before - tokens.len();
        tokens.insert(token.clone(), claims.clone());
        drop(tokens);
        tracing::debug!(user_id = %claims.user_id, purged, "token issued");
        Ok((claims, token))
    }

    /// Returns the claims of a live token. Expired tokens are dropped.
    #[must_use]
    pub fn verify_token(&self, token: &str) -> Option<TokenClaims> {
        let claims = self.tokens.read().get(token).cloned()?;
        if claims.expires_at <= Utc::now() {
            self.revoke(token);
            return None;
        }
        Some(claims)
    }

    /// Invalidates a token. Unknown tokens are ignored.
    pub fn revoke(&self, token: &str) {
        let _ = self.tokens.write().remove(token);
    }
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_ascii_lowercase();
    if email.chars().any(char::is_whitespace) {
        return Err(AuthError::InvalidEmail);
    }
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') =>
        {
            Ok(email)
        }
        _ => Err(AuthError::InvalidEmail),
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| AuthError::Internal(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| AuthError::Internal(e.to_string()))?;
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .to_string();
    Ok(phc)
}

fn verify_password(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash)
        .is_ok_and(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

/// 256-bit random token, base64url without padding.
fn random_token() -> Result<String, AuthError> {
    let mut buf = [0u8; 32];
    getrandom::getrandom(&mut buf).map_err(|e| AuthError::Internal(e.to_string()))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf))
}
