//! Identity layer: email/password accounts and bearer tokens.
//!
//! [`AccountRegistry`] is shared by the gateway, which authenticates
//! `Authorization: Bearer` headers with it, and by the console's
//! [`LocalIdentityProvider`]. A subject id is the id of the application
//! [`crate::domain::User`] record created by self-registration.

pub mod accounts;
pub mod provider;

pub use accounts::{AccountRegistry, AuthError, IdentitySession, MIN_PASSWORD_LEN, TokenClaims};
pub use provider::{IdentityProvider, LocalIdentityProvider};
