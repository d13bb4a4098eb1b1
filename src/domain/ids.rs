//! Type-safe record identifiers.
//!
//! Every record kind gets its own string newtype so that an [`EventId`]
//! can never be passed where a [`MediaId`] is expected. Seed records use
//! fixed ids (`event-1`, `token-123`, ...); generated ids take the form
//! `<prefix>-<uuid v4 simple>`.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Prefix used for generated identifiers of this kind.
            pub const PREFIX: &'static str = $prefix;

            /// Wraps an existing identifier string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generates a fresh, globally unique identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(format!("{}-{}", $prefix, uuid::Uuid::new_v4().simple()))
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

record_id!(
    /// Identity-provider subject id, shared with the application user record.
    UserId,
    "user"
);
record_id!(
    /// Identifier of an [`super::Event`].
    EventId,
    "event"
);
record_id!(
    /// Identifier of a [`super::QrCode`].
    QrCodeId,
    "qr"
);
record_id!(
    /// Identifier of a [`super::Media`] record.
    MediaId,
    "media"
);
record_id!(
    /// Identifier of a [`super::PricingPlan`].
    PlanId,
    "plan"
);
record_id!(
    /// Guest-facing QR token. Unique across all QR codes and immutable.
    QrToken,
    "token"
);
