//! Data Transfer Objects for REST request/response serialization.
//!
//! Field names are camelCase on the wire. Records such as
//! [`crate::domain::Event`] are returned as-is; only request bodies and
//! list envelopes live here.

pub mod event_dto;
pub mod media_dto;
pub mod plan_dto;
pub mod user_dto;

pub use event_dto::*;
pub use media_dto::*;
pub use plan_dto::*;
pub use user_dto::*;
