//! WebSocket layer: live moderation feed.
//!
//! The endpoint at `/ws` streams [`crate::domain::GalleryEvent`]s for the
//! events a client subscribes to, and answers pending-queue queries.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
