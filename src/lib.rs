//! # guestlens
//!
//! Backend and console core for an event photo-sharing service. Guests
//! scan a QR code to view an event gallery or upload photos and videos;
//! administrators manage events, QR rules and moderation.
//!
//! The crate has two faces. The gateway (`api`, `ws`, `service`) serves
//! the REST boundary over a map-based [`domain::RecordStore`]. The
//! [`console`] module holds the client-side logic: session state,
//! authorization gates, guest flow, uploads and dashboards, talking to a
//! [`console::Backend`] that is either the live gateway over HTTP or an
//! in-process mock.
//!
//! ## Architecture
//!
//! ```text
//! Console (console/)            Clients (HTTP, WebSocket)
//!     │                              │
//!     ├── HttpBackend ──────────────►├── REST Handlers (api/)
//!     ├── MockBackend ──┐            ├── WS Handler (ws/)
//!     │                 │            │
//!     │                 └───────────►├── Services (service/)
//!     │                              ├── EventBus (domain/)
//!     │                              │
//!     ├── IdentityProvider ─────────►├── AccountRegistry (identity/)
//!     │                              ├── RecordStore (domain/)
//!     │                              │
//!     └── ObjectStorage              └── JSON snapshot (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod console;
pub mod domain;
pub mod error;
pub mod identity;
pub mod persistence;
pub mod service;
pub mod ws;
