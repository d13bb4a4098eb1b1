//! Console core: the administration console's logic without a UI.
//!
//! Everything here talks to the gallery through [`Backend`], either the
//! live gateway ([`HttpBackend`]) or the in-process [`MockBackend`]. The
//! signed-in user lives in [`SessionState`]; [`RouteGate`], [`RoleGate`]
//! and [`Navigator`] decide navigation from it.

pub mod auth_service;
pub mod backend;
pub mod dashboard;
pub mod guard;
pub mod guest_flow;
pub mod http_backend;
pub mod mock_backend;
pub mod moderation;
pub mod navigation;
pub mod object_storage;
pub mod session_state;
pub mod uploader;

pub use auth_service::AuthService;
pub use backend::{Backend, ConsoleError};
pub use dashboard::{EventDashboard, PlatformDashboard, SuperAdminDashboard};
pub use guard::{DEFAULT_SESSION_WAIT, GateDecision, Redirect, RoleGate, RouteGate};
pub use guest_flow::{GuestFlow, GuestFlowError};
pub use http_backend::HttpBackend;
pub use mock_backend::{DEFAULT_MOCK_LATENCY, MockBackend};
pub use moderation::Moderation;
pub use navigation::{Navigator, RouteAccess};
pub use object_storage::{LocalObjectStorage, ObjectStorage, StorageError, TransferProgress};
pub use session_state::SessionState;
pub use uploader::{MediaUploader, UploadFile, UploadReport, UploadTarget};
