//! Domain layer: record types, guest access rules, the record store and
//! the event system.
//!
//! Everything here is transport-agnostic. The REST handlers in
//! [`crate::api`] and the console core in [`crate::console`] both speak in
//! these types.

pub mod event;
pub mod event_bus;
pub mod gallery_event;
pub mod guest_access;
pub mod ids;
pub mod media;
pub mod pricing;
pub mod record_store;
pub mod user;

pub use event::{Event, PhoneRequirement, QrCode, QrRules};
pub use event_bus::EventBus;
pub use gallery_event::GalleryEvent;
pub use guest_access::{GuestAccessError, GuestTab, GuestView, UploaderDetails};
pub use ids::{EventId, MediaId, PlanId, QrCodeId, QrToken, UserId};
pub use media::{BYTES_PER_GB, FileType, Media, UploadProgress, UploadStatus};
pub use pricing::PricingPlan;
pub use record_store::{RecordStore, Registration};
pub use user::{User, UserRole};
