//! Service layer: business logic orchestration.
//!
//! Each service owns an `Arc` of the shared [`crate::domain::RecordStore`]
//! and a handle to the [`crate::domain::EventBus`]. Mutations write through
//! the store and then publish a [`crate::domain::GalleryEvent`].

pub mod event_service;
pub mod media_service;
pub mod pricing_service;
pub mod user_service;

pub use event_service::EventService;
pub use media_service::MediaService;
pub use pricing_service::PricingService;
pub use user_service::UserService;
