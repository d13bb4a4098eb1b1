//! Persistence layer: namespaced JSON snapshots of the record set.
//!
//! The whole record set is written after every mutation (full replace)
//! and read back at start-up, so state survives a restart. A missing
//! snapshot falls back to the demo seed in [`seed`].

pub mod models;
pub mod seed;
pub mod snapshot;

pub use models::{RecordSet, Snapshot};
pub use snapshot::SnapshotStore;
