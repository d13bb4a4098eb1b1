//! Snapshot file models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Event, Media, PricingPlan, QrCode, User};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Complete record set, one namespace per record kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSet {
    /// Application users.
    #[serde(default)]
    pub users: Vec<User>,
    /// Pricing plans.
    #[serde(default)]
    pub plans: Vec<PricingPlan>,
    /// Events.
    #[serde(default)]
    pub events: Vec<Event>,
    /// QR codes.
    #[serde(default)]
    pub qr_codes: Vec<QrCode>,
    /// Media records.
    #[serde(default)]
    pub media: Vec<Media>,
}

/// On-disk snapshot envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Format version, see [`SNAPSHOT_VERSION`].
    pub version: u32,
    /// Time of the write.
    pub saved_at: DateTime<Utc>,
    /// The record set.
    pub records: RecordSet,
}
