//! Demo record set used when no snapshot exists.

use chrono::Utc;

use super::models::RecordSet;
use crate::domain::{
    Event, EventId, FileType, Media, MediaId, PlanId, PricingPlan, QrCode, QrCodeId, QrRules,
    QrToken, User, UserId, UserRole,
};

/// Email of the seeded super admin.
pub const SUPER_ADMIN_EMAIL: &str = "super@admin.com";
/// Email of the seeded platform admin.
pub const PLATFORM_ADMIN_EMAIL: &str = "platform@admin.com";

fn plan(id: &str, name: &str, price: f64, storage_limit_gb: f64) -> PricingPlan {
    let now = Utc::now();
    PricingPlan {
        id: PlanId::new(id),
        name: name.to_string(),
        storage_limit_gb,
        price,
        currency: "USD".to_string(),
        is_active: true,
        features: vec![format!("{name} Plan")],
        created_at: now,
        updated_at: now,
    }
}

fn media(id: &str, approved: bool, uploaded_by: &str) -> Media {
    Media {
        id: MediaId::new(id),
        event_id: EventId::new("event-1"),
        qr_code_id: QrCodeId::new("qr-1"),
        file_name: format!("{id}.jpg"),
        file_url: "https://via.placeholder.com/300".to_string(),
        file_type: FileType::Image,
        file_size: 0,
        uploaded_by: Some(uploaded_by.to_string()),
        uploaded_by_phone: None,
        uploaded_by_token: Some(QrToken::new("token-123")),
        is_approved: approved,
        uploaded_at: Utc::now(),
        approved_at: None,
        approved_by: None,
    }
}

/// Builds the demo data set: a super admin, a platform admin, three plans,
/// one wedding event with a guest QR code, one approved and one pending
/// photo.
#[must_use]
pub fn demo_records() -> RecordSet {
    let now = Utc::now();

    let mut super_admin = User::new(UserId::new("user-1"), SUPER_ADMIN_EMAIL, UserRole::SuperAdmin);
    super_admin.display_name = Some("Super Admin".to_string());

    let mut platform_admin = User::new(
        UserId::new("user-2"),
        PLATFORM_ADMIN_EMAIL,
        UserRole::PlatformAdmin,
    );
    platform_admin.display_name = Some("Platform Admin".to_string());
    platform_admin.storage_used = Some(1.5);
    platform_admin.storage_limit = Some(10.0);

    let event = Event {
        id: EventId::new("event-1"),
        name: "Wedding 2024".to_string(),
        description: Some("John and Jane Wedding".to_string()),
        platform_admin_id: UserId::new("user-2"),
        event_admin_ids: Vec::new(),
        pricing_plan_id: None,
        expires_at: None,
        is_active: true,
        storage_used: 0.5,
        created_at: now,
        updated_at: now,
    };

    let qr = QrCode {
        id: QrCodeId::new("qr-1"),
        event_id: EventId::new("event-1"),
        name: "Main Guest QR".to_string(),
        token: QrToken::new("token-123"),
        rules: QrRules::default(),
        is_active: true,
        scan_count: 10,
        created_at: now,
        updated_at: now,
    };

    RecordSet {
        users: vec![super_admin, platform_admin],
        plans: vec![
            plan("plan-1", "Basic", 0.0, 5.0),
            plan("plan-2", "Pro", 29.0, 50.0),
            plan("plan-3", "Enterprise", 99.0, 500.0),
        ],
        events: vec![event],
        qr_codes: vec![qr],
        media: vec![media("media-1", true, "guest-1"), media("media-2", false, "guest-2")],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_has_one_pending_photo() {
        let records = demo_records();
        let pending = records.media.iter().filter(|m| !m.is_approved).count();
        assert_eq!(pending, 1);
        assert_eq!(records.plans.len(), 3);
        assert!(records.qr_codes.iter().any(|q| q.token.as_str() == "token-123"));
    }
}
