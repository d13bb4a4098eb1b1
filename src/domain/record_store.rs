//! Map-based repository for every record kind.
//!
//! [`RecordStore`] keeps users, plans, events, QR codes and media in
//! `HashMap`s behind a single [`tokio::sync::RwLock`]. Mutations run
//! against a copy of the tables; the copy replaces the live tables only
//! after the snapshot (when configured) has been written, so memory and
//! disk never diverge.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{
    Event, EventId, Media, MediaId, PlanId, PricingPlan, QrCode, QrCodeId, QrToken, User,
    UserId, UserRole,
};
use crate::error::GalleryError;
use crate::persistence::{RecordSet, SnapshotStore};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    plans: HashMap<PlanId, PricingPlan>,
    events: HashMap<EventId, Event>,
    qr_codes: HashMap<QrCodeId, QrCode>,
    tokens: HashMap<QrToken, QrCodeId>,
    media: HashMap<MediaId, Media>,
}

impl Tables {
    fn from_records(records: RecordSet) -> Self {
        let mut tables = Self::default();
        for user in records.users {
            tables.users.insert(user.id.clone(), user);
        }
        for plan in records.plans {
            tables.plans.insert(plan.id.clone(), plan);
        }
        for event in records.events {
            tables.events.insert(event.id.clone(), event);
        }
        for qr in records.qr_codes {
            tables.tokens.insert(qr.token.clone(), qr.id.clone());
            tables.qr_codes.insert(qr.id.clone(), qr);
        }
        for media in records.media {
            tables.media.insert(media.id.clone(), media);
        }
        tables
    }

    fn to_records(&self) -> RecordSet {
        RecordSet {
            users: sorted(self.users.values().cloned(), |u| (u.created_at, u.id.clone())),
            plans: sorted(self.plans.values().cloned(), |p| (p.created_at, p.id.clone())),
            events: sorted(self.events.values().cloned(), |e| (e.created_at, e.id.clone())),
            qr_codes: sorted(self.qr_codes.values().cloned(), |q| (q.created_at, q.id.clone())),
            media: sorted(self.media.values().cloned(), |m| (m.uploaded_at, m.id.clone())),
        }
    }

    /// Adjusts the storage counters of an event and of its owning platform
    /// admin by `delta_gb`, clamping at zero.
    fn adjust_storage(&mut self, event_id: &EventId, delta_gb: f64) {
        let Some(event) = self.events.get_mut(event_id) else {
            return;
        };
        event.storage_used = (event.storage_used + delta_gb).max(0.0);
        let owner = event.platform_admin_id.clone();
        if let Some(user) = self.users.get_mut(&owner)
            && user.role == UserRole::PlatformAdmin
        {
            let used = user.storage_used.unwrap_or(0.0);
            user.storage_used = Some((used + delta_gb).max(0.0));
        }
    }

    /// Moves the user `from` to the id `to`, rewriting every reference.
    fn rekey_user(&mut self, from: &UserId, to: &UserId) -> Option<User> {
        let mut user = self.users.remove(from)?;
        user.id = to.clone();
        user.updated_at = chrono::Utc::now();
        for event in self.events.values_mut() {
            if &event.platform_admin_id == from {
                event.platform_admin_id = to.clone();
            }
            for admin in &mut event.event_admin_ids {
                if admin == from {
                    *admin = to.clone();
                }
            }
        }
        for media in self.media.values_mut() {
            if media.approved_by.as_ref() == Some(from) {
                media.approved_by = Some(to.clone());
            }
        }
        self.users.insert(to.clone(), user.clone());
        Some(user)
    }
}

/// How [`RecordStore::claim_user`] bound a subject to a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// The subject already had a record.
    Existing,
    /// A record created for the same email under another id now carries
    /// the subject's id.
    Linked(UserId),
    /// A new record was inserted.
    Created,
}

fn sorted<T, K: Ord>(items: impl Iterator<Item = T>, key: impl FnMut(&T) -> K) -> Vec<T> {
    let mut v: Vec<T> = items.collect();
    v.sort_by_key(key);
    v
}

/// Central store for all records.
#[derive(Debug, Default)]
pub struct RecordStore {
    tables: RwLock<Tables>,
    snapshots: Option<SnapshotStore>,
}

impl RecordStore {
    /// Creates an empty, memory-only store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `records`, persisting mutations to
    /// `snapshots` when given.
    #[must_use]
    pub fn from_records(records: RecordSet, snapshots: Option<SnapshotStore>) -> Self {
        Self {
            tables: RwLock::new(Tables::from_records(records)),
            snapshots,
        }
    }

    /// Opens a snapshot-backed store. When no snapshot exists yet, `seed`
    /// provides the initial records, which are written out immediately.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::PersistenceError`] if the snapshot exists but
    /// cannot be read, or the seed cannot be written.
    pub async fn open(
        snapshots: SnapshotStore,
        seed: impl FnOnce() -> RecordSet,
    ) -> Result<Self, GalleryError> {
        let records = match snapshots.load().await? {
            Some(records) => records,
            None => {
                let records = seed();
                snapshots.save(&records).await?;
                tracing::info!(path = %snapshots.path().display(), "snapshot seeded");
                records
            }
        };
        Ok(Self::from_records(records, Some(snapshots)))
    }

    /// Exports the full record set.
    pub async fn records(&self) -> RecordSet {
        self.tables.read().await.to_records()
    }

    /// Applies `f` to a copy of the tables, persists the copy and swaps it in.
    async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<T, GalleryError>,
    ) -> Result<T, GalleryError> {
        let mut tables = self.tables.write().await;
        let mut next = tables.clone();
        let out = f(&mut next)?;
        if let Some(snapshots) = &self.snapshots {
            snapshots.save(&next.to_records()).await?;
        }
        *tables = next;
        Ok(out)
    }

    // ── Users ───────────────────────────────────────────────────────────

    /// Returns every user, oldest first.
    pub async fn users(&self) -> Vec<User> {
        self.tables.read().await.to_records().users
    }

    /// Returns the user with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::UserNotFound`] if absent.
    pub async fn user(&self, id: &UserId) -> Result<User, GalleryError> {
        self.tables
            .read()
            .await
            .users
            .get(id)
            .cloned()
            .ok_or_else(|| GalleryError::UserNotFound(id.clone()))
    }

    /// Looks a user up by email, case-insensitively.
    pub async fn user_by_email(&self, email: &str) -> Option<User> {
        self.tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    /// Inserts a new user.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::UserAlreadyExists`] if the id or email is
    /// taken.
    pub async fn insert_user(&self, user: User) -> Result<User, GalleryError> {
        self.mutate(|t| {
            if t.users.contains_key(&user.id) {
                return Err(GalleryError::UserAlreadyExists(user.id.to_string()));
            }
            if t.users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
                return Err(GalleryError::UserAlreadyExists(user.email.clone()));
            }
            t.users.insert(user.id.clone(), user.clone());
            Ok(user)
        })
        .await
    }

    /// Binds an identity subject to its directory record in one write.
    ///
    /// Returns the subject's record when it exists. Otherwise a record with
    /// the same email is moved to the subject's id; identity emails are
    /// unique, so such a record was created before its owner signed up.
    /// Failing both, the record built by `fresh` is inserted.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::PersistenceError`] if the snapshot write fails.
    pub async fn claim_user(
        &self,
        subject: &UserId,
        email: &str,
        fresh: impl FnOnce() -> User,
    ) -> Result<(User, Registration), GalleryError> {
        self.mutate(|t| {
            if let Some(user) = t.users.get(subject) {
                return Ok((user.clone(), Registration::Existing));
            }
            let previous = t
                .users
                .values()
                .find(|u| u.email.eq_ignore_ascii_case(email))
                .map(|u| u.id.clone());
            if let Some(previous) = previous
                && let Some(user) = t.rekey_user(&previous, subject)
            {
                return Ok((user, Registration::Linked(previous)));
            }
            let user = fresh();
            t.users.insert(subject.clone(), user.clone());
            Ok((user, Registration::Created))
        })
        .await
    }

    /// Applies `f` to the user with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::UserNotFound`] if absent.
    pub async fn update_user(
        &self,
        id: &UserId,
        f: impl FnOnce(&mut User),
    ) -> Result<User, GalleryError> {
        self.mutate(|t| {
            let user = t
                .users
                .get_mut(id)
                .ok_or_else(|| GalleryError::UserNotFound(id.clone()))?;
            f(user);
            user.updated_at = chrono::Utc::now();
            Ok(user.clone())
        })
        .await
    }

    // ── Pricing plans ───────────────────────────────────────────────────

    /// Returns every plan, oldest first.
    pub async fn plans(&self) -> Vec<PricingPlan> {
        self.tables.read().await.to_records().plans
    }

    /// Returns the plan with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::PlanNotFound`] if absent.
    pub async fn plan(&self, id: &PlanId) -> Result<PricingPlan, GalleryError> {
        self.tables
            .read()
            .await
            .plans
            .get(id)
            .cloned()
            .ok_or_else(|| GalleryError::PlanNotFound(id.clone()))
    }

    /// Inserts a new plan.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::InvalidRequest`] on an id collision.
    pub async fn insert_plan(&self, plan: PricingPlan) -> Result<PricingPlan, GalleryError> {
        self.mutate(|t| {
            if t.plans.contains_key(&plan.id) {
                return Err(GalleryError::InvalidRequest(format!(
                    "plan {} already exists",
                    plan.id
                )));
            }
            t.plans.insert(plan.id.clone(), plan.clone());
            Ok(plan)
        })
        .await
    }

    /// Applies `f` to the plan with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::PlanNotFound`] if absent.
    pub async fn update_plan(
        &self,
        id: &PlanId,
        f: impl FnOnce(&mut PricingPlan),
    ) -> Result<PricingPlan, GalleryError> {
        self.mutate(|t| {
            let plan = t
                .plans
                .get_mut(id)
                .ok_or_else(|| GalleryError::PlanNotFound(id.clone()))?;
            f(plan);
            plan.updated_at = chrono::Utc::now();
            Ok(plan.clone())
        })
        .await
    }

    /// Removes the plan with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::PlanNotFound`] if absent.
    pub async fn remove_plan(&self, id: &PlanId) -> Result<PricingPlan, GalleryError> {
        self.mutate(|t| {
            t.plans
                .remove(id)
                .ok_or_else(|| GalleryError::PlanNotFound(id.clone()))
        })
        .await
    }

    // ── Events ──────────────────────────────────────────────────────────

    /// Returns every event, oldest first.
    pub async fn events(&self) -> Vec<Event> {
        self.tables.read().await.to_records().events
    }

    /// Returns the event with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::EventNotFound`] if absent.
    pub async fn event(&self, id: &EventId) -> Result<Event, GalleryError> {
        self.tables
            .read()
            .await
            .events
            .get(id)
            .cloned()
            .ok_or_else(|| GalleryError::EventNotFound(id.clone()))
    }

    /// Inserts a new event.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::InvalidRequest`] on an id collision.
    pub async fn insert_event(&self, event: Event) -> Result<Event, GalleryError> {
        self.mutate(|t| {
            if t.events.contains_key(&event.id) {
                return Err(GalleryError::InvalidRequest(format!(
                    "event {} already exists",
                    event.id
                )));
            }
            t.events.insert(event.id.clone(), event.clone());
            Ok(event)
        })
        .await
    }

    /// Applies `f` to the event with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::EventNotFound`] if absent.
    pub async fn update_event(
        &self,
        id: &EventId,
        f: impl FnOnce(&mut Event),
    ) -> Result<Event, GalleryError> {
        self.mutate(|t| {
            let event = t
                .events
                .get_mut(id)
                .ok_or_else(|| GalleryError::EventNotFound(id.clone()))?;
            f(event);
            event.updated_at = chrono::Utc::now();
            Ok(event.clone())
        })
        .await
    }

    /// Removes an event together with its QR codes and media, releasing the
    /// media's storage from the owner's quota.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::EventNotFound`] if absent.
    pub async fn remove_event(&self, id: &EventId) -> Result<Event, GalleryError> {
        self.mutate(|t| {
            if !t.events.contains_key(id) {
                return Err(GalleryError::EventNotFound(id.clone()));
            }
            let released: f64 = t
                .media
                .values()
                .filter(|m| &m.event_id == id)
                .map(Media::size_gb)
                .sum();
            t.adjust_storage(id, -released);
            t.media.retain(|_, m| &m.event_id != id);
            t.qr_codes.retain(|_, q| &q.event_id != id);
            let live: std::collections::HashSet<&QrCodeId> = t.qr_codes.keys().collect();
            t.tokens.retain(|_, qr_id| live.contains(qr_id));
            t.events
                .remove(id)
                .ok_or_else(|| GalleryError::EventNotFound(id.clone()))
        })
        .await
    }

    // ── QR codes ────────────────────────────────────────────────────────

    /// Returns the QR codes of an event, oldest first.
    pub async fn qr_codes_for_event(&self, event_id: &EventId) -> Vec<QrCode> {
        let tables = self.tables.read().await;
        sorted(
            tables
                .qr_codes
                .values()
                .filter(|q| &q.event_id == event_id)
                .cloned(),
            |q| (q.created_at, q.id.clone()),
        )
    }

    /// Returns the QR code with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::QrCodeNotFound`] if absent.
    pub async fn qr_code(&self, id: &QrCodeId) -> Result<QrCode, GalleryError> {
        self.tables
            .read()
            .await
            .qr_codes
            .get(id)
            .cloned()
            .ok_or_else(|| GalleryError::QrCodeNotFound(id.clone()))
    }

    /// Resolves a guest token and counts the scan.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::InvalidToken`] if no QR code carries `token`.
    pub async fn scan_qr_code(&self, token: &QrToken) -> Result<QrCode, GalleryError> {
        self.mutate(|t| {
            let id = t
                .tokens
                .get(token)
                .cloned()
                .ok_or_else(|| GalleryError::InvalidToken(token.clone()))?;
            let qr = t
                .qr_codes
                .get_mut(&id)
                .ok_or_else(|| GalleryError::InvalidToken(token.clone()))?;
            qr.scan_count = qr.scan_count.saturating_add(1);
            Ok(qr.clone())
        })
        .await
    }

    /// Inserts a QR code for an existing event.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::EventNotFound`] if the event is absent and
    /// [`GalleryError::InvalidRequest`] if the id or token is already used.
    pub async fn insert_qr_code(&self, qr: QrCode) -> Result<QrCode, GalleryError> {
        self.mutate(|t| {
            if !t.events.contains_key(&qr.event_id) {
                return Err(GalleryError::EventNotFound(qr.event_id.clone()));
            }
            if t.qr_codes.contains_key(&qr.id) || t.tokens.contains_key(&qr.token) {
                return Err(GalleryError::InvalidRequest(format!(
                    "QR code {} or its token already exists",
                    qr.id
                )));
            }
            t.tokens.insert(qr.token.clone(), qr.id.clone());
            t.qr_codes.insert(qr.id.clone(), qr.clone());
            Ok(qr)
        })
        .await
    }

    // ── Media ───────────────────────────────────────────────────────────

    /// Returns the media of an event, oldest first.
    pub async fn media_for_event(&self, event_id: &EventId) -> Vec<Media> {
        let tables = self.tables.read().await;
        sorted(
            tables
                .media
                .values()
                .filter(|m| &m.event_id == event_id)
                .cloned(),
            |m| (m.uploaded_at, m.id.clone()),
        )
    }

    /// Returns the media record with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::MediaNotFound`] if absent.
    pub async fn media(&self, id: &MediaId) -> Result<Media, GalleryError> {
        self.tables
            .read()
            .await
            .media
            .get(id)
            .cloned()
            .ok_or_else(|| GalleryError::MediaNotFound(id.clone()))
    }

    /// Inserts a media record and charges its size to the event and owner.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::EventNotFound`] if the event is absent and
    /// [`GalleryError::InvalidRequest`] on an id collision.
    pub async fn insert_media(&self, media: Media) -> Result<Media, GalleryError> {
        self.mutate(|t| {
            if !t.events.contains_key(&media.event_id) {
                return Err(GalleryError::EventNotFound(media.event_id.clone()));
            }
            if t.media.contains_key(&media.id) {
                return Err(GalleryError::InvalidRequest(format!(
                    "media {} already exists",
                    media.id
                )));
            }
            t.adjust_storage(&media.event_id, media.size_gb());
            t.media.insert(media.id.clone(), media.clone());
            Ok(media)
        })
        .await
    }

    /// Applies `f` to the media record with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::MediaNotFound`] if absent.
    pub async fn update_media(
        &self,
        id: &MediaId,
        f: impl FnOnce(&mut Media),
    ) -> Result<Media, GalleryError> {
        self.mutate(|t| {
            let media = t
                .media
                .get_mut(id)
                .ok_or_else(|| GalleryError::MediaNotFound(id.clone()))?;
            f(media);
            Ok(media.clone())
        })
        .await
    }

    /// Removes a media record if present, releasing its storage.
    ///
    /// Removing an absent id is not an error and returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::PersistenceError`] if the snapshot write fails.
    pub async fn remove_media(&self, id: &MediaId) -> Result<Option<Media>, GalleryError> {
        if !self.tables.read().await.media.contains_key(id) {
            return Ok(None);
        }
        self.mutate(|t| {
            let removed = t.media.remove(id);
            if let Some(media) = &removed {
                t.adjust_storage(&media.event_id, -media.size_gb());
            }
            Ok(removed)
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{FileType, QrRules};
    use crate::persistence::seed::demo_records;
    use chrono::Utc;

    fn seeded() -> RecordStore {
        RecordStore::from_records(demo_records(), None)
    }

    fn newcomer(id: &str, email: &str) -> User {
        User::new(UserId::new(id), email, UserRole::EventAdmin)
    }

    #[tokio::test]
    async fn claim_links_record_created_before_sign_up() {
        let store = seeded();
        let subject = UserId::new("subject-9");
        let Ok((user, outcome)) = store
            .claim_user(&subject, "PLATFORM@admin.com", || newcomer("subject-9", "x@y.com"))
            .await
        else {
            panic!("claim failed");
        };
        assert_eq!(outcome, Registration::Linked(UserId::new("user-2")));
        assert_eq!(user.id, subject);
        assert_eq!(user.role, UserRole::PlatformAdmin);
        assert!(store.user(&UserId::new("user-2")).await.is_err());

        let Ok(event) = store.event(&EventId::new("event-1")).await else {
            panic!("event missing");
        };
        assert_eq!(event.platform_admin_id, subject);

        let Ok((_, again)) = store
            .claim_user(&subject, "platform@admin.com", || newcomer("subject-9", "x@y.com"))
            .await
        else {
            panic!("second claim failed");
        };
        assert_eq!(again, Registration::Existing);
    }

    #[tokio::test]
    async fn concurrent_claims_create_one_record() {
        let store = std::sync::Arc::new(seeded());
        let before = store.users().await.len();
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let store = std::sync::Arc::clone(&store);
            tasks.spawn(async move {
                let subject = UserId::new("subject-1");
                store
                    .claim_user(&subject, "late@guest.com", || {
                        newcomer("subject-1", "late@guest.com")
                    })
                    .await
            });
        }
        let mut created = 0;
        while let Some(joined) = tasks.join_next().await {
            let Ok(Ok((_, outcome))) = joined else {
                panic!("claim failed");
            };
            if outcome == Registration::Created {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.users().await.len(), before + 1);
    }

    fn make_media(id: &str, size: u64) -> Media {
        Media {
            id: MediaId::new(id),
            event_id: EventId::new("event-1"),
            qr_code_id: QrCodeId::new("qr-1"),
            file_name: "a.jpg".to_string(),
            file_url: "http://files/a.jpg".to_string(),
            file_type: FileType::Image,
            file_size: size,
            uploaded_by: None,
            uploaded_by_phone: None,
            uploaded_by_token: None,
            is_approved: false,
            uploaded_at: Utc::now(),
            approved_at: None,
            approved_by: None,
        }
    }

    #[tokio::test]
    async fn seeded_lookups() {
        let store = seeded();
        assert_eq!(store.users().await.len(), 2);
        assert!(store.event(&EventId::new("event-1")).await.is_ok());
        assert!(store.user_by_email("SUPER@admin.com").await.is_some());
        assert!(matches!(
            store.event(&EventId::new("event-404")).await,
            Err(GalleryError::EventNotFound(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = seeded();
        let dup = User::new(UserId::generate(), "platform@admin.com", UserRole::EventAdmin);
        assert!(matches!(
            store.insert_user(dup).await,
            Err(GalleryError::UserAlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn scan_increments_count() {
        let store = seeded();
        let Ok(qr) = store.scan_qr_code(&QrToken::new("token-123")).await else {
            panic!("token should resolve");
        };
        assert_eq!(qr.scan_count, 11);
        assert!(matches!(
            store.scan_qr_code(&QrToken::new("nope")).await,
            Err(GalleryError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn qr_token_must_be_unique() {
        let store = seeded();
        let now = Utc::now();
        let qr = QrCode {
            id: QrCodeId::generate(),
            event_id: EventId::new("event-1"),
            name: "Copy".to_string(),
            token: QrToken::new("token-123"),
            rules: QrRules::default(),
            is_active: true,
            scan_count: 0,
            created_at: now,
            updated_at: now,
        };
        assert!(matches!(
            store.insert_qr_code(qr).await,
            Err(GalleryError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn media_storage_is_charged_and_released() {
        let store = seeded();
        let one_gb = 1024 * 1024 * 1024;
        assert!(store.insert_media(make_media("media-big", one_gb)).await.is_ok());

        let Ok(event) = store.event(&EventId::new("event-1")).await else {
            panic!("event-1 missing");
        };
        assert!((event.storage_used - 1.5).abs() < 1e-9);
        let Ok(owner) = store.user(&UserId::new("user-2")).await else {
            panic!("user-2 missing");
        };
        assert_eq!(owner.storage_used, Some(2.5));

        let removed = store.remove_media(&MediaId::new("media-big")).await;
        assert!(matches!(removed, Ok(Some(_))));
        let Ok(event) = store.event(&EventId::new("event-1")).await else {
            panic!("event-1 missing");
        };
        assert!((event.storage_used - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn removing_absent_media_is_silent() {
        let store = seeded();
        assert!(matches!(
            store.remove_media(&MediaId::new("media-none")).await,
            Ok(None)
        ));
    }

    #[tokio::test]
    async fn removing_event_cascades() {
        let store = seeded();
        let id = EventId::new("event-1");
        assert!(store.remove_event(&id).await.is_ok());
        assert!(store.qr_codes_for_event(&id).await.is_empty());
        assert!(store.media_for_event(&id).await.is_empty());
        assert!(store.scan_qr_code(&QrToken::new("token-123")).await.is_err());
    }

    #[tokio::test]
    async fn mutations_reach_the_snapshot() {
        let path = std::env::temp_dir()
            .join(format!("guestlens-store-{}", uuid::Uuid::new_v4().simple()))
            .join("snapshot.json");
        let Ok(store) = RecordStore::open(SnapshotStore::new(&path), demo_records).await else {
            panic!("open failed");
        };
        let _ = store.remove_media(&MediaId::new("media-2")).await;

        let Ok(reopened) = RecordStore::open(SnapshotStore::new(&path), RecordSet::default).await
        else {
            panic!("reopen failed");
        };
        let media = reopened.media_for_event(&EventId::new("event-1")).await;
        assert_eq!(media.len(), 1);
    }
}
