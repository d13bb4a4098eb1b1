//! User service: directory of application users.

use std::sync::Arc;

use chrono::Utc;

use crate::api::dto::CreateUserRequest;
use crate::domain::{EventBus, GalleryEvent, RecordStore, Registration, User, UserId, UserRole};
use crate::error::GalleryError;

/// Orchestration layer for user records.
#[derive(Debug, Clone)]
pub struct UserService {
    store: Arc<RecordStore>,
    event_bus: EventBus,
}

impl UserService {
    /// Creates a new `UserService`.
    #[must_use]
    pub fn new(store: Arc<RecordStore>, event_bus: EventBus) -> Self {
        Self { store, event_bus }
    }

    /// Returns every user, oldest first.
    pub async fn list_users(&self) -> Vec<User> {
        self.store.users().await
    }

    /// Returns the platform admins.
    pub async fn platform_admins(&self) -> Vec<User> {
        let mut users = self.store.users().await;
        users.retain(|u| u.role == UserRole::PlatformAdmin);
        users
    }

    /// Returns the user with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::UserNotFound`] if absent.
    pub async fn get_user(&self, id: &UserId) -> Result<User, GalleryError> {
        self.store.user(id).await
    }

    /// Creates a user on behalf of a super admin.
    ///
    /// Platform admins start with zero storage used and the quota of the
    /// request, or of their plan when the request gives none.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::InvalidRequest`] for a malformed email,
    /// [`GalleryError::PlanNotFound`] for an unknown plan and
    /// [`GalleryError::UserAlreadyExists`] for a taken email.
    pub async fn create_user(&self, req: CreateUserRequest) -> Result<User, GalleryError> {
        let email = normalize_email(&req.email)?;
        let mut user = User::new(UserId::generate(), email, req.role);
        user.display_name = req.display_name.filter(|n| !n.trim().is_empty());

        if req.role == UserRole::PlatformAdmin {
            let plan_limit = match &req.plan_id {
                Some(plan_id) => Some(self.store.plan(plan_id).await?.storage_limit_gb),
                None => None,
            };
            user.storage_used = Some(0.0);
            user.storage_limit = req.storage_limit.or(plan_limit).or(Some(0.0));
            user.plan_id = req.plan_id;
        }

        self.insert(user).await
    }

    /// Creates the user record for an identity subject that has none yet.
    ///
    /// Idempotent: when a record already exists it is returned unchanged and
    /// the flag is `false`. A record a super admin created for the same email
    /// is taken over by the subject, keeping its role; the flag is `false`
    /// as well. Otherwise a new event-admin record is created.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::InvalidRequest`] for a malformed email.
    pub async fn self_register(
        &self,
        subject: &UserId,
        email: &str,
        display_name: Option<String>,
    ) -> Result<(User, bool), GalleryError> {
        let email = normalize_email(email)?;
        let display_name = display_name.filter(|n| !n.trim().is_empty());
        let (user, registration) = self
            .store
            .claim_user(subject, &email, || {
                let mut user = User::new(subject.clone(), email.as_str(), UserRole::EventAdmin);
                user.display_name = display_name;
                user
            })
            .await?;

        match &registration {
            Registration::Existing => {
                tracing::debug!(user_id = %subject, "self-registration of existing user");
            }
            Registration::Linked(previous) => {
                tracing::info!(user_id = %subject, %previous, "directory record linked to identity");
            }
            Registration::Created => {
                let _ = self.event_bus.publish(GalleryEvent::UserRegistered {
                    user_id: user.id.clone(),
                    timestamp: Utc::now(),
                });
                tracing::info!(user_id = %user.id, role = user.role.as_str(), "user registered");
            }
        }
        Ok((user, registration == Registration::Created))
    }

    async fn insert(&self, user: User) -> Result<User, GalleryError> {
        let user = self.store.insert_user(user).await?;
        let _ = self.event_bus.publish(GalleryEvent::UserRegistered {
            user_id: user.id.clone(),
            timestamp: Utc::now(),
        });
        tracing::info!(user_id = %user.id, role = user.role.as_str(), "user registered");
        Ok(user)
    }

    /// Enables or disables a user.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::UserNotFound`] if absent.
    pub async fn set_active(&self, id: &UserId, active: bool) -> Result<User, GalleryError> {
        let user = self.store.update_user(id, |u| u.is_active = active).await?;
        let _ = self.event_bus.publish(GalleryEvent::UserStatusChanged {
            user_id: id.clone(),
            is_active: active,
            timestamp: Utc::now(),
        });
        tracing::info!(user_id = %id, active, "user status changed");
        Ok(user)
    }
}

fn normalize_email(email: &str) -> Result<String, GalleryError> {
    let email = email.trim().to_ascii_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(GalleryError::InvalidRequest(format!(
            "invalid email address: {email}"
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::PlanId;
    use crate::persistence::seed::demo_records;

    fn make_service() -> UserService {
        let store = Arc::new(RecordStore::from_records(demo_records(), None));
        UserService::new(store, EventBus::new(64))
    }

    fn request(email: &str, role: UserRole) -> CreateUserRequest {
        CreateUserRequest {
            email: email.into(),
            role,
            display_name: None,
            storage_limit: None,
            plan_id: None,
        }
    }

    #[tokio::test]
    async fn self_register_is_idempotent() {
        let svc = make_service();
        let subject = UserId::new("user-new");

        let Ok((user, created)) = svc
            .self_register(&subject, "new@guest.com", Some("New".into()))
            .await
        else {
            panic!("first registration failed");
        };
        assert!(created);
        assert_eq!(user.role, UserRole::EventAdmin);

        let Ok((again, created)) = svc.self_register(&subject, "new@guest.com", None).await else {
            panic!("second registration failed");
        };
        assert!(!created);
        assert_eq!(again.id, user.id);
        assert_eq!(again.display_name.as_deref(), Some("New"));
    }

    #[tokio::test]
    async fn self_register_takes_over_created_record() {
        let svc = make_service();
        let Ok(created) = svc
            .create_user(request("venue@x.com", UserRole::PlatformAdmin))
            .await
        else {
            panic!("create failed");
        };

        let subject = UserId::new("subject-venue");
        let Ok((user, fresh)) = svc.self_register(&subject, "Venue@X.com", None).await else {
            panic!("registration failed");
        };
        assert!(!fresh);
        assert_eq!(user.id, subject);
        assert_eq!(user.role, UserRole::PlatformAdmin);
        assert!(svc.get_user(&created.id).await.is_err());
    }

    #[tokio::test]
    async fn platform_admin_inherits_plan_quota() {
        let svc = make_service();
        let mut req = request("owner@venue.com", UserRole::PlatformAdmin);
        req.plan_id = Some(PlanId::new("plan-2"));
        let Ok(user) = svc.create_user(req).await else {
            panic!("create failed");
        };
        assert_eq!(user.storage_limit, Some(50.0));
        assert_eq!(user.storage_used, Some(0.0));
        assert_eq!(svc.platform_admins().await.len(), 2);
    }

    #[tokio::test]
    async fn malformed_email_is_rejected() {
        let svc = make_service();
        let result = svc.create_user(request("not-an-email", UserRole::EventAdmin)).await;
        assert!(matches!(result, Err(GalleryError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn disabling_keeps_role() {
        let svc = make_service();
        let id = UserId::new("user-2");
        let Ok(user) = svc.set_active(&id, false).await else {
            panic!("disable failed");
        };
        assert!(!user.is_active);
        assert_eq!(user.role, UserRole::PlatformAdmin);
    }
}
