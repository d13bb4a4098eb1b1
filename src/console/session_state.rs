//! Process-wide holder of the signed-in application user.

use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::User;

/// Last fetched application user, broadcast to subscribers on change.
///
/// Cloning shares the same underlying channel.
#[derive(Debug, Clone)]
pub struct SessionState {
    tx: Arc<watch::Sender<Option<User>>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Latest value.
    #[must_use]
    pub fn current(&self) -> Option<User> {
        self.tx.borrow().clone()
    }

    /// Registers a change listener. Dropping the receiver releases it.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.tx.subscribe()
    }

    /// Publishes `user` to every subscriber. Works with no subscribers.
    pub fn set(&self, user: Option<User>) {
        tracing::debug!(user_id = ?user.as_ref().map(|u| u.id.as_str()), "session user updated");
        let _ = self.tx.send_replace(user);
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{UserId, UserRole};

    #[test]
    fn set_without_subscribers_is_kept() {
        let state = SessionState::new();
        let user = User::new(UserId::new("user-1"), "a@b.com", UserRole::SuperAdmin);
        state.set(Some(user.clone()));
        assert_eq!(state.current(), Some(user));
    }

    #[tokio::test]
    async fn subscribers_see_changes_and_release_on_drop() {
        let state = SessionState::new();
        let mut rx = state.subscribe();
        assert_eq!(state.subscriber_count(), 1);

        state.set(Some(User::new(UserId::new("user-2"), "p@b.com", UserRole::PlatformAdmin)));
        assert!(rx.changed().await.is_ok());
        assert!(rx.borrow_and_update().is_some());

        drop(rx);
        assert_eq!(state.subscriber_count(), 0);
    }
}
