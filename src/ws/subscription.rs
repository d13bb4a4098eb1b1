//! Per-connection subscription manager.
//!
//! Tracks which events a moderation client follows and filters the bus
//! server-side.

use std::collections::HashSet;

use crate::domain::{EventId, GalleryEvent};

/// Manages the set of event subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed event ids. Ignored while `subscribe_all` is set.
    event_ids: HashSet<EventId>,
    /// Whether the client follows everything (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds event ids to the subscription set.
    pub fn subscribe(&mut self, ids: &[EventId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.event_ids.extend(ids.iter().cloned());
    }

    /// Removes event ids from the subscription set. `wildcard` also drops
    /// the wildcard.
    pub fn unsubscribe(&mut self, ids: &[EventId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
        }
        for id in ids {
            self.event_ids.remove(id);
        }
    }

    /// Returns `true` if `event` passes the filter. Events that belong to no
    /// gallery event (users, plans) only reach wildcard subscribers.
    #[must_use]
    pub fn matches(&self, event: &GalleryEvent) -> bool {
        if self.subscribe_all {
            return true;
        }
        event.event_id().is_some_and(|id| self.event_ids.contains(id))
    }

    /// Returns `true` if `id` was subscribed explicitly.
    #[must_use]
    pub fn follows(&self, id: &EventId) -> bool {
        self.event_ids.contains(id)
    }

    /// Returns the number of explicitly subscribed event ids.
    #[must_use]
    pub fn count(&self) -> usize {
        self.event_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MediaId, UserId};
    use chrono::Utc;

    fn uploaded(event_id: &str) -> GalleryEvent {
        GalleryEvent::MediaUploaded {
            event_id: EventId::new(event_id),
            media_id: MediaId::new("media-9"),
            pending: true,
            timestamp: Utc::now(),
        }
    }

    fn registered() -> GalleryEvent {
        GalleryEvent::UserRegistered {
            user_id: UserId::new("user-9"),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(&uploaded("event-1")));
    }

    #[test]
    fn subscribe_specific_event() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[EventId::new("event-1")], false);
        assert!(mgr.matches(&uploaded("event-1")));
        assert!(!mgr.matches(&uploaded("event-2")));
        assert!(!mgr.matches(&registered()));
    }

    #[test]
    fn wildcard_matches_everything() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[], true);
        assert!(mgr.matches(&uploaded("event-7")));
        assert!(mgr.matches(&registered()));

        mgr.unsubscribe(&[], true);
        assert!(!mgr.is_subscribed_all());
    }

    #[test]
    fn unsubscribe_removes_event() {
        let mut mgr = SubscriptionManager::new();
        let id = EventId::new("event-1");
        mgr.subscribe(std::slice::from_ref(&id), false);
        assert_eq!(mgr.count(), 1);
        mgr.unsubscribe(&[id], false);
        assert!(!mgr.matches(&uploaded("event-1")));
        assert_eq!(mgr.count(), 0);
    }
}
