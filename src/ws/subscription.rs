//! Per-connection subscription manager.
//!
//! Tracks which user IDs a WebSocket client follows and provides
//! server-side event filtering.

use std::collections::HashSet;

use crate::domain::UserId;

/// Manages the set of user subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed user IDs. If `subscribe_all` is true, this set is ignored.
    user_ids: HashSet<UserId>,
    /// Whether the client follows every user (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds user IDs to the subscription set; `"*"` enables the wildcard.
    /// Returns the explicit IDs that were added.
    pub fn subscribe(&mut self, ids: &[String]) -> Vec<UserId> {
        let mut added = Vec::new();
        for raw in ids.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            if raw == "*" {
                self.subscribe_all = true;
            } else {
                let id = UserId::new(raw);
                if self.user_ids.insert(id.clone()) {
                    added.push(id);
                }
            }
        }
        added
    }

    /// Removes user IDs from the subscription set; `"*"` drops the
    /// wildcard. Returns the explicit IDs that were removed.
    pub fn unsubscribe(&mut self, ids: &[String]) -> Vec<UserId> {
        let mut removed = Vec::new();
        for raw in ids.iter().map(|s| s.trim()) {
            if raw == "*" {
                self.subscribe_all = false;
                continue;
            }
            let id = UserId::new(raw);
            if self.user_ids.remove(&id) {
                removed.push(id);
            }
        }
        removed
    }

    /// Returns `true` if events for `user_id` pass the filter.
    #[must_use]
    pub fn matches(&self, user_id: &UserId) -> bool {
        self.subscribe_all || self.user_ids.contains(user_id)
    }

    /// Returns the number of explicitly subscribed user IDs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.user_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}
