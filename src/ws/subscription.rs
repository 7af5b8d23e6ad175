//! Per-connection subscription manager.
//!
//! Tracks which topics (member ids, store names) a WebSocket client is
//! subscribed to and provides server-side event filtering.

use std::collections::HashSet;

use crate::domain::LedgerEvent;

/// Topic that matches every event.
pub const WILDCARD: &str = "*";

/// Manages the set of topic subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed topics. If `subscribe_all` is true, this set is ignored.
    topics: HashSet<String>,
    /// Whether the client subscribes to everything (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds topics to the subscription set. `"*"` enables the wildcard.
    pub fn subscribe<S: AsRef<str>>(&mut self, topics: &[S]) {
        for topic in topics {
            match topic.as_ref().trim() {
                "" => {}
                WILDCARD => self.subscribe_all = true,
                t => {
                    self.topics.insert(t.to_string());
                }
            }
        }
    }

    /// Removes topics from the subscription set. `"*"` clears the wildcard.
    pub fn unsubscribe<S: AsRef<str>>(&mut self, topics: &[S]) {
        for topic in topics {
            match topic.as_ref().trim() {
                WILDCARD => self.subscribe_all = false,
                t => {
                    self.topics.remove(t);
                }
            }
        }
    }

    /// Returns `true` if the event carries a subscribed topic.
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        self.subscribe_all || event.topics().iter().any(|t| self.topics.contains(*t))
    }

    /// Returns the number of explicitly subscribed topics.
    #[must_use]
    pub fn count(&self) -> usize {
        self.topics.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn credit(member: &str, store: Option<&str>) -> LedgerEvent {
        LedgerEvent::PointsCredited {
            member_id: member.into(),
            amount: 10,
            balance: 10,
            store_id: store.map(String::from),
            note: "Points Added".into(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(&credit("7777777777", None)));
    }

    #[test]
    fn member_topic_matches() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&["7777777777"]);
        assert!(mgr.matches(&credit("7777777777", None)));
        assert!(!mgr.matches(&credit("8888888888", None)));
    }

    #[test]
    fn store_topic_matches_any_member() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&["Pune Hardware"]);
        assert!(mgr.matches(&credit("8888888888", Some("Pune Hardware"))));
        assert!(!mgr.matches(&credit("8888888888", Some("Mumbai Tiles"))));
    }

    #[test]
    fn wildcard_matches_everything() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[WILDCARD]);
        assert!(mgr.matches(&credit("1", None)));
        mgr.unsubscribe(&[WILDCARD]);
        assert!(!mgr.matches(&credit("1", None)));
    }

    #[test]
    fn unsubscribe_removes_topic() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&["a", "b"]);
        assert_eq!(mgr.count(), 2);
        mgr.unsubscribe(&["a"]);
        assert_eq!(mgr.count(), 1);
        assert!(!mgr.matches(&credit("a", None)));
    }
}
