//! Observable holder of the current session.

// Allow dead code: subscription surface is for UI consumers
#![allow(dead_code)]

use tokio::sync::watch;

use super::user::User;

/// Single source of truth for "who is logged in."
///
/// Holds `Option<User>` behind a watch channel: the orchestrator is the only
/// writer, and any number of readers take synchronous snapshots or subscribe
/// for changes. Writes are total replacements of the value, never field
/// mutation, so readers can never observe a half-updated session.
///
/// Subscribers see the value current at subscription time, then every later
/// replacement in publication order; a reader that falls behind observes only
/// the newest value, never a reordered one.
#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: watch::Sender<Option<User>>,
}

impl SessionStore {
    /// Create a store with no authenticated session.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Synchronous snapshot of the current session.
    pub fn current(&self) -> Option<User> {
        self.tx.borrow().clone()
    }

    /// Replace the session wholesale and notify all subscribers.
    pub fn set(&self, user: Option<User>) {
        self.tx.send_replace(user);
    }

    /// Subscribe to session changes. The receiver immediately holds the
    /// current value.
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.tx.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn test_user(token: &str) -> User {
        User::new(
            "a@x.com".to_string(),
            "U1".to_string(),
            token.to_string(),
            Utc::now() + Duration::hours(1),
        )
    }

    #[test]
    fn test_starts_anonymous() {
        let store = SessionStore::new();
        assert!(store.current().is_none());
    }

    #[test]
    fn test_set_replaces_wholesale() {
        let store = SessionStore::new();
        store.set(Some(test_user("T1")));
        assert_eq!(store.current().unwrap().token(), Some("T1"));

        store.set(Some(test_user("T2")));
        assert_eq!(store.current().unwrap().token(), Some("T2"));

        store.set(None);
        assert!(store.current().is_none());
    }

    #[tokio::test]
    async fn test_subscriber_sees_current_value_then_changes() {
        let store = SessionStore::new();
        store.set(Some(test_user("T1")));

        let mut rx = store.subscribe();
        assert_eq!(rx.borrow().as_ref().and_then(|u| u.token()), Some("T1"));

        store.set(None);
        rx.changed().await.expect("sender still alive");
        assert!(rx.borrow().is_none());
    }

    #[test]
    fn test_set_without_subscribers_does_not_fail() {
        let store = SessionStore::new();
        // No receivers exist; a replacement must still be recorded.
        store.set(Some(test_user("T1")));
        assert!(store.current().is_some());
    }
}
