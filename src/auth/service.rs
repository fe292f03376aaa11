//! Auth orchestrator: the single writer of the session state.
//!
//! Ties transport, store, persistence, and the expiry timer together. Every
//! session transition funnels through here, which is what keeps the
//! invariants simple: at most one armed timer, disarm before every new arm,
//! and a logout that always leaves the store empty, the persisted record
//! deleted, and the timer disarmed.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::error::AuthError;
use super::expiry::ExpiryTimer;
use super::persist::SessionFile;
use super::session::SessionStore;
use super::transport::IdentityClient;
use super::user::User;

/// Navigation requests the auth core raises toward the presentation layer.
/// Logging out is the only transition that navigates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavRequest {
    /// Return to the unauthenticated entry point (the sign-in screen).
    AuthEntry,
}

/// Drives the session lifecycle: login/signup/auto-login/logout.
///
/// Clone is cheap (shared inner state); the expiry timer's callback holds a
/// clone so a token reaching its expiration instant triggers the same
/// `logout` a user would.
#[derive(Clone)]
pub struct AuthService {
    inner: Arc<Inner>,
}

struct Inner {
    transport: IdentityClient,
    store: SessionStore,
    file: SessionFile,
    timer: Mutex<Option<ExpiryTimer>>,
    nav: mpsc::UnboundedSender<NavRequest>,
}

impl AuthService {
    pub fn new(
        transport: IdentityClient,
        file: SessionFile,
        nav: mpsc::UnboundedSender<NavRequest>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                store: SessionStore::new(),
                file,
                timer: Mutex::new(None),
                nav,
            }),
        }
    }

    /// The observable session state. Consumers read it; only this service
    /// writes it.
    pub fn store(&self) -> &SessionStore {
        &self.inner.store
    }

    /// Exchange credentials for a session. On failure the state stays
    /// Anonymous and the mapped provider message is returned.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self.inner.transport.login(email, password).await?;
        info!(email = %user.email, "login succeeded");
        self.establish_session(user.clone());
        Ok(user)
    }

    /// Create an account and establish its session. Symmetric to [`login`].
    ///
    /// [`login`]: AuthService::login
    pub async fn signup(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self.inner.transport.signup(email, password).await?;
        info!(email = %user.email, "signup succeeded");
        self.establish_session(user.clone());
        Ok(user)
    }

    /// Restore a persisted session, if any. Silent no-op when there is no
    /// record or the record carries no token.
    ///
    /// A record whose expiration instant already passed is still adopted:
    /// the timer arms with zero remaining time and fires near-immediately,
    /// which is how stale sessions get cleaned up on startup.
    pub fn auto_login(&self) {
        let Some(record) = self.inner.file.load() else {
            debug!("no persisted session");
            return;
        };
        if record.token.is_empty() {
            debug!("persisted session has no token, staying anonymous");
            return;
        }

        let user = record.into_user();
        let remaining = user.time_until_expiry();
        info!(email = %user.email, seconds_left = remaining.num_seconds(), "restoring persisted session");
        self.adopt_session(user, remaining);
    }

    /// End the session: empty the store, delete the persisted record,
    /// disarm the timer, and ask the presentation layer to navigate back to
    /// the sign-in screen. Safe to call from any state.
    pub fn logout(&self) {
        self.inner.store.set(None);
        if let Err(e) = self.inner.file.clear() {
            warn!(error = %e, "failed to delete persisted session");
        }
        self.disarm();
        let _ = self.inner.nav.send(NavRequest::AuthEntry);
        info!("logged out");
    }

    /// Shared tail of login/signup: adopt the session, then persist it.
    fn establish_session(&self, user: User) {
        let remaining = user.time_until_expiry();
        self.adopt_session(user.clone(), remaining);
        if let Err(e) = self.inner.file.save(&user) {
            warn!(error = %e, "failed to persist session");
        }
    }

    /// Push the identity into the store and (re)arm the expiry timer.
    /// Disarm always happens before the new arm, so a timer from a previous
    /// session can never fire into this one.
    fn adopt_session(&self, user: User, remaining: chrono::Duration) {
        // Disarm before the new identity becomes visible; a timer left over
        // from the previous session must never fire into this one.
        self.disarm();
        self.inner.store.set(Some(user));

        // Negative remaining lifetime clamps to zero: fire as soon as possible.
        let after = remaining.to_std().unwrap_or_default();
        let service = self.clone();
        let timer = ExpiryTimer::arm(after, async move {
            info!("session token expired");
            service.logout();
        });
        *self.inner.timer.lock().unwrap() = Some(timer);
    }

    fn disarm(&self) {
        if let Some(timer) = self.inner.timer.lock().unwrap().take() {
            timer.disarm();
        }
    }

    #[cfg(test)]
    fn has_armed_timer(&self) -> bool {
        self.inner
            .timer
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn service_in(dir: &TempDir) -> (AuthService, mpsc::UnboundedReceiver<NavRequest>) {
        let (nav_tx, nav_rx) = mpsc::unbounded_channel();
        let transport = IdentityClient::new("test-key".to_string()).unwrap();
        let file = SessionFile::new(dir.path().to_path_buf());
        (AuthService::new(transport, file, nav_tx), nav_rx)
    }

    fn user_expiring_in(token: &str, seconds: i64) -> User {
        User::new(
            "a@x.com".to_string(),
            "U1".to_string(),
            token.to_string(),
            Utc::now() + Duration::seconds(seconds),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_establish_session_populates_store_and_record() {
        let dir = TempDir::new().unwrap();
        let (service, _nav_rx) = service_in(&dir);

        service.establish_session(user_expiring_in("T1", 3600));

        let current = service.store().current().expect("session should exist");
        assert_eq!(current.email, "a@x.com");
        assert_eq!(current.id, "U1");
        assert_eq!(current.token(), Some("T1"));
        assert!(service.has_armed_timer());

        let record = service.inner.file.load().expect("record should be written");
        assert_eq!(record.email, "a@x.com");
        assert_eq!(record.id, "U1");
        assert_eq!(record.token, "T1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_clears_everything() {
        let dir = TempDir::new().unwrap();
        let (service, mut nav_rx) = service_in(&dir);
        service.establish_session(user_expiring_in("T1", 3600));

        service.logout();

        assert!(service.store().current().is_none());
        assert!(service.inner.file.load().is_none());
        assert!(!service.has_armed_timer());
        assert_eq!(nav_rx.try_recv(), Ok(NavRequest::AuthEntry));
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_from_anonymous_is_harmless() {
        let dir = TempDir::new().unwrap();
        let (service, mut nav_rx) = service_in(&dir);

        service.logout();

        assert!(service.store().current().is_none());
        assert_eq!(nav_rx.try_recv(), Ok(NavRequest::AuthEntry));
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_login_without_record_is_noop() {
        let dir = TempDir::new().unwrap();
        let (service, _nav_rx) = service_in(&dir);

        service.auto_login();

        assert!(service.store().current().is_none());
        assert!(!service.has_armed_timer());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_login_with_empty_token_is_noop() {
        let dir = TempDir::new().unwrap();
        let (service, _nav_rx) = service_in(&dir);
        service
            .inner
            .file
            .save(&user_expiring_in("", 3600))
            .unwrap();

        service.auto_login();

        assert!(service.store().current().is_none());
        assert!(!service.has_armed_timer());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_login_restores_valid_session() {
        let dir = TempDir::new().unwrap();
        let (service, _nav_rx) = service_in(&dir);
        service
            .inner
            .file
            .save(&user_expiring_in("T1", 3600))
            .unwrap();

        service.auto_login();

        assert_eq!(
            service.store().current().and_then(|u| u.token().map(String::from)),
            Some("T1".to_string())
        );
        assert!(service.has_armed_timer());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_login_with_expired_record_forces_logout() {
        let dir = TempDir::new().unwrap();
        let (service, mut nav_rx) = service_in(&dir);
        service
            .inner
            .file
            .save(&user_expiring_in("T1", -60))
            .unwrap();

        let mut rx = service.store().subscribe();
        service.auto_login();

        // Adopted first: authenticated state is observable before the
        // zero-delay timer lands.
        assert!(service.store().current().is_some());

        while service.store().current().is_some() {
            rx.changed().await.expect("store writer still alive");
        }

        assert!(service.inner.file.load().is_none());
        assert_eq!(nav_rx.try_recv(), Ok(NavRequest::AuthEntry));
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_logs_out_at_expiry_instant() {
        let dir = TempDir::new().unwrap();
        let (service, mut nav_rx) = service_in(&dir);
        service.establish_session(user_expiring_in("T1", 30));

        let mut rx = service.store().subscribe();
        while service.store().current().is_some() {
            rx.changed().await.expect("store writer still alive");
        }

        assert!(service.inner.file.load().is_none());
        assert!(!service.has_armed_timer());
        assert_eq!(nav_rx.try_recv(), Ok(NavRequest::AuthEntry));
    }

    #[tokio::test(start_paused = true)]
    async fn test_relogin_over_already_due_timer_keeps_new_session() {
        let dir = TempDir::new().unwrap();
        let (service, mut nav_rx) = service_in(&dir);

        // The first session's timer is due the moment it is armed; the
        // replacement must disarm it before the new identity is published,
        // so its logout can never tear down the second session.
        service.establish_session(user_expiring_in("T1", -60));
        service.establish_session(user_expiring_in("T2", 3600));

        tokio::time::sleep(std::time::Duration::from_secs(5)).await;

        assert_eq!(
            service.store().current().and_then(|u| u.token().map(String::from)),
            Some("T2".to_string())
        );
        assert!(service.inner.file.load().is_some());
        assert!(nav_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_relogin_keeps_only_newest_timer() {
        let dir = TempDir::new().unwrap();
        let (service, mut nav_rx) = service_in(&dir);

        // First session would expire in one second; the second supersedes it.
        service.establish_session(user_expiring_in("T1", 1));
        service.establish_session(user_expiring_in("T2", 3600));

        // Sleep well past the first expiry. If its timer were still armed,
        // the second session would have been logged out here.
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;

        assert_eq!(
            service.store().current().and_then(|u| u.token().map(String::from)),
            Some("T2".to_string())
        );
        assert!(service.has_armed_timer());
        assert!(service.inner.file.load().is_some());
        assert!(nav_rx.try_recv().is_err());
    }
}
