//! Durable session persistence.
//!
//! One JSON file in the application data directory holds the current
//! session, so a restart can restore a still-valid token. The on-disk field
//! names match the record the web client keeps in local storage, so the two
//! stay interchangeable.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::user::User;

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

/// On-disk shape of a saved session: `{email, id, token, tokenExpirationDate}`.
///
/// The expiration instant serializes as an RFC 3339 date string. A record
/// with a missing token deserializes with an empty one; deciding whether an
/// empty token is usable is the orchestrator's job, not this module's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub email: String,
    pub id: String,
    #[serde(default)]
    pub token: String,
    #[serde(rename = "tokenExpirationDate")]
    pub token_expiration: DateTime<Utc>,
}

impl From<&User> for StoredSession {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id.clone(),
            token: user.raw_token().to_string(),
            token_expiration: user.expires_at(),
        }
    }
}

impl StoredSession {
    pub fn into_user(self) -> User {
        User::new(self.email, self.id, self.token, self.token_expiration)
    }
}

/// Best-effort local persistence for the session record.
pub struct SessionFile {
    data_dir: PathBuf,
}

impl SessionFile {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Write the session record, replacing any previous one.
    pub fn save(&self, user: &User) -> Result<()> {
        let path = self.session_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let record = StoredSession::from(user);
        let contents = serde_json::to_string_pretty(&record)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write session file {}", path.display()))?;
        debug!(path = %path.display(), "session persisted");
        Ok(())
    }

    /// Read the persisted record, if one exists.
    ///
    /// Unreadable or unparseable content reads as "no session" rather than
    /// an error; a corrupt file must never block startup.
    pub fn load(&self) -> Option<StoredSession> {
        let path = self.session_path();
        let contents = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed session file");
                None
            }
        }
    }

    /// Delete the persisted record. No-op if none exists.
    pub fn clear(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to delete session file {}", path.display()))?;
        }
        Ok(())
    }

    fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }
}
