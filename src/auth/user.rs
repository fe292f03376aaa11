//! Authenticated user identity.

use chrono::{DateTime, Duration, Utc};

/// One authenticated principal: who is logged in, their bearer token, and
/// when that token stops being usable.
///
/// The token is replaced wholesale on every login; there is no refresh-token
/// exchange, so an expired `User` can only be renewed by logging in again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub email: String,
    pub id: String,
    token: String,
    token_expiration: DateTime<Utc>,
}

impl User {
    pub fn new(
        email: String,
        id: String,
        token: String,
        token_expiration: DateTime<Utc>,
    ) -> Self {
        Self {
            email,
            id,
            token,
            token_expiration,
        }
    }

    /// Get the bearer token if it is still usable.
    ///
    /// Returns `None` once the expiration instant has passed, and also when
    /// the token is empty (a restored record with no token counts as
    /// expired for authorization purposes).
    pub fn token(&self) -> Option<&str> {
        if self.token.is_empty() || Utc::now() > self.token_expiration {
            None
        } else {
            Some(&self.token)
        }
    }

    /// Raw token string regardless of validity. Used by the persistence
    /// layer, which stores the record as-is.
    pub(crate) fn raw_token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.token_expiration
    }

    pub fn time_until_expiry(&self) -> Duration {
        self.token_expiration - Utc::now()
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self) -> i64 {
        self.time_until_expiry().num_minutes().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_expiring_in(seconds: i64) -> User {
        User::new(
            "a@x.com".to_string(),
            "U1".to_string(),
            "T1".to_string(),
            Utc::now() + Duration::seconds(seconds),
        )
    }

    #[test]
    fn test_token_valid_before_expiry() {
        let user = user_expiring_in(3600);
        assert_eq!(user.token(), Some("T1"));
    }

    #[test]
    fn test_token_gone_after_expiry() {
        let user = user_expiring_in(-1);
        assert_eq!(user.token(), None);
    }

    #[test]
    fn test_empty_token_counts_as_expired() {
        let user = User::new(
            "a@x.com".to_string(),
            "U1".to_string(),
            String::new(),
            Utc::now() + Duration::hours(1),
        );
        assert_eq!(user.token(), None);
    }

    #[test]
    fn test_minutes_until_expiry_clamps_at_zero() {
        let user = user_expiring_in(-3600);
        assert_eq!(user.minutes_until_expiry(), 0);
        assert!(user_expiring_in(3600).minutes_until_expiry() >= 59);
    }
}
