//! HTTP transport for the identity provider.
//!
//! Issues sign-in and sign-up requests against the hosted identity toolkit
//! and converts responses into [`User`] values. Provider failures (and any
//! network or decoding failure) are collapsed into [`AuthError`] so callers
//! only ever see the stable user-facing messages.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::AuthError;
use super::user::User;

// ============================================================================
// Constants
// ============================================================================

/// Sign-in endpoint (email/password exchange for a secure token)
const SIGN_IN_URL: &str =
    "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword";

/// Sign-up endpoint (account creation, returns the same token shape)
const SIGN_UP_URL: &str = "https://identitytoolkit.googleapis.com/v1/accounts:signUp";

/// HTTP request timeout in seconds.
/// 30s allows for slow provider responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Request body for both sign-in and sign-up.
#[derive(Debug, Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(rename = "returnSecureToken")]
    return_secure_token: bool,
}

/// Success body returned by the provider for sign-in and sign-up.
///
/// `expiresIn` is a relative lifetime in seconds, delivered as a string.
/// The refresh token is part of the wire format but is never exchanged;
/// full re-login is the only renewal path.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct AuthResponseData {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(rename = "idToken")]
    pub id_token: String,
    pub email: String,
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: String,
    #[serde(rename = "expiresIn")]
    pub expires_in: String,
    #[serde(rename = "localId")]
    pub local_id: String,
    #[serde(default)]
    pub registered: Option<bool>,
}

/// Client for the identity provider.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct IdentityClient {
    client: Client,
    api_key: String,
}

impl IdentityClient {
    /// Create a new identity client with the static provider API key.
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, api_key })
    }

    /// Exchange email/password for an authenticated [`User`].
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.request(SIGN_IN_URL, email, password).await
    }

    /// Create an account and return the authenticated [`User`].
    pub async fn signup(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.request(SIGN_UP_URL, email, password).await
    }

    async fn request(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let url = format!("{}?key={}", endpoint, self.api_key);
        let body = CredentialsBody {
            email,
            password,
            return_secure_token: true,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "identity provider request failed");
                AuthError::Unknown
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            debug!(status = %status, "identity provider rejected credentials");
            return Err(AuthError::from_error_body(&text));
        }

        let data: AuthResponseData = response.json().await.map_err(|e| {
            warn!(error = %e, "failed to parse identity provider response");
            AuthError::Unknown
        })?;

        user_from_response(data, Utc::now())
    }
}

/// Convert a provider success body into a [`User`], anchoring the relative
/// `expiresIn` lifetime to the wall clock at response receipt.
fn user_from_response(
    data: AuthResponseData,
    received_at: DateTime<Utc>,
) -> Result<User, AuthError> {
    let seconds: i64 = data.expires_in.parse().map_err(|_| {
        warn!(expires_in = %data.expires_in, "provider returned unparseable expiresIn");
        AuthError::Unknown
    })?;

    // A lifetime too large to represent is as malformed as a non-numeric one.
    let expires_at = Duration::try_seconds(seconds)
        .and_then(|lifetime| received_at.checked_add_signed(lifetime))
        .ok_or_else(|| {
            warn!(expires_in = %data.expires_in, "provider returned out-of-range expiresIn");
            AuthError::Unknown
        })?;

    Ok(User::new(data.email, data.local_id, data.id_token, expires_at))
}
