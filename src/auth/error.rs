use serde::Deserialize;
use thiserror::Error;

/// User-facing authentication failure.
///
/// Every failure path out of the identity provider collapses into one of
/// these variants, and the `Display` strings are shown to the user verbatim.
/// Raw provider payloads never leave this module.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("This email exists already!")]
    EmailExists,

    #[error("Please enter a valid email!")]
    InvalidEmail,

    #[error("Incorrect credentials!")]
    IncorrectCredentials,

    #[error("This user account has been disabled by an administrator!")]
    UserDisabled,

    #[error("An unknown error occurred!")]
    Unknown,
}

/// Error body shape used by the identity provider:
/// `{"error": {"message": "SOME_CODE", ...}}`
#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    message: String,
}

impl AuthError {
    /// Map a provider error code to its user-facing variant.
    /// Unrecognized codes fall through to `Unknown`.
    pub fn from_provider_code(code: &str) -> Self {
        match code {
            "EMAIL_EXISTS" => AuthError::EmailExists,
            "INVALID_EMAIL" => AuthError::InvalidEmail,
            "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" => AuthError::IncorrectCredentials,
            "USER_DISABLED" => AuthError::UserDisabled,
            _ => AuthError::Unknown,
        }
    }

    /// Parse a non-success response body from the provider.
    /// A structurally malformed body maps to `Unknown`.
    pub fn from_error_body(body: &str) -> Self {
        match serde_json::from_str::<ProviderErrorBody>(body) {
            Ok(parsed) => Self::from_provider_code(&parsed.error.message),
            Err(_) => AuthError::Unknown,
        }
    }
}
