//! Session and authentication lifecycle.
//!
//! This module is the auth core of the client:
//! - `IdentityClient`: credential exchange with the identity provider
//! - `SessionStore`: observable "who is logged in" state
//! - `ExpiryTimer`: one-shot forced-logout timer
//! - `SessionFile`: durable session record on disk
//! - `AuthService`: the orchestrator tying the pieces together
//!
//! Tokens are never refreshed in place; when one expires the session is
//! force-logged-out and the user signs in again.

pub mod error;
pub mod expiry;
pub mod persist;
pub mod service;
pub mod session;
pub mod transport;
pub mod user;

pub use error::AuthError;
pub use expiry::ExpiryTimer;
pub use persist::{SessionFile, StoredSession};
pub use service::{AuthService, NavRequest};
pub use session::SessionStore;
pub use transport::{AuthResponseData, IdentityClient};
pub use user::User;
