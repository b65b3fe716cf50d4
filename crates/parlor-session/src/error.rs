//! Error types for the session layer.

use parlor_protocol::SessionId;

/// Errors that can occur during session management.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Authentication failed — the token was invalid, expired, or rejected
    /// by the [`crate::Authenticator`].
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// No session exists for the given session id.
    #[error("session not found: {0}")]
    NotFound(SessionId),
}
