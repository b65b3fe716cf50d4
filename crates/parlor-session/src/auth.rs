//! Authentication hook for resolving a handshake token into an identity.
//!
//! This crate doesn't implement authentication itself — that's the auth
//! broker's job (JWT validation, Firebase, a custom service, whatever).
//! Instead it defines the [`Authenticator`] trait: a single async method
//! that takes a token and returns an [`AuthResult`]. A null `user_id`
//! means the caller is a guest — guests are still allowed to play.

use crate::session::AuthResult;
use crate::SessionError;

/// Resolves a client's auth token into an identity.
///
/// `Send + Sync + 'static` — shareable across async tasks and long-lived
/// for the life of the server.
///
/// ```rust
/// use parlor_session::{Authenticator, AuthResult, SessionError};
///
/// /// Treats any non-empty token as a user id. Only for development.
/// struct DevAuthenticator;
///
/// impl Authenticator for DevAuthenticator {
///     async fn authenticate(&self, token: &str) -> Result<AuthResult, SessionError> {
///         if token.is_empty() {
///             Ok(AuthResult { user_id: None, is_anonymous: true })
///         } else {
///             Ok(AuthResult {
///                 user_id: Some(parlor_protocol::UserId(token.to_string())),
///                 is_anonymous: false,
///             })
///         }
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Resolves `token`, or degrades the caller to a guest.
    ///
    /// A collaborator failure (the auth broker being down) is recoverable
    /// per the error handling design: callers should treat an `Err` here
    /// as "fall back to guest" rather than refusing the connection.
    fn authenticate(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<AuthResult, SessionError>> + Send;
}
