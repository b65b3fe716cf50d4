//! Session types: the server's record of one live client connection.
//!
//! A session is created on connect and destroyed on disconnect — there is
//! no reconnect-grace-period state machine here. Disconnect is immediate
//! cleanup (see the room crate's disconnect handling), so a session's
//! lifetime is exactly its connection's lifetime.

use parlor_protocol::{SessionId, UserId};

/// The result of resolving a handshake token via an [`crate::Authenticator`].
/// `user_id: None` means the connection is a guest.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub user_id: Option<UserId>,
    pub is_anonymous: bool,
}

/// One live client connection.
///
/// `user_id` is bound exactly once, at construction, from the
/// [`AuthResult`] the authenticator produced during the handshake. There
/// is deliberately no setter: the only way to get a `Session` with a
/// different `user_id` is to build a new one, which is what "one-write,
/// immutable after auth" means in practice — the type itself has no path
/// to a second write.
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: SessionId,
    user_id: Option<UserId>,
    pub is_anonymous: bool,
}

impl Session {
    pub fn new(session_id: SessionId, auth: AuthResult) -> Self {
        Self { session_id, user_id: auth.user_id, is_anonymous: auth.is_anonymous }
    }

    /// Read-only accessor — there is no corresponding setter.
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_session_has_no_user_id() {
        let session = Session::new(
            SessionId("s1".into()),
            AuthResult { user_id: None, is_anonymous: true },
        );
        assert!(session.user_id().is_none());
        assert!(session.is_anonymous);
    }

    #[test]
    fn test_authenticated_session_carries_user_id() {
        let session = Session::new(
            SessionId("s1".into()),
            AuthResult { user_id: Some(UserId("u1".into())), is_anonymous: false },
        );
        assert_eq!(session.user_id(), Some(&UserId("u1".into())));
    }
}
