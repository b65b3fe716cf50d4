//! Tracks every live session. Created on connect, destroyed on
//! disconnect — there is no expiry sweep because there is no grace period
//! to expire out of.

use std::collections::HashMap;

use parlor_protocol::SessionId;
use rand::Rng;

use crate::session::{AuthResult, Session};
use crate::SessionError;

/// Process-wide session table.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<SessionId, Session>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self { sessions: HashMap::new() }
    }

    /// Mints a fresh `SessionId` and stores a new session bound to `auth`.
    pub fn create(&mut self, auth: AuthResult) -> &Session {
        let session_id = generate_session_id();
        let session = Session::new(session_id.clone(), auth);
        self.sessions.insert(session_id.clone(), session);
        self.sessions.get(&session_id).expect("just inserted")
    }

    /// Removes and returns the session, e.g. on disconnect.
    pub fn destroy(&mut self, session_id: &SessionId) -> Result<Session, SessionError> {
        self.sessions
            .remove(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.clone()))
    }

    pub fn get(&self, session_id: &SessionId) -> Option<&Session> {
        self.sessions.get(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

fn generate_session_id() -> SessionId {
    let bytes: [u8; 16] = rand::rng().random();
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    SessionId(hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guest() -> AuthResult {
        AuthResult { user_id: None, is_anonymous: true }
    }

    #[test]
    fn test_create_returns_distinct_session_ids() {
        let mut mgr = SessionManager::new();
        let a = mgr.create(guest()).session_id.clone();
        let b = mgr.create(guest()).session_id.clone();
        assert_ne!(a, b);
        assert_eq!(mgr.len(), 2);
    }

    #[test]
    fn test_destroy_removes_session() {
        let mut mgr = SessionManager::new();
        let id = mgr.create(guest()).session_id.clone();
        assert!(mgr.destroy(&id).is_ok());
        assert!(mgr.get(&id).is_none());
    }

    #[test]
    fn test_destroy_unknown_session_errors() {
        let mut mgr = SessionManager::new();
        let result = mgr.destroy(&SessionId("nope".into()));
        assert!(matches!(result, Err(SessionError::NotFound(_))));
    }
}
