//! Tracks, per authenticated user, the set of sessions currently open.
//! Presence transitions are driven by the *count* of sessions, not by any
//! single session — a user with two tabs open is still "online" after
//! closing one of them.

use std::collections::{HashMap, HashSet};

use parlor_protocol::{SessionId, UserId};

/// Whether a [`PresenceIndex`] mutation caused a presence transition the
/// caller should broadcast to friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceChange {
    /// No transition — the user was already online (add) or remains
    /// online (remove).
    None,
    /// The user's session count went from zero to one.
    WentOnline,
    /// The user's session count went from one to zero.
    WentOffline,
}

#[derive(Debug, Default)]
pub struct PresenceIndex {
    sessions_by_user: HashMap<UserId, HashSet<SessionId>>,
}

impl PresenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `session_id` under `user_id`. Returns [`PresenceChange::WentOnline`]
    /// the first time this user gains a session.
    pub fn add(&mut self, user_id: UserId, session_id: SessionId) -> PresenceChange {
        let set = self.sessions_by_user.entry(user_id).or_default();
        let was_empty = set.is_empty();
        set.insert(session_id);
        if was_empty { PresenceChange::WentOnline } else { PresenceChange::None }
    }

    /// Unregisters `session_id` from `user_id`. Returns [`PresenceChange::WentOffline`]
    /// when this was the user's last session; the entry is removed
    /// entirely in that case (empty entries do not linger).
    pub fn remove(&mut self, user_id: &UserId, session_id: &SessionId) -> PresenceChange {
        let Some(set) = self.sessions_by_user.get_mut(user_id) else {
            return PresenceChange::None;
        };
        set.remove(session_id);
        if set.is_empty() {
            self.sessions_by_user.remove(user_id);
            PresenceChange::WentOffline
        } else {
            PresenceChange::None
        }
    }

    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.sessions_by_user.get(user_id).is_some_and(|s| !s.is_empty())
    }

    pub fn online_users(&self) -> impl Iterator<Item = &UserId> {
        self.sessions_by_user.keys()
    }

    /// The sessions currently open for `user_id`, empty if offline.
    /// Used to fan a presence or friend event out to every tab/device a
    /// friend has open, not just one.
    pub fn sessions_of(&self, user_id: &UserId) -> impl Iterator<Item = &SessionId> {
        self.sessions_by_user.get(user_id).into_iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> UserId {
        UserId(s.into())
    }
    fn sid(s: &str) -> SessionId {
        SessionId(s.into())
    }

    #[test]
    fn test_first_session_transitions_online() {
        let mut idx = PresenceIndex::new();
        assert_eq!(idx.add(uid("u1"), sid("s1")), PresenceChange::WentOnline);
        assert_eq!(idx.add(uid("u1"), sid("s2")), PresenceChange::None);
    }

    #[test]
    fn test_last_session_transitions_offline_and_empties_entry() {
        let mut idx = PresenceIndex::new();
        idx.add(uid("u1"), sid("s1"));
        idx.add(uid("u1"), sid("s2"));
        assert_eq!(idx.remove(&uid("u1"), &sid("s1")), PresenceChange::None);
        assert_eq!(idx.remove(&uid("u1"), &sid("s2")), PresenceChange::WentOffline);
        assert!(!idx.is_online(&uid("u1")));
        assert_eq!(idx.online_users().count(), 0);
    }

    #[test]
    fn test_remove_unknown_user_is_noop() {
        let mut idx = PresenceIndex::new();
        assert_eq!(idx.remove(&uid("ghost"), &sid("s1")), PresenceChange::None);
    }
}
