//! Friend-request / room-invite collaborator. Durable friendships and
//! room invites live outside the game core, which only needs an
//! interface for them — this module is that interface (mirroring the
//! shape of [`parlor_session::Authenticator`] and
//! [`parlor_session::RateLimiter`]) plus an in-memory reference
//! implementation so the event handlers that consume it are fully
//! exercised without a real directory service.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use parlor_protocol::{FriendErrorCode, FriendRequestView, RoomId, RoomInviteView, UserId};
use uuid::Uuid;

/// Upper bound on a single user's friend list. Arbitrary but finite —
/// without some cap `MAX_FRIENDS_REACHED` in the wire error taxonomy
/// would never be reachable.
const MAX_FRIENDS: usize = 500;

pub trait FriendsDirectory: Send + Sync + 'static {
    /// The user ids `user` currently has as friends (for presence fanout).
    fn friends_of(&self, user: &UserId) -> Vec<UserId>;

    fn send_request(&self, from: &UserId, to: &UserId) -> Result<String, FriendErrorCode>;
    fn accept_request(&self, user: &UserId, request_id: &str) -> Result<UserId, FriendErrorCode>;
    fn decline_request(&self, user: &UserId, request_id: &str) -> Result<(), FriendErrorCode>;
    fn cancel_request(&self, user: &UserId, request_id: &str) -> Result<(), FriendErrorCode>;
    fn remove_friend(&self, user: &UserId, other: &UserId);
    fn pending_requests(&self, user: &UserId) -> Vec<FriendRequestView>;

    fn send_invite(&self, from: &UserId, to: &UserId, room_id: &RoomId) -> Result<String, FriendErrorCode>;
    fn respond_invite(
        &self,
        user: &UserId,
        invite_id: &str,
        accept: bool,
    ) -> Result<Option<(UserId, RoomId)>, FriendErrorCode>;
    fn pending_invites(&self, user: &UserId) -> Vec<RoomInviteView>;
}

struct FriendRequest {
    from: UserId,
    to: UserId,
}

struct RoomInvite {
    from: UserId,
    to: UserId,
    room_id: RoomId,
}

#[derive(Default)]
struct State {
    friends: HashMap<UserId, HashSet<UserId>>,
    requests: HashMap<String, FriendRequest>,
    invites: HashMap<String, RoomInvite>,
}

/// In-memory reference [`FriendsDirectory`]. A real deployment would swap
/// this for one backed by durable storage behind the same trait;
/// `DATABASE_ERROR` is reserved for that implementation and never
/// returned here, the same way the engine's `GameError::SelfRequest`
/// (vote validation) is reserved without ever being raised by this
/// crate's vote logic.
#[derive(Default)]
pub struct InMemoryFriendsDirectory {
    state: Mutex<State>,
}

impl InMemoryFriendsDirectory {
    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("friends directory mutex poisoned")
    }
}

impl FriendsDirectory for InMemoryFriendsDirectory {
    fn friends_of(&self, user: &UserId) -> Vec<UserId> {
        self.lock().friends.get(user).map(|s| s.iter().cloned().collect()).unwrap_or_default()
    }

    fn send_request(&self, from: &UserId, to: &UserId) -> Result<String, FriendErrorCode> {
        if to.0.trim().is_empty() {
            return Err(FriendErrorCode::InvalidUserId);
        }
        if from == to {
            return Err(FriendErrorCode::SelfRequest);
        }
        let mut state = self.lock();
        if state.friends.get(from).is_some_and(|s| s.contains(to)) {
            return Err(FriendErrorCode::AlreadyFriends);
        }
        let id = Uuid::new_v4().to_string();
        state.requests.insert(id.clone(), FriendRequest { from: from.clone(), to: to.clone() });
        Ok(id)
    }

    fn accept_request(&self, user: &UserId, request_id: &str) -> Result<UserId, FriendErrorCode> {
        let mut state = self.lock();
        let req = state.requests.get(request_id).ok_or(FriendErrorCode::RequestNotFound)?;
        if req.to != *user {
            return Err(FriendErrorCode::NotAuthorized);
        }
        let from = req.from.clone();
        let user_count = state.friends.get(user).map(HashSet::len).unwrap_or(0);
        let from_count = state.friends.get(&from).map(HashSet::len).unwrap_or(0);
        if user_count >= MAX_FRIENDS || from_count >= MAX_FRIENDS {
            return Err(FriendErrorCode::MaxFriendsReached);
        }
        state.requests.remove(request_id);
        state.friends.entry(user.clone()).or_default().insert(from.clone());
        state.friends.entry(from.clone()).or_default().insert(user.clone());
        Ok(from)
    }

    fn decline_request(&self, user: &UserId, request_id: &str) -> Result<(), FriendErrorCode> {
        let mut state = self.lock();
        let req = state.requests.get(request_id).ok_or(FriendErrorCode::RequestNotFound)?;
        if req.to != *user {
            return Err(FriendErrorCode::NotAuthorized);
        }
        state.requests.remove(request_id);
        Ok(())
    }

    fn cancel_request(&self, user: &UserId, request_id: &str) -> Result<(), FriendErrorCode> {
        let mut state = self.lock();
        let req = state.requests.get(request_id).ok_or(FriendErrorCode::RequestNotFound)?;
        if req.from != *user {
            return Err(FriendErrorCode::NotAuthorized);
        }
        state.requests.remove(request_id);
        Ok(())
    }

    fn remove_friend(&self, user: &UserId, other: &UserId) {
        let mut state = self.lock();
        if let Some(set) = state.friends.get_mut(user) {
            set.remove(other);
        }
        if let Some(set) = state.friends.get_mut(other) {
            set.remove(user);
        }
    }

    fn pending_requests(&self, user: &UserId) -> Vec<FriendRequestView> {
        self.lock()
            .requests
            .iter()
            .filter(|(_, req)| req.to == *user)
            .map(|(id, req)| FriendRequestView { request_id: id.clone(), from_user_id: req.from.clone() })
            .collect()
    }

    fn send_invite(&self, from: &UserId, to: &UserId, room_id: &RoomId) -> Result<String, FriendErrorCode> {
        if to.0.trim().is_empty() {
            return Err(FriendErrorCode::InvalidUserId);
        }
        if from == to {
            return Err(FriendErrorCode::SelfRequest);
        }
        let id = Uuid::new_v4().to_string();
        self.lock().invites.insert(id.clone(), RoomInvite { from: from.clone(), to: to.clone(), room_id: room_id.clone() });
        Ok(id)
    }

    fn respond_invite(
        &self,
        user: &UserId,
        invite_id: &str,
        accept: bool,
    ) -> Result<Option<(UserId, RoomId)>, FriendErrorCode> {
        let mut state = self.lock();
        let invite = state.invites.get(invite_id).ok_or(FriendErrorCode::RequestNotFound)?;
        if invite.to != *user {
            return Err(FriendErrorCode::NotAuthorized);
        }
        let result = if accept { Some((invite.from.clone(), invite.room_id.clone())) } else { None };
        state.invites.remove(invite_id);
        Ok(result)
    }

    fn pending_invites(&self, user: &UserId) -> Vec<RoomInviteView> {
        self.lock()
            .invites
            .iter()
            .filter(|(_, inv)| inv.to == *user)
            .map(|(id, inv)| RoomInviteView { invite_id: id.clone(), from_user_id: inv.from.clone(), room_id: inv.room_id.clone() })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> UserId {
        UserId(s.into())
    }

    #[test]
    fn test_request_accept_makes_mutual_friends() {
        let dir = InMemoryFriendsDirectory::default();
        let id = dir.send_request(&uid("a"), &uid("b")).unwrap();
        let from = dir.accept_request(&uid("b"), &id).unwrap();
        assert_eq!(from, uid("a"));
        assert!(dir.friends_of(&uid("a")).contains(&uid("b")));
        assert!(dir.friends_of(&uid("b")).contains(&uid("a")));
    }

    #[test]
    fn test_self_request_rejected() {
        let dir = InMemoryFriendsDirectory::default();
        assert_eq!(dir.send_request(&uid("a"), &uid("a")), Err(FriendErrorCode::SelfRequest));
    }

    #[test]
    fn test_already_friends_rejected() {
        let dir = InMemoryFriendsDirectory::default();
        let id = dir.send_request(&uid("a"), &uid("b")).unwrap();
        dir.accept_request(&uid("b"), &id).unwrap();
        assert_eq!(dir.send_request(&uid("a"), &uid("b")), Err(FriendErrorCode::AlreadyFriends));
    }

    #[test]
    fn test_only_recipient_can_accept() {
        let dir = InMemoryFriendsDirectory::default();
        let id = dir.send_request(&uid("a"), &uid("b")).unwrap();
        assert_eq!(dir.accept_request(&uid("a"), &id), Err(FriendErrorCode::NotAuthorized));
    }

    #[test]
    fn test_unknown_request_id_not_found() {
        let dir = InMemoryFriendsDirectory::default();
        assert_eq!(dir.accept_request(&uid("a"), "nope"), Err(FriendErrorCode::RequestNotFound));
    }

    #[test]
    fn test_room_invite_round_trip() {
        let dir = InMemoryFriendsDirectory::default();
        let room_id = RoomId("AB12CD".into());
        let id = dir.send_invite(&uid("a"), &uid("b"), &room_id).unwrap();
        let result = dir.respond_invite(&uid("b"), &id, true).unwrap();
        assert_eq!(result, Some((uid("a"), room_id)));
        assert!(dir.pending_invites(&uid("b")).is_empty());
    }
}
