//! Envelope, framing messages, and the concrete client/server event sets.
//!
//! Unlike a generic game room framework that carries opaque game bytes
//! inside its envelope, this protocol is for exactly one game: the inbound
//! and outbound event enums are concrete members of this crate rather than
//! an associated type filled in elsewhere.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::{GameId, RoomId, SessionId, UserId};
use crate::views::{ChatMessage, GameMode, GameStateView, RoomListEntry, RoomView};

/// Delivery channel for an envelope. Reliable-ordered is the default and
/// covers essentially every message this protocol sends; unreliable exists
/// for transports that support it but nothing here currently asks for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Channel {
    #[default]
    ReliableOrdered,
    ReliableUnordered,
    Unreliable,
}

/// Connection-lifecycle framing, independent of any game event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SystemMessage {
    Handshake { version: u32, token: String },
    HandshakeAck { session_id: SessionId, server_time: u64 },
    Heartbeat { client_time: u64 },
    HeartbeatAck { client_time: u64, server_time: u64 },
    Disconnect { reason: String },
}

/// Every event a client may send, named exactly as the external interface
/// table specifies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientEvent {
    JoinGame {
        name: String,
        avatar: String,
    },
    CreateRoom {
        name: String,
        password: Option<String>,
        category: Option<String>,
        game_mode: Option<GameMode>,
    },
    JoinRoom {
        room_id: RoomId,
        password: Option<String>,
    },
    LeaveRoom,
    StartGame {
        language: Option<String>,
    },
    SubmitHint(String),
    SubmitVote {
        target_session_id: SessionId,
    },
    PlayAgain,
    SendMessage(String),
    GetRooms,
    SendFriendRequest {
        user_id: UserId,
    },
    AcceptFriendRequest {
        request_id: String,
    },
    DeclineFriendRequest {
        request_id: String,
    },
    CancelFriendRequest {
        request_id: String,
    },
    RemoveFriend {
        user_id: UserId,
    },
    SendRoomInvite {
        user_id: UserId,
        room_id: RoomId,
    },
    RespondToInvite {
        invite_id: String,
        accept: bool,
    },
    GetPendingInvites,
    GetPendingRequests,
}

/// Error codes carried by `friend_error`, per the external interface table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FriendErrorCode {
    InvalidUserId,
    UserNotFound,
    AlreadyFriends,
    RequestNotFound,
    RequestAlreadyHandled,
    NotAuthorized,
    SelfRequest,
    MaxFriendsReached,
    DatabaseError,
}

/// A pending friend request or room invite, surfaced back to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestView {
    pub request_id: String,
    pub from_user_id: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInviteView {
    pub invite_id: String,
    pub from_user_id: UserId,
    pub room_id: RoomId,
}

/// Every event the server may send, named exactly as the external
/// interface table specifies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerEvent {
    PlayerStatus(crate::views::PlayerView),
    RoomUpdate(Option<RoomView>),
    RoomList(Vec<RoomListEntry>),
    GameState(GameStateView),
    RoomMessage(ChatMessage),
    Error(String),
    FriendOnline { user_id: UserId },
    FriendOffline { user_id: UserId },
    FriendsOnlineList { user_ids: Vec<UserId> },
    FriendError { code: FriendErrorCode, message: Option<String> },
    PendingInvites(Vec<RoomInviteView>),
    PendingRequests(Vec<FriendRequestView>),
}

/// The sum type carried by every [`Envelope`]. `System` handles connection
/// lifecycle; `Client`/`Server` carry the game-specific event sets and only
/// ever appear in the direction their name suggests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Payload {
    System(SystemMessage),
    Client(ClientEvent),
    Server(ServerEvent),
}

/// The wire frame. `seq` is a monotonically increasing per-connection
/// counter assigned by the sender; `timestamp` is milliseconds since the
/// Unix epoch at send time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub seq: u64,
    pub timestamp: u64,
    #[serde(default)]
    pub channel: Channel,
    pub payload: Payload,
}

/// Used only by stats recording — never serialized over the wire.
#[derive(Debug, Clone)]
pub struct GameEndRecord {
    pub game_id: GameId,
    pub winner: String,
    pub players: Vec<SessionId>,
    pub category: Option<String>,
    pub room_id: Option<RoomId>,
    pub duration_seconds: Option<u64>,
}

pub type VoteMap = HashMap<SessionId, SessionId>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_event_join_game_round_trips() {
        let ev = ClientEvent::JoinGame { name: "Alice".into(), avatar: "fox".into() };
        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.contains("\"type\":\"JoinGame\""));
        let decoded: ClientEvent = serde_json::from_str(&json).unwrap();
        match decoded {
            ClientEvent::JoinGame { name, avatar } => {
                assert_eq!(name, "Alice");
                assert_eq!(avatar, "fox");
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_submit_vote_round_trips() {
        let ev = ClientEvent::SubmitVote { target_session_id: SessionId("s2".into()) };
        let json = serde_json::to_string(&ev).unwrap();
        let decoded: ClientEvent = serde_json::from_str(&json).unwrap();
        assert!(matches!(decoded, ClientEvent::SubmitVote { target_session_id } if target_session_id == SessionId("s2".into())));
    }

    #[test]
    fn test_envelope_defaults_channel_when_absent() {
        let json = r#"{"seq":1,"timestamp":0,"payload":{"type":"Client","data":{"type":"GetRooms"}}}"#;
        let env: Envelope = serde_json::from_str(json).unwrap();
        assert_eq!(env.channel, Channel::ReliableOrdered);
    }

    #[test]
    fn test_malformed_payload_rejected() {
        let json = r#"{"seq":1,"timestamp":0,"payload":{"type":"NotARealVariant"}}"#;
        assert!(serde_json::from_str::<Envelope>(json).is_err());
    }

    #[test]
    fn test_server_error_event_round_trips() {
        let ev = ServerEvent::Error("ROOM_NOT_FOUND".into());
        let json = serde_json::to_string(&ev).unwrap();
        let decoded: ServerEvent = serde_json::from_str(&json).unwrap();
        assert!(matches!(decoded, ServerEvent::Error(code) if code == "ROOM_NOT_FOUND"));
    }
}
