//! Wire-facing view types: the sanitized shapes actually sent to clients.
//!
//! These are never the canonical state — `parlor-engine` owns that. A view
//! is what you get after running a canonical `Room`/`GameState` through a
//! projection: secrets stripped, role-dependent fields resolved for one
//! specific recipient.

use serde::{Deserialize, Serialize};

use crate::ids::{RoomId, SessionId, UserId};

/// Game mode selected at room creation.
///
/// CLASSIC tells the imposter they're the imposter and gives them no word.
/// BLIND hides the role from the imposter entirely but still gives them a
/// (different) word to blend in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameMode {
    Classic,
    Blind,
}

impl Default for GameMode {
    fn default() -> Self {
        GameMode::Classic
    }
}

/// Lifecycle status of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Lobby,
    Playing,
    Ended,
}

/// A player as seen by anyone in the room — never carries `userId`.
///
/// `role` and `eliminated` are populated only once a game has started;
/// `latestHint` mirrors the most recent entry in the player's hint list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub session_id: SessionId,
    pub display_name: String,
    pub avatar_tag: String,
    pub ready: bool,
    pub eliminated: bool,
    pub has_voted_this_round: bool,
    pub latest_hint: Option<String>,
}

/// The sanitized room record broadcast to every member: no `password`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub room_id: RoomId,
    pub display_name: String,
    pub has_password: bool,
    pub players: Vec<PlayerView>,
    pub owner_session_id: SessionId,
    pub status: RoomStatus,
    pub selected_category: Option<String>,
    pub game_mode: GameMode,
}

/// One row of the public room list (`get_rooms` / lobby broadcast).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomListEntry {
    pub id: RoomId,
    pub name: String,
    pub player_count: usize,
    pub max_players: usize,
    pub status: RoomStatus,
    pub has_password: bool,
    pub category: Option<String>,
    pub owner_name: String,
}

/// The per-recipient projection of `GameState` (see the engine crate's
/// `projection` module for how this is computed). `word` and `isImposter`
/// are resolved per-recipient; `votes` and `imposterId` are phase-gated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateView {
    pub game_id: String,
    pub phase: String,
    pub category: String,
    pub word: Option<String>,
    pub is_imposter: bool,
    pub current_turn_index: usize,
    pub turn_order: Vec<SessionId>,
    pub turn_time_left: u32,
    pub phase_time_left: u32,
    pub round_number: u32,
    pub votes: std::collections::HashMap<SessionId, SessionId>,
    pub hints: std::collections::HashMap<SessionId, Vec<String>>,
    pub eliminated_player_id: Option<SessionId>,
    pub winner: Option<String>,
    pub imposter_id: Option<SessionId>,
}

/// A chat message broadcast to a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub session_id: SessionId,
    pub display_name: String,
    pub text: String,
}

/// Presence list sent to a newly-connected authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendsOnlineList {
    pub user_ids: Vec<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_mode_serializes_screaming_snake_case() {
        assert_eq!(serde_json::to_string(&GameMode::Classic).unwrap(), "\"CLASSIC\"");
        assert_eq!(serde_json::to_string(&GameMode::Blind).unwrap(), "\"BLIND\"");
    }

    #[test]
    fn test_room_view_omits_password_field() {
        let view = RoomView {
            room_id: RoomId("AB12CD".into()),
            display_name: "Room".into(),
            has_password: true,
            players: vec![],
            owner_session_id: SessionId("s1".into()),
            status: RoomStatus::Lobby,
            selected_category: None,
            game_mode: GameMode::Classic,
        };
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("password\""));
        assert!(json.contains("hasPassword"));
    }

    #[test]
    fn test_player_view_has_no_user_id_field() {
        let json = serde_json::to_string(&PlayerView {
            session_id: SessionId("s1".into()),
            display_name: "Alice".into(),
            avatar_tag: "fox".into(),
            ready: true,
            eliminated: false,
            has_voted_this_round: false,
            latest_hint: None,
        })
        .unwrap();
        assert!(!json.contains("userId"));
    }
}
