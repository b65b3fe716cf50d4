//! Canonical, server-authoritative state. Never serialized directly to a
//! client — `projection` turns this into the sanitized view types from
//! `parlor-protocol`.

use std::collections::HashMap;

use parlor_protocol::{GameId, GameMode, RoomId, RoomStatus, SessionId};
use serde::{Deserialize, Serialize};

use crate::phase::Phase;

/// A player's persistent membership record within one room.
///
/// `eliminated` persists across rounds within a single match — once a
/// player is voted out they stay out until the match ends or resets via
/// `play_again`. `role`, `hasVotedThisRound`, and `latestHint` are
/// deliberately not stored here: they're derived from `GameState` at
/// projection time so there is exactly one place that can disagree with
/// itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub session_id: SessionId,
    pub display_name: String,
    pub avatar_tag: String,
    pub ready: bool,
    pub eliminated: bool,
}

impl Player {
    pub fn new(session_id: SessionId, display_name: String, avatar_tag: String) -> Self {
        Self { session_id, display_name, avatar_tag, ready: false, eliminated: false }
    }
}

/// Who won a completed match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Winner {
    Citizens,
    Imposter,
}

/// One played game's mutable state, owned by the `Room` it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub game_id: GameId,
    pub phase: Phase,
    pub category: String,
    pub citizen_word: String,
    pub imposter_word: Option<String>,
    pub imposter_session_id: SessionId,
    pub current_turn_index: usize,
    pub turn_order: Vec<SessionId>,
    pub turn_time_left: u32,
    pub phase_time_left: u32,
    pub round_number: u32,
    pub votes: HashMap<SessionId, SessionId>,
    pub hints: HashMap<SessionId, Vec<String>>,
    pub eliminated_player_id: Option<SessionId>,
    pub winner: Option<Winner>,
}

impl GameState {
    /// The player whose turn it currently is during `HINT_ROUND`, if any.
    pub fn current_speaker(&self) -> Option<&SessionId> {
        self.turn_order.get(self.current_turn_index)
    }
}

/// A room: the unit of ownership for players, password, and at most one
/// live `GameState`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub room_id: RoomId,
    pub display_name: String,
    pub password: Option<String>,
    pub players: Vec<Player>,
    pub owner_session_id: SessionId,
    pub status: RoomStatus,
    pub selected_category: Option<String>,
    pub game_mode: GameMode,
    pub game_state: Option<GameState>,
}

impl Room {
    pub fn player(&self, session_id: &SessionId) -> Option<&Player> {
        self.players.iter().find(|p| &p.session_id == session_id)
    }

    pub fn player_mut(&mut self, session_id: &SessionId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| &p.session_id == session_id)
    }

    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.player(session_id).is_some()
    }

    pub fn is_joinable(&self) -> bool {
        self.status == RoomStatus::Lobby && self.players.len() < crate::config::MAX_PLAYERS
    }

    /// Non-eliminated players, in their stable join order. This is the
    /// set eligible to vote, to be voted for, and to take a hint turn.
    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| !p.eliminated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str) -> Player {
        Player::new(SessionId(id.into()), id.into(), "fox".into())
    }

    #[test]
    fn test_active_players_excludes_eliminated() {
        let mut room = Room {
            room_id: RoomId("AB12CD".into()),
            display_name: "Room".into(),
            password: None,
            players: vec![player("p1"), player("p2")],
            owner_session_id: SessionId("p1".into()),
            status: RoomStatus::Playing,
            selected_category: None,
            game_mode: GameMode::Classic,
            game_state: None,
        };
        room.player_mut(&SessionId("p2".into())).unwrap().eliminated = true;
        let active: Vec<_> = room.active_players().map(|p| p.session_id.clone()).collect();
        assert_eq!(active, vec![SessionId("p1".into())]);
    }

    #[test]
    fn test_is_joinable_false_once_full() {
        let players: Vec<_> = (0..crate::config::MAX_PLAYERS)
            .map(|i| player(&format!("p{i}")))
            .collect();
        let room = Room {
            room_id: RoomId("AB12CD".into()),
            display_name: "Room".into(),
            password: None,
            players,
            owner_session_id: SessionId("p0".into()),
            status: RoomStatus::Lobby,
            selected_category: None,
            game_mode: GameMode::Classic,
            game_state: None,
        };
        assert!(!room.is_joinable());
    }
}
