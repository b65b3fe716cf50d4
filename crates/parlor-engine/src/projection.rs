//! Pure projection: canonical state -> the sanitized view types clients
//! actually receive. This is the cheat barrier — no function here ever
//! has access to a recipient it isn't computing for, so there's no path
//! by which one player's role or word can end up in another's payload.

use parlor_protocol::{
    GameStateView, PlayerView, RoomListEntry, RoomView, SessionId,
};

use crate::phase::Phase;
use crate::state::{GameState, Room};

fn project_player(room: &Room, game: Option<&GameState>, session_id: &SessionId) -> PlayerView {
    let player = room.player(session_id).expect("player must exist in room");
    let latest_hint = game
        .and_then(|g| g.hints.get(session_id))
        .and_then(|hints| hints.last())
        .cloned();
    let has_voted_this_round =
        game.map(|g| g.votes.contains_key(session_id)).unwrap_or(false);

    PlayerView {
        session_id: player.session_id.clone(),
        display_name: player.display_name.clone(),
        avatar_tag: player.avatar_tag.clone(),
        ready: player.ready,
        eliminated: player.eliminated,
        has_voted_this_round,
        latest_hint,
    }
}

/// Builds the room-wide broadcast: the room minus its password, every
/// player minus their `userId` (there is no `userId` on the canonical
/// `Player` at all — it lives only on `Session` — so this is really just
/// about never including `password`).
pub fn project_room(room: &Room) -> RoomView {
    let players = room
        .players
        .iter()
        .map(|p| project_player(room, room.game_state.as_ref(), &p.session_id))
        .collect();

    RoomView {
        room_id: room.room_id.clone(),
        display_name: room.display_name.clone(),
        has_password: room.password.is_some(),
        players,
        owner_session_id: room.owner_session_id.clone(),
        status: room.status,
        selected_category: room.selected_category.clone(),
        game_mode: room.game_mode,
    }
}

/// Builds one row of the public room list.
pub fn project_room_list_entry(room: &Room) -> RoomListEntry {
    let owner_name = room
        .player(&room.owner_session_id)
        .map(|p| p.display_name.clone())
        .unwrap_or_default();

    RoomListEntry {
        id: room.room_id.clone(),
        name: room.display_name.clone(),
        player_count: room.players.len(),
        max_players: crate::config::MAX_PLAYERS,
        status: room.status,
        has_password: room.password.is_some(),
        category: room.selected_category.clone(),
        owner_name,
    }
}

/// Builds the per-player game-state projection for `recipient`:
///
/// - `CLASSIC`: the imposter's `word` is `None` and `isImposter = true`;
///   everyone else gets `citizen_word` and `isImposter = false`.
/// - `BLIND`: every recipient gets a word (imposter gets `imposter_word`,
///   everyone else gets `citizen_word`); `isImposter` is always `false`
///   (BLIND hides the role from the imposter themself).
/// - `votes` is populated only during `VOTE_RESULT`/`GAME_OVER`.
/// - `imposter_id` is populated only during `GAME_OVER`.
pub fn project_game_state(
    game: &GameState,
    recipient: &SessionId,
    game_mode: parlor_protocol::GameMode,
) -> GameStateView {
    let is_recipient_imposter = recipient == &game.imposter_session_id;

    let (word, is_imposter) = match game_mode {
        parlor_protocol::GameMode::Classic => {
            if is_recipient_imposter {
                (None, true)
            } else {
                (Some(game.citizen_word.clone()), false)
            }
        }
        parlor_protocol::GameMode::Blind => {
            let word = if is_recipient_imposter {
                game.imposter_word.clone().or_else(|| Some(game.citizen_word.clone()))
            } else {
                Some(game.citizen_word.clone())
            };
            (word, false)
        }
    };

    let reveal_votes_and_winner = matches!(game.phase, Phase::VoteResult | Phase::GameOver);

    GameStateView {
        game_id: game.game_id.to_string(),
        phase: game.phase.code().to_string(),
        category: game.category.clone(),
        word,
        is_imposter,
        current_turn_index: game.current_turn_index,
        turn_order: game.turn_order.clone(),
        turn_time_left: game.turn_time_left,
        phase_time_left: game.phase_time_left,
        round_number: game.round_number,
        votes: if reveal_votes_and_winner { game.votes.clone() } else { Default::default() },
        hints: game.hints.clone(),
        eliminated_player_id: game.eliminated_player_id.clone(),
        winner: game.winner.map(|w| match w {
            crate::state::Winner::Citizens => "CITIZENS".to_string(),
            crate::state::Winner::Imposter => "IMPOSTER".to_string(),
        }),
        imposter_id: if game.phase == Phase::GameOver {
            Some(game.imposter_session_id.clone())
        } else {
            None
        },
    }
}
