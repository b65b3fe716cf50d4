//! Vote validation, pure application, and tallying.

use std::collections::HashMap;

use parlor_protocol::SessionId;

use crate::error::GameError;
use crate::phase::Phase;
use crate::state::Room;

/// Checks a prospective vote against the current room state. Checks run
/// in this order and the first failure wins:
///
/// 1. a game must exist,
/// 2. the phase must be `VOTING`,
/// 3. `voter != target`,
/// 4. `target` must be a current, non-eliminated player.
///
/// A voter changing an earlier vote is always allowed — this function
/// does not consult whether `voter` already has an entry in `votes`.
pub fn validate_vote(room: &Room, voter: &SessionId, target: &SessionId) -> Option<GameError> {
    let Some(game) = room.game_state.as_ref() else {
        return Some(GameError::GameNotStarted);
    };
    if game.phase != Phase::Voting {
        return Some(GameError::WrongPhase);
    }
    if voter == target {
        return Some(GameError::CannotVoteSelf);
    }
    match room.player(target) {
        Some(p) if !p.eliminated => None,
        _ => Some(GameError::InvalidTarget),
    }
}

/// Returns a new votes map equal to `votes` with `votes[voter] = target`.
/// Does not mutate the input.
pub fn apply_vote(
    votes: &HashMap<SessionId, SessionId>,
    voter: SessionId,
    target: SessionId,
) -> HashMap<SessionId, SessionId> {
    let mut next = votes.clone();
    next.insert(voter, target);
    next
}

/// Tallies `votes` by target and returns the sole player with strictly
/// more votes than the runner-up, or `None` if there are no votes or the
/// top is tied.
pub fn calculate_eliminated(votes: &HashMap<SessionId, SessionId>) -> Option<SessionId> {
    if votes.is_empty() {
        return None;
    }
    let mut tally: HashMap<&SessionId, u32> = HashMap::new();
    for target in votes.values() {
        *tally.entry(target).or_insert(0) += 1;
    }
    let mut counts: Vec<(&SessionId, u32)> = tally.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    match counts.as_slice() {
        [(top, top_count), rest @ ..] => {
            let runner_up = rest.first().map(|(_, c)| *c).unwrap_or(0);
            if *top_count > runner_up {
                Some((*top).clone())
            } else {
                None
            }
        }
        [] => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{GameState, Player, Winner};
    use parlor_protocol::{GameId, GameMode, RoomId, RoomStatus};

    fn sid(s: &str) -> SessionId {
        SessionId(s.into())
    }

    fn room_with_phase(phase: Phase, players: &[&str]) -> Room {
        let player_records: Vec<Player> = players
            .iter()
            .map(|p| Player::new(sid(p), p.to_string(), "fox".into()))
            .collect();
        Room {
            room_id: RoomId("AB12CD".into()),
            display_name: "Room".into(),
            password: None,
            players: player_records,
            owner_session_id: sid(players[0]),
            status: RoomStatus::Playing,
            selected_category: None,
            game_mode: GameMode::Classic,
            game_state: Some(GameState {
                game_id: GameId::new(),
                phase,
                category: "Animals".into(),
                citizen_word: "Cat".into(),
                imposter_word: None,
                imposter_session_id: sid(players[0]),
                current_turn_index: 0,
                turn_order: players.iter().map(|p| sid(p)).collect(),
                turn_time_left: 0,
                phase_time_left: 0,
                round_number: 1,
                votes: HashMap::new(),
                hints: HashMap::new(),
                eliminated_player_id: None,
                winner: None,
            }),
        }
    }

    #[test]
    fn test_validate_vote_rejects_wrong_phase() {
        let room = room_with_phase(Phase::Discussion, &["p1", "p2", "p3"]);
        assert_eq!(
            validate_vote(&room, &sid("p1"), &sid("p2")),
            Some(GameError::WrongPhase)
        );
    }

    #[test]
    fn test_validate_vote_rejects_self_vote() {
        let room = room_with_phase(Phase::Voting, &["p1", "p2", "p3"]);
        assert_eq!(
            validate_vote(&room, &sid("p1"), &sid("p1")),
            Some(GameError::CannotVoteSelf)
        );
    }

    #[test]
    fn test_validate_vote_rejects_eliminated_target() {
        let mut room = room_with_phase(Phase::Voting, &["p1", "p2", "p3"]);
        room.player_mut(&sid("p2")).unwrap().eliminated = true;
        assert_eq!(
            validate_vote(&room, &sid("p1"), &sid("p2")),
            Some(GameError::InvalidTarget)
        );
    }

    #[test]
    fn test_validate_vote_rejects_no_game() {
        let mut room = room_with_phase(Phase::Voting, &["p1", "p2", "p3"]);
        room.game_state = None;
        assert_eq!(
            validate_vote(&room, &sid("p1"), &sid("p2")),
            Some(GameError::GameNotStarted)
        );
    }

    #[test]
    fn test_validate_vote_accepts_legal_vote() {
        let room = room_with_phase(Phase::Voting, &["p1", "p2", "p3"]);
        assert_eq!(validate_vote(&room, &sid("p1"), &sid("p2")), None);
    }

    #[test]
    fn test_apply_vote_does_not_mutate_input() {
        let votes = HashMap::new();
        let next = apply_vote(&votes, sid("p1"), sid("p2"));
        assert!(votes.is_empty());
        assert_eq!(next.get(&sid("p1")), Some(&sid("p2")));
    }

    #[test]
    fn test_apply_vote_overwrite_is_last_write_wins() {
        let votes = HashMap::new();
        let first = apply_vote(&votes, sid("p1"), sid("p2"));
        let second = apply_vote(&first, sid("p1"), sid("p3"));
        let direct = apply_vote(&HashMap::new(), sid("p1"), sid("p3"));
        assert_eq!(second, direct);
    }

    #[test]
    fn test_calculate_eliminated_empty_map_is_none() {
        assert_eq!(calculate_eliminated(&HashMap::new()), None);
    }

    #[test]
    fn test_calculate_eliminated_all_different_targets_is_none() {
        let mut votes = HashMap::new();
        votes.insert(sid("p1"), sid("p2"));
        votes.insert(sid("p2"), sid("p3"));
        votes.insert(sid("p3"), sid("p1"));
        assert_eq!(calculate_eliminated(&votes), None);
    }

    #[test]
    fn test_calculate_eliminated_exact_tie_is_none() {
        let mut votes = HashMap::new();
        votes.insert(sid("p1"), sid("p2"));
        votes.insert(sid("p3"), sid("p4"));
        assert_eq!(calculate_eliminated(&votes), None);
    }

    #[test]
    fn test_calculate_eliminated_returns_unique_top() {
        let mut votes = HashMap::new();
        votes.insert(sid("p1"), sid("p2"));
        votes.insert(sid("p2"), sid("p1"));
        votes.insert(sid("p3"), sid("p2"));
        assert_eq!(calculate_eliminated(&votes), Some(sid("p2")));
    }

    #[test]
    fn test_winner_enum_round_trips() {
        let json = serde_json::to_string(&Winner::Citizens).unwrap();
        assert_eq!(json, "\"CITIZENS\"");
    }
}
