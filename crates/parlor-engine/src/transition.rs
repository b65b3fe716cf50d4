//! Pure phase transitions.

use crate::config::GameConfig;
use crate::error::EngineError;
use crate::phase::{can_transition, get_phase_duration, Phase};
use crate::state::GameState;

/// Produces the `GameState` that results from moving to `target_phase`,
/// without mutating `state`. Returns [`EngineError::InvalidTransition`] if
/// the edge isn't legal per [`can_transition`].
///
/// Phase-specific resets on entry:
/// - `VOTING` clears `votes`.
/// - `HINT_ROUND` resets `current_turn_index` to `0` and `turn_time_left`
///   to the configured hint-turn duration.
/// - `GAME_OVER` otherwise leaves fields untouched — the caller is
///   expected to have already set `winner` before transitioning here.
pub fn apply_phase_transition(
    state: &GameState,
    target_phase: Phase,
    config: &GameConfig,
) -> Result<GameState, EngineError> {
    if !can_transition(state.phase, target_phase) {
        return Err(EngineError::InvalidTransition);
    }

    let mut next = state.clone();
    next.phase = target_phase;
    next.phase_time_left = get_phase_duration(target_phase, config);

    match target_phase {
        Phase::Voting => {
            next.votes.clear();
        }
        Phase::HintRound => {
            next.current_turn_index = 0;
            next.turn_time_left = config.hint_turn_time;
        }
        _ => {}
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Winner;
    use parlor_protocol::{GameId, SessionId};
    use std::collections::HashMap;

    fn base_state(phase: Phase) -> GameState {
        GameState {
            game_id: GameId::new(),
            phase,
            category: "Animals".into(),
            citizen_word: "Cat".into(),
            imposter_word: None,
            imposter_session_id: SessionId("p1".into()),
            current_turn_index: 2,
            turn_order: vec![SessionId("p1".into()), SessionId("p2".into())],
            turn_time_left: 5,
            phase_time_left: 5,
            round_number: 1,
            votes: HashMap::from([(SessionId("p1".into()), SessionId("p2".into()))]),
            hints: HashMap::new(),
            eliminated_player_id: None,
            winner: None,
        }
    }

    #[test]
    fn test_rejects_illegal_edge() {
        let state = base_state(Phase::Lobby);
        let cfg = GameConfig::default();
        assert_eq!(
            apply_phase_transition(&state, Phase::Voting, &cfg),
            Err(EngineError::InvalidTransition)
        );
    }

    #[test]
    fn test_voting_clears_votes() {
        let state = base_state(Phase::Discussion);
        let cfg = GameConfig::default();
        let next = apply_phase_transition(&state, Phase::Voting, &cfg).unwrap();
        assert!(next.votes.is_empty());
        assert_eq!(next.phase_time_left, cfg.voting_time);
    }

    #[test]
    fn test_hint_round_resets_turn_state() {
        let state = base_state(Phase::VoteResult);
        let cfg = GameConfig::default();
        let next = apply_phase_transition(&state, Phase::HintRound, &cfg).unwrap();
        assert_eq!(next.current_turn_index, 0);
        assert_eq!(next.turn_time_left, cfg.hint_turn_time);
    }

    #[test]
    fn test_game_over_preserves_winner() {
        let mut state = base_state(Phase::VoteResult);
        state.winner = Some(Winner::Citizens);
        let cfg = GameConfig::default();
        let next = apply_phase_transition(&state, Phase::GameOver, &cfg).unwrap();
        assert_eq!(next.winner, Some(Winner::Citizens));
    }

    #[test]
    fn test_is_pure_repeated_application_equal() {
        let state = base_state(Phase::Discussion);
        let cfg = GameConfig::default();
        let a = apply_phase_transition(&state, Phase::Voting, &cfg).unwrap();
        let b = apply_phase_transition(&state, Phase::Voting, &cfg).unwrap();
        assert_eq!(a, b);
        // and the input itself was never touched
        assert_eq!(state.phase, Phase::Discussion);
    }
}
