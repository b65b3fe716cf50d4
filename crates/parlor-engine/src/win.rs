//! Win-condition evaluation.

use crate::state::{GameState, Room, Winner};

/// Evaluates whether either side has won yet. Citizens win the instant the
/// imposter is eliminated; the imposter wins once non-eliminated citizens
/// number one or fewer. `None` means the game continues.
pub fn check_win_condition(room: &Room, game: &GameState) -> Option<Winner> {
    let imposter_eliminated = room
        .player(&game.imposter_session_id)
        .map(|p| p.eliminated)
        .unwrap_or(true);
    if imposter_eliminated {
        return Some(Winner::Citizens);
    }

    let remaining_citizens = room
        .active_players()
        .filter(|p| p.session_id != game.imposter_session_id)
        .count();
    if remaining_citizens <= 1 {
        return Some(Winner::Imposter);
    }

    None
}
