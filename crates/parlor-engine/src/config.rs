//! Tunable constants for one match, with the same `Default`-impl pattern
//! the room/session/tick crates use for their configuration structs.

use serde::{Deserialize, Serialize};

/// Minimum players required for `start_game` and to remain `PLAYING`.
pub const MIN_PLAYERS: usize = 3;
/// Maximum players a room can hold.
pub const MAX_PLAYERS: usize = 8;
/// Weight given to the imposter when sampling the first speaker, relative
/// to a citizen's weight of `1.0`. Applies in both game modes.
pub const IMPOSTER_FIRST_SPEAKER_WEIGHT: f64 = 0.5;

/// Per-match timing and round-count configuration, matching the
/// "Configuration constants" table. All durations are whole seconds since
/// the scheduler ticks at 1 Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub role_reveal_time: u32,
    pub hint_turn_time: u32,
    pub hint_rounds: u32,
    pub discussion_time: u32,
    pub voting_time: u32,
    pub vote_result_time: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            role_reveal_time: 5,
            hint_turn_time: 30,
            hint_rounds: 3,
            discussion_time: 60,
            voting_time: 30,
            vote_result_time: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_internally_consistent() {
        let cfg = GameConfig::default();
        assert!(cfg.role_reveal_time > 0);
        assert!(cfg.hint_rounds > 0);
    }
}
