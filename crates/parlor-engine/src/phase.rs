//! The eight-phase state machine that drives one round.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;

/// One phase of a match. Ordering here is only for `Debug`/`Display`
/// convenience — the legal transition graph lives in [`can_transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Lobby,
    RoleReveal,
    HintRound,
    Discussion,
    Voting,
    VoteResult,
    GameOver,
}

/// Returns `true` iff the directed edge `from -> to` is part of the legal
/// transition graph:
///
/// ```text
/// LOBBY -> ROLE_REVEAL -> HINT_ROUND -> DISCUSSION -> VOTING -> VOTE_RESULT -> GAME_OVER
///                             ^                                    |
///                             +------------ next round -----------+
/// GAME_OVER -> LOBBY   (play again)
/// ```
pub fn can_transition(from: Phase, to: Phase) -> bool {
    use Phase::*;
    matches!(
        (from, to),
        (Lobby, RoleReveal)
            | (RoleReveal, HintRound)
            | (HintRound, Discussion)
            | (Discussion, Voting)
            | (Voting, VoteResult)
            | (VoteResult, GameOver)
            | (VoteResult, HintRound)
            | (GameOver, Lobby)
    )
}

/// The single structural successor of a phase, for phases that only ever
/// have one legal destination. `VOTE_RESULT` has two legal destinations
/// (`HINT_ROUND` or `GAME_OVER`, chosen by [`crate::win::check_win_condition`]
/// after tallying), so it returns `None` here — callers must decide that
/// branch explicitly rather than ask this function to guess.
pub fn get_next_phase(phase: Phase) -> Option<Phase> {
    use Phase::*;
    match phase {
        Lobby => Some(RoleReveal),
        RoleReveal => Some(HintRound),
        HintRound => Some(Discussion),
        Discussion => Some(Voting),
        Voting => Some(VoteResult),
        VoteResult => None,
        GameOver => Some(Lobby),
    }
}

impl Phase {
    /// The wire-facing code for this phase, e.g. `"HINT_ROUND"`.
    pub fn code(&self) -> &'static str {
        use Phase::*;
        match self {
            Lobby => "LOBBY",
            RoleReveal => "ROLE_REVEAL",
            HintRound => "HINT_ROUND",
            Discussion => "DISCUSSION",
            Voting => "VOTING",
            VoteResult => "VOTE_RESULT",
            GameOver => "GAME_OVER",
        }
    }
}

/// Countdown duration assigned to a phase on entry. `LOBBY` and
/// `GAME_OVER` are not timer-driven (the scheduler pauses while a room
/// sits in either), so they return `0`.
pub fn get_phase_duration(phase: Phase, config: &GameConfig) -> u32 {
    use Phase::*;
    match phase {
        Lobby | GameOver => 0,
        RoleReveal => config.role_reveal_time,
        HintRound => config.hint_turn_time,
        Discussion => config.discussion_time,
        Voting => config.voting_time,
        VoteResult => config.vote_result_time,
    }
}
