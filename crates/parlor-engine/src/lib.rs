//! Pure rules engine for the parlor social-deduction game.
//!
//! Every function in this crate is deterministic given its inputs: no
//! clock reads, no hidden RNG, no I/O. Randomness (`selectWordsForMode`,
//! `selectTurnOrder`) and wall-clock durations are always parameters, the
//! same way a functional core stays reference-transparent and therefore
//! trivially testable.
//!
//! # Architecture
//!
//! ```text
//! parlor-room (actor, owns mutation order)
//!        |
//!        v
//! parlor-engine (this crate: pure validators, reducers, projections)
//!        |
//!        v
//! parlor-protocol (wire types the projections produce)
//! ```

mod config;
mod error;
mod phase;
mod projection;
mod state;
mod transition;
mod turn_order;
mod votes;
mod win;
mod words;

pub use config::{GameConfig, IMPOSTER_FIRST_SPEAKER_WEIGHT, MAX_PLAYERS, MIN_PLAYERS};
pub use error::{EngineError, GameError};
pub use phase::{can_transition, get_next_phase, get_phase_duration, Phase};
pub use projection::{project_game_state, project_room, project_room_list_entry};
pub use state::{GameState, Player, Room, Winner};
pub use transition::apply_phase_transition;
pub use turn_order::select_turn_order;
pub use votes::{apply_vote, calculate_eliminated, validate_vote};
pub use win::check_win_condition;
pub use words::{select_words_for_mode, BuiltinWordBank, WordBank, WordPair};
