//! Error types for the room layer.

use parlor_engine::GameError;
use parlor_protocol::RoomId;

/// Errors that can occur at the room-actor/manager boundary. Every
/// wire-facing validation/authorization code already lives on
/// [`GameError`] — the engine crate enumerates them per the error
/// taxonomy. This enum only adds the one failure mode that is purely
/// about a room's existence rather than a rule inside an existing one.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RoomError {
    /// A rule violation delegated from the engine; its wire code lives on
    /// `GameError::code()`.
    #[error(transparent)]
    Game(#[from] GameError),

    /// The room's command channel is closed — its actor already shut
    /// down, most often because its last player just left. By the time a
    /// command reaches a dead actor the room might as well not exist, so
    /// callers should treat this the same as `ROOM_NOT_FOUND`.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}

impl RoomError {
    /// The wire-facing error code for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            RoomError::Game(e) => e.code(),
            RoomError::Unavailable(_) => GameError::RoomNotFound.code(),
        }
    }
}
