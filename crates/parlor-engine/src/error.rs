//! The error taxonomy surfaced to clients, plus the engine's own internal
//! error for transitions that are a programmer error rather than a
//! rejected player action.

/// Every validation/authorization code a client can receive via the
/// `error` event. `Display` prints exactly the wire code string, so
/// `game_error.to_string()` is what goes straight into `ServerEvent::Error`.
///
/// `SelfRequest` and `AlreadyVoted` are defined but never raised by this
/// crate's validation logic — they're reserved for rules this match
/// doesn't implement yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("GAME_NOT_STARTED")]
    GameNotStarted,
    #[error("WRONG_PHASE")]
    WrongPhase,
    #[error("CANNOT_VOTE_SELF")]
    CannotVoteSelf,
    #[error("INVALID_TARGET")]
    InvalidTarget,
    #[error("ALREADY_VOTED")]
    AlreadyVoted,
    #[error("NOT_YOUR_TURN")]
    NotYourTurn,
    #[error("INCORRECT_PASSWORD")]
    IncorrectPassword,
    #[error("ROOM_FULL")]
    RoomFull,
    #[error("ROOM_NOT_FOUND")]
    RoomNotFound,
    #[error("GAME_ALREADY_STARTED")]
    GameAlreadyStarted,
    #[error("YOU_ARE_NOT_THE_HOST")]
    YouAreNotTheHost,
    #[error("NEED_AT_LEAST_N_PLAYERS")]
    NeedAtLeastNPlayers,
    #[error("CANNOT_USE_THE_SECRET_WORD_AS_HINT")]
    CannotUseTheSecretWordAsHint,
    #[error("RATE_LIMITED")]
    RateLimited,
    #[error("NOT_AUTHORIZED")]
    NotAuthorized,
    #[error("SELF_REQUEST")]
    SelfRequest,
}

impl GameError {
    /// The bare wire code, e.g. `"ROOM_FULL"`.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::GameNotStarted => "GAME_NOT_STARTED",
            GameError::WrongPhase => "WRONG_PHASE",
            GameError::CannotVoteSelf => "CANNOT_VOTE_SELF",
            GameError::InvalidTarget => "INVALID_TARGET",
            GameError::AlreadyVoted => "ALREADY_VOTED",
            GameError::NotYourTurn => "NOT_YOUR_TURN",
            GameError::IncorrectPassword => "INCORRECT_PASSWORD",
            GameError::RoomFull => "ROOM_FULL",
            GameError::RoomNotFound => "ROOM_NOT_FOUND",
            GameError::GameAlreadyStarted => "GAME_ALREADY_STARTED",
            GameError::YouAreNotTheHost => "YOU_ARE_NOT_THE_HOST",
            GameError::NeedAtLeastNPlayers => "NEED_AT_LEAST_N_PLAYERS",
            GameError::CannotUseTheSecretWordAsHint => "CANNOT_USE_THE_SECRET_WORD_AS_HINT",
            GameError::RateLimited => "RATE_LIMITED",
            GameError::NotAuthorized => "NOT_AUTHORIZED",
            GameError::SelfRequest => "SELF_REQUEST",
        }
    }
}

/// Internal engine errors: these are never surfaced to a client. A
/// `InvalidTransition` means the caller asked for an edge outside the
/// phase graph — a bug in the room actor, logged and discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid phase transition")]
    InvalidTransition,
}
