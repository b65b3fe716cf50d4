//! Identity newtypes used throughout the stack.
//!
//! Every identifier that crosses a crate boundary gets its own type here
//! rather than being passed around as a bare `String`. This is the same
//! newtype pattern the wire types below use for `Channel`:
//! the compiler stops you from handing a `RoomId` to a function expecting
//! a `SessionId`, even though both are strings underneath.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single client connection's identity.
///
/// Generated by the session layer on connect (a random 32-character hex
/// token). A `SessionId` is the key a `Player` record is stored under
/// inside a `Room` — it identifies a player within that room, not across
/// the player's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The identity of an authenticated user, as minted by the auth broker.
///
/// `None` on a `Session` means the connection is a guest — guests can
/// still play, they just never appear in anyone's `PresenceIndex`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A room's join code: 6 characters, uppercase letters and digits.
///
/// Unlike a sequential `RoomId(u64)`, this is the user-facing code
/// itself — players type it in to join, so it can't be an opaque
/// counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for one played game within a room.
///
/// A room can host many games over its lifetime (lobby → play → play
/// again → ...); each one gets a fresh `GameId` so stats recording can be
/// idempotent per game rather than per room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub Uuid);

impl GameId {
    /// Mints a fresh, random game id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
