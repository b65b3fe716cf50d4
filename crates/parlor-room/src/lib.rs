//! Room actor and room store for the parlor social-deduction game.
//!
//! Each room is an isolated Tokio task (actor model) wrapping one
//! [`parlor_engine::Room`]/[`parlor_engine::GameState`] pair and driving
//! its own 1Hz phase scheduler. This server hosts exactly one game, so
//! (unlike a framework built to host arbitrary games) the actor talks
//! `parlor_engine` types and `parlor_protocol::ServerEvent` directly
//! rather than through a pluggable `GameLogic` trait.

mod config;
mod error;
mod game;
mod manager;
mod room;

pub use config::RoomConfig;
pub use error::RoomError;
pub use game::{LeaveOutcome, RoomGame, TickOutcome};
pub use manager::RoomManager;
pub use room::{PlayerSender, RoomHandle, RoomSnapshot};
