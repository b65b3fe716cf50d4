//! # parlor
//!
//! Authoritative real-time game server for parlor, a social-deduction
//! "find the hidden imposter" party game.
//!
//! The stack is layered the way a generic game backend would layer
//! itself, just with every layer wired to one concrete game instead of
//! a pluggable `GameLogic`:
//!
//! ```text
//! parlor-transport   ← WebSocket connections
//! parlor-protocol    ← envelopes, ClientEvent/ServerEvent wire types
//! parlor-session     ← auth, presence, rate limiting
//! parlor-room        ← room actors, the per-room RoomGame
//! parlor-engine      ← pure rules: phases, votes, words, turn order
//! ```
//!
//! This crate ties the layers together: [`server`] accepts connections
//! and builds the shared state, [`handler`] runs the per-connection event
//! loop, and [`friends`]/[`stats`] are the collaborator seams for what's
//! out of scope for the game core itself (friendships/invites and match
//! history) plus in-memory reference implementations of each.
//!
//! ```rust,no_run
//! use parlor::{ParlorServer, AuthResult, SessionError};
//!
//! struct DevAuthenticator;
//!
//! impl parlor::Authenticator for DevAuthenticator {
//!     async fn authenticate(&self, token: &str) -> Result<AuthResult, SessionError> {
//!         if token.is_empty() {
//!             Ok(AuthResult { user_id: None, is_anonymous: true })
//!         } else {
//!             Ok(AuthResult {
//!                 user_id: Some(parlor::UserId(token.to_string())),
//!                 is_anonymous: false,
//!             })
//!         }
//!     }
//! }
//!
//! # async fn run() -> Result<(), parlor::ParlorError> {
//! let server = ParlorServer::builder().bind("0.0.0.0:8080").build(DevAuthenticator).await?;
//! server.run().await
//! # }
//! ```

mod error;
mod friends;
mod handler;
mod server;
mod stats;

pub use error::ParlorError;
pub use friends::{FriendsDirectory, InMemoryFriendsDirectory};
pub use server::{ParlorServer, ParlorServerBuilder, PROTOCOL_VERSION};
pub use stats::{InMemoryStatsSink, StatsSink};

pub use parlor_protocol::{GameId, RoomId, SessionId, UserId};
pub use parlor_session::{AuthResult, Authenticator, SessionError};
