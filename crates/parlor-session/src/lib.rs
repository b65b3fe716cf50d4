//! Player session management.
//!
//! This crate handles the lifecycle of player connections:
//!
//! 1. **Authentication** — resolving who a player is ([`Authenticator`] trait)
//! 2. **Session tracking** — knowing who's connected right now ([`SessionManager`])
//! 3. **Presence** — knowing which authenticated users are online across
//!    however many sessions they have open ([`PresenceIndex`])
//! 4. **Rate limiting** — bounding how often a session or user can fire a
//!    given event ([`RateLimiter`])
//!
//! There is no reconnection machinery: a session is created on connect and
//! destroyed on disconnect, full stop.
//!
//! # How it fits in the stack
//!
//! ```text
//! Room Layer (above)   ← uses sessions to know which players are in which rooms
//!     ↕
//! Session Layer (this crate)  ← manages player identity, presence, connection state
//!     ↕
//! Protocol Layer (below)  ← provides SessionId, UserId, SystemMessage types
//! ```

#![allow(async_fn_in_trait)]

mod auth;
mod error;
mod manager;
mod presence;
mod rate_limit;
mod session;

pub use auth::Authenticator;
pub use error::SessionError;
pub use manager::SessionManager;
pub use presence::{PresenceChange, PresenceIndex};
pub use rate_limit::{RateLimiter, TokenBucketRateLimiter};
pub use session::{AuthResult, Session};
