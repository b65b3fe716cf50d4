//! Wire protocol for the parlor game server.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Identity** ([`SessionId`], [`UserId`], [`RoomId`], [`GameId`]).
//! - **Views** ([`RoomView`], [`PlayerView`], [`GameStateView`], ...) — the
//!   sanitized, role-aware shapes actually sent to clients.
//! - **Messages** ([`Envelope`], [`ClientEvent`], [`ServerEvent`]) — the
//!   message structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the session
//! orchestrator (player identity, game rules). It doesn't know about
//! connections or rooms — it only knows how to name and shape messages.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Session (player context)
//! ```

mod codec;
mod error;
mod ids;
mod messages;
mod views;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use ids::{GameId, RoomId, SessionId, UserId};
pub use messages::{
    Channel, ClientEvent, Envelope, FriendErrorCode, FriendRequestView, GameEndRecord, Payload,
    RoomInviteView, ServerEvent, SystemMessage, VoteMap,
};
pub use views::{
    ChatMessage, FriendsOnlineList, GameMode, GameStateView, PlayerView, RoomListEntry, RoomStatus,
    RoomView,
};
