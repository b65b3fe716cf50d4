//! `ParlorServer` builder and server accept loop.
//!
//! This is the entry point for running the parlor game server. It ties
//! together all the layers: transport → protocol → session → room.

use std::collections::HashMap;
use std::sync::Arc;

use parlor_engine::{GameConfig, WordBank};
use parlor_protocol::{Codec, JsonCodec, SessionId};
use parlor_room::{PlayerSender, RoomConfig, RoomManager};
use parlor_session::{Authenticator, PresenceIndex, SessionManager, TokenBucketRateLimiter};
use parlor_transport::{Transport, WebSocketTransport};
use tokio::sync::{mpsc, Mutex};

use crate::friends::InMemoryFriendsDirectory;
use crate::handler::handle_connection;
use crate::stats::InMemoryStatsSink;
use crate::ParlorError;

/// The current protocol version. Clients must send this in their
/// handshake or be rejected.
pub const PROTOCOL_VERSION: u32 = 1;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. Interior
/// mutability via `Mutex` where needed. Unlike a generic
/// `ServerState<G: GameLogic, ...>`, this server hosts exactly one game,
/// so `rooms` is a concrete `RoomManager` rather than one generalized
/// over a pluggable game type.
pub(crate) struct ServerState<A: Authenticator, C: Codec> {
    pub(crate) sessions: Mutex<SessionManager>,
    pub(crate) presence: Mutex<PresenceIndex>,
    pub(crate) rooms: Mutex<RoomManager>,
    /// Every connected session's outbound channel, for delivering events
    /// that don't originate from a room actor (room lists, friend
    /// presence, friend/invite responses).
    pub(crate) connections: Mutex<HashMap<SessionId, PlayerSender>>,
    pub(crate) auth: A,
    pub(crate) rate_limiter: TokenBucketRateLimiter,
    pub(crate) friends: InMemoryFriendsDirectory,
    pub(crate) stats: Arc<InMemoryStatsSink>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a parlor server.
pub struct ParlorServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    game_config: GameConfig,
    word_bank: Arc<dyn WordBank + Send + Sync>,
}

impl ParlorServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            room_config: RoomConfig::default(),
            game_config: GameConfig::default(),
            word_bank: Arc::new(parlor_engine::BuiltinWordBank),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the per-room channel configuration.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Sets the per-match timing configuration.
    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.game_config = config;
        self
    }

    /// Sets the word bank used to resolve categories at `start_game`.
    pub fn word_bank(mut self, bank: Arc<dyn WordBank + Send + Sync>) -> Self {
        self.word_bank = bank;
        self
    }

    /// Builds and starts the server with the given authenticator.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport` as defaults (MVP). The
    /// rate limiter, friends directory, and stats sink are the in-memory
    /// reference implementations — real deployments swap them for
    /// durable-backed ones behind the same traits without touching this
    /// crate.
    pub async fn build<A: Authenticator>(
        self,
        auth: A,
    ) -> Result<ParlorServer<A, JsonCodec>, ParlorError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let (stats_tx, mut stats_rx) = mpsc::unbounded_channel();
        let stats = Arc::new(InMemoryStatsSink::default());
        let sink_for_drain = Arc::clone(&stats);
        tokio::spawn(async move {
            while let Some(record) = stats_rx.recv().await {
                sink_for_drain.record_game_end(record);
            }
        });

        let rooms = RoomManager::new(self.room_config, self.game_config, self.word_bank, stats_tx);

        let state = Arc::new(ServerState {
            sessions: Mutex::new(SessionManager::new()),
            presence: Mutex::new(PresenceIndex::new()),
            rooms: Mutex::new(rooms),
            connections: Mutex::new(HashMap::new()),
            auth,
            rate_limiter: TokenBucketRateLimiter::default(),
            friends: InMemoryFriendsDirectory::default(),
            stats,
            codec: JsonCodec,
        });

        Ok(ParlorServer { transport, state })
    }
}

impl Default for ParlorServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running parlor game server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ParlorServer<A: Authenticator, C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<A, C>>,
}

impl<A, C> ParlorServer<A, C>
where
    A: Authenticator,
    C: Codec + Clone + 'static,
{
    /// Creates a new builder.
    pub fn builder() -> ParlorServerBuilder {
        ParlorServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections, performs the handshake, and spawns
    /// a handler task for each connected player. Runs until the process
    /// is terminated.
    pub async fn run(mut self) -> Result<(), ParlorError> {
        tracing::info!("parlor server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
