//! The room actor: one Tokio task per room, serializing every mutation
//! to its [`RoomGame`] through a command channel and driving the 1Hz
//! phase scheduler through the same event loop (`tokio::select!`) the
//! commands arrive on.

use std::collections::HashMap;
use std::sync::Arc;

use parlor_engine::{project_game_state, project_room, project_room_list_entry, GameError, WordBank};
use parlor_protocol::{GameEndRecord, GameMode, RoomId, RoomListEntry, RoomStatus, ServerEvent, SessionId};
use parlor_tick::TickScheduler;
use rand::Rng;
use tokio::sync::{mpsc, oneshot};

use crate::config::RoomConfig;
use crate::error::RoomError;
use crate::game::RoomGame;

/// Per-session outbound channel. Every `ServerEvent` a room wants to
/// deliver to a connected player goes through one of these.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

/// A read-only snapshot used for the public lobby listing and to decide
/// whether a room can still be joined.
#[derive(Debug, Clone)]
pub struct RoomSnapshot {
    pub list_entry: RoomListEntry,
    pub is_joinable: bool,
}

enum RoomCommand {
    Join {
        session_id: SessionId,
        display_name: String,
        avatar_tag: String,
        password: Option<String>,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    /// Replies with whether the room was emptied by this departure.
    Leave {
        session_id: SessionId,
        reply: oneshot::Sender<bool>,
    },
    StartGame {
        session_id: SessionId,
        language: Option<String>,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    SubmitHint {
        session_id: SessionId,
        text: String,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    SubmitVote {
        session_id: SessionId,
        target: SessionId,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    PlayAgain {
        session_id: SessionId,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    SendMessage {
        session_id: SessionId,
        text: String,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    Snapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },
    Shutdown,
}

/// A cheap handle to a running room actor. Every method round-trips
/// through the actor's command channel so no two callers can interleave
/// a mutation.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub async fn join(
        &self,
        session_id: SessionId,
        display_name: String,
        avatar_tag: String,
        password: Option<String>,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let (tx, rx) = oneshot::channel();
        self.send(RoomCommand::Join { session_id, display_name, avatar_tag, password, sender, reply: tx })
            .await?;
        self.recv(rx).await?.map_err(RoomError::Game)
    }

    /// Returns `true` if this was the last player and the room has torn
    /// itself down.
    pub async fn leave(&self, session_id: SessionId) -> Result<bool, RoomError> {
        let (tx, rx) = oneshot::channel();
        self.send(RoomCommand::Leave { session_id, reply: tx }).await?;
        self.recv(rx).await
    }

    pub async fn start_game(&self, session_id: SessionId, language: Option<String>) -> Result<(), RoomError> {
        self.game_command(|reply| RoomCommand::StartGame { session_id, language, reply }).await
    }

    pub async fn submit_hint(&self, session_id: SessionId, text: String) -> Result<(), RoomError> {
        self.game_command(|reply| RoomCommand::SubmitHint { session_id, text, reply }).await
    }

    pub async fn submit_vote(&self, session_id: SessionId, target: SessionId) -> Result<(), RoomError> {
        self.game_command(|reply| RoomCommand::SubmitVote { session_id, target, reply }).await
    }

    pub async fn play_again(&self, session_id: SessionId) -> Result<(), RoomError> {
        self.game_command(|reply| RoomCommand::PlayAgain { session_id, reply }).await
    }

    pub async fn send_message(&self, session_id: SessionId, text: String) -> Result<(), RoomError> {
        self.game_command(|reply| RoomCommand::SendMessage { session_id, text, reply }).await
    }

    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        let (tx, rx) = oneshot::channel();
        self.send(RoomCommand::Snapshot { reply: tx }).await?;
        self.recv(rx).await
    }

    pub async fn shutdown(&self) {
        let _ = self.sender.send(RoomCommand::Shutdown).await;
    }

    async fn game_command(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<(), GameError>>) -> RoomCommand,
    ) -> Result<(), RoomError> {
        let (tx, rx) = oneshot::channel();
        self.send(build(tx)).await?;
        self.recv(rx).await?.map_err(RoomError::Game)
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender.send(cmd).await.map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    async fn recv<T>(&self, rx: oneshot::Receiver<T>) -> Result<T, RoomError> {
        rx.await.map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }
}

struct RoomActor {
    game: RoomGame,
    senders: HashMap<SessionId, PlayerSender>,
    receiver: mpsc::Receiver<RoomCommand>,
    stats_tx: mpsc::UnboundedSender<GameEndRecord>,
    scheduler: TickScheduler,
}

impl RoomActor {
    async fn run(mut self) {
        let room_id = self.game.room.room_id.clone();
        tracing::info!(%room_id, "room actor started");
        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    match cmd {
                        Some(cmd) => {
                            if self.handle_command(cmd) {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _tick = self.scheduler.wait_for_tick() => {
                    let outcome = self.game.tick(|| rand::rng().random::<f64>());
                    if let Some(record) = outcome.game_ended {
                        let _ = self.stats_tx.send(record);
                    }
                    self.broadcast();
                    self.scheduler.record_tick_end();
                }
            }
        }
        tracing::info!(%room_id, "room actor stopped");
    }

    /// Returns `true` if the actor should stop after handling this command.
    fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Join { session_id, display_name, avatar_tag, password, sender, reply } => {
                let result = self.game.join(session_id.clone(), display_name, avatar_tag, password);
                if result.is_ok() {
                    self.senders.insert(session_id, sender);
                }
                let _ = reply.send(result);
                self.broadcast();
                false
            }
            RoomCommand::Leave { session_id, reply } => {
                let outcome = self.game.leave(&session_id);
                self.senders.remove(&session_id);
                let _ = reply.send(outcome.room_destroyed);
                if let Some(record) = outcome.game_ended {
                    let _ = self.stats_tx.send(record);
                }
                if outcome.room_destroyed {
                    tracing::info!(room_id = %self.game.room.room_id, "room emptied, shutting down");
                    return true;
                }
                self.broadcast();
                false
            }
            RoomCommand::StartGame { session_id, language, reply } => {
                let result = self.game.start_game(&session_id, language, || rand::rng().random::<f64>());
                let _ = reply.send(result);
                self.broadcast();
                false
            }
            RoomCommand::SubmitHint { session_id, text, reply } => {
                let result = self.game.submit_hint(&session_id, &text);
                let _ = reply.send(result);
                self.broadcast();
                false
            }
            RoomCommand::SubmitVote { session_id, target, reply } => {
                let result = self.game.submit_vote(&session_id, &target);
                let _ = reply.send(result);
                self.broadcast();
                false
            }
            RoomCommand::PlayAgain { session_id, reply } => {
                let result = self.game.play_again(&session_id);
                let _ = reply.send(result);
                self.broadcast();
                false
            }
            RoomCommand::SendMessage { session_id, text, reply } => {
                match self.game.chat(&session_id, &text) {
                    Ok(msg) => {
                        let _ = reply.send(Ok(()));
                        self.send_to_all(ServerEvent::RoomMessage(msg));
                    }
                    Err(e) => {
                        let _ = reply.send(Err(e));
                    }
                }
                false
            }
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(RoomSnapshot {
                    list_entry: project_room_list_entry(&self.game.room),
                    is_joinable: self.game.room.is_joinable(),
                });
                false
            }
            RoomCommand::Shutdown => true,
        }
    }

    fn broadcast(&self) {
        let view = project_room(&self.game.room);
        self.send_to_all(ServerEvent::RoomUpdate(Some(view)));

        if matches!(self.game.room.status, RoomStatus::Playing | RoomStatus::Ended) {
            if let Some(game) = &self.game.room.game_state {
                for session_id in self.senders.keys().cloned().collect::<Vec<_>>() {
                    let projected = project_game_state(game, &session_id, self.game.room.game_mode);
                    self.send_to(&session_id, ServerEvent::GameState(projected));
                }
            }
        }
    }

    fn send_to_all(&self, event: ServerEvent) {
        for sender in self.senders.values() {
            let _ = sender.send(event.clone());
        }
    }

    fn send_to(&self, session_id: &SessionId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(session_id) {
            let _ = sender.send(event);
        }
    }
}

/// Spawns a room actor and returns a handle to it. The owner is seated by
/// [`RoomGame::new`] already; callers must still `join()` the owner's own
/// `PlayerSender` through the handle to wire up their outbound channel.
#[allow(clippy::too_many_arguments)]
pub fn spawn_room(
    room_id: RoomId,
    display_name: String,
    password: Option<String>,
    owner_session_id: SessionId,
    owner_display_name: String,
    owner_avatar_tag: String,
    category: Option<String>,
    game_mode: GameMode,
    config: parlor_engine::GameConfig,
    word_bank: Arc<dyn WordBank + Send + Sync>,
    room_config: RoomConfig,
    stats_tx: mpsc::UnboundedSender<GameEndRecord>,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(room_config.channel_size);
    let game = RoomGame::new(
        room_id.clone(),
        display_name,
        password,
        owner_session_id,
        owner_display_name,
        owner_avatar_tag,
        category,
        game_mode,
        config,
        word_bank,
    );
    let actor = RoomActor {
        game,
        senders: HashMap::new(),
        receiver: rx,
        stats_tx,
        scheduler: TickScheduler::with_rate(1),
    };
    tokio::spawn(actor.run());
    RoomHandle { room_id, sender: tx }
}
