//! Room manager: creates rooms, tracks which room each session is in,
//! and routes per-event commands to the right room actor.
//!
//! A generic room manager might mint sequential numeric room ids from a
//! static `AtomicU64` counter; this game's rooms are joined by a
//! human-typed code, so ids are short, upper-alphanumeric, and minted
//! with a collision-retry loop instead.

use std::collections::HashMap;
use std::sync::Arc;

use parlor_engine::{GameConfig, GameError, WordBank};
use parlor_protocol::{GameEndRecord, GameMode, RoomId, RoomListEntry, SessionId};
use rand::Rng;
use tokio::sync::mpsc;

use crate::config::RoomConfig;
use crate::error::RoomError;
use crate::room::{spawn_room, PlayerSender, RoomHandle};

const ROOM_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ROOM_ID_LEN: usize = 6;

pub struct RoomManager {
    rooms: HashMap<RoomId, RoomHandle>,
    player_rooms: HashMap<SessionId, RoomId>,
    room_config: RoomConfig,
    game_config: GameConfig,
    word_bank: Arc<dyn WordBank + Send + Sync>,
    stats_tx: mpsc::UnboundedSender<GameEndRecord>,
}

impl RoomManager {
    pub fn new(
        room_config: RoomConfig,
        game_config: GameConfig,
        word_bank: Arc<dyn WordBank + Send + Sync>,
        stats_tx: mpsc::UnboundedSender<GameEndRecord>,
    ) -> Self {
        Self {
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
            room_config,
            game_config,
            word_bank,
            stats_tx,
        }
    }

    /// `create_room`. Registers the owner's outbound channel through the
    /// same `join` path every later player uses — `RoomGame::new` already
    /// seated them, so this only wires up the sender.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_room(
        &mut self,
        owner_session_id: SessionId,
        owner_display_name: String,
        owner_avatar_tag: String,
        owner_sender: PlayerSender,
        display_name: String,
        password: Option<String>,
        category: Option<String>,
        game_mode: GameMode,
    ) -> Result<RoomId, RoomError> {
        let room_id = self.fresh_room_id();
        let handle = spawn_room(
            room_id.clone(),
            display_name,
            password.clone(),
            owner_session_id.clone(),
            owner_display_name.clone(),
            owner_avatar_tag.clone(),
            category,
            game_mode,
            self.game_config,
            self.word_bank.clone(),
            self.room_config,
            self.stats_tx.clone(),
        );
        handle
            .join(owner_session_id.clone(), owner_display_name, owner_avatar_tag, password, owner_sender)
            .await?;
        self.rooms.insert(room_id.clone(), handle);
        self.player_rooms.insert(owner_session_id, room_id.clone());
        tracing::info!(%room_id, "room created");
        Ok(room_id)
    }

    /// `join_room`. A session may only be in one room at a time — moving
    /// to a new one first leaves the old one through the same cleanup
    /// path a disconnect would take.
    pub async fn join_room(
        &mut self,
        session_id: SessionId,
        room_id: RoomId,
        display_name: String,
        avatar_tag: String,
        password: Option<String>,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        if let Some(current) = self.player_rooms.get(&session_id) {
            if *current == room_id {
                return Ok(());
            }
            let _ = self.leave_room(session_id.clone()).await;
        }

        let handle = self.handle(&room_id)?;
        handle.join(session_id.clone(), display_name, avatar_tag, password, sender).await?;
        self.player_rooms.insert(session_id, room_id);
        Ok(())
    }

    /// `leave_room` / disconnect.
    pub async fn leave_room(&mut self, session_id: SessionId) -> Result<(), RoomError> {
        let Some(room_id) = self.player_rooms.remove(&session_id) else {
            return Ok(());
        };
        if let Some(handle) = self.rooms.get(&room_id) {
            let destroyed = handle.leave(session_id).await?;
            if destroyed {
                self.rooms.remove(&room_id);
                tracing::info!(%room_id, "room destroyed (emptied)");
            }
        }
        Ok(())
    }

    pub async fn start_game(
        &self,
        session_id: SessionId,
        room_id: &RoomId,
        language: Option<String>,
    ) -> Result<(), RoomError> {
        self.handle(room_id)?.start_game(session_id, language).await
    }

    pub async fn submit_hint(&self, session_id: SessionId, room_id: &RoomId, text: String) -> Result<(), RoomError> {
        self.handle(room_id)?.submit_hint(session_id, text).await
    }

    pub async fn submit_vote(
        &self,
        session_id: SessionId,
        room_id: &RoomId,
        target: SessionId,
    ) -> Result<(), RoomError> {
        self.handle(room_id)?.submit_vote(session_id, target).await
    }

    pub async fn play_again(&self, session_id: SessionId, room_id: &RoomId) -> Result<(), RoomError> {
        self.handle(room_id)?.play_again(session_id).await
    }

    pub async fn send_message(&self, session_id: SessionId, room_id: &RoomId, text: String) -> Result<(), RoomError> {
        self.handle(room_id)?.send_message(session_id, text).await
    }

    pub fn player_room(&self, session_id: &SessionId) -> Option<RoomId> {
        self.player_rooms.get(session_id).cloned()
    }

    /// `get_rooms`. Lists every room; `status`/`player_count`/`max_players`
    /// on each entry let a client decide whether it can still be joined.
    pub async fn list_rooms(&self) -> Vec<RoomListEntry> {
        let mut out = Vec::with_capacity(self.rooms.len());
        for handle in self.rooms.values() {
            if let Ok(snapshot) = handle.snapshot().await {
                out.push(snapshot.list_entry);
            }
        }
        out
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().cloned().collect()
    }

    fn handle(&self, room_id: &RoomId) -> Result<RoomHandle, RoomError> {
        self.rooms.get(room_id).cloned().ok_or(RoomError::Game(GameError::RoomNotFound))
    }

    fn fresh_room_id(&self) -> RoomId {
        loop {
            let candidate: String = (0..ROOM_ID_LEN)
                .map(|_| {
                    let idx = rand::rng().random_range(0..ROOM_ID_ALPHABET.len());
                    ROOM_ID_ALPHABET[idx] as char
                })
                .collect();
            let room_id = RoomId(candidate);
            if !self.rooms.contains_key(&room_id) {
                return room_id;
            }
        }
    }
}
