//! The concrete game wrapped by a room actor.
//!
//! A generic backend would make its room actor generic over a `GameLogic`
//! trait so one `RoomActor<G>` shape could host any game. This server hosts
//! exactly one game, so `RoomGame` owns a [`parlor_engine::Room`] and
//! [`parlor_engine::GameConfig`] directly and calls the engine's pure
//! functions itself rather than going through an associated-type seam.
//! Every method here is the authoritative implementation of one inbound
//! event or one phase-scheduler completion handler; the room actor
//! (`room.rs`) only owns channels and fan-out, none of the rules.

use std::collections::HashMap;
use std::sync::Arc;

use parlor_engine::{
    apply_phase_transition, apply_vote, calculate_eliminated, check_win_condition,
    select_turn_order, select_words_for_mode, validate_vote, GameConfig, GameError, GameState,
    Phase, Player, Room, WordBank, Winner, MAX_PLAYERS, MIN_PLAYERS,
};
use parlor_protocol::{ChatMessage, GameEndRecord, GameId, GameMode, RoomId, RoomStatus, SessionId};

/// Outcome of a player leaving the room, for the actor to act on.
#[derive(Debug, Clone)]
pub struct LeaveOutcome {
    /// The room has no players left and should be torn down.
    pub room_destroyed: bool,
    /// A game ended as a direct result of this departure (the imposter
    /// disconnected mid-game), and should be reported to the stats sink.
    pub game_ended: Option<GameEndRecord>,
}

/// Outcome of a scheduler tick.
#[derive(Debug, Clone, Default)]
pub struct TickOutcome {
    /// A game reached GAME_OVER on this tick.
    pub game_ended: Option<GameEndRecord>,
}

pub struct RoomGame {
    pub room: Room,
    config: GameConfig,
    word_bank: Arc<dyn WordBank + Send + Sync>,
    ticks_elapsed: u64,
}

impl RoomGame {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        room_id: RoomId,
        display_name: String,
        password: Option<String>,
        owner_session_id: SessionId,
        owner_display_name: String,
        owner_avatar_tag: String,
        category: Option<String>,
        game_mode: GameMode,
        config: GameConfig,
        word_bank: Arc<dyn WordBank + Send + Sync>,
    ) -> Self {
        let owner = Player::new(owner_session_id.clone(), owner_display_name, owner_avatar_tag);
        let room = Room {
            room_id,
            display_name,
            password,
            players: vec![owner],
            owner_session_id,
            status: RoomStatus::Lobby,
            selected_category: category,
            game_mode,
            game_state: None,
        };
        Self { room, config, word_bank, ticks_elapsed: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.room.players.is_empty()
    }

    /// `join_room`. Idempotent if the session is already seated.
    pub fn join(
        &mut self,
        session_id: SessionId,
        display_name: String,
        avatar_tag: String,
        password: Option<String>,
    ) -> Result<(), GameError> {
        if self.room.contains(&session_id) {
            return Ok(());
        }
        if self.room.password.is_some() && self.room.password != password {
            return Err(GameError::IncorrectPassword);
        }
        if self.room.status != RoomStatus::Lobby {
            return Err(GameError::GameAlreadyStarted);
        }
        if self.room.players.len() >= MAX_PLAYERS {
            return Err(GameError::RoomFull);
        }
        self.room.players.push(Player::new(session_id, display_name, avatar_tag));
        Ok(())
    }

    /// `leave_room` / disconnect cleanup.
    pub fn leave(&mut self, session_id: &SessionId) -> LeaveOutcome {
        let was_owner = self.room.owner_session_id == *session_id;
        self.room.players.retain(|p| p.session_id != *session_id);

        if self.room.players.is_empty() {
            return LeaveOutcome { room_destroyed: true, game_ended: None };
        }

        if was_owner {
            self.room.owner_session_id = self.room.players[0].session_id.clone();
        }

        let mut game_ended = None;

        if self.room.status == RoomStatus::Playing {
            let was_imposter = self
                .room
                .game_state
                .as_ref()
                .map(|g| g.imposter_session_id == *session_id)
                .unwrap_or(false);
            let already_over = self
                .room
                .game_state
                .as_ref()
                .map(|g| g.phase == Phase::GameOver)
                .unwrap_or(true);

            if let Some(game) = self.room.game_state.as_mut() {
                game.turn_order.retain(|s| s != session_id);
                game.votes.remove(session_id);
                game.votes.retain(|_, target| target != session_id);
                game.hints.remove(session_id);
                if !game.turn_order.is_empty() && game.current_turn_index >= game.turn_order.len() {
                    game.current_turn_index %= game.turn_order.len();
                }
            }

            if was_imposter && !already_over {
                game_ended = Some(self.end_game(Winner::Citizens));
            } else if self.room.status == RoomStatus::Playing
                && self.room.players.len() < MIN_PLAYERS
            {
                self.room.status = RoomStatus::Lobby;
                self.room.game_state = None;
                self.room.selected_category = None;
            }
        }

        LeaveOutcome { room_destroyed: false, game_ended }
    }

    /// `start_game`.
    pub fn start_game(
        &mut self,
        session_id: &SessionId,
        _language: Option<String>,
        mut rand: impl FnMut() -> f64,
    ) -> Result<(), GameError> {
        if self.room.owner_session_id != *session_id {
            return Err(GameError::YouAreNotTheHost);
        }
        if self.room.status != RoomStatus::Lobby {
            return Err(GameError::GameAlreadyStarted);
        }
        if self.room.players.len() < MIN_PLAYERS {
            return Err(GameError::NeedAtLeastNPlayers);
        }

        let category = match &self.room.selected_category {
            Some(c) => c.clone(),
            None => {
                let categories = self.word_bank.categories();
                let idx = ((rand() * categories.len() as f64) as usize).min(categories.len() - 1);
                categories[idx].to_string()
            }
        };
        let word_list = self
            .word_bank
            .words(&category)
            .expect("category was resolved from the word bank's own category list")
            .to_vec();
        let pair = select_words_for_mode(self.room.game_mode, &word_list, &mut rand);

        let session_ids: Vec<SessionId> = self.room.players.iter().map(|p| p.session_id.clone()).collect();
        let imposter_idx = ((rand() * session_ids.len() as f64) as usize).min(session_ids.len() - 1);
        let imposter_id = session_ids[imposter_idx].clone();
        let turn_order = select_turn_order(&session_ids, &imposter_id, self.room.game_mode, &mut rand);

        for player in &mut self.room.players {
            player.eliminated = false;
        }

        let initial = GameState {
            game_id: GameId::new(),
            phase: Phase::Lobby,
            category: category.clone(),
            citizen_word: pair.citizen_word,
            imposter_word: pair.imposter_word,
            imposter_session_id: imposter_id,
            current_turn_index: 0,
            turn_order,
            turn_time_left: 0,
            phase_time_left: 0,
            round_number: 1,
            votes: HashMap::new(),
            hints: HashMap::new(),
            eliminated_player_id: None,
            winner: None,
        };
        let revealed = apply_phase_transition(&initial, Phase::RoleReveal, &self.config)
            .expect("LOBBY -> ROLE_REVEAL is a legal edge");

        self.room.status = RoomStatus::Playing;
        self.room.selected_category = Some(category);
        self.room.game_state = Some(revealed);
        self.ticks_elapsed = 0;
        Ok(())
    }

    /// `submit_hint`.
    pub fn submit_hint(&mut self, session_id: &SessionId, text: &str) -> Result<(), GameError> {
        {
            let game = self.room.game_state.as_ref().ok_or(GameError::GameNotStarted)?;
            if game.phase != Phase::HintRound {
                return Err(GameError::WrongPhase);
            }
            if game.current_speaker() != Some(session_id) {
                return Err(GameError::NotYourTurn);
            }
            let trimmed = text.trim();
            if trimmed.eq_ignore_ascii_case(&game.citizen_word) {
                return Err(GameError::CannotUseTheSecretWordAsHint);
            }
        }

        let trimmed = text.trim();
        let hint = if trimmed.is_empty() {
            "(Empty)".to_string()
        } else {
            trimmed.chars().take(50).collect::<String>()
        };

        let game = self.room.game_state.as_mut().expect("checked above");
        game.hints.entry(session_id.clone()).or_default().push(hint);
        self.advance_hint_turn();
        Ok(())
    }

    /// `submit_vote`. Resolves the round immediately once every active
    /// player has cast a vote, instead of waiting for VOTING's timer.
    pub fn submit_vote(&mut self, voter: &SessionId, target: &SessionId) -> Result<(), GameError> {
        if let Some(err) = validate_vote(&self.room, voter, target) {
            return Err(err);
        }
        {
            let game = self.room.game_state.as_mut().expect("validate_vote checked the game exists");
            game.votes = apply_vote(&game.votes, voter.clone(), target.clone());
        }
        let all_voted = {
            let game = self.room.game_state.as_ref().unwrap();
            self.room.active_players().all(|p| game.votes.contains_key(&p.session_id))
        };
        if all_voted {
            self.resolve_votes();
        }
        Ok(())
    }

    /// `play_again`.
    pub fn play_again(&mut self, session_id: &SessionId) -> Result<(), GameError> {
        if self.room.owner_session_id != *session_id {
            return Err(GameError::YouAreNotTheHost);
        }
        if self.room.status != RoomStatus::Ended {
            return Err(GameError::WrongPhase);
        }
        self.room.status = RoomStatus::Lobby;
        self.room.game_state = None;
        for p in &mut self.room.players {
            p.eliminated = false;
            p.ready = false;
        }
        Ok(())
    }

    /// Room chat. Not a game rule, just a room-membership check.
    pub fn chat(&self, session_id: &SessionId, text: &str) -> Result<ChatMessage, GameError> {
        let player = self.room.player(session_id).ok_or(GameError::NotAuthorized)?;
        let text: String = text.trim().chars().take(200).collect();
        Ok(ChatMessage { session_id: session_id.clone(), display_name: player.display_name.clone(), text })
    }

    /// One 1Hz scheduler tick. No-op unless a game is in progress.
    pub fn tick(&mut self, mut rand: impl FnMut() -> f64) -> TickOutcome {
        if self.room.status != RoomStatus::Playing {
            return TickOutcome::default();
        }
        self.ticks_elapsed += 1;

        let phase = match &self.room.game_state {
            Some(g) => g.phase,
            None => return TickOutcome::default(),
        };

        match phase {
            Phase::Lobby | Phase::GameOver => TickOutcome::default(),
            Phase::HintRound => {
                let expired = {
                    let game = self.room.game_state.as_mut().unwrap();
                    if game.turn_time_left > 0 {
                        game.turn_time_left -= 1;
                    }
                    game.turn_time_left == 0
                };
                if expired {
                    self.handle_turn_timeout();
                }
                TickOutcome::default()
            }
            _ => {
                let expired = {
                    let game = self.room.game_state.as_mut().unwrap();
                    if game.phase_time_left > 0 {
                        game.phase_time_left -= 1;
                    }
                    game.phase_time_left == 0
                };
                if expired {
                    self.handle_phase_expiry(phase)
                } else {
                    TickOutcome::default()
                }
            }
        }
    }

    fn handle_turn_timeout(&mut self) {
        let game = self.room.game_state.as_mut().unwrap();
        if let Some(speaker) = game.current_speaker().cloned() {
            game.hints.entry(speaker).or_default().push("(Timed out)".to_string());
        }
        self.advance_hint_turn();
    }

    fn advance_hint_turn(&mut self) {
        let game = self.room.game_state.as_mut().unwrap();
        game.current_turn_index += 1;
        if game.turn_order.is_empty() || game.current_turn_index >= game.turn_order.len() {
            if game.round_number < self.config.hint_rounds {
                game.round_number += 1;
                game.current_turn_index = 0;
                game.turn_time_left = self.config.hint_turn_time;
            } else {
                self.transition(Phase::Discussion);
            }
        } else {
            game.turn_time_left = self.config.hint_turn_time;
        }
    }

    fn handle_phase_expiry(&mut self, phase: Phase) -> TickOutcome {
        match phase {
            Phase::RoleReveal => {
                self.transition(Phase::HintRound);
                TickOutcome::default()
            }
            Phase::Discussion => {
                self.transition(Phase::Voting);
                TickOutcome::default()
            }
            Phase::Voting => {
                self.resolve_votes();
                TickOutcome::default()
            }
            Phase::VoteResult => self.complete_vote_result(),
            Phase::Lobby | Phase::HintRound | Phase::GameOver => TickOutcome::default(),
        }
    }

    fn transition(&mut self, target: Phase) {
        let next = {
            let game = self.room.game_state.as_ref().unwrap();
            apply_phase_transition(game, target, &self.config)
                .expect("transition() is only called with a legal edge from the current phase")
        };
        self.room.game_state = Some(next);
    }

    fn resolve_votes(&mut self) {
        let eliminated = {
            let game = self.room.game_state.as_ref().unwrap();
            calculate_eliminated(&game.votes)
        };
        if let Some(id) = &eliminated {
            if let Some(p) = self.room.player_mut(id) {
                p.eliminated = true;
            }
            let game = self.room.game_state.as_mut().unwrap();
            game.turn_order.retain(|s| s != id);
            if !game.turn_order.is_empty() && game.current_turn_index >= game.turn_order.len() {
                game.current_turn_index %= game.turn_order.len();
            }
        }
        self.room.game_state.as_mut().unwrap().eliminated_player_id = eliminated;
        self.transition(Phase::VoteResult);
    }

    fn complete_vote_result(&mut self) -> TickOutcome {
        let winner = {
            let game = self.room.game_state.as_ref().unwrap();
            check_win_condition(&self.room, game)
        };
        match winner {
            Some(w) => TickOutcome { game_ended: Some(self.end_game(w)) },
            None => {
                {
                    let game = self.room.game_state.as_mut().unwrap();
                    game.round_number += 1;
                    game.hints.clear();
                    game.votes.clear();
                    game.eliminated_player_id = None;
                }
                self.transition(Phase::HintRound);
                TickOutcome::default()
            }
        }
    }

    /// Ends the game immediately, bypassing the normal phase graph. This
    /// is used both by a winning VOTE_RESULT (a legal VOTE_RESULT ->
    /// GAME_OVER edge, so going through `transition` would also work
    /// there) and by an imposter disconnecting mid-round (not a legal
    /// edge from every phase) — doing it uniformly here keeps both paths
    /// in one place.
    fn end_game(&mut self, winner: Winner) -> GameEndRecord {
        let game = self.room.game_state.as_mut().unwrap();
        game.winner = Some(winner);
        game.phase = Phase::GameOver;
        game.phase_time_left = 0;
        game.turn_time_left = 0;
        self.room.status = RoomStatus::Ended;

        let game = self.room.game_state.as_ref().unwrap();
        GameEndRecord {
            game_id: game.game_id,
            winner: match winner {
                Winner::Citizens => "CITIZENS".to_string(),
                Winner::Imposter => "IMPOSTER".to_string(),
            },
            players: self.room.players.iter().map(|p| p.session_id.clone()).collect(),
            category: self.room.selected_category.clone(),
            room_id: Some(self.room.room_id.clone()),
            duration_seconds: Some(self.ticks_elapsed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_engine::BuiltinWordBank;

    fn sid(s: &str) -> SessionId {
        SessionId(s.into())
    }

    /// A three-player room in `HINT_ROUND`, started with an always-zero
    /// rand source so the category ("Animals"), citizen word ("Cat"),
    /// and turn order (owner first) are all deterministic.
    fn hint_round_game() -> RoomGame {
        let mut game = RoomGame::new(
            RoomId("ABCDEF".into()),
            "Game Night".into(),
            None,
            sid("host"),
            "Host".into(),
            "fox".into(),
            None,
            GameMode::Classic,
            GameConfig::default(),
            Arc::new(BuiltinWordBank),
        );
        game.join(sid("p2"), "P2".into(), "owl".into(), None).unwrap();
        game.join(sid("p3"), "P3".into(), "owl".into(), None).unwrap();
        game.start_game(&sid("host"), None, || 0.0).unwrap();
        game.transition(Phase::HintRound);
        game
    }

    #[test]
    fn test_submit_hint_records_hint_and_advances_turn() {
        let mut game = hint_round_game();
        let state = game.room.game_state.as_ref().unwrap();
        assert_eq!(state.citizen_word, "Cat");
        let speaker = state.current_speaker().cloned().unwrap();
        assert_eq!(speaker, sid("host"));

        game.submit_hint(&speaker, "Lion").unwrap();

        let state = game.room.game_state.as_ref().unwrap();
        assert_eq!(state.hints.get(&speaker).unwrap(), &vec!["Lion".to_string()]);
        assert_eq!(state.current_turn_index, 1);
    }

    #[test]
    fn test_submit_hint_rejects_secret_word_case_insensitively() {
        let mut game = hint_round_game();
        let speaker = game.room.game_state.as_ref().unwrap().current_speaker().cloned().unwrap();
        let turn_before = game.room.game_state.as_ref().unwrap().current_turn_index;

        let err = game.submit_hint(&speaker, "cAt").unwrap_err();

        assert_eq!(err, GameError::CannotUseTheSecretWordAsHint);
        let state = game.room.game_state.as_ref().unwrap();
        assert_eq!(state.current_turn_index, turn_before);
        assert!(state.hints.get(&speaker).is_none());
    }

    #[test]
    fn test_submit_hint_rejects_out_of_turn_player() {
        let mut game = hint_round_game();
        let state = game.room.game_state.as_ref().unwrap();
        let speaker = state.current_speaker().cloned().unwrap();
        let not_speaker = [sid("host"), sid("p2"), sid("p3")]
            .into_iter()
            .find(|s| *s != speaker)
            .unwrap();

        let err = game.submit_hint(&not_speaker, "Lion").unwrap_err();
        assert_eq!(err, GameError::NotYourTurn);
    }
}
