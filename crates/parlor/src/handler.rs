//! Per-connection session orchestrator: handshake, event dispatch, and
//! disconnect cleanup. One instance of [`handle_connection`] runs per
//! accepted connection; it owns nothing across connections except the
//! shared [`ServerState`].

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parlor_protocol::{
    Channel, ClientEvent, Codec, Envelope, FriendErrorCode, Payload, ServerEvent, SessionId,
    SystemMessage, UserId,
};
use parlor_room::PlayerSender;
use parlor_session::{Authenticator, PresenceChange, RateLimiter};
use parlor_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::{ServerState, PROTOCOL_VERSION};
use crate::ParlorError;

/// Runs one connection end to end: handshake, event loop, cleanup.
pub(crate) async fn handle_connection<A, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<A, C>>,
) -> Result<(), ParlorError>
where
    A: Authenticator,
    C: Codec + Clone + 'static,
{
    let mut seq = 0u64;

    let session_id = match perform_handshake(&conn, &state, &mut seq).await? {
        Some(id) => id,
        None => return Ok(()),
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    state.connections.lock().await.insert(session_id.clone(), tx.clone());

    let mut profile: Option<(String, String)> = None;
    let result = run_event_loop(&conn, &state, &session_id, &tx, &mut rx, &mut seq, &mut profile).await;

    cleanup(&state, &session_id).await;

    result
}

/// Reads the first frame and expects a `Handshake`. Returns `None` if the
/// connection closed, or sends a `Disconnect` and returns `None` on a
/// version mismatch — both are not errors, just "no session to run".
async fn perform_handshake<A, C>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<A, C>>,
    seq: &mut u64,
) -> Result<Option<SessionId>, ParlorError>
where
    A: Authenticator,
    C: Codec,
{
    let Some(bytes) = conn.recv().await? else {
        return Ok(None);
    };
    let envelope: Envelope = match state.codec.decode(&bytes) {
        Ok(e) => e,
        Err(_) => return Ok(None),
    };
    let Payload::System(SystemMessage::Handshake { version, token }) = envelope.payload else {
        return Ok(None);
    };
    if version != PROTOCOL_VERSION {
        send_system(
            conn,
            state,
            seq,
            SystemMessage::Disconnect { reason: "unsupported protocol version".into() },
        )
        .await?;
        return Ok(None);
    }

    let auth = state.auth.authenticate(&token).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "auth collaborator failed, degrading to guest");
        parlor_session::AuthResult { user_id: None, is_anonymous: true }
    });

    let session_id = {
        let mut sessions = state.sessions.lock().await;
        sessions.create(auth).session_id.clone()
    };

    send_system(
        conn,
        state,
        seq,
        SystemMessage::HandshakeAck { session_id: session_id.clone(), server_time: now_millis() },
    )
    .await?;

    Ok(Some(session_id))
}

#[allow(clippy::too_many_arguments)]
async fn run_event_loop<A, C>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<A, C>>,
    session_id: &SessionId,
    self_tx: &PlayerSender,
    rx: &mut mpsc::UnboundedReceiver<ServerEvent>,
    seq: &mut u64,
    profile: &mut Option<(String, String)>,
) -> Result<(), ParlorError>
where
    A: Authenticator,
    C: Codec,
{
    loop {
        tokio::select! {
            incoming = conn.recv() => {
                match incoming? {
                    None => return Ok(()),
                    Some(bytes) => {
                        let envelope: Envelope = match state.codec.decode(&bytes) {
                            Ok(e) => e,
                            Err(e) => {
                                tracing::debug!(%session_id, error = %e, "dropping malformed frame");
                                continue;
                            }
                        };
                        match envelope.payload {
                            Payload::Client(event) => {
                                dispatch(state, session_id, self_tx, event, profile).await;
                            }
                            Payload::System(SystemMessage::Heartbeat { client_time }) => {
                                send_system(
                                    conn,
                                    state,
                                    seq,
                                    SystemMessage::HeartbeatAck { client_time, server_time: now_millis() },
                                )
                                .await?;
                            }
                            Payload::System(SystemMessage::Disconnect { .. }) => return Ok(()),
                            _ => {}
                        }
                    }
                }
            }
            event = rx.recv() => {
                match event {
                    Some(event) => send_envelope(conn, state, seq, Payload::Server(event)).await?,
                    None => return Ok(()),
                }
            }
        }
    }
}

/// Disconnect cleanup per the leave/disconnect ordering: leave every
/// room, drop presence, destroy the session, forget its outbound channel.
async fn cleanup<A, C>(state: &Arc<ServerState<A, C>>, session_id: &SessionId)
where
    A: Authenticator,
    C: Codec,
{
    let _ = state.rooms.lock().await.leave_room(session_id.clone()).await;

    let user_id = state.sessions.lock().await.get(session_id).and_then(|s| s.user_id().cloned());
    if let Some(user_id) = &user_id {
        let change = state.presence.lock().await.remove(user_id, session_id);
        if change == PresenceChange::WentOffline {
            notify_friends(state, user_id, ServerEvent::FriendOffline { user_id: user_id.clone() }).await;
        }
    }

    let _ = state.sessions.lock().await.destroy(session_id);
    state.connections.lock().await.remove(session_id);
    tracing::debug!(%session_id, "connection cleaned up");
}

/// Consults the rate limiter, then dispatches one inbound client event.
async fn dispatch<A, C>(
    state: &Arc<ServerState<A, C>>,
    session_id: &SessionId,
    self_tx: &PlayerSender,
    event: ClientEvent,
    profile: &mut Option<(String, String)>,
) where
    A: Authenticator,
    C: Codec,
{
    let user_id = state.sessions.lock().await.get(session_id).and_then(|s| s.user_id().cloned());

    if !state.rate_limiter.allow(event_name(&event), session_id, user_id.as_ref()) {
        let _ = self_tx.send(ServerEvent::Error("RATE_LIMITED".into()));
        return;
    }

    match event {
        ClientEvent::JoinGame { name, avatar } => {
            *profile = Some((name, avatar));
            if let Some(user_id) = &user_id {
                let change = state.presence.lock().await.add(user_id.clone(), session_id.clone());
                if change == PresenceChange::WentOnline {
                    notify_friends(state, user_id, ServerEvent::FriendOnline { user_id: user_id.clone() }).await;
                }
            }
            send_lobby_snapshot(state, self_tx, user_id.as_ref()).await;
        }
        ClientEvent::CreateRoom { name, password, category, game_mode } => {
            let Some((display_name, avatar_tag)) = profile.clone() else {
                let _ = self_tx.send(ServerEvent::Error("NOT_AUTHORIZED".into()));
                return;
            };
            let result = state
                .rooms
                .lock()
                .await
                .create_room(
                    session_id.clone(),
                    display_name,
                    avatar_tag,
                    self_tx.clone(),
                    name,
                    password,
                    category,
                    game_mode.unwrap_or_default(),
                )
                .await;
            if let Err(e) = result {
                let _ = self_tx.send(ServerEvent::Error(e.code().to_string()));
            }
        }
        ClientEvent::JoinRoom { room_id, password } => {
            let Some((display_name, avatar_tag)) = profile.clone() else {
                let _ = self_tx.send(ServerEvent::Error("NOT_AUTHORIZED".into()));
                return;
            };
            let result = state
                .rooms
                .lock()
                .await
                .join_room(session_id.clone(), room_id, display_name, avatar_tag, password, self_tx.clone())
                .await;
            if let Err(e) = result {
                let _ = self_tx.send(ServerEvent::Error(e.code().to_string()));
            }
        }
        ClientEvent::LeaveRoom => {
            let _ = state.rooms.lock().await.leave_room(session_id.clone()).await;
        }
        ClientEvent::StartGame { language } => {
            let room_id = state.rooms.lock().await.player_room(session_id);
            match room_id {
                Some(room_id) => {
                    let result = state.rooms.lock().await.start_game(session_id.clone(), &room_id, language).await;
                    report(self_tx, result);
                }
                None => report_not_in_room(self_tx),
            }
        }
        ClientEvent::SubmitHint(text) => {
            let room_id = state.rooms.lock().await.player_room(session_id);
            match room_id {
                Some(room_id) => {
                    let result = state.rooms.lock().await.submit_hint(session_id.clone(), &room_id, text).await;
                    report(self_tx, result);
                }
                None => report_not_in_room(self_tx),
            }
        }
        ClientEvent::SubmitVote { target_session_id } => {
            let room_id = state.rooms.lock().await.player_room(session_id);
            match room_id {
                Some(room_id) => {
                    let result = state
                        .rooms
                        .lock()
                        .await
                        .submit_vote(session_id.clone(), &room_id, target_session_id)
                        .await;
                    report(self_tx, result);
                }
                None => report_not_in_room(self_tx),
            }
        }
        ClientEvent::PlayAgain => {
            let room_id = state.rooms.lock().await.player_room(session_id);
            match room_id {
                Some(room_id) => {
                    let result = state.rooms.lock().await.play_again(session_id.clone(), &room_id).await;
                    report(self_tx, result);
                }
                None => report_not_in_room(self_tx),
            }
        }
        ClientEvent::SendMessage(text) => {
            let room_id = state.rooms.lock().await.player_room(session_id);
            match room_id {
                Some(room_id) => {
                    let result = state.rooms.lock().await.send_message(session_id.clone(), &room_id, text).await;
                    report(self_tx, result);
                }
                None => report_not_in_room(self_tx),
            }
        }
        ClientEvent::GetRooms => {
            let list = state.rooms.lock().await.list_rooms().await;
            let _ = self_tx.send(ServerEvent::RoomList(list));
        }
        ClientEvent::SendFriendRequest { user_id: to } => {
            let Some(from) = &user_id else {
                send_friend_not_authorized(self_tx);
                return;
            };
            match state.friends.send_request(from, &to) {
                Ok(_id) => notify_pending_requests(state, &to).await,
                Err(code) => send_friend_error(self_tx, code),
            }
        }
        ClientEvent::AcceptFriendRequest { request_id } => {
            let Some(user) = &user_id else {
                send_friend_not_authorized(self_tx);
                return;
            };
            match state.friends.accept_request(user, &request_id) {
                Ok(from) => {
                    refresh_friends_online_list(state, user, self_tx).await;
                    notify_friends_online_refresh(state, &from).await;
                }
                Err(code) => send_friend_error(self_tx, code),
            }
        }
        ClientEvent::DeclineFriendRequest { request_id } => {
            let Some(user) = &user_id else {
                send_friend_not_authorized(self_tx);
                return;
            };
            if let Err(code) = state.friends.decline_request(user, &request_id) {
                send_friend_error(self_tx, code);
            }
        }
        ClientEvent::CancelFriendRequest { request_id } => {
            let Some(user) = &user_id else {
                send_friend_not_authorized(self_tx);
                return;
            };
            if let Err(code) = state.friends.cancel_request(user, &request_id) {
                send_friend_error(self_tx, code);
            }
        }
        ClientEvent::RemoveFriend { user_id: other } => {
            let Some(user) = &user_id else {
                send_friend_not_authorized(self_tx);
                return;
            };
            state.friends.remove_friend(user, &other);
        }
        ClientEvent::SendRoomInvite { user_id: to, room_id } => {
            let Some(from) = &user_id else {
                send_friend_not_authorized(self_tx);
                return;
            };
            match state.friends.send_invite(from, &to, &room_id) {
                Ok(_id) => notify_pending_invites(state, &to).await,
                Err(code) => send_friend_error(self_tx, code),
            }
        }
        ClientEvent::RespondToInvite { invite_id, accept } => {
            let Some(user) = &user_id else {
                send_friend_not_authorized(self_tx);
                return;
            };
            match state.friends.respond_invite(user, &invite_id, accept) {
                Ok(Some((_from, room_id))) => {
                    let Some((display_name, avatar_tag)) = profile.clone() else {
                        let _ = self_tx.send(ServerEvent::Error("NOT_AUTHORIZED".into()));
                        return;
                    };
                    let result = state
                        .rooms
                        .lock()
                        .await
                        .join_room(session_id.clone(), room_id, display_name, avatar_tag, None, self_tx.clone())
                        .await;
                    if let Err(e) = result {
                        let _ = self_tx.send(ServerEvent::Error(e.code().to_string()));
                    }
                }
                Ok(None) => {}
                Err(code) => send_friend_error(self_tx, code),
            }
        }
        ClientEvent::GetPendingInvites => {
            let Some(user) = &user_id else {
                send_friend_not_authorized(self_tx);
                return;
            };
            let _ = self_tx.send(ServerEvent::PendingInvites(state.friends.pending_invites(user)));
        }
        ClientEvent::GetPendingRequests => {
            let Some(user) = &user_id else {
                send_friend_not_authorized(self_tx);
                return;
            };
            let _ = self_tx.send(ServerEvent::PendingRequests(state.friends.pending_requests(user)));
        }
    }
}

fn report(self_tx: &PlayerSender, result: Result<(), parlor_room::RoomError>) {
    if let Err(e) = result {
        let _ = self_tx.send(ServerEvent::Error(e.code().to_string()));
    }
}

fn report_not_in_room(self_tx: &PlayerSender) {
    let _ = self_tx.send(ServerEvent::Error(parlor_engine::GameError::RoomNotFound.code().to_string()));
}

async fn send_lobby_snapshot<A, C>(state: &Arc<ServerState<A, C>>, self_tx: &PlayerSender, user_id: Option<&UserId>)
where
    A: Authenticator,
    C: Codec,
{
    let list = state.rooms.lock().await.list_rooms().await;
    let _ = self_tx.send(ServerEvent::RoomList(list));

    if let Some(user_id) = user_id {
        let presence = state.presence.lock().await;
        let online: Vec<UserId> =
            state.friends.friends_of(user_id).into_iter().filter(|f| presence.is_online(f)).collect();
        drop(presence);
        let _ = self_tx.send(ServerEvent::FriendsOnlineList { user_ids: online });
    }
}

async fn refresh_friends_online_list<A, C>(state: &Arc<ServerState<A, C>>, user_id: &UserId, self_tx: &PlayerSender)
where
    A: Authenticator,
    C: Codec,
{
    let presence = state.presence.lock().await;
    let online: Vec<UserId> =
        state.friends.friends_of(user_id).into_iter().filter(|f| presence.is_online(f)).collect();
    drop(presence);
    let _ = self_tx.send(ServerEvent::FriendsOnlineList { user_ids: online });
}

/// Sends every online session of `user_id` a refreshed online-friends list.
/// Used after a friend request is accepted, since both sides' lists change.
async fn notify_friends_online_refresh<A, C>(state: &Arc<ServerState<A, C>>, user_id: &UserId)
where
    A: Authenticator,
    C: Codec,
{
    let presence = state.presence.lock().await;
    let sessions: Vec<SessionId> = presence.sessions_of(user_id).cloned().collect();
    let online: Vec<UserId> =
        state.friends.friends_of(user_id).into_iter().filter(|f| presence.is_online(f)).collect();
    drop(presence);
    let connections = state.connections.lock().await;
    for session in &sessions {
        if let Some(sender) = connections.get(session) {
            let _ = sender.send(ServerEvent::FriendsOnlineList { user_ids: online.clone() });
        }
    }
}

async fn notify_pending_requests<A, C>(state: &Arc<ServerState<A, C>>, user_id: &UserId)
where
    A: Authenticator,
    C: Codec,
{
    let pending = state.friends.pending_requests(user_id);
    let presence = state.presence.lock().await;
    let sessions: Vec<SessionId> = presence.sessions_of(user_id).cloned().collect();
    drop(presence);
    let connections = state.connections.lock().await;
    for session in &sessions {
        if let Some(sender) = connections.get(session) {
            let _ = sender.send(ServerEvent::PendingRequests(pending.clone()));
        }
    }
}

async fn notify_pending_invites<A, C>(state: &Arc<ServerState<A, C>>, user_id: &UserId)
where
    A: Authenticator,
    C: Codec,
{
    let pending = state.friends.pending_invites(user_id);
    let presence = state.presence.lock().await;
    let sessions: Vec<SessionId> = presence.sessions_of(user_id).cloned().collect();
    drop(presence);
    let connections = state.connections.lock().await;
    for session in &sessions {
        if let Some(sender) = connections.get(session) {
            let _ = sender.send(ServerEvent::PendingInvites(pending.clone()));
        }
    }
}

/// Fans `event` out to every online session of every friend of `user_id`.
async fn notify_friends<A, C>(state: &Arc<ServerState<A, C>>, user_id: &UserId, event: ServerEvent)
where
    A: Authenticator,
    C: Codec,
{
    let friends = state.friends.friends_of(user_id);
    let presence = state.presence.lock().await;
    let mut targets = Vec::new();
    for friend in &friends {
        targets.extend(presence.sessions_of(friend).cloned());
    }
    drop(presence);
    let connections = state.connections.lock().await;
    for session in &targets {
        if let Some(sender) = connections.get(session) {
            let _ = sender.send(event.clone());
        }
    }
}

fn send_friend_not_authorized(self_tx: &PlayerSender) {
    let _ = self_tx.send(ServerEvent::FriendError {
        code: FriendErrorCode::NotAuthorized,
        message: Some("guest sessions cannot use the friend system".into()),
    });
}

fn send_friend_error(self_tx: &PlayerSender, code: FriendErrorCode) {
    let _ = self_tx.send(ServerEvent::FriendError { code, message: None });
}

/// Encodes and sends one server-originated envelope over the wire.
async fn send_envelope<A, C>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<A, C>>,
    seq: &mut u64,
    payload: Payload,
) -> Result<(), ParlorError>
where
    A: Authenticator,
    C: Codec,
{
    *seq += 1;
    let envelope = Envelope { seq: *seq, timestamp: now_millis(), channel: Channel::ReliableOrdered, payload };
    let bytes = state.codec.encode(&envelope)?;
    conn.send(&bytes).await?;
    Ok(())
}

async fn send_system<A, C>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<A, C>>,
    seq: &mut u64,
    msg: SystemMessage,
) -> Result<(), ParlorError>
where
    A: Authenticator,
    C: Codec,
{
    send_envelope(conn, state, seq, Payload::System(msg)).await
}

fn now_millis() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

fn event_name(event: &ClientEvent) -> &'static str {
    match event {
        ClientEvent::JoinGame { .. } => "join_game",
        ClientEvent::CreateRoom { .. } => "create_room",
        ClientEvent::JoinRoom { .. } => "join_room",
        ClientEvent::LeaveRoom => "leave_room",
        ClientEvent::StartGame { .. } => "start_game",
        ClientEvent::SubmitHint(_) => "submit_hint",
        ClientEvent::SubmitVote { .. } => "submit_vote",
        ClientEvent::PlayAgain => "play_again",
        ClientEvent::SendMessage(_) => "send_message",
        ClientEvent::GetRooms => "get_rooms",
        ClientEvent::SendFriendRequest { .. } => "send_friend_request",
        ClientEvent::AcceptFriendRequest { .. } => "accept_friend_request",
        ClientEvent::DeclineFriendRequest { .. } => "decline_friend_request",
        ClientEvent::CancelFriendRequest { .. } => "cancel_friend_request",
        ClientEvent::RemoveFriend { .. } => "remove_friend",
        ClientEvent::SendRoomInvite { .. } => "send_room_invite",
        ClientEvent::RespondToInvite { .. } => "respond_to_invite",
        ClientEvent::GetPendingInvites => "get_pending_invites",
        ClientEvent::GetPendingRequests => "get_pending_requests",
    }
}
