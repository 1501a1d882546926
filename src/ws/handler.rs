//! WebSocket upgrade handler and session loop

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::server::{Recipient, RoomCmd, RoomEvent, RoomHandle};
use crate::server::registry::normalize_custom_id;
use crate::util::rate_limit::SessionRateLimiter;
use crate::util::time::unix_millis;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Per-connection session state
struct Session {
    player_id: Uuid,
    username: Option<String>,
    room: Option<RoomHandle>,
    state: AppState,
    rate: SessionRateLimiter,
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    // connections are anonymous; identity is minted per socket
    let player_id = Uuid::new_v4();
    info!(player_id = %player_id, "new WebSocket connection");

    let (mut sink, mut stream) = socket.split();

    let welcome = ServerMsg::Welcome {
        id: player_id,
        server_time: unix_millis(),
    };
    if send_msg(&mut sink, &welcome).await.is_err() {
        return;
    }

    let mut session = Session {
        player_id,
        username: None,
        room: None,
        state,
        rate: SessionRateLimiter::new(),
    };
    // swapped whenever the session enters a room
    let mut room_rx: Option<broadcast::Receiver<RoomEvent>> = None;

    loop {
        tokio::select! {
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if !session.rate.check_input() {
                            warn!(player_id = %player_id, "rate limited input message");
                            continue;
                        }
                        match serde_json::from_str::<ClientMsg>(&text) {
                            Ok(msg) => {
                                if session.handle_msg(msg, &mut sink, &mut room_rx).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!(player_id = %player_id, error = %e, "unparseable client message");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!(player_id = %player_id, "client closed connection");
                        break;
                    }
                    Some(Ok(_)) => {
                        // binary/ping/pong carry no protocol traffic
                    }
                    Some(Err(e)) => {
                        error!(player_id = %player_id, error = %e, "WebSocket error");
                        break;
                    }
                }
            }
            event = recv_room_event(&mut room_rx) => {
                match event {
                    Ok(event) => {
                        if session.event_is_for_us(&event)
                            && send_msg(&mut sink, &event.msg).await.is_err()
                        {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(player_id = %player_id, lagged = n, "client lagged, events skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!(player_id = %player_id, "room event channel closed");
                        room_rx = None;
                        session.room = None;
                    }
                }
            }
        }
    }

    session.leave_room().await;
    info!(player_id = %player_id, "WebSocket connection closed");
}

/// Wait on the room broadcast if subscribed; otherwise park this branch
async fn recv_room_event(
    rx: &mut Option<broadcast::Receiver<RoomEvent>>,
) -> Result<RoomEvent, broadcast::error::RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

impl Session {
    fn event_is_for_us(&self, event: &RoomEvent) -> bool {
        match event.recipient {
            Recipient::All => true,
            Recipient::One(id) => id == self.player_id,
        }
    }

    async fn handle_msg(
        &mut self,
        msg: ClientMsg,
        sink: &mut SplitSink<WebSocket, Message>,
        room_rx: &mut Option<broadcast::Receiver<RoomEvent>>,
    ) -> Result<(), ()> {
        match msg {
            ClientMsg::RequestRoomList => {
                let rooms = self.state.registry.summaries();
                send_msg(sink, &ServerMsg::RoomListUpdate { rooms }).await
            }
            ClientMsg::CreateRoom {
                custom_id,
                duration,
                username,
            } => {
                let Some(username) = valid_username(&username) else {
                    return send_error(sink, "missing_username", "A username is required").await;
                };

                let room_id = match custom_id.as_deref().map(normalize_custom_id) {
                    Some(id) if !id.is_empty() => {
                        if self.state.registry.contains(&id) {
                            return send_error(
                                sink,
                                "duplicate_room_id",
                                "A room with that id already exists",
                            )
                            .await;
                        }
                        id
                    }
                    _ => self.state.registry.generate_room_id(),
                };

                let duration = if duration == 0 {
                    self.state.config.default_room_duration
                } else {
                    duration
                };
                let handle = self.state.registry.spawn_room(room_id, duration);
                self.username = Some(username);
                self.enter_room(handle, room_rx).await;
                Ok(())
            }
            ClientMsg::JoinRoom { room_id, username } => {
                let Some(username) = valid_username(&username) else {
                    return send_error(sink, "missing_username", "A username is required").await;
                };
                let Some(handle) = self.state.registry.get(&normalize_custom_id(&room_id)) else {
                    return send_error(sink, "unknown_room", "No such room").await;
                };
                self.username = Some(username);
                self.enter_room(handle, room_rx).await;
                Ok(())
            }
            ClientMsg::PlayerMove {
                room_id, x, y, angle,
            } => {
                self.forward(
                    &room_id,
                    RoomCmd::Move {
                        player_id: self.player_id,
                        x,
                        y,
                        angle,
                    },
                )
                .await;
                Ok(())
            }
            ClientMsg::PlayerShoot { room_id } => {
                self.forward(
                    &room_id,
                    RoomCmd::Shoot {
                        player_id: self.player_id,
                    },
                )
                .await;
                Ok(())
            }
            ClientMsg::PlayerHit {
                room_id,
                shooter_id,
                victim_id,
                damage,
            } => {
                // claims carry damage, so they get their own tighter cap
                if !self.rate.check_hit_claim() {
                    warn!(player_id = %self.player_id, "rate limited hit claim");
                    return Ok(());
                }
                // a session may only claim hits as itself
                if shooter_id != self.player_id {
                    warn!(player_id = %self.player_id, claimed = %shooter_id, "spoofed shooter id");
                    return Ok(());
                }
                self.forward(
                    &room_id,
                    RoomCmd::Hit {
                        shooter_id,
                        victim_id,
                        damage,
                    },
                )
                .await;
                Ok(())
            }
            ClientMsg::PickupItem { room_id, item_id } => {
                self.forward(
                    &room_id,
                    RoomCmd::Pickup {
                        player_id: self.player_id,
                        item_id,
                    },
                )
                .await;
                Ok(())
            }
        }
    }

    /// Subscribe to a room and announce ourselves, leaving any previous room
    async fn enter_room(
        &mut self,
        handle: RoomHandle,
        room_rx: &mut Option<broadcast::Receiver<RoomEvent>>,
    ) {
        self.leave_room().await;
        *room_rx = Some(handle.events.subscribe());
        let name = self.username.clone().unwrap_or_default();
        let _ = handle
            .cmd_tx
            .send(RoomCmd::Join {
                player_id: self.player_id,
                name,
            })
            .await;
        self.room = Some(handle);
    }

    async fn leave_room(&mut self) {
        if let Some(room) = self.room.take() {
            let _ = room
                .cmd_tx
                .send(RoomCmd::Leave {
                    player_id: self.player_id,
                })
                .await;
        }
    }

    /// Route a command to the current room, ignoring stale room ids
    async fn forward(&self, room_id: &str, cmd: RoomCmd) {
        let Some(room) = &self.room else {
            return;
        };
        if room.id != room_id {
            debug!(player_id = %self.player_id, room_id, "command for a room we are not in");
            return;
        }
        let _ = room.cmd_tx.send(cmd).await;
    }
}

fn valid_username(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(24).collect())
    }
}

async fn send_msg(sink: &mut SplitSink<WebSocket, Message>, msg: &ServerMsg) -> Result<(), ()> {
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    sink.send(Message::Text(json)).await.map_err(|e| {
        debug!(error = %e, "WebSocket send failed");
    })
}

async fn send_error(
    sink: &mut SplitSink<WebSocket, Message>,
    code: &str,
    message: &str,
) -> Result<(), ()> {
    send_msg(
        sink,
        &ServerMsg::Error {
            code: code.to_string(),
            message: message.to_string(),
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames_are_trimmed_and_bounded() {
        assert_eq!(valid_username("  ada  ").as_deref(), Some("ada"));
        assert!(valid_username("   ").is_none());
        let long = "x".repeat(60);
        assert_eq!(valid_username(&long).unwrap().len(), 24);
    }
}
