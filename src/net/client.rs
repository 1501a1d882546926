//! Server connection and the remote render state it feeds

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::render::Sprite;
use crate::ws::protocol::{ClientMsg, ItemKind, ServerMsg};

use super::subscribers::Subscribers;

/// Kill-feed entry published to subscribers
#[derive(Debug, Clone)]
pub struct KillEvent {
    pub victim_id: Uuid,
    pub killer_id: Uuid,
}

/// Remote player state as last broadcast by the server
#[derive(Debug, Clone)]
pub struct RemotePlayer {
    pub id: Uuid,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub health: i32,
    pub is_dead: bool,
}

/// Server-owned item mirrored for rendering
#[derive(Debug, Clone)]
pub struct RemoteItem {
    pub id: Uuid,
    pub kind: ItemKind,
    pub x: f32,
    pub y: f32,
}

/// Authoritative state mirrored from the server. The server is the sole
/// writer; the renderer only reads between merges.
#[derive(Default)]
pub struct RemoteWorld {
    pub players: HashMap<Uuid, RemotePlayer>,
    pub items: HashMap<Uuid, RemoteItem>,
    pub scores: HashMap<Uuid, u32>,
    pub time_left: u32,
    pub game_over: bool,
    pub winner_id: Option<Uuid>,
    /// Respawn notice for the local player (consumed by the session)
    pub pending_respawn: Option<(f32, f32)>,
}

impl RemoteWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one authoritative delta. Unknown ids are ignored: deltas may
    /// race with joins/removals and stale references are never an error.
    pub fn apply(&mut self, msg: &ServerMsg, local_id: Uuid, kills: &mut Subscribers<KillEvent>) {
        match msg {
            ServerMsg::PlayerJoined {
                id,
                name,
                current_players,
                time_left,
            } => {
                self.time_left = *time_left;
                for p in current_players {
                    if p.id == local_id {
                        continue;
                    }
                    self.players.insert(
                        p.id,
                        RemotePlayer {
                            id: p.id,
                            name: p.name.clone(),
                            x: p.x,
                            y: p.y,
                            angle: p.angle,
                            health: p.health,
                            is_dead: p.is_dead,
                        },
                    );
                }
                debug!(id = %id, name = %name, "player joined");
            }
            ServerMsg::PlayerLeft { id } => {
                self.players.remove(id);
                self.scores.remove(id);
            }
            ServerMsg::PlayerMoved { id, x, y, angle } => {
                // own movement is client-side predicted, never reconciled
                if *id == local_id {
                    return;
                }
                if let Some(p) = self.players.get_mut(id) {
                    p.x = *x;
                    p.y = *y;
                    p.angle = *angle;
                }
            }
            ServerMsg::HealthUpdate {
                id,
                health,
                is_dead,
            } => {
                if let Some(p) = self.players.get_mut(id) {
                    p.health = *health;
                    if let Some(dead) = is_dead {
                        p.is_dead = *dead;
                    }
                }
            }
            ServerMsg::PlayerDied {
                victim_id,
                killer_id,
                scores,
            } => {
                self.scores = scores.clone();
                if let Some(p) = self.players.get_mut(victim_id) {
                    p.is_dead = true;
                    p.health = 0;
                }
                kills.publish(KillEvent {
                    victim_id: *victim_id,
                    killer_id: *killer_id,
                });
            }
            ServerMsg::PlayerRespawn { x, y } => {
                self.pending_respawn = Some((*x, *y));
            }
            ServerMsg::ItemSpawn { item } => {
                self.items.insert(
                    item.id,
                    RemoteItem {
                        id: item.id,
                        kind: item.kind,
                        x: item.x,
                        y: item.y,
                    },
                );
            }
            ServerMsg::ItemRemoved { item_id } | ServerMsg::ItemCollected { item_id, .. } => {
                self.items.remove(item_id);
            }
            ServerMsg::TimeUpdate { time_left } => {
                self.time_left = *time_left;
            }
            ServerMsg::GameOver { winner_id, .. } => {
                self.game_over = true;
                self.winner_id = *winner_id;
            }
            // lobby-level and echo messages carry no world state
            _ => {}
        }
    }

    /// Sprites for all live remote entities
    pub fn sprites(&self) -> Vec<Sprite> {
        let mut sprites = Vec::with_capacity(self.players.len() + self.items.len());
        for p in self.players.values() {
            if p.is_dead {
                continue;
            }
            sprites.push(Sprite::RemotePlayer {
                id: p.id,
                x: p.x,
                y: p.y,
            });
        }
        for item in self.items.values() {
            sprites.push(Sprite::Item {
                id: item.id,
                x: item.x,
                y: item.y,
                kind: item.kind,
            });
        }
        sprites
    }
}

/// Session-owned connection to the room server.
///
/// Constructed at session start, dropped at session end; the transport
/// half (the actual WebSocket) lives in the client shell and exchanges
/// messages over these channels.
pub struct ServerConnection {
    pub local_id: Uuid,
    pub room_id: String,
    outgoing: mpsc::UnboundedSender<ClientMsg>,
    incoming: mpsc::UnboundedReceiver<ServerMsg>,
    pub world: RemoteWorld,
    pub kill_feed: Subscribers<KillEvent>,
}

impl ServerConnection {
    pub fn new(
        local_id: Uuid,
        room_id: String,
        outgoing: mpsc::UnboundedSender<ClientMsg>,
        incoming: mpsc::UnboundedReceiver<ServerMsg>,
    ) -> Self {
        Self {
            local_id,
            room_id,
            outgoing,
            incoming,
            world: RemoteWorld::new(),
            kill_feed: Subscribers::new(),
        }
    }

    /// Drain queued server messages into the remote world. Called once per
    /// frame before the raycast pass.
    pub fn poll(&mut self) {
        while let Ok(msg) = self.incoming.try_recv() {
            self.world.apply(&msg, self.local_id, &mut self.kill_feed);
        }
    }

    pub fn send_move(&self, x: f32, y: f32, angle: f32) {
        let _ = self.outgoing.send(ClientMsg::PlayerMove {
            room_id: self.room_id.clone(),
            x,
            y,
            angle,
        });
    }

    pub fn send_shoot(&self) {
        let _ = self.outgoing.send(ClientMsg::PlayerShoot {
            room_id: self.room_id.clone(),
        });
    }

    /// Emit a hit claim; the server is the sole arbiter of damage
    pub fn send_hit_claim(&self, victim_id: Uuid, damage: i32) {
        let _ = self.outgoing.send(ClientMsg::PlayerHit {
            room_id: self.room_id.clone(),
            shooter_id: self.local_id,
            victim_id,
            damage,
        });
    }

    pub fn send_pickup(&self, item_id: Uuid) {
        let _ = self.outgoing.send(ClientMsg::PickupItem {
            room_id: self.room_id.clone(),
            item_id,
        });
    }
}
