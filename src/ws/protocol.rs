//! WebSocket protocol message definitions
//!
//! The `type` tags and payload shapes are the compatibility contract with
//! renderer clients; tags are camelCase event names.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Item flavors that can spawn on death
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Health,
    Ammo,
}

/// Room lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMsg {
    /// Ask for the current room summaries
    RequestRoomList,

    /// Create a room and auto-join it
    CreateRoom {
        /// Optional caller-supplied id (truncated to 10 chars, uppercased)
        custom_id: Option<String>,
        /// Match duration in seconds
        duration: u32,
        username: String,
    },

    /// Join an existing room
    JoinRoom { room_id: String, username: String },

    /// Authoritative position update for the sender
    PlayerMove {
        room_id: String,
        x: f32,
        y: f32,
        angle: f32,
    },

    /// Cosmetic fire notification; carries no damage
    PlayerShoot { room_id: String },

    /// Hit claim: shooter asserts it damaged victim (lazy trust model)
    PlayerHit {
        room_id: String,
        shooter_id: Uuid,
        victim_id: Uuid,
        damage: i32,
    },

    /// First-claim-wins item pickup
    PickupItem { room_id: String, item_id: Uuid },
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMsg {
    /// Sent once after connection with the assigned player id
    Welcome { id: Uuid, server_time: u64 },

    RoomListUpdate { rooms: Vec<RoomSummary> },

    /// A player (possibly the recipient) joined the room
    PlayerJoined {
        id: Uuid,
        name: String,
        current_players: Vec<RoomPlayer>,
        time_left: u32,
    },

    PlayerLeft { id: Uuid },

    PlayerMoved { id: Uuid, x: f32, y: f32, angle: f32 },

    /// Cosmetic shot echo for remote muzzle flashes
    PlayerShot { id: Uuid },

    HealthUpdate {
        id: Uuid,
        health: i32,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_dead: Option<bool>,
    },

    PlayerDied {
        victim_id: Uuid,
        killer_id: Uuid,
        scores: HashMap<Uuid, u32>,
    },

    /// Addressed only to the respawning player
    PlayerRespawn { x: f32, y: f32 },

    ItemSpawn { item: ItemPayload },

    /// Expiry removal; fires at most once per item
    ItemRemoved { item_id: Uuid },

    ItemCollected { item_id: Uuid, by: Uuid, kind: ItemKind },

    /// Integer seconds remaining, once per second while playing
    TimeUpdate { time_left: u32 },

    GameOver {
        winner_id: Option<Uuid>,
        winner_name: Option<String>,
        scores: HashMap<Uuid, u32>,
    },

    /// Named error surfaced to the originating client
    Error { code: String, message: String },
}

/// Room list entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: String,
    pub count: usize,
    pub status: RoomStatus,
    pub time_left: u32,
}

/// Player entry inside `playerJoined`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPlayer {
    pub id: Uuid,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub health: i32,
    pub is_dead: bool,
}

/// Item payload for spawn events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
    pub id: Uuid,
    pub kind: ItemKind,
    pub x: f32,
    pub y: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_tags_are_camel_case_event_names() {
        let msg = ClientMsg::PlayerHit {
            room_id: "ABC123".into(),
            shooter_id: Uuid::nil(),
            victim_id: Uuid::nil(),
            damage: 25,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "playerHit");
        assert_eq!(json["roomId"], "ABC123");
        assert_eq!(json["damage"], 25);
    }

    #[test]
    fn server_tags_are_camel_case_event_names() {
        let msg = ServerMsg::TimeUpdate { time_left: 119 };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "timeUpdate");
        assert_eq!(json["timeLeft"], 119);
    }

    #[test]
    fn health_update_omits_absent_death_flag() {
        let msg = ServerMsg::HealthUpdate {
            id: Uuid::nil(),
            health: 70,
            is_dead: None,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("isDead").is_none());
    }

    #[test]
    fn round_trips_through_json() {
        let msg = ClientMsg::CreateRoom {
            custom_id: Some("LOBBY1".into()),
            duration: 120,
            username: "ada".into(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: ClientMsg = serde_json::from_str(&json).unwrap();
        match back {
            ClientMsg::CreateRoom { duration, .. } => assert_eq!(duration, 120),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
