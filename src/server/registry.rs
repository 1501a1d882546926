//! Room registry and room id allocation

use std::sync::atomic::{AtomicU32, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use rand::Rng;
use tokio::sync::{broadcast, mpsc};
use tracing::info;

use crate::ws::protocol::{RoomStatus, RoomSummary};

use super::room::{Room, RoomCmd, RoomEvent};

const ROOM_ID_LEN: usize = 6;
const ROOM_ID_MAX_LEN: usize = 10;
const ROOM_ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Room figures mirrored out of the room task so the registry can build
/// summaries without asking each task.
pub struct RoomStats {
    players: AtomicUsize,
    status: AtomicU8,
    time_left: AtomicU32,
}

impl RoomStats {
    pub fn new(duration: u32) -> Self {
        Self {
            players: AtomicUsize::new(0),
            status: AtomicU8::new(0),
            time_left: AtomicU32::new(duration),
        }
    }

    pub fn update(&self, players: usize, status: RoomStatus, time_left: u32) {
        self.players.store(players, Ordering::Relaxed);
        let code = match status {
            RoomStatus::Waiting => 0,
            RoomStatus::Playing => 1,
            RoomStatus::Finished => 2,
        };
        self.status.store(code, Ordering::Relaxed);
        self.time_left.store(time_left, Ordering::Relaxed);
    }

    pub fn players(&self) -> usize {
        self.players.load(Ordering::Relaxed)
    }

    pub fn status(&self) -> RoomStatus {
        match self.status.load(Ordering::Relaxed) {
            0 => RoomStatus::Waiting,
            1 => RoomStatus::Playing,
            _ => RoomStatus::Finished,
        }
    }

    pub fn time_left(&self) -> u32 {
        self.time_left.load(Ordering::Relaxed)
    }
}

/// Handle to a running room task
#[derive(Clone)]
pub struct RoomHandle {
    pub id: String,
    pub cmd_tx: mpsc::Sender<RoomCmd>,
    pub events: broadcast::Sender<RoomEvent>,
    pub stats: Arc<RoomStats>,
}

/// All live rooms. Rooms own their state; the registry only holds handles
/// and removes them when their task exits. The map sits behind an `Arc`
/// so room tasks can deregister themselves.
pub struct RoomRegistry {
    rooms: Arc<DashMap<String, RoomHandle>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
        }
    }

    pub fn get(&self, id: &str) -> Option<RoomHandle> {
        self.rooms.get(id).map(|r| r.value().clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rooms.contains_key(id)
    }

    pub fn remove(&self, id: &str) -> Option<RoomHandle> {
        self.rooms.remove(id).map(|(_, h)| h)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn total_players(&self) -> usize {
        self.rooms.iter().map(|r| r.value().stats.players()).sum()
    }

    /// Snapshot of all rooms for `roomListUpdate`
    pub fn summaries(&self) -> Vec<RoomSummary> {
        let mut rooms: Vec<RoomSummary> = self
            .rooms
            .iter()
            .map(|r| {
                let stats = &r.value().stats;
                RoomSummary {
                    id: r.key().clone(),
                    count: stats.players(),
                    status: stats.status(),
                    time_left: stats.time_left(),
                }
            })
            .collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        rooms
    }

    /// Fresh unused room id, uppercase alphanumeric
    pub fn generate_room_id(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let id: String = (0..ROOM_ID_LEN)
                .map(|_| ROOM_ID_CHARSET[rng.gen_range(0..ROOM_ID_CHARSET.len())] as char)
                .collect();
            if !self.rooms.contains_key(&id) {
                return id;
            }
        }
    }

    /// Spawn a room task and register its handle. The task deregisters
    /// itself when the room drains.
    pub fn spawn_room(&self, id: String, duration: u32) -> RoomHandle {
        let seed = rand::thread_rng().gen();
        let (room, handle) = Room::new(id.clone(), duration, seed);
        self.rooms.insert(id.clone(), handle.clone());
        info!(room_id = %id, duration, "room registered");

        let rooms = Arc::clone(&self.rooms);
        tokio::spawn(async move {
            room.run().await;
            rooms.remove(&id);
            info!(room_id = %id, "room deregistered");
        });

        handle
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize a caller-supplied room id: trimmed, uppercased, at most ten
/// characters, non-alphanumerics dropped.
pub fn normalize_custom_id(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(ROOM_ID_MAX_LEN)
        .collect::<String>()
        .to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn custom_ids_are_uppercased_and_bounded() {
        assert_eq!(normalize_custom_id("  lobby one!  "), "LOBBYONE");
        assert_eq!(normalize_custom_id("abcdefghijklmnop"), "ABCDEFGHIJ");
        assert_eq!(normalize_custom_id(""), "");
    }

    #[test]
    fn generated_ids_use_the_charset() {
        let registry = RoomRegistry::new();
        let id = registry.generate_room_id();
        assert_eq!(id.len(), ROOM_ID_LEN);
        assert!(id.bytes().all(|b| ROOM_ID_CHARSET.contains(&b)));
    }

    #[tokio::test(start_paused = true)]
    async fn drained_room_deregisters_itself() {
        let registry = RoomRegistry::new();
        let handle = registry.spawn_room("LOBBY1".into(), 120);
        assert!(registry.contains("LOBBY1"));

        let player = Uuid::new_v4();
        handle
            .cmd_tx
            .send(RoomCmd::Join {
                player_id: player,
                name: "ada".into(),
            })
            .await
            .unwrap();
        handle
            .cmd_tx
            .send(RoomCmd::Leave { player_id: player })
            .await
            .unwrap();

        // let the room task observe the drain and exit
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(!registry.contains("LOBBY1"));
        assert_eq!(registry.room_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn summaries_mirror_room_stats() {
        let registry = RoomRegistry::new();
        let handle = registry.spawn_room("LOBBY2".into(), 90);
        handle
            .cmd_tx
            .send(RoomCmd::Join {
                player_id: Uuid::new_v4(),
                name: "ada".into(),
            })
            .await
            .unwrap();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        let summaries = registry.summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, "LOBBY2");
        assert_eq!(summaries[0].count, 1);
        assert_eq!(summaries[0].status, RoomStatus::Playing);
        assert_eq!(summaries[0].time_left, 90);
    }
}
