//! Room state and the authoritative room task

use std::collections::HashMap;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{debug, info};
use uuid::Uuid;

use crate::game::MAX_HEALTH;
use crate::util::time::{COUNTDOWN_TICK, ITEM_EXPIRY, RESPAWN_DELAY};
use crate::world::SAFE_SPAWNS;
use crate::ws::protocol::{ItemKind, ItemPayload, RoomPlayer, RoomStatus, ServerMsg};

use super::registry::{RoomHandle, RoomStats};

/// Who an event is for. Sessions filter the broadcast stream on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    All,
    One(Uuid),
}

/// An addressed outgoing message
#[derive(Debug, Clone)]
pub struct RoomEvent {
    pub recipient: Recipient,
    pub msg: ServerMsg,
}

impl RoomEvent {
    fn all(msg: ServerMsg) -> Self {
        Self {
            recipient: Recipient::All,
            msg,
        }
    }

    fn one(id: Uuid, msg: ServerMsg) -> Self {
        Self {
            recipient: Recipient::One(id),
            msg,
        }
    }
}

/// Commands into the room task. Sessions send the first group; the second
/// group arrives from the room's own one-shot timers.
#[derive(Debug)]
pub enum RoomCmd {
    Join {
        player_id: Uuid,
        name: String,
    },
    Leave {
        player_id: Uuid,
    },
    Move {
        player_id: Uuid,
        x: f32,
        y: f32,
        angle: f32,
    },
    Shoot {
        player_id: Uuid,
    },
    Hit {
        shooter_id: Uuid,
        victim_id: Uuid,
        damage: i32,
    },
    Pickup {
        player_id: Uuid,
        item_id: Uuid,
    },
    RespawnDue {
        player_id: Uuid,
    },
    ExpireItem {
        item_id: Uuid,
    },
}

/// Deferred work a handler scheduled; the actor turns these into sleeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Followup {
    Respawn(Uuid),
    Expiry(Uuid),
}

#[derive(Debug, Clone)]
struct PlayerSlot {
    id: Uuid,
    name: String,
    x: f32,
    y: f32,
    angle: f32,
    health: i32,
    is_dead: bool,
}

#[derive(Debug, Clone)]
struct RoomItem {
    id: Uuid,
    kind: ItemKind,
    x: f32,
    y: f32,
}

/// Authoritative room state. Owned by the room task; all handlers are
/// synchronous and return the events to publish, so the state machine is
/// testable without a runtime.
pub struct RoomState {
    pub id: String,
    pub status: RoomStatus,
    pub time_left: u32,
    players: HashMap<Uuid, PlayerSlot>,
    items: HashMap<Uuid, RoomItem>,
    scores: HashMap<Uuid, u32>,
    rng: ChaCha8Rng,
    ever_joined: bool,
    followups: Vec<Followup>,
}

impl RoomState {
    pub fn new(id: String, duration: u32, seed: u64) -> Self {
        Self {
            id,
            status: RoomStatus::Waiting,
            time_left: duration,
            players: HashMap::new(),
            items: HashMap::new(),
            scores: HashMap::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            ever_joined: false,
            followups: Vec::new(),
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// True once the last player has left a room that had any
    pub fn is_drained(&self) -> bool {
        self.ever_joined && self.players.is_empty()
    }

    /// Timers scheduled by the last handler call
    pub fn take_followups(&mut self) -> Vec<Followup> {
        std::mem::take(&mut self.followups)
    }

    fn random_spawn(&mut self) -> (f32, f32) {
        SAFE_SPAWNS[self.rng.gen_range(0..SAFE_SPAWNS.len())]
    }

    fn roster(&self) -> Vec<RoomPlayer> {
        self.players
            .values()
            .map(|p| RoomPlayer {
                id: p.id,
                name: p.name.clone(),
                x: p.x,
                y: p.y,
                angle: p.angle,
                health: p.health,
                is_dead: p.is_dead,
            })
            .collect()
    }

    /// Add a player; flips the room to PLAYING on the first join
    pub fn handle_join(&mut self, player_id: Uuid, name: String) -> Vec<RoomEvent> {
        if self.players.contains_key(&player_id) {
            return Vec::new();
        }

        let (x, y) = self.random_spawn();
        self.players.insert(
            player_id,
            PlayerSlot {
                id: player_id,
                name: name.clone(),
                x,
                y,
                angle: 0.0,
                health: MAX_HEALTH,
                is_dead: false,
            },
        );
        self.scores.entry(player_id).or_insert(0);
        self.ever_joined = true;

        if self.status == RoomStatus::Waiting {
            self.status = RoomStatus::Playing;
        }

        vec![RoomEvent::all(ServerMsg::PlayerJoined {
            id: player_id,
            name,
            current_players: self.roster(),
            time_left: self.time_left,
        })]
    }

    pub fn handle_leave(&mut self, player_id: Uuid) -> Vec<RoomEvent> {
        if self.players.remove(&player_id).is_none() {
            return Vec::new();
        }
        self.scores.remove(&player_id);
        vec![RoomEvent::all(ServerMsg::PlayerLeft { id: player_id })]
    }

    /// Accept the client's position as authoritative and rebroadcast
    pub fn handle_move(&mut self, player_id: Uuid, x: f32, y: f32, angle: f32) -> Vec<RoomEvent> {
        let Some(p) = self.players.get_mut(&player_id) else {
            return Vec::new();
        };
        if p.is_dead {
            return Vec::new();
        }
        p.x = x;
        p.y = y;
        p.angle = angle;
        vec![RoomEvent::all(ServerMsg::PlayerMoved {
            id: player_id,
            x,
            y,
            angle,
        })]
    }

    /// Cosmetic shot rebroadcast, no damage attached
    pub fn handle_shoot(&mut self, player_id: Uuid) -> Vec<RoomEvent> {
        if !self.players.contains_key(&player_id) {
            return Vec::new();
        }
        vec![RoomEvent::all(ServerMsg::PlayerShot { id: player_id })]
    }

    /// Apply a hit claim. Claims against missing or already-dead victims
    /// are silent no-ops, which makes duplicate claims for the same kill
    /// idempotent.
    pub fn handle_hit(&mut self, shooter_id: Uuid, victim_id: Uuid, damage: i32) -> Vec<RoomEvent> {
        if self.status != RoomStatus::Playing || damage <= 0 {
            return Vec::new();
        }
        let Some(victim) = self.players.get_mut(&victim_id) else {
            return Vec::new();
        };
        if victim.is_dead {
            return Vec::new();
        }

        victim.health -= damage;
        if victim.health > 0 {
            return vec![RoomEvent::all(ServerMsg::HealthUpdate {
                id: victim_id,
                health: victim.health,
                is_dead: None,
            })];
        }

        // lethal: health is floored at zero regardless of overkill
        victim.health = 0;
        victim.is_dead = true;
        let (loot_x, loot_y) = (victim.x, victim.y);
        *self.scores.entry(shooter_id).or_insert(0) += 1;

        let mut events = vec![
            RoomEvent::all(ServerMsg::HealthUpdate {
                id: victim_id,
                health: 0,
                is_dead: Some(true),
            }),
            RoomEvent::all(ServerMsg::PlayerDied {
                victim_id,
                killer_id: shooter_id,
                scores: self.scores.clone(),
            }),
        ];

        events.push(self.spawn_item(loot_x, loot_y));
        self.followups.push(Followup::Respawn(victim_id));
        events
    }

    /// Drop a loot item at (x, y) and schedule its expiry
    fn spawn_item(&mut self, x: f32, y: f32) -> RoomEvent {
        let kind = if self.rng.gen::<bool>() {
            ItemKind::Health
        } else {
            ItemKind::Ammo
        };
        let item = RoomItem {
            id: Uuid::new_v4(),
            kind,
            x,
            y,
        };
        let payload = ItemPayload {
            id: item.id,
            kind: item.kind,
            x: item.x,
            y: item.y,
        };
        self.followups.push(Followup::Expiry(item.id));
        self.items.insert(item.id, item);
        RoomEvent::all(ServerMsg::ItemSpawn { item: payload })
    }

    /// First claim wins; claims for ids already collected or expired are
    /// silently ignored.
    pub fn handle_pickup(&mut self, player_id: Uuid, item_id: Uuid) -> Vec<RoomEvent> {
        if !self.players.contains_key(&player_id) {
            return Vec::new();
        }
        let Some(item) = self.items.remove(&item_id) else {
            return Vec::new();
        };
        vec![RoomEvent::all(ServerMsg::ItemCollected {
            item_id,
            by: player_id,
            kind: item.kind,
        })]
    }

    /// Respawn timer fired. Re-validates that the player is still here and
    /// still dead: the timer may outlive a leave.
    pub fn respawn_due(&mut self, player_id: Uuid) -> Vec<RoomEvent> {
        let (x, y) = self.random_spawn();
        let Some(p) = self.players.get_mut(&player_id) else {
            return Vec::new();
        };
        if !p.is_dead {
            return Vec::new();
        }
        p.x = x;
        p.y = y;
        p.health = MAX_HEALTH;
        p.is_dead = false;
        vec![
            RoomEvent::one(player_id, ServerMsg::PlayerRespawn { x, y }),
            RoomEvent::all(ServerMsg::HealthUpdate {
                id: player_id,
                health: MAX_HEALTH,
                is_dead: Some(false),
            }),
            RoomEvent::all(ServerMsg::PlayerMoved {
                id: player_id,
                x,
                y,
                angle: p.angle,
            }),
        ]
    }

    /// Expiry timer fired; emits `itemRemoved` at most once per item
    pub fn expire_item(&mut self, item_id: Uuid) -> Vec<RoomEvent> {
        if self.items.remove(&item_id).is_none() {
            return Vec::new();
        }
        vec![RoomEvent::all(ServerMsg::ItemRemoved { item_id })]
    }

    /// One countdown tick. Emits `timeUpdate` every second while playing
    /// and finishes the match when the clock hits zero.
    pub fn tick_second(&mut self) -> Vec<RoomEvent> {
        if self.status != RoomStatus::Playing || self.players.is_empty() {
            return Vec::new();
        }
        self.time_left = self.time_left.saturating_sub(1);
        let mut events = vec![RoomEvent::all(ServerMsg::TimeUpdate {
            time_left: self.time_left,
        })];
        if self.time_left == 0 {
            events.push(self.finish());
        }
        events
    }

    /// End of match: winner is the highest scorer, ties broken by lowest
    /// player id so every node computing this picks the same winner.
    fn finish(&mut self) -> RoomEvent {
        self.status = RoomStatus::Finished;
        let top = self.scores.values().copied().max().unwrap_or(0);
        let winner_id = self
            .scores
            .iter()
            .filter(|(_, s)| **s == top)
            .map(|(id, _)| *id)
            .min();
        let winner_name =
            winner_id.and_then(|id| self.players.get(&id).map(|p| p.name.clone()));
        RoomEvent::all(ServerMsg::GameOver {
            winner_id,
            winner_name,
            scores: self.scores.clone(),
        })
    }
}

/// The room actor: owns a `RoomState` and runs until drained
pub struct Room {
    state: RoomState,
    cmd_rx: mpsc::Receiver<RoomCmd>,
    cmd_tx: mpsc::Sender<RoomCmd>,
    events: broadcast::Sender<RoomEvent>,
    stats: Arc<RoomStats>,
}

impl Room {
    pub fn new(id: String, duration: u32, seed: u64) -> (Self, RoomHandle) {
        let (cmd_tx, cmd_rx) = mpsc::channel(256);
        let (events, _) = broadcast::channel(256);
        let stats = Arc::new(RoomStats::new(duration));

        let handle = RoomHandle {
            id: id.clone(),
            cmd_tx: cmd_tx.clone(),
            events: events.clone(),
            stats: stats.clone(),
        };

        let room = Self {
            state: RoomState::new(id, duration, seed),
            cmd_rx,
            cmd_tx,
            events,
            stats,
        };
        (room, handle)
    }

    /// Run until the player set drains. The 1 s ticker is the only
    /// recurring timer; one-shot timers come back in as commands.
    pub async fn run(mut self) {
        info!(room_id = %self.state.id, "room opened");

        let mut ticker = interval_at(Instant::now() + COUNTDOWN_TICK, COUNTDOWN_TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(cmd) => self.dispatch(cmd),
                    None => break,
                },
                _ = ticker.tick() => {
                    let events = self.state.tick_second();
                    self.publish(events);
                }
            }

            self.stats.update(
                self.state.player_count(),
                self.state.status,
                self.state.time_left,
            );

            if self.state.is_drained() {
                info!(room_id = %self.state.id, "last player left, closing room");
                break;
            }
        }
    }

    fn dispatch(&mut self, cmd: RoomCmd) {
        let events = match cmd {
            RoomCmd::Join { player_id, name } => self.state.handle_join(player_id, name),
            RoomCmd::Leave { player_id } => self.state.handle_leave(player_id),
            RoomCmd::Move {
                player_id,
                x,
                y,
                angle,
            } => self.state.handle_move(player_id, x, y, angle),
            RoomCmd::Shoot { player_id } => self.state.handle_shoot(player_id),
            RoomCmd::Hit {
                shooter_id,
                victim_id,
                damage,
            } => self.state.handle_hit(shooter_id, victim_id, damage),
            RoomCmd::Pickup { player_id, item_id } => self.state.handle_pickup(player_id, item_id),
            RoomCmd::RespawnDue { player_id } => self.state.respawn_due(player_id),
            RoomCmd::ExpireItem { item_id } => self.state.expire_item(item_id),
        };
        self.publish(events);

        for followup in self.state.take_followups() {
            self.schedule(followup);
        }
    }

    fn publish(&self, events: Vec<RoomEvent>) {
        for event in events {
            // send only fails with zero receivers, which is fine
            let _ = self.events.send(event);
        }
    }

    fn schedule(&self, followup: Followup) {
        let tx = self.cmd_tx.clone();
        match followup {
            Followup::Respawn(player_id) => {
                tokio::spawn(async move {
                    sleep(RESPAWN_DELAY).await;
                    let _ = tx.send(RoomCmd::RespawnDue { player_id }).await;
                });
            }
            Followup::Expiry(item_id) => {
                tokio::spawn(async move {
                    sleep(ITEM_EXPIRY).await;
                    let _ = tx.send(RoomCmd::ExpireItem { item_id }).await;
                });
            }
        }
        debug!(room_id = %self.state.id, ?followup, "timer scheduled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, Duration};

    fn room(duration: u32) -> RoomState {
        RoomState::new("TEST01".into(), duration, 42)
    }

    fn join(state: &mut RoomState, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        state.handle_join(id, name.into());
        id
    }

    fn lethal(state: &mut RoomState, shooter: Uuid, victim: Uuid) -> Vec<RoomEvent> {
        state.handle_hit(shooter, victim, MAX_HEALTH)
    }

    fn spawned_item_id(events: &[RoomEvent]) -> Uuid {
        events
            .iter()
            .find_map(|e| match &e.msg {
                ServerMsg::ItemSpawn { item } => Some(item.id),
                _ => None,
            })
            .expect("lethal hit must spawn loot")
    }

    #[test]
    fn first_join_flips_waiting_to_playing() {
        let mut state = room(120);
        assert_eq!(state.status, RoomStatus::Waiting);
        join(&mut state, "ada");
        assert_eq!(state.status, RoomStatus::Playing);
    }

    #[test]
    fn nonlethal_hit_broadcasts_health_only() {
        let mut state = room(120);
        let shooter = join(&mut state, "ada");
        let victim = join(&mut state, "bob");

        let events = state.handle_hit(shooter, victim, 25);
        assert_eq!(events.len(), 1);
        match &events[0].msg {
            ServerMsg::HealthUpdate { id, health, is_dead } => {
                assert_eq!(*id, victim);
                assert_eq!(*health, 75);
                assert!(is_dead.is_none());
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(state.take_followups().is_empty());
    }

    #[test]
    fn lethal_hit_scores_spawns_loot_and_schedules_respawn() {
        let mut state = room(120);
        let shooter = join(&mut state, "ada");
        let victim = join(&mut state, "bob");

        // overkill damage still floors health at zero
        let events = state.handle_hit(shooter, victim, 999);
        let tags: Vec<_> = events
            .iter()
            .map(|e| match &e.msg {
                ServerMsg::HealthUpdate { health, is_dead, .. } => {
                    assert_eq!(*health, 0);
                    assert_eq!(*is_dead, Some(true));
                    "health"
                }
                ServerMsg::PlayerDied {
                    killer_id, scores, ..
                } => {
                    assert_eq!(*killer_id, shooter);
                    assert_eq!(scores[&shooter], 1);
                    "died"
                }
                ServerMsg::ItemSpawn { .. } => "item",
                other => panic!("unexpected: {other:?}"),
            })
            .collect();
        assert_eq!(tags, ["health", "died", "item"]);

        let followups = state.take_followups();
        assert!(followups.contains(&Followup::Respawn(victim)));
        assert_eq!(followups.len(), 2);
    }

    #[test]
    fn hit_claim_against_dead_victim_is_silent() {
        let mut state = room(120);
        let shooter = join(&mut state, "ada");
        let victim = join(&mut state, "bob");

        lethal(&mut state, shooter, victim);
        state.take_followups();

        // duplicate claim for the same kill must change nothing
        let events = state.handle_hit(shooter, victim, 50);
        assert!(events.is_empty());
        assert!(state.take_followups().is_empty());
    }

    #[test]
    fn pickup_is_first_claim_wins() {
        let mut state = room(120);
        let shooter = join(&mut state, "ada");
        let victim = join(&mut state, "bob");
        let racer = join(&mut state, "eve");

        let item_id = spawned_item_id(&lethal(&mut state, shooter, victim));
        state.take_followups();

        let first = state.handle_pickup(shooter, item_id);
        match &first[0].msg {
            ServerMsg::ItemCollected { by, .. } => assert_eq!(*by, shooter),
            other => panic!("unexpected: {other:?}"),
        }

        // the losing claim is silently dropped
        assert!(state.handle_pickup(racer, item_id).is_empty());
    }

    #[test]
    fn expiry_fires_once_and_blocks_later_pickup() {
        let mut state = room(120);
        let shooter = join(&mut state, "ada");
        let victim = join(&mut state, "bob");
        let item_id = spawned_item_id(&lethal(&mut state, shooter, victim));
        state.take_followups();

        let removed = state.expire_item(item_id);
        assert!(matches!(removed[0].msg, ServerMsg::ItemRemoved { .. }));
        assert!(state.expire_item(item_id).is_empty());
        assert!(state.handle_pickup(shooter, item_id).is_empty());
    }

    #[test]
    fn respawn_resets_health_at_a_safe_spawn() {
        let mut state = room(120);
        let shooter = join(&mut state, "ada");
        let victim = join(&mut state, "bob");
        lethal(&mut state, shooter, victim);
        state.take_followups();

        let events = state.respawn_due(victim);
        let respawn = events
            .iter()
            .find(|e| e.recipient == Recipient::One(victim))
            .expect("respawn notice must be addressed to the victim");
        match respawn.msg {
            ServerMsg::PlayerRespawn { x, y } => {
                assert!(SAFE_SPAWNS.contains(&(x, y)));
            }
            ref other => panic!("unexpected: {other:?}"),
        }
        assert!(events.iter().any(|e| matches!(
            e.msg,
            ServerMsg::HealthUpdate {
                health: MAX_HEALTH,
                is_dead: Some(false),
                ..
            }
        )));

        // firing again finds the player alive and does nothing
        assert!(state.respawn_due(victim).is_empty());
    }

    #[test]
    fn respawn_after_leave_is_silent() {
        let mut state = room(120);
        let shooter = join(&mut state, "ada");
        let victim = join(&mut state, "bob");
        lethal(&mut state, shooter, victim);
        state.take_followups();
        state.handle_leave(victim);
        assert!(state.respawn_due(victim).is_empty());
    }

    #[test]
    fn countdown_ticks_once_per_second_then_game_over() {
        let mut state = room(120);
        let ada = join(&mut state, "ada");
        let bob = join(&mut state, "bob");
        lethal(&mut state, ada, bob);
        state.take_followups();

        let mut time_updates = 0;
        let mut game_over = None;
        for _ in 0..120 {
            for event in state.tick_second() {
                match event.msg {
                    ServerMsg::TimeUpdate { .. } => time_updates += 1,
                    ServerMsg::GameOver { winner_id, .. } => game_over = Some(winner_id),
                    other => panic!("unexpected: {other:?}"),
                }
            }
        }

        assert_eq!(time_updates, 120);
        assert_eq!(game_over, Some(Some(ada)));
        assert_eq!(state.status, RoomStatus::Finished);

        // a finished room stops ticking
        assert!(state.tick_second().is_empty());
    }

    #[test]
    fn game_over_tie_break_is_lowest_player_id() {
        let mut state = room(1);
        let ada = join(&mut state, "ada");
        let bob = join(&mut state, "bob");
        // both at zero score: every node must pick the same winner
        let events = state.tick_second();
        let winner = events
            .iter()
            .find_map(|e| match e.msg {
                ServerMsg::GameOver { winner_id, .. } => Some(winner_id),
                _ => None,
            })
            .expect("countdown hit zero");
        assert_eq!(winner, Some(ada.min(bob)));
    }

    #[test]
    fn hits_are_ignored_outside_playing() {
        let mut state = room(1);
        let ada = join(&mut state, "ada");
        let bob = join(&mut state, "bob");
        state.tick_second();
        assert_eq!(state.status, RoomStatus::Finished);
        assert!(state.handle_hit(ada, bob, 50).is_empty());
    }

    #[test]
    fn room_drains_when_last_player_leaves() {
        let mut state = room(120);
        let ada = join(&mut state, "ada");
        assert!(!state.is_drained());
        state.handle_leave(ada);
        assert!(state.is_drained());
    }

    #[tokio::test(start_paused = true)]
    async fn respawn_fires_at_three_seconds() {
        let (room, handle) = Room::new("ITEST1".into(), 300, 9);
        let mut rx = handle.events.subscribe();
        tokio::spawn(room.run());

        let ada = Uuid::new_v4();
        let bob = Uuid::new_v4();
        for (id, name) in [(ada, "ada"), (bob, "bob")] {
            handle
                .cmd_tx
                .send(RoomCmd::Join {
                    player_id: id,
                    name: name.into(),
                })
                .await
                .unwrap();
        }
        handle
            .cmd_tx
            .send(RoomCmd::Hit {
                shooter_id: ada,
                victim_id: bob,
                damage: MAX_HEALTH,
            })
            .await
            .unwrap();

        // paused clock: let the room task drain the command queue and its
        // one-shot timer tasks register their deadlines before advancing
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        advance(Duration::from_millis(3100)).await;
        // let the fired timer task and the room's response to it run
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        let mut respawn = None;
        while let Ok(event) = rx.try_recv() {
            if let ServerMsg::PlayerRespawn { x, y } = event.msg {
                assert_eq!(event.recipient, Recipient::One(bob));
                respawn = Some((x, y));
            }
        }
        let (x, y) = respawn.expect("respawn must fire after 3000 ms");
        assert!(SAFE_SPAWNS.contains(&(x, y)));
    }

    #[tokio::test(start_paused = true)]
    async fn uncollected_item_expires_at_five_seconds() {
        let (room, handle) = Room::new("ITEST2".into(), 300, 9);
        let mut rx = handle.events.subscribe();
        tokio::spawn(room.run());

        let ada = Uuid::new_v4();
        let bob = Uuid::new_v4();
        for (id, name) in [(ada, "ada"), (bob, "bob")] {
            handle
                .cmd_tx
                .send(RoomCmd::Join {
                    player_id: id,
                    name: name.into(),
                })
                .await
                .unwrap();
        }
        handle
            .cmd_tx
            .send(RoomCmd::Hit {
                shooter_id: ada,
                victim_id: bob,
                damage: MAX_HEALTH,
            })
            .await
            .unwrap();

        // paused clock: let the room task drain the command queue and its
        // one-shot timer tasks register their deadlines before advancing
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        advance(Duration::from_millis(5100)).await;
        // let the fired timer task and the room's response to it run
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        let mut spawned = None;
        let mut removed = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event.msg {
                ServerMsg::ItemSpawn { item } => spawned = Some(item.id),
                ServerMsg::ItemRemoved { item_id } => removed.push(item_id),
                _ => {}
            }
        }
        assert_eq!(removed, vec![spawned.expect("loot spawned on the kill")]);
    }
}
