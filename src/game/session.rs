//! Single-player game session: the per-frame tick
//!
//! Everything runs sequentially inside one frame callback: input,
//! player physics, AI, combat resolution, item/decal/particle upkeep,
//! then the three render passes. No internal concurrency.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;
use uuid::Uuid;

use crate::render::{
    render_floor_ceiling, render_sprites, render_walls, Framebuffer, Sprite, TextureBank,
};
use crate::util::time::clamp_frame_delta;
use crate::world::Grid;
use crate::ws::protocol::ItemKind;

use super::combat::{resolve_shot, HitTarget, ShotResolution};
use super::decal::Decal;
use super::enemy::{Difficulty, DifficultyStats, Enemy, EnemySpawner};
use super::item::{LootItem, AMMO_ITEM_ROUNDS, HEALTH_ITEM_AMOUNT};
use super::player::LocalPlayer;

/// Floor and ceiling texture codes for the arena
const TEX_FLOOR: u8 = 8;
const TEX_CEILING: u8 = 9;

/// Where resolved hits go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatMode {
    /// Trusted client: apply damage locally, spawn loot on death
    Trusted,
    /// Server-authoritative: queue hit claims, never touch remote state
    Claims,
}

/// Hit claim queued for the server in claims mode
#[derive(Debug, Clone, Copy)]
pub struct HitClaim {
    pub victim_id: Uuid,
    pub damage: i32,
}

/// Per-frame input snapshot from the external input provider
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    /// -1.0..1.0 forward/back
    pub forward: f32,
    /// -1.0..1.0 strafe
    pub strafe: f32,
    /// Mouse delta, radians
    pub turn: f32,
    /// Mouse delta, screen pixels
    pub pitch: f32,
    pub jump: bool,
    pub fire: bool,
    pub weapon_select: Option<usize>,
}

/// Short-lived impact particle
#[derive(Debug, Clone, Copy)]
struct Particle {
    x: f32,
    y: f32,
    color: u32,
    life: f32,
}

/// The single-player simulation plus its render state
pub struct GameSession {
    pub grid: Grid,
    pub player: LocalPlayer,
    pub enemies: Vec<Enemy>,
    pub items: Vec<LootItem>,
    pub decals: Vec<Decal>,
    particles: Vec<Particle>,
    spawner: EnemySpawner,
    difficulty: DifficultyStats,
    pub mode: CombatMode,
    pub pending_claims: Vec<HitClaim>,
    pub kills: u32,
    rng: ChaCha8Rng,
    clock: f32,
    move_speed: f32,
}

impl GameSession {
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        let grid = Grid::arena();
        Self {
            player: LocalPlayer::new(12.0, 12.0),
            grid,
            enemies: Vec::new(),
            items: Vec::new(),
            decals: Vec::new(),
            particles: Vec::new(),
            spawner: EnemySpawner::new(4.0, 8),
            difficulty: DifficultyStats::for_tier(difficulty),
            mode: CombatMode::Trusted,
            pending_claims: Vec::new(),
            kills: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            clock: 0.0,
            move_speed: 3.0,
        }
    }

    /// Run one simulation step. `screen_w`/`screen_h` are needed for the
    /// screen-space part of combat resolution.
    pub fn frame(&mut self, raw_dt: f32, input: &FrameInput, screen_w: usize, screen_h: usize) {
        let dt = clamp_frame_delta(raw_dt);
        self.clock += dt;

        self.apply_input(input, dt);
        self.player.update(dt);

        if input.fire && !self.player.is_dead() && self.player.try_fire() {
            self.fire_shot(screen_w, screen_h);
        }

        self.update_enemies(dt);
        self.update_items(dt);
        self.decals.retain_mut(|d| d.update(dt));
        self.particles.retain_mut(|p| {
            p.life -= dt;
            p.life > 0.0
        });
    }

    fn apply_input(&mut self, input: &FrameInput, dt: f32) {
        if self.player.is_dead() {
            return;
        }
        if input.turn != 0.0 {
            self.player.camera.rotate(input.turn);
        }
        if input.pitch != 0.0 {
            self.player.camera.add_pitch(input.pitch);
        }
        if let Some(index) = input.weapon_select {
            self.player.select_weapon(index);
        }
        if input.jump {
            self.player.jump();
        }
        if input.forward != 0.0 || input.strafe != 0.0 {
            self.player
                .walk(&self.grid, input.forward, input.strafe, self.move_speed, dt);
        }
    }

    fn fire_shot(&mut self, screen_w: usize, screen_h: usize) {
        let targets: Vec<HitTarget> = self
            .enemies
            .iter()
            .filter(|e| e.is_alive())
            .map(|e| HitTarget {
                id: e.id,
                x: e.x,
                y: e.y,
            })
            .collect();

        let weapon = self.player.weapon();
        match resolve_shot(
            &self.grid,
            &self.player.camera,
            screen_w,
            screen_h,
            &targets,
            &weapon,
        ) {
            ShotResolution::Wall { decal, .. } => {
                self.decals.push(decal);
            }
            ShotResolution::Target { id, damage, .. } => match self.mode {
                CombatMode::Trusted => self.apply_local_hit(id, damage),
                CombatMode::Claims => self.pending_claims.push(HitClaim {
                    victim_id: id,
                    damage,
                }),
            },
            ShotResolution::Nothing => {}
        }
    }

    /// Trusted-client damage path: mutate the enemy directly, drop loot
    /// when it dies.
    fn apply_local_hit(&mut self, id: Uuid, damage: i32) {
        let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == id) else {
            return;
        };
        enemy.take_damage(damage);
        let (x, y) = (enemy.x, enemy.y);

        self.particles.push(Particle {
            x,
            y,
            color: 0xFFB0_1010,
            life: 0.3,
        });

        if !enemy.is_alive() {
            // death is immediate removal; the corpse becomes loot
            self.enemies.retain(|e| e.id != id);
            self.kills += 1;
            let kind = if self.rng.gen::<bool>() {
                ItemKind::Health
            } else {
                ItemKind::Ammo
            };
            self.items.push(LootItem::new(kind, x, y));
            debug!(kills = self.kills, "enemy down");
        }
    }

    fn update_enemies(&mut self, dt: f32) {
        if self.player.is_dead() {
            return;
        }
        let (px, py) = (self.player.camera.pos_x, self.player.camera.pos_y);

        let mut incoming = 0;
        for enemy in &mut self.enemies {
            if let Some(attack) =
                enemy.update(&self.grid, px, py, &self.difficulty, dt, &mut self.rng)
            {
                incoming += attack.damage;
            }
        }
        if incoming > 0 {
            self.player.take_damage(incoming);
        }

        let alive = self.enemies.len();
        if let Some((x, y)) = self
            .spawner
            .update(&self.grid, px, py, alive, dt, &mut self.rng)
        {
            self.enemies.push(Enemy::new(x, y));
        }
    }

    fn update_items(&mut self, dt: f32) {
        let (px, py) = (self.player.camera.pos_x, self.player.camera.pos_y);
        let player = &mut self.player;

        self.items.retain_mut(|item| {
            if !item.update(dt) {
                return false;
            }
            if !player.is_dead() && item.in_pickup_range(px, py) {
                match item.kind {
                    ItemKind::Health => player.heal(HEALTH_ITEM_AMOUNT),
                    ItemKind::Ammo => player.ammo[player.weapon_index].add_reserve(AMMO_ITEM_ROUNDS),
                }
                return false;
            }
            true
        });
    }

    /// Sprite list for the current frame, resolved per variant
    pub fn sprites(&self) -> Vec<Sprite> {
        let mut sprites: Vec<Sprite> = Vec::with_capacity(
            self.enemies.len() + self.items.len() + self.particles.len(),
        );
        for enemy in &self.enemies {
            sprites.push(Sprite::Enemy {
                id: enemy.id,
                x: enemy.x,
                y: enemy.y,
                frame: enemy.frame,
            });
        }
        for item in &self.items {
            sprites.push(Sprite::Item {
                id: item.id,
                x: item.x,
                y: item.y,
                kind: item.kind,
            });
        }
        for particle in &self.particles {
            sprites.push(Sprite::Particle {
                x: particle.x,
                y: particle.y,
                color: particle.color,
                scale: 0.15,
            });
        }
        sprites
    }

    /// Draw the frame: floor/ceiling, walls (fills the z-buffer), sprites
    pub fn render(&self, fb: &mut Framebuffer, bank: &TextureBank) {
        fb.clear(0xFF00_0000);
        let cam = &self.player.camera;
        render_floor_ceiling(fb, cam, bank, TEX_FLOOR, TEX_CEILING);
        render_walls(fb, &self.grid, cam, bank, (self.clock * 4.0) as usize);
        render_sprites(fb, cam, &self.sprites(), bank);
    }

    /// Drain hit claims queued in claims mode
    pub fn take_claims(&mut self) -> Vec<HitClaim> {
        std::mem::take(&mut self.pending_claims)
    }
}
