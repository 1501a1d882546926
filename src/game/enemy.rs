//! Enemy AI finite-state machine and the spawn policy
//!
//! Enemies idle until the player enters aggro range with line of sight,
//! then chase forever (no de-aggro). Death is handled as immediate removal
//! by the session; DYING/DEAD exist for state reporting, not animation.

use rand::Rng;
use uuid::Uuid;

use crate::world::Grid;

use super::line_of_sight;

/// Wall clearance for enemy movement
const MOVE_MARGIN: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyState {
    Idle,
    Chase,
    Attack,
    Dying,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Behavior tuning per difficulty tier
#[derive(Debug, Clone, Copy)]
pub struct DifficultyStats {
    /// Distance at which an enemy aggros (with line of sight)
    pub aggro_range: f32,
    /// Distance for the cooldown-gated ranged attack
    pub attack_range: f32,
    pub move_speed: f32,
    /// Per-tick chance of the random burst attack
    pub burst_chance: f32,
    pub attack_damage: i32,
    /// Seconds between ranged attacks
    pub attack_cooldown: f32,
}

impl DifficultyStats {
    pub fn for_tier(tier: Difficulty) -> Self {
        match tier {
            Difficulty::Easy => Self {
                aggro_range: 6.0,
                attack_range: 3.5,
                move_speed: 1.2,
                burst_chance: 0.002,
                attack_damage: 5,
                attack_cooldown: 2.0,
            },
            Difficulty::Medium => Self {
                aggro_range: 8.0,
                attack_range: 4.5,
                move_speed: 1.8,
                burst_chance: 0.005,
                attack_damage: 10,
                attack_cooldown: 1.4,
            },
            Difficulty::Hard => Self {
                aggro_range: 11.0,
                attack_range: 6.0,
                move_speed: 2.6,
                burst_chance: 0.01,
                attack_damage: 18,
                attack_cooldown: 0.8,
            },
        }
    }
}

/// One live enemy
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: Uuid,
    pub x: f32,
    pub y: f32,
    pub dir_x: f32,
    pub dir_y: f32,
    pub state: EnemyState,
    pub health: i32,
    /// Animation frame for the sprite pass
    pub frame: usize,
    frame_clock: f32,
    attack_timer: f32,
}

/// Damage the enemy dealt this tick
#[derive(Debug, Clone, Copy)]
pub struct EnemyAttack {
    pub damage: i32,
}

impl Enemy {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            x,
            y,
            dir_x: 1.0,
            dir_y: 0.0,
            state: EnemyState::Idle,
            health: 50,
            frame: 0,
            frame_clock: 0.0,
            attack_timer: 0.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Apply damage; flips to DYING on the lethal hit
    pub fn take_damage(&mut self, damage: i32) {
        self.health -= damage;
        if self.health <= 0 {
            self.health = 0;
            self.state = EnemyState::Dying;
        }
    }

    /// One AI tick against the player at (px, py)
    pub fn update<R: Rng>(
        &mut self,
        grid: &Grid,
        px: f32,
        py: f32,
        stats: &DifficultyStats,
        dt: f32,
        rng: &mut R,
    ) -> Option<EnemyAttack> {
        if !self.is_alive() {
            return None;
        }

        self.attack_timer = (self.attack_timer - dt).max(0.0);
        self.frame_clock += dt;
        if self.frame_clock >= 0.25 {
            self.frame_clock = 0.0;
            self.frame = self.frame.wrapping_add(1);
        }

        let dx = px - self.x;
        let dy = py - self.y;
        let dist = (dx * dx + dy * dy).sqrt();

        match self.state {
            EnemyState::Idle => {
                // once aggroed, an enemy never drops back to idle
                if dist <= stats.aggro_range && line_of_sight(grid, self.x, self.y, px, py) {
                    self.state = EnemyState::Chase;
                }
                None
            }
            EnemyState::Chase | EnemyState::Attack => {
                self.state = EnemyState::Chase;

                if dist > 1e-3 {
                    self.dir_x = dx / dist;
                    self.dir_y = dy / dist;
                }

                // keep a little distance so the sprite doesn't overlap the camera
                if dist > 0.8 {
                    self.step(grid, stats.move_speed * dt);
                }

                // random burst attack, any distance once aggroed
                if rng.gen::<f32>() < stats.burst_chance && dist <= stats.aggro_range {
                    self.state = EnemyState::Attack;
                    return Some(EnemyAttack {
                        damage: stats.attack_damage,
                    });
                }

                // cooldown-gated ranged attack
                if self.attack_timer == 0.0
                    && dist <= stats.attack_range
                    && line_of_sight(grid, self.x, self.y, px, py)
                {
                    self.attack_timer = stats.attack_cooldown;
                    self.state = EnemyState::Attack;
                    return Some(EnemyAttack {
                        damage: stats.attack_damage,
                    });
                }
                None
            }
            EnemyState::Dying | EnemyState::Dead => None,
        }
    }

    /// Move toward the player, validating each axis against the grid
    /// independently so the enemy slides along walls.
    fn step(&mut self, grid: &Grid, step: f32) {
        let dx = self.dir_x * step;
        let dy = self.dir_y * step;
        if !grid.blocks(self.x + dx + MOVE_MARGIN * dx.signum(), self.y) {
            self.x += dx;
        }
        if !grid.blocks(self.x, self.y + dy + MOVE_MARGIN * dy.signum()) {
            self.y += dy;
        }
    }
}

/// Rate-limited spawner that keeps new enemies away from the player
pub struct EnemySpawner {
    timer: f32,
    pub interval: f32,
    pub max_alive: usize,
    pub min_player_distance: f32,
}

impl EnemySpawner {
    pub fn new(interval: f32, max_alive: usize) -> Self {
        Self {
            timer: interval,
            interval,
            max_alive,
            min_player_distance: 6.0,
        }
    }

    /// Tick the spawn timer; yields a spawn position when one is due and
    /// an open cell far enough from the player can be found.
    pub fn update<R: Rng>(
        &mut self,
        grid: &Grid,
        px: f32,
        py: f32,
        alive: usize,
        dt: f32,
        rng: &mut R,
    ) -> Option<(f32, f32)> {
        self.timer -= dt;
        if self.timer > 0.0 || alive >= self.max_alive {
            return None;
        }

        for _ in 0..16 {
            let x = rng.gen_range(1..grid.width() as i32 - 1);
            let y = rng.gen_range(1..grid.height() as i32 - 1);
            if grid.is_solid(x, y) {
                continue;
            }
            let fx = x as f32 + 0.5;
            let fy = y as f32 + 0.5;
            let dx = fx - px;
            let dy = fy - py;
            if dx * dx + dy * dy >= self.min_player_distance * self.min_player_distance {
                self.timer = self.interval;
                return Some((fx, fy));
            }
        }
        // no valid cell this attempt; retry next tick without resetting
        None
    }
}
