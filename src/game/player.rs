//! Local player state: movement, jump physics, health and ammunition

use crate::render::Camera;
use crate::world::Grid;

use super::MAX_HEALTH;

/// Gravity applied to the eye-height offset, in screen pixels / s^2
const GRAVITY: f32 = 900.0;
/// Initial vertical velocity of a jump, screen pixels / s
const JUMP_VELOCITY: f32 = 260.0;
/// Wall clearance kept while sliding
const MOVE_MARGIN: f32 = 0.2;

/// Per-weapon stats table
#[derive(Debug, Clone, Copy)]
pub struct WeaponStats {
    pub damage: i32,
    /// Seconds between shots
    pub cooldown: f32,
    pub clip_capacity: u32,
    pub headshot_multiplier: f32,
}

impl WeaponStats {
    pub fn for_index(index: usize) -> Self {
        match index {
            0 => Self {
                // pistol
                damage: 25,
                cooldown: 0.35,
                clip_capacity: 12,
                headshot_multiplier: 2.0,
            },
            1 => Self {
                // smg
                damage: 12,
                cooldown: 0.09,
                clip_capacity: 30,
                headshot_multiplier: 1.5,
            },
            _ => Self {
                // shotgun
                damage: 60,
                cooldown: 0.9,
                clip_capacity: 6,
                headshot_multiplier: 1.5,
            },
        }
    }
}

pub const WEAPON_COUNT: usize = 3;

/// Ammunition for one weapon slot. Clip never exceeds capacity, nothing
/// goes negative.
#[derive(Debug, Clone, Copy)]
pub struct AmmoPool {
    pub clip: u32,
    pub reserve: u32,
}

impl AmmoPool {
    pub fn full(stats: &WeaponStats, reserve: u32) -> Self {
        Self {
            clip: stats.clip_capacity,
            reserve,
        }
    }

    /// Take one round from the clip; false when empty
    pub fn consume(&mut self) -> bool {
        if self.clip == 0 {
            return false;
        }
        self.clip -= 1;
        true
    }

    /// Move rounds from reserve into the clip
    pub fn reload(&mut self, stats: &WeaponStats) {
        let need = stats.clip_capacity - self.clip;
        let take = need.min(self.reserve);
        self.clip += take;
        self.reserve -= take;
    }

    pub fn add_reserve(&mut self, rounds: u32) {
        self.reserve = self.reserve.saturating_add(rounds);
    }
}

/// The locally simulated player. In multiplayer the server owns the
/// authoritative copy; this one is the predicted view.
pub struct LocalPlayer {
    pub camera: Camera,
    /// Vertical velocity of the jump arc, screen pixels / s
    pub z_velocity: f32,
    pub health: i32,
    pub weapon_index: usize,
    pub ammo: [AmmoPool; WEAPON_COUNT],
    pub fire_cooldown: f32,
    pub unlimited_ammo: bool,
}

impl LocalPlayer {
    pub fn new(x: f32, y: f32) -> Self {
        let ammo = std::array::from_fn(|i| AmmoPool::full(&WeaponStats::for_index(i), 48));
        Self {
            camera: Camera::new(x, y, 1.0, 0.0),
            z_velocity: 0.0,
            health: MAX_HEALTH,
            weapon_index: 0,
            ammo,
            fire_cooldown: 0.0,
            unlimited_ammo: false,
        }
    }

    pub fn weapon(&self) -> WeaponStats {
        WeaponStats::for_index(self.weapon_index)
    }

    pub fn select_weapon(&mut self, index: usize) {
        if index < WEAPON_COUNT {
            self.weapon_index = index;
        }
    }

    /// Damage intake, clamped at zero. Returns true when this was lethal.
    pub fn take_damage(&mut self, damage: i32) -> bool {
        self.health = (self.health - damage).max(0);
        self.health == 0
    }

    pub fn heal(&mut self, amount: i32) {
        self.health = (self.health + amount).min(MAX_HEALTH);
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    /// True when the fire gate (cooldown + ammo) allows a shot; consumes
    /// a round and restarts the cooldown on success.
    pub fn try_fire(&mut self) -> bool {
        if self.fire_cooldown > 0.0 {
            return false;
        }
        if !self.unlimited_ammo && !self.ammo[self.weapon_index].consume() {
            return false;
        }
        self.fire_cooldown = self.weapon().cooldown;
        true
    }

    /// Walk relative to the facing direction, sliding along walls by
    /// validating each axis independently.
    pub fn walk(&mut self, grid: &Grid, forward: f32, strafe: f32, speed: f32, dt: f32) {
        let cam = &mut self.camera;
        let step = speed * dt;
        let dx = (cam.dir_x * forward - cam.dir_y * strafe) * step;
        let dy = (cam.dir_y * forward + cam.dir_x * strafe) * step;

        let probe_x = cam.pos_x + dx + MOVE_MARGIN * dx.signum();
        if !grid.blocks(probe_x, cam.pos_y) {
            cam.pos_x += dx;
        }
        let probe_y = cam.pos_y + dy + MOVE_MARGIN * dy.signum();
        if !grid.blocks(cam.pos_x, probe_y) {
            cam.pos_y += dy;
        }
    }

    pub fn jump(&mut self) {
        if self.camera.z <= 0.0 && self.z_velocity == 0.0 {
            self.z_velocity = JUMP_VELOCITY;
        }
    }

    /// Advance jump arc and fire cooldown
    pub fn update(&mut self, dt: f32) {
        self.fire_cooldown = (self.fire_cooldown - dt).max(0.0);

        if self.camera.z > 0.0 || self.z_velocity != 0.0 {
            self.z_velocity -= GRAVITY * dt;
            self.camera.z = (self.camera.z + self.z_velocity * dt).max(0.0);
            if self.camera.z == 0.0 && self.z_velocity < 0.0 {
                self.z_velocity = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Grid;

    #[test]
    fn health_clamps_at_zero_and_max() {
        let mut player = LocalPlayer::new(2.5, 2.5);
        assert!(!player.take_damage(60));
        assert_eq!(player.health, 40);
        assert!(player.take_damage(500));
        assert_eq!(player.health, 0);
        player.heal(1000);
        assert_eq!(player.health, MAX_HEALTH);
    }

    #[test]
    fn clip_never_exceeds_capacity() {
        let stats = WeaponStats::for_index(0);
        let mut ammo = AmmoPool::full(&stats, 5);
        ammo.consume();
        ammo.consume();
        ammo.reload(&stats);
        assert_eq!(ammo.clip, stats.clip_capacity);
        assert_eq!(ammo.reserve, 3);
        ammo.reload(&stats);
        assert_eq!(ammo.reserve, 3);
    }

    #[test]
    fn fire_gate_enforces_cooldown_and_ammo() {
        let mut player = LocalPlayer::new(2.5, 2.5);
        assert!(player.try_fire());
        assert!(!player.try_fire(), "cooldown must block immediate refire");
        player.update(1.0);
        assert!(player.try_fire());

        player.ammo[0].clip = 0;
        player.ammo[0].reserve = 0;
        player.update(1.0);
        assert!(!player.try_fire(), "empty clip must block fire");

        player.unlimited_ammo = true;
        assert!(player.try_fire());
    }

    #[test]
    fn walk_slides_along_walls() {
        let grid = Grid::arena();
        let mut player = LocalPlayer::new(1.5, 12.0);
        // push straight into the west border wall while strafing
        player.camera.dir_x = -1.0;
        player.camera.dir_y = 0.0;
        player.walk(&grid, 1.0, 1.0, 3.0, 0.2);
        assert!(player.camera.pos_x >= 1.0, "must not enter the wall");
        assert!(player.camera.pos_y != 12.0, "free axis must still move");
    }

    #[test]
    fn jump_arc_returns_to_ground() {
        let mut player = LocalPlayer::new(2.5, 2.5);
        player.jump();
        player.update(0.05);
        assert!(player.camera.z > 0.0);
        for _ in 0..100 {
            player.update(0.05);
        }
        assert_eq!(player.camera.z, 0.0);
        assert_eq!(player.z_velocity, 0.0);
    }
}
