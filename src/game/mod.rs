//! Single-player game simulation: local player, combat resolution,
//! enemy AI and the per-frame session tick.

pub mod combat;
pub mod decal;
pub mod enemy;
pub mod item;
pub mod player;
pub mod session;

pub use combat::{resolve_shot, ShotResolution};
pub use enemy::{Difficulty, Enemy, EnemyState};
pub use player::LocalPlayer;
pub use session::{CombatMode, FrameInput, GameSession};

use crate::world::Grid;

/// Maximum health for players and the respawn reset value
pub const MAX_HEALTH: i32 = 100;

/// Samples taken along a sight segment when checking for blocking cells
pub const LOS_SAMPLES: u32 = 16;

/// Line of sight between two points, sampled at a fixed step count.
/// Any sample landing on a blocking cell rejects the segment.
pub fn line_of_sight(grid: &Grid, x0: f32, y0: f32, x1: f32, y1: f32) -> bool {
    for i in 1..LOS_SAMPLES {
        let t = i as f32 / LOS_SAMPLES as f32;
        let x = x0 + (x1 - x0) * t;
        let y = y0 + (y1 - y0) * t;
        if grid.blocks(x, y) {
            return false;
        }
    }
    true
}
