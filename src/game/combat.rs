//! Hitscan combat resolution
//!
//! A shot resolves against the wall grid first (maximum range and decal
//! placement), then against live enemies through a narrow-cone,
//! line-of-sight-verified, screen-space-confirmed selection of the nearest
//! candidate. Vertical hit offset classifies headshots.

use uuid::Uuid;

use crate::render::{cast_ray, project_sprite, Camera};
use crate::world::Grid;

use super::decal::Decal;
use super::line_of_sight;
use super::player::WeaponStats;

/// Max perpendicular offset from the view axis for a target to count
pub const HIT_CORRIDOR: f32 = 0.5;

/// Crosshair positions in the top quarter of the sprite span are headshots
pub const HEADSHOT_FRACTION: f32 = 0.25;

/// A combat target offered to the resolver
#[derive(Debug, Clone, Copy)]
pub struct HitTarget {
    pub id: Uuid,
    pub x: f32,
    pub y: f32,
}

/// What a fired shot resolved to
#[derive(Debug, Clone)]
pub enum ShotResolution {
    /// Only a wall was struck; leaves a decal
    Wall { decal: Decal, distance: f32 },
    /// The nearest in-cone, visible target was struck
    Target {
        id: Uuid,
        damage: i32,
        headshot: bool,
        distance: f32,
    },
    /// The ray escaped the grid entirely
    Nothing,
}

/// Resolve exactly one hit test for a shot fired from `cam` along its view
/// direction. `screen_w`/`screen_h` are the dimensions the sprite pass
/// projects into; the crosshair sits at the vertical screen center.
pub fn resolve_shot(
    grid: &Grid,
    cam: &Camera,
    screen_w: usize,
    screen_h: usize,
    targets: &[HitTarget],
    weapon: &WeaponStats,
) -> ShotResolution {
    // Wall pass bounds the range and supplies the decal point
    let wall = cast_ray(grid, cam.pos_x, cam.pos_y, cam.dir_x, cam.dir_y);
    let max_range = wall.map(|h| h.perp_dist).unwrap_or(f32::MAX);

    let crosshair_y = screen_h as f32 / 2.0;
    let mut best: Option<(Uuid, f32, f32)> = None; // (id, distance, vertical fraction)

    for target in targets {
        let dx = target.x - cam.pos_x;
        let dy = target.y - cam.pos_y;

        // must be in front of the player
        let along = dx * cam.dir_x + dy * cam.dir_y;
        if along <= 0.0 {
            continue;
        }

        let dist = (dx * dx + dy * dy).sqrt();
        if dist > max_range {
            continue;
        }

        // narrow corridor around the view axis
        let perp = (dx * cam.dir_y - dy * cam.dir_x).abs();
        if perp > HIT_CORRIDOR {
            continue;
        }

        if !line_of_sight(grid, cam.pos_x, cam.pos_y, target.x, target.y) {
            continue;
        }

        // screen-space confirmation: the crosshair row must fall inside
        // the projected sprite span (same projection the renderer uses)
        let proj = match project_sprite(cam, screen_w, screen_h, target.x, target.y) {
            Some(p) => p,
            None => continue,
        };
        if !proj.contains_row(crosshair_y) {
            continue;
        }

        let fraction = proj.vertical_fraction(crosshair_y);
        match best {
            Some((_, best_dist, _)) if best_dist <= dist => {}
            _ => best = Some((target.id, dist, fraction)),
        }
    }

    if let Some((id, distance, fraction)) = best {
        let headshot = fraction < HEADSHOT_FRACTION;
        let damage = if headshot {
            (weapon.damage as f32 * weapon.headshot_multiplier) as i32
        } else {
            weapon.damage
        };
        return ShotResolution::Target {
            id,
            damage,
            headshot,
            distance,
        };
    }

    match wall {
        Some(hit) => ShotResolution::Wall {
            decal: Decal::at_wall(&hit),
            distance: hit.perp_dist,
        },
        None => ShotResolution::Nothing,
    }
}
