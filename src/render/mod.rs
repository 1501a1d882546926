//! Software DDA raycasting renderer
//!
//! One ray per screen column against the grid, an inverse-perspective
//! floor/ceiling scan, then depth-sorted billboard sprites tested against
//! the per-column z-buffer recorded during wall casting.

pub mod camera;
pub mod framebuffer;
pub mod raycast;
pub mod sprite;
pub mod texture;

pub use camera::Camera;
pub use framebuffer::Framebuffer;
pub use raycast::{cast_ray, render_floor_ceiling, render_walls, WallHit, WallSide};
pub use sprite::{project_sprite, render_sprites, Sprite, SpriteProjection};
pub use texture::{Texture, TextureBank};

/// Fog color blended in with distance
pub const FOG_COLOR: u32 = 0xFF_10_10_18;

/// Distance at which fog fully swallows a surface
pub const MAX_FOG_DISTANCE: f32 = 14.0;

/// Linear distance fog: 0.0 at the camera, 1.0 at max fog distance
pub fn fog_factor(dist: f32) -> f32 {
    (dist / MAX_FOG_DISTANCE).clamp(0.0, 1.0)
}

/// Blend a pixel toward the fog color
pub fn apply_fog(color: u32, dist: f32) -> u32 {
    blend(color, FOG_COLOR, fog_factor(dist))
}

/// Linear blend between two 0xAARRGGBB colors, t in [0, 1]
pub fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| -> u32 {
        let ca = ca as f32;
        let cb = cb as f32;
        (ca + (cb - ca) * t) as u32
    };
    let r = lerp((a >> 16) & 0xFF, (b >> 16) & 0xFF);
    let g = lerp((a >> 8) & 0xFF, (b >> 8) & 0xFF);
    let bl = lerp(a & 0xFF, b & 0xFF);
    0xFF00_0000 | (r << 16) | (g << 8) | bl
}

/// Scale the RGB channels of a color (side shading)
pub fn darken(color: u32, f: f32) -> u32 {
    let f = f.clamp(0.0, 1.0);
    let r = (((color >> 16) & 0xFF) as f32 * f) as u32;
    let g = (((color >> 8) & 0xFF) as f32 * f) as u32;
    let b = ((color & 0xFF) as f32 * f) as u32;
    0xFF00_0000 | (r << 16) | (g << 8) | b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fog_is_linear_and_capped() {
        assert_eq!(fog_factor(0.0), 0.0);
        assert_eq!(fog_factor(MAX_FOG_DISTANCE), 1.0);
        assert_eq!(fog_factor(MAX_FOG_DISTANCE * 3.0), 1.0);
        let half = fog_factor(MAX_FOG_DISTANCE / 2.0);
        assert!((half - 0.5).abs() < 1e-6);
    }

    #[test]
    fn full_fog_reaches_fog_color() {
        assert_eq!(apply_fog(0xFFFF_FFFF, MAX_FOG_DISTANCE), FOG_COLOR);
    }
}
