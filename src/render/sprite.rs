//! Billboard sprite casting
//!
//! Sprites are transformed into camera space through the inverse of the
//! [plane, dir] basis, sorted far-to-near, and drawn column by column
//! against the z-buffer recorded during wall casting.

use uuid::Uuid;

use crate::ws::protocol::ItemKind;

use super::camera::Camera;
use super::framebuffer::Framebuffer;
use super::texture::{TextureBank, COLOR_KEY};
use super::apply_fog;

/// Sprite texture codes handed to the asset provider
pub const TEX_ENEMY: u8 = 16;
pub const TEX_REMOTE_PLAYER: u8 = 17;
pub const TEX_ITEM_HEALTH: u8 = 18;
pub const TEX_ITEM_AMMO: u8 = 19;

/// Everything the sprite pass can draw, resolved by pattern matching
/// rather than structural duck-typing.
#[derive(Debug, Clone)]
pub enum Sprite {
    Enemy {
        id: Uuid,
        x: f32,
        y: f32,
        frame: usize,
    },
    Item {
        id: Uuid,
        x: f32,
        y: f32,
        kind: ItemKind,
    },
    Particle {
        x: f32,
        y: f32,
        color: u32,
        scale: f32,
    },
    RemotePlayer {
        id: Uuid,
        x: f32,
        y: f32,
    },
}

impl Sprite {
    pub fn pos(&self) -> (f32, f32) {
        match *self {
            Sprite::Enemy { x, y, .. }
            | Sprite::Item { x, y, .. }
            | Sprite::Particle { x, y, .. }
            | Sprite::RemotePlayer { x, y, .. } => (x, y),
        }
    }

    /// World-space size multiplier relative to a full wall cell
    fn scale(&self) -> f32 {
        match *self {
            Sprite::Enemy { .. } | Sprite::RemotePlayer { .. } => 1.0,
            Sprite::Item { .. } => 0.5,
            Sprite::Particle { scale, .. } => scale,
        }
    }
}

/// A sprite's projected footprint on screen
#[derive(Debug, Clone, Copy)]
pub struct SpriteProjection {
    /// Camera-space depth (positive in front of the camera)
    pub depth: f32,
    /// Projected horizontal center column (may be off-screen)
    pub screen_x: f32,
    /// Projected width/height in pixels before clamping
    pub size: f32,
    /// Unclamped vertical extents
    pub top: f32,
    pub bottom: f32,
}

impl SpriteProjection {
    /// Position of a screen row inside the span: 0.0 at the top edge,
    /// 1.0 at the bottom. Used for headshot classification.
    pub fn vertical_fraction(&self, y: f32) -> f32 {
        let span = (self.bottom - self.top).max(1e-4);
        (y - self.top) / span
    }

    pub fn contains_row(&self, y: f32) -> bool {
        y >= self.top && y <= self.bottom
    }
}

/// Transform a world position into its screen-space projection.
///
/// Returns None when the point is behind the camera or the camera basis is
/// numerically degenerate (direction parallel to plane).
pub fn project_sprite(
    cam: &Camera,
    screen_w: usize,
    screen_h: usize,
    x: f32,
    y: f32,
) -> Option<SpriteProjection> {
    let det = cam.plane_x * cam.dir_y - cam.dir_x * cam.plane_y;
    if det.abs() < 1e-6 {
        return None;
    }
    let inv_det = 1.0 / det;

    let dx = x - cam.pos_x;
    let dy = y - cam.pos_y;

    let trans_x = inv_det * (cam.dir_y * dx - cam.dir_x * dy);
    let depth = inv_det * (-cam.plane_y * dx + cam.plane_x * dy);
    if depth <= 0.01 {
        return None;
    }

    let screen_x = (screen_w as f32 / 2.0) * (1.0 + trans_x / depth);
    let size = (screen_h as f32 / depth * cam.zoom).abs();
    let v_shift = cam.pitch + cam.z / depth;
    let center_y = screen_h as f32 / 2.0 + v_shift;

    Some(SpriteProjection {
        depth,
        screen_x,
        size,
        top: center_y - size / 2.0,
        bottom: center_y + size / 2.0,
    })
}

/// Draw all sprites in painter's order against the wall z-buffer
pub fn render_sprites(fb: &mut Framebuffer, cam: &Camera, sprites: &[Sprite], bank: &TextureBank) {
    let w = fb.width();
    let h = fb.height();

    // far-to-near: billboards composite correctly without a per-pixel
    // depth test among themselves
    let mut order: Vec<usize> = (0..sprites.len()).collect();
    order.sort_by(|&a, &b| {
        let da = dist_sq(cam, &sprites[a]);
        let db = dist_sq(cam, &sprites[b]);
        db.partial_cmp(&da).unwrap_or(std::cmp::Ordering::Equal)
    });

    for idx in order {
        let sprite = &sprites[idx];
        let (sx, sy) = sprite.pos();
        let proj = match project_sprite(cam, w, h, sx, sy) {
            Some(p) => p,
            None => continue,
        };

        let size = proj.size * sprite.scale();
        let center_y = (proj.top + proj.bottom) / 2.0;
        let top = center_y - size / 2.0;
        let bottom = center_y + size / 2.0;

        let x_start = ((proj.screen_x - size / 2.0).max(0.0)) as usize;
        let x_end = ((proj.screen_x + size / 2.0).min(w as f32 - 1.0)) as usize;
        let y_start = (top.max(0.0)) as usize;
        let y_end = (bottom.min(h as f32 - 1.0)) as usize;
        if x_start > x_end || y_start > y_end {
            continue;
        }

        match *sprite {
            Sprite::Particle { color, .. } => {
                for x in x_start..=x_end {
                    if proj.depth >= fb.depth(x) {
                        continue;
                    }
                    for y in y_start..=y_end {
                        fb.put(x, y, apply_fog(color, proj.depth));
                    }
                }
            }
            ref textured => {
                let code = match *textured {
                    Sprite::Enemy { .. } => TEX_ENEMY,
                    Sprite::RemotePlayer { .. } => TEX_REMOTE_PLAYER,
                    Sprite::Item { kind, .. } => match kind {
                        ItemKind::Health => TEX_ITEM_HEALTH,
                        ItemKind::Ammo => TEX_ITEM_AMMO,
                    },
                    Sprite::Particle { .. } => unreachable!(),
                };
                let frame = match *textured {
                    Sprite::Enemy { frame, .. } => frame,
                    _ => 0,
                };
                let tex = bank.frame(code, frame);
                let tw = tex.width() as f32;
                let th = tex.height() as f32;

                for x in x_start..=x_end {
                    // occluded where a wall is nearer at this column
                    if proj.depth >= fb.depth(x) {
                        continue;
                    }
                    let u = ((x as f32 - (proj.screen_x - size / 2.0)) / size).clamp(0.0, 0.999);
                    let tex_x = (u * tw) as usize;
                    for y in y_start..=y_end {
                        let v = ((y as f32 - top) / size).clamp(0.0, 0.999);
                        let tex_y = (v * th) as usize;
                        let color = tex.sample(tex_x, tex_y);
                        if color == COLOR_KEY {
                            continue;
                        }
                        fb.put(x, y, apply_fog(color, proj.depth));
                    }
                }
            }
        }
    }
}

fn dist_sq(cam: &Camera, sprite: &Sprite) -> f32 {
    let (x, y) = sprite.pos();
    let dx = x - cam.pos_x;
    let dy = y - cam.pos_y;
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::raycast::render_walls;
    use crate::render::texture::Texture;
    use crate::world::Grid;

    fn boxed_grid(size: usize) -> Grid {
        let mut cells = vec![0u8; size * size];
        for y in 0..size {
            for x in 0..size {
                if x == 0 || y == 0 || x == size - 1 || y == size - 1 {
                    cells[y * size + x] = 1;
                }
            }
        }
        Grid::new(size, size, cells)
    }

    fn bank() -> TextureBank {
        let mut bank = TextureBank::new();
        bank.insert(1, vec![Texture::solid(4, 0xFF80_8080)]);
        bank.insert(TEX_ENEMY, vec![Texture::solid(4, 0xFF00_FF00)]);
        bank
    }

    #[test]
    fn behind_camera_is_discarded() {
        let cam = Camera::new(4.5, 4.5, 1.0, 0.0);
        assert!(project_sprite(&cam, 64, 64, 2.0, 4.5).is_none());
    }

    #[test]
    fn nearer_sprites_project_larger() {
        let cam = Camera::new(1.5, 4.5, 1.0, 0.0);
        let near = project_sprite(&cam, 64, 64, 3.5, 4.5).unwrap();
        let far = project_sprite(&cam, 64, 64, 6.5, 4.5).unwrap();
        assert!(near.depth < far.depth);
        assert!(near.size > far.size);
    }

    #[test]
    fn sprite_in_front_of_wall_is_visible() {
        let grid = boxed_grid(12);
        let cam = Camera::new(1.5, 5.5, 1.0, 0.0);
        let mut fb = Framebuffer::new(32, 32);
        fb.clear(0xFF00_0000);
        let bank = bank();

        render_walls(&mut fb, &grid, &cam, &bank, 0);
        let wall_pixel = fb.get(16, 16);

        let sprites = vec![Sprite::Enemy {
            id: Uuid::new_v4(),
            x: 4.5,
            y: 5.5,
            frame: 0,
        }];
        render_sprites(&mut fb, &cam, &sprites, &bank);

        // enemy depth ~3.0 < wall depth ~9.5: center column repainted
        assert_ne!(fb.get(16, 16), wall_pixel);
    }

    #[test]
    fn sprite_behind_wall_is_fully_occluded() {
        let grid = boxed_grid(8);
        let cam = Camera::new(1.5, 4.5, 1.0, 0.0);
        let mut fb = Framebuffer::new(32, 32);
        fb.clear(0xFF00_0000);
        let bank = bank();

        render_walls(&mut fb, &grid, &cam, &bank, 0);
        let before: Vec<u32> = fb.pixels().to_vec();

        // wall face at x=7 (depth 5.5); sprite beyond it at depth 8.0
        let sprites = vec![Sprite::Enemy {
            id: Uuid::new_v4(),
            x: 9.5,
            y: 4.5,
            frame: 0,
        }];
        render_sprites(&mut fb, &cam, &sprites, &bank);

        assert_eq!(fb.pixels(), &before[..], "occluded sprite must not draw");
    }
}
