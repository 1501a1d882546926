//! DDA wall casting and the floor/ceiling scan

use crate::world::Grid;

use super::camera::Camera;
use super::framebuffer::Framebuffer;
use super::texture::TextureBank;
use super::{apply_fog, darken};

/// Which grid axis the terminating step crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallSide {
    X,
    Y,
}

/// Result of walking a ray through the grid to the first solid cell
#[derive(Debug, Clone, Copy)]
pub struct WallHit {
    pub map_x: i32,
    pub map_y: i32,
    pub side: WallSide,
    /// Wall-type code of the hit cell
    pub cell: u8,
    /// Distance from the camera plane to the hit (fisheye-corrected)
    pub perp_dist: f32,
    /// Fractional intersection coordinate along the wall face, [0, 1)
    pub wall_x: f32,
}

impl WallHit {
    /// Texture column for this hit. Mirrored when the ray direction is
    /// positive along the relevant axis so both faces of a wall read the
    /// texture in a consistent orientation.
    pub fn tex_column(&self, tex_width: usize, ray_dx: f32, ray_dy: f32) -> usize {
        let mut tex_x = (self.wall_x * tex_width as f32) as usize;
        if tex_x >= tex_width {
            tex_x = tex_width - 1;
        }
        let mirrored = match self.side {
            WallSide::X => ray_dx > 0.0,
            WallSide::Y => ray_dy < 0.0,
        };
        if mirrored {
            tex_width - tex_x - 1
        } else {
            tex_x
        }
    }
}

/// Walk the grid from (ox, oy) along (ray_dx, ray_dy) until a solid cell.
///
/// Classic DDA: keep side-distance accumulators per axis, advance whichever
/// is smaller, flip the side flag accordingly. A zero ray component gets an
/// f32::MAX delta sentinel instead of dividing by zero. The step count is
/// capped so a NaN direction cannot loop forever; the solid border plus
/// solid out-of-bounds reads terminate every real ray well before the cap.
pub fn cast_ray(grid: &Grid, ox: f32, oy: f32, ray_dx: f32, ray_dy: f32) -> Option<WallHit> {
    let mut map_x = ox.floor() as i32;
    let mut map_y = oy.floor() as i32;

    let delta_dist_x = if ray_dx == 0.0 {
        f32::MAX
    } else {
        (1.0 / ray_dx).abs()
    };
    let delta_dist_y = if ray_dy == 0.0 {
        f32::MAX
    } else {
        (1.0 / ray_dy).abs()
    };

    let (step_x, mut side_dist_x) = if ray_dx < 0.0 {
        (-1, (ox - map_x as f32) * delta_dist_x)
    } else {
        (1, (map_x as f32 + 1.0 - ox) * delta_dist_x)
    };
    let (step_y, mut side_dist_y) = if ray_dy < 0.0 {
        (-1, (oy - map_y as f32) * delta_dist_y)
    } else {
        (1, (map_y as f32 + 1.0 - oy) * delta_dist_y)
    };

    let max_steps = 2 * (grid.width() + grid.height());
    let mut side = WallSide::X;

    for _ in 0..max_steps {
        if side_dist_x < side_dist_y {
            side_dist_x += delta_dist_x;
            map_x += step_x;
            side = WallSide::X;
        } else {
            side_dist_y += delta_dist_y;
            map_y += step_y;
            side = WallSide::Y;
        }

        if grid.is_solid(map_x, map_y) {
            // Side distance was advanced past the hit cell boundary; back
            // out one increment to get the perpendicular distance.
            let perp_dist = match side {
                WallSide::X => side_dist_x - delta_dist_x,
                WallSide::Y => side_dist_y - delta_dist_y,
            };
            let wall_x = match side {
                WallSide::X => oy + perp_dist * ray_dy,
                WallSide::Y => ox + perp_dist * ray_dx,
            };
            return Some(WallHit {
                map_x,
                map_y,
                side,
                cell: grid.cell(map_x, map_y),
                perp_dist: perp_dist.max(1e-4),
                wall_x: wall_x - wall_x.floor(),
            });
        }
    }
    None
}

/// Cast one ray per screen column and draw textured wall slices, recording
/// perpendicular distance in the per-column z-buffer.
pub fn render_walls(
    fb: &mut Framebuffer,
    grid: &Grid,
    cam: &Camera,
    bank: &TextureBank,
    anim_tick: usize,
) {
    let w = fb.width();
    let h = fb.height();
    let half_h = h as f32 / 2.0;

    for x in 0..w {
        // -1 at the left edge, +1 at the right
        let camera_x = 2.0 * x as f32 / w as f32 - 1.0;
        let ray_dx = cam.dir_x + cam.plane_x * camera_x;
        let ray_dy = cam.dir_y + cam.plane_y * camera_x;

        let hit = match cast_ray(grid, cam.pos_x, cam.pos_y, ray_dx, ray_dy) {
            Some(hit) => hit,
            None => {
                fb.set_depth(x, f32::MAX);
                continue;
            }
        };

        let line_height = h as f32 / hit.perp_dist * cam.zoom;
        let v_shift = cam.pitch + cam.z / hit.perp_dist;
        let unclipped_top = half_h + v_shift - line_height / 2.0;
        let draw_start = (unclipped_top.max(0.0)) as usize;
        let draw_end = ((half_h + v_shift + line_height / 2.0).min(h as f32 - 1.0)) as usize;

        let tex = bank.frame(hit.cell, anim_tick);
        let tex_x = hit.tex_column(tex.width(), ray_dx, ray_dy);

        let tex_step = tex.height() as f32 / line_height;
        let mut tex_pos = (draw_start as f32 - unclipped_top) * tex_step;

        let side_dim = if hit.side == WallSide::Y { 0.7 } else { 1.0 };

        for y in draw_start..=draw_end {
            let tex_y = tex_pos as usize;
            tex_pos += tex_step;
            let color = darken(tex.sample(tex_x, tex_y), side_dim);
            fb.put(x, y, apply_fog(color, hit.perp_dist));
        }

        fb.set_depth(x, hit.perp_dist);
    }
}

/// Inverse-perspective floor/ceiling scan. Writes straight into the raw
/// pixel buffer; texture coordinates step linearly per row with deltas
/// derived from the camera plane.
pub fn render_floor_ceiling(
    fb: &mut Framebuffer,
    cam: &Camera,
    bank: &TextureBank,
    floor_code: u8,
    ceil_code: u8,
) {
    let w = fb.width();
    let h = fb.height();
    let half_h = h as f32 / 2.0;
    let horizon = half_h + cam.pitch;

    let ray0_x = cam.dir_x - cam.plane_x;
    let ray0_y = cam.dir_y - cam.plane_y;
    let ray1_x = cam.dir_x + cam.plane_x;
    let ray1_y = cam.dir_y + cam.plane_y;

    let floor_tex = bank.frame(floor_code, 0);
    let ceil_tex = bank.frame(ceil_code, 0);
    let zoom = cam.zoom;
    let cam_z = cam.z;
    let (pos_x, pos_y) = (cam.pos_x, cam.pos_y);
    let pixels = fb.pixels_mut();

    for y in 0..h {
        let is_floor = (y as f32) > horizon;
        // Signed offset from the horizon row; degenerate rows (at the
        // horizon itself) have no finite projection and are skipped.
        let row_offset = if is_floor {
            y as f32 - horizon
        } else {
            horizon - y as f32
        };
        if row_offset < 1.0 {
            continue;
        }

        // Eye height above the floor / below the ceiling plane, in pixels
        let vertical_extent = if is_floor {
            half_h + cam_z
        } else {
            (half_h - cam_z).max(1.0)
        };
        let row_dist = vertical_extent * zoom / row_offset;

        let step_x = row_dist * (ray1_x - ray0_x) / w as f32;
        let step_y = row_dist * (ray1_y - ray0_y) / w as f32;
        let mut world_x = pos_x + row_dist * ray0_x;
        let mut world_y = pos_y + row_dist * ray0_y;

        let tex = if is_floor { floor_tex } else { ceil_tex };
        let tw = tex.width() as f32;
        let th = tex.height() as f32;
        let row_base = y * w;

        for x in 0..w {
            let tx = ((world_x - world_x.floor()) * tw) as usize;
            let ty = ((world_y - world_y.floor()) * th) as usize;
            world_x += step_x;
            world_y += step_y;

            let color = tex.sample(tx, ty);
            pixels[row_base + x] = apply_fog(color, row_dist);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::texture::Texture;

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

    #[test]
    fn every_direction_terminates_with_positive_distance() {
        let grid = boxed_grid(8);
        for i in 0..360 {
            let a = i as f32 * std::f32::consts::TAU / 360.0;
            let hit = cast_ray(&grid, 4.5, 4.5, a.cos(), a.sin())
                .expect("bounded grid must terminate every ray");
            assert!(hit.perp_dist > 0.0, "angle {i}: perp_dist must be positive");
            assert!(hit.perp_dist < 8.0, "angle {i}: hit must be inside the box");
        }
    }

    #[test]
    fn axis_aligned_rays_survive_zero_components() {
        let grid = boxed_grid(8);
        let east = cast_ray(&grid, 4.5, 4.5, 1.0, 0.0).unwrap();
        assert!((east.perp_dist - 2.5).abs() < 1e-4);
        assert_eq!(east.side, WallSide::X);
        let north = cast_ray(&grid, 4.5, 4.5, 0.0, -1.0).unwrap();
        assert!((north.perp_dist - 3.5).abs() < 1e-4);
        assert_eq!(north.side, WallSide::Y);
    }

    #[test]
    fn opposite_rays_mirror_texture_columns_consistently() {
        let grid = boxed_grid(8);
        const TEX_W: usize = 64;

        // Both rays hit an x-side at the same fractional wall coordinate;
        // the positive-x ray mirrors, the negative-x ray does not, so the
        // columns must be exact mirror images of each other.
        let right = cast_ray(&grid, 4.5, 4.2, 1.0, 0.0).unwrap();
        let left = cast_ray(&grid, 4.5, 4.2, -1.0, 0.0).unwrap();
        assert!((right.wall_x - left.wall_x).abs() < 1e-5);

        let tex_right = right.tex_column(TEX_W, 1.0, 0.0);
        let tex_left = left.tex_column(TEX_W, -1.0, 0.0);
        assert_eq!(tex_right + tex_left, TEX_W - 1);
    }

    #[test]
    fn wall_pass_fills_zbuffer_and_draws_fogged_texture() {
        let grid = boxed_grid(8);
        let cam = Camera::new(4.5, 4.5, 1.0, 0.0);
        let mut fb = Framebuffer::new(16, 16);
        fb.clear(0xFF00_0000);
        let mut bank = TextureBank::new();
        bank.insert(1, vec![Texture::solid(4, 0xFFFF_FFFF)]);

        render_walls(&mut fb, &grid, &cam, &bank, 0);

        for x in 0..fb.width() {
            let d = fb.depth(x);
            assert!(d > 0.0 && d < 8.0, "column {x} depth {d}");
        }
        // center pixel must carry the fogged white wall, not the clear color
        let center = fb.get(8, 8);
        assert_ne!(center, 0xFF00_0000);
    }

    #[test]
    fn floor_pass_paints_below_horizon() {
        let cam = Camera::new(4.5, 4.5, 1.0, 0.0);
        let mut fb = Framebuffer::new(16, 16);
        fb.clear(0xFF00_0000);
        let mut bank = TextureBank::new();
        bank.insert(8, vec![Texture::solid(4, 0xFF40_8040)]);
        bank.insert(9, vec![Texture::solid(4, 0xFF20_2040)]);

        render_floor_ceiling(&mut fb, &cam, &bank, 8, 9);

        assert_ne!(fb.get(8, 14), 0xFF00_0000, "floor row untouched");
        assert_ne!(fb.get(8, 1), 0xFF00_0000, "ceiling row untouched");
    }
}
