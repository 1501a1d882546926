//! Bullet decals on wall faces

use crate::render::{WallHit, WallSide};

/// Seconds a fresh decal stays on the wall
pub const DECAL_LIFE: f32 = 6.0;

/// Cosmetic bullet mark pinned to a wall face
#[derive(Debug, Clone, Copy)]
pub struct Decal {
    pub map_x: i32,
    pub map_y: i32,
    pub side: WallSide,
    /// Normalized offset along the wall face, [0, 1)
    pub offset: f32,
    /// Remaining life in seconds; removed at zero
    pub life: f32,
}

impl Decal {
    pub fn at_wall(hit: &WallHit) -> Self {
        Self {
            map_x: hit.map_x,
            map_y: hit.map_y,
            side: hit.side,
            offset: hit.wall_x,
            life: DECAL_LIFE,
        }
    }

    /// Advance decay; returns false once the decal is spent
    pub fn update(&mut self, dt: f32) -> bool {
        self.life -= dt;
        self.life > 0.0
    }

    /// Opacity for rendering, 1.0 fresh to 0.0 spent
    pub fn opacity(&self) -> f32 {
        (self.life / DECAL_LIFE).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decal_fades_and_expires() {
        let mut decal = Decal {
            map_x: 3,
            map_y: 4,
            side: WallSide::X,
            offset: 0.4,
            life: DECAL_LIFE,
        };
        assert!(decal.update(1.0));
        assert!(decal.opacity() < 1.0 && decal.opacity() > 0.0);
        assert!(!decal.update(DECAL_LIFE));
        assert_eq!(decal.opacity(), 0.0);
    }
}
