//! Camera state: position, view basis, pitch and vertical offset

/// Base camera-plane half-width (~66 degree FOV at zoom 1.0)
pub const PLANE_SCALE: f32 = 0.66;

/// Pitch clamp in screen pixels
pub const MAX_PITCH: f32 = 200.0;

/// Camera state fed to every render pass
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub pos_x: f32,
    pub pos_y: f32,
    /// Unit facing direction
    pub dir_x: f32,
    pub dir_y: f32,
    /// Camera plane, perpendicular to dir; magnitude encodes FOV width
    pub plane_x: f32,
    pub plane_y: f32,
    /// Vertical look offset in screen pixels
    pub pitch: f32,
    /// Eye height offset above standing level, in screen pixels (jumping)
    pub z: f32,
    /// Projection scale; >1.0 narrows the view (aim zoom)
    pub zoom: f32,
}

impl Camera {
    /// Camera at a position facing along (dir_x, dir_y)
    pub fn new(pos_x: f32, pos_y: f32, dir_x: f32, dir_y: f32) -> Self {
        let len = (dir_x * dir_x + dir_y * dir_y).sqrt();
        // Degenerate direction falls back to +x rather than dividing by zero
        let (dx, dy) = if len < 1e-6 {
            (1.0, 0.0)
        } else {
            (dir_x / len, dir_y / len)
        };
        Self {
            pos_x,
            pos_y,
            dir_x: dx,
            dir_y: dy,
            plane_x: -dy * PLANE_SCALE,
            plane_y: dx * PLANE_SCALE,
            pitch: 0.0,
            z: 0.0,
            zoom: 1.0,
        }
    }

    /// Rotate the view basis by `angle` radians, keeping plane perpendicular
    pub fn rotate(&mut self, angle: f32) {
        let (sin, cos) = angle.sin_cos();
        let dx = self.dir_x * cos - self.dir_y * sin;
        let dy = self.dir_x * sin + self.dir_y * cos;
        self.dir_x = dx;
        self.dir_y = dy;
        let px = self.plane_x * cos - self.plane_y * sin;
        let py = self.plane_x * sin + self.plane_y * cos;
        self.plane_x = px;
        self.plane_y = py;
    }

    /// Adjust pitch by a mouse delta, clamped
    pub fn add_pitch(&mut self, delta: f32) {
        self.pitch = (self.pitch + delta).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Facing angle in radians (for the wire protocol)
    pub fn angle(&self) -> f32 {
        self.dir_y.atan2(self.dir_x)
    }
}
