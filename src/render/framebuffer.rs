//! Frame target: 0xAARRGGBB pixels plus a per-column depth buffer

/// Full-screen pixel buffer with the per-column z-buffer recorded during
/// wall casting and consulted by the sprite pass.
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
    zbuffer: Vec<f32>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0xFF00_0000; width * height],
            zbuffer: vec![f32::MAX; width],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Reset pixels to a clear color and depth to infinity
    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
        self.zbuffer.fill(f32::MAX);
    }

    #[inline]
    pub fn put(&mut self, x: usize, y: usize, color: u32) {
        debug_assert!(x < self.width && y < self.height);
        self.pixels[y * self.width + x] = color;
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    /// Raw pixel slice for the floor/ceiling pass
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[inline]
    pub fn depth(&self, column: usize) -> f32 {
        self.zbuffer[column]
    }

    #[inline]
    pub fn set_depth(&mut self, column: usize, dist: f32) {
        self.zbuffer[column] = dist;
    }
}
