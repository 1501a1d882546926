//! Texture frames and the provider-facing texture bank
//!
//! Textures arrive from an external asset provider as power-of-two square
//! pixel buffers, one ordered frame list per wall/sprite code.

use std::collections::HashMap;

/// Fully transparent pixels are skipped by the sprite pass
pub const COLOR_KEY: u32 = 0x0000_0000;

/// A single texture frame. Width and height must be powers of two so the
/// floor/ceiling pass can wrap coordinates with a mask.
#[derive(Debug, Clone)]
pub struct Texture {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Texture {
    pub fn new(width: usize, height: usize, pixels: Vec<u32>) -> Self {
        assert!(width.is_power_of_two() && height.is_power_of_two());
        assert_eq!(pixels.len(), width * height);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Uniform single-color frame (tests, fallback)
    pub fn solid(size: usize, color: u32) -> Self {
        Self::new(size, size, vec![color; size * size])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn sample(&self, x: usize, y: usize) -> u32 {
        // pow2 mask wrap
        self.pixels[(y & (self.height - 1)) * self.width + (x & (self.width - 1))]
    }
}

/// Wall/sprite texture codes mapped to ordered animation frame lists
pub struct TextureBank {
    frames: HashMap<u8, Vec<Texture>>,
    fallback: Texture,
}

impl TextureBank {
    pub fn new() -> Self {
        // magenta/black checkerboard marks missing art
        let size = 64;
        let mut pixels = vec![0xFF00_0000; size * size];
        for y in 0..size {
            for x in 0..size {
                if (x / 8 + y / 8) % 2 == 0 {
                    pixels[y * size + x] = 0xFFFF_00FF;
                }
            }
        }
        Self {
            frames: HashMap::new(),
            fallback: Texture::new(size, size, pixels),
        }
    }

    pub fn insert(&mut self, code: u8, frames: Vec<Texture>) {
        if !frames.is_empty() {
            self.frames.insert(code, frames);
        }
    }

    /// Frame for `code` at animation step `tick` (wraps over the frame list)
    pub fn frame(&self, code: u8, tick: usize) -> &Texture {
        match self.frames.get(&code) {
            Some(frames) => &frames[tick % frames.len()],
            None => &self.fallback,
        }
    }
}

impl Default for TextureBank {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_wraps_with_mask() {
        let tex = Texture::solid(4, 0xFF12_3456);
        assert_eq!(tex.sample(0, 0), 0xFF12_3456);
        assert_eq!(tex.sample(4, 4), 0xFF12_3456);
        assert_eq!(tex.sample(103, 77), 0xFF12_3456);
    }

    #[test]
    fn missing_code_yields_fallback() {
        let bank = TextureBank::new();
        let tex = bank.frame(42, 0);
        assert_eq!(tex.width(), 64);
    }

    #[test]
    fn animation_frames_cycle() {
        let mut bank = TextureBank::new();
        bank.insert(
            7,
            vec![Texture::solid(2, 0xFF00_0001), Texture::solid(2, 0xFF00_0002)],
        );
        assert_eq!(bank.frame(7, 0).sample(0, 0), 0xFF00_0001);
        assert_eq!(bank.frame(7, 1).sample(0, 0), 0xFF00_0002);
        assert_eq!(bank.frame(7, 2).sample(0, 0), 0xFF00_0001);
    }
}
