//! Pixel type for CPU-side image buffers

use bytemuck::{Pod, Zeroable};

/// Straight (non-premultiplied) RGBA8 pixel, laid out as canvas `ImageData` expects
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    pub const TRANSPARENT: Pixel = Pixel::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Color with alpha in `0.0..=1.0`
    pub fn from_rgb(rgb: [u8; 3], alpha: f32) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2], unit_to_u8(alpha))
    }

    #[inline]
    pub fn alpha(&self) -> f32 {
        self.a as f32 / 255.0
    }
}

#[inline]
pub(crate) fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Colors for overlay elements
pub mod colors {
    pub const SNOW: [u8; 3] = [255, 255, 255];
    /// Background point cloud (#FFD700)
    pub const FIELD_GOLD: [u8; 3] = [255, 215, 0];
}
