//! Cached crystal sprite
//!
//! The glyph is rasterized once per start. Every falling flake is a single
//! scaled, rotated blit of it.

use glam::Vec2;

use super::pixel::{Pixel, colors, unit_to_u8};
use super::shapes::{Segment, crystal_segments};

/// Stroke styling for the cached glyph
#[derive(Debug, Clone, Copy, PartialEq)]
struct SpriteStyle {
    /// Stroke width in pixels
    line_width: f32,
    line_alpha: f32,
    /// Soft glow extent around strokes
    glow_radius: f32,
    glow_alpha: f32,
    /// Gap between arm tips and the sprite edge
    inset: f32,
}

impl Default for SpriteStyle {
    fn default() -> Self {
        Self {
            line_width: 2.2,
            line_alpha: 0.95,
            glow_radius: 4.0,
            glow_alpha: 0.9,
            inset: 4.0,
        }
    }
}

/// Square RGBA image of the crystal glyph
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteCache {
    size: u32,
    pixels: Vec<Pixel>,
}

impl SpriteCache {
    /// Rasterize the glyph
    pub fn render(size: u32) -> Self {
        let style = SpriteStyle::default();
        let size = size.max(1);
        let half = size as f32 / 2.0;
        let arm_length = (half - style.inset).max(1.0);
        let segments = crystal_segments(Vec2::splat(half), arm_length);

        let mut pixels = Vec::with_capacity((size * size) as usize);
        for y in 0..size {
            for x in 0..size {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let alpha = glyph_alpha(&segments, p, &style);
                pixels.push(Pixel::from_rgb(colors::SNOW, alpha));
            }
        }

        log::debug!("Sprite cache rendered at {}x{}", size, size);
        Self { size, pixels }
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Raw RGBA bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Pixel at integer coordinates, `None` outside the sprite
    pub fn pixel(&self, x: i32, y: i32) -> Option<Pixel> {
        let size = self.size as i32;
        if x < 0 || y < 0 || x >= size || y >= size {
            return None;
        }
        Some(self.pixels[(y * size + x) as usize])
    }
}

/// Combined stroke and glow coverage at `p`
fn glyph_alpha(segments: &[Segment], p: Vec2, style: &SpriteStyle) -> f32 {
    let dist = segments
        .iter()
        .map(|s| s.distance_to(p))
        .fold(f32::INFINITY, f32::min);

    let half_width = style.line_width / 2.0;
    // One pixel of anti-aliasing at the stroke edge
    let stroke = (half_width + 0.5 - dist).clamp(0.0, 1.0) * style.line_alpha;

    let glow = if dist <= half_width {
        style.glow_alpha
    } else {
        let sigma = (style.glow_radius / 2.0).max(1e-3);
        let d = (dist - half_width) / sigma;
        style.glow_alpha * (-0.5 * d * d).exp()
    };

    // Stroke composited over its glow
    let alpha = stroke + glow * (1.0 - stroke);
    // Drop the long gaussian tail so the sprite edges stay clean
    if unit_to_u8(alpha) <= 2 { 0.0 } else { alpha }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprite_dimensions() {
        let sprite = SpriteCache::render(32);
        assert_eq!(sprite.size(), 32);
        assert_eq!(sprite.pixels().len(), 32 * 32);
        assert_eq!(sprite.as_bytes().len(), 32 * 32 * 4);
    }

    #[test]
    fn test_center_is_opaque_white() {
        let sprite = SpriteCache::render(32);
        let center = sprite.pixel(16, 16).unwrap();
        assert_eq!((center.r, center.g, center.b), (255, 255, 255));
        assert!(center.a > 240);
    }

    #[test]
    fn test_corners_are_clear() {
        let sprite = SpriteCache::render(32);
        for (x, y) in [(0, 0), (31, 0), (0, 31), (31, 31)] {
            assert_eq!(sprite.pixel(x, y).unwrap().a, 0, "corner ({x}, {y})");
        }
    }

    #[test]
    fn test_six_fold_symmetry() {
        let sprite = SpriteCache::render(32);
        let alpha_at = |angle: f32, r: f32| {
            let p = Vec2::splat(16.0) + Vec2::from_angle(angle).rotate(Vec2::NEG_Y) * r;
            sprite.pixel(p.x as i32, p.y as i32).unwrap().a
        };
        // Along every arm, well inside the stroke
        for i in 0..6 {
            let a = alpha_at(std::f32::consts::FRAC_PI_3 * i as f32, 8.0);
            assert!(a > 200, "arm {i} alpha {a}");
        }
    }

    #[test]
    fn test_out_of_bounds_pixel() {
        let sprite = SpriteCache::render(8);
        assert!(sprite.pixel(-1, 0).is_none());
        assert!(sprite.pixel(0, 8).is_none());
    }
}
