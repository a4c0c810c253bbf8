//! Software painter
//!
//! Straight-alpha RGBA framebuffer used when there is no browser canvas
//! (native runs, tests). Mirrors what the Canvas 2D painter does, pixel for
//! pixel close enough to check coverage and placement.

use glam::Vec2;

use super::pixel::{Pixel, unit_to_u8};
use super::shapes::ellipse_contains;
use super::sprite::SpriteCache;
use super::{BlendMode, Painter};
use crate::Viewport;

/// CPU framebuffer implementing [`Painter`]
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
    sprite: Option<SpriteCache>,
    blend: BlendMode,
}

impl PixelCanvas {
    pub fn new(viewport: Viewport) -> Self {
        let (width, height) = viewport.pixel_size();
        Self {
            width,
            height,
            pixels: vec![Pixel::TRANSPARENT; (width * height) as usize],
            sprite: None,
            blend: BlendMode::default(),
        }
    }

    /// Attach the sprite used by `draw_glyph`
    pub fn with_sprite(mut self, sprite: SpriteCache) -> Self {
        self.sprite = Some(sprite);
        self
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Raw RGBA bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }

    /// Number of pixels with any opacity
    pub fn covered_pixels(&self) -> usize {
        self.pixels.iter().filter(|p| p.a > 0).count()
    }

    /// Blend `rgb` at `alpha` into one pixel
    fn blend_pixel(&mut self, x: i32, y: i32, rgb: [u8; 3], alpha: f32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 || alpha <= 0.0 {
            return;
        }
        let idx = (y as u32 * self.width + x as u32) as usize;
        let dst = self.pixels[idx];
        self.pixels[idx] = match self.blend {
            BlendMode::SourceOver => source_over(dst, rgb, alpha),
            BlendMode::Additive => additive(dst, rgb, alpha),
        };
    }

    /// Pixel-center bounds covering a box of `half_extent` around `center`
    fn pixel_bounds(&self, center: Vec2, half_extent: Vec2) -> (i32, i32, i32, i32) {
        let x0 = ((center.x - half_extent.x).floor() as i32).max(0);
        let y0 = ((center.y - half_extent.y).floor() as i32).max(0);
        let x1 = ((center.x + half_extent.x).ceil() as i32).min(self.width as i32 - 1);
        let y1 = ((center.y + half_extent.y).ceil() as i32).min(self.height as i32 - 1);
        (x0, y0, x1, y1)
    }
}

fn source_over(dst: Pixel, rgb: [u8; 3], alpha: f32) -> Pixel {
    let sa = alpha.clamp(0.0, 1.0);
    let da = dst.alpha();
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Pixel::TRANSPARENT;
    }
    let mix = |s: u8, d: u8| {
        let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    Pixel::new(
        mix(rgb[0], dst.r),
        mix(rgb[1], dst.g),
        mix(rgb[2], dst.b),
        unit_to_u8(out_a),
    )
}

fn additive(dst: Pixel, rgb: [u8; 3], alpha: f32) -> Pixel {
    let sa = alpha.clamp(0.0, 1.0);
    let add = |s: u8, d: u8| (d as f32 + s as f32 * sa).min(255.0) as u8;
    Pixel::new(
        add(rgb[0], dst.r),
        add(rgb[1], dst.g),
        add(rgb[2], dst.b),
        unit_to_u8(dst.alpha() + sa),
    )
}

impl Painter for PixelCanvas {
    fn resize(&mut self, viewport: Viewport) {
        let (width, height) = viewport.pixel_size();
        self.width = width;
        self.height = height;
        self.pixels = vec![Pixel::TRANSPARENT; (width * height) as usize];
    }

    fn clear(&mut self) {
        self.pixels.fill(Pixel::TRANSPARENT);
    }

    fn set_blend(&mut self, blend: BlendMode) {
        self.blend = blend;
    }

    fn draw_glyph(&mut self, pos: Vec2, rotation: f32, scale: f32, alpha: f32) {
        if scale <= 0.0 || alpha <= 0.0 {
            return;
        }
        let Some(sprite) = self.sprite.take() else {
            return;
        };
        let size = sprite.size() as f32;
        let half = size / 2.0;
        // Rotated square fits in a circle of radius half * sqrt(2)
        let reach = half * scale * std::f32::consts::SQRT_2;
        let (x0, y0, x1, y1) = self.pixel_bounds(pos, Vec2::splat(reach));
        let inverse = Vec2::from_angle(-rotation);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let local = inverse.rotate(p - pos) / scale + Vec2::splat(half);
                let Some(texel) = sprite.pixel(local.x.floor() as i32, local.y.floor() as i32)
                else {
                    continue;
                };
                if texel.a == 0 {
                    continue;
                }
                self.blend_pixel(x, y, [texel.r, texel.g, texel.b], texel.alpha() * alpha);
            }
        }
        self.sprite = Some(sprite);
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: [u8; 3], alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        let (x0, y0, x1, y1) = self.pixel_bounds(center, radii);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if ellipse_contains(center, radii, p) {
                    self.blend_pixel(x, y, color, alpha);
                }
            }
        }
    }
}
