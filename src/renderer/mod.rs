//! Rendering
//!
//! The simulator emits a paint list; a [`Painter`] turns it into pixels.
//! Browser builds paint through Canvas 2D (`platform::web`), everything else
//! through the software [`PixelCanvas`].

pub mod pixel;
pub mod raster;
pub mod shapes;
pub mod sprite;

pub use pixel::{Pixel, colors};
pub use raster::PixelCanvas;
pub use sprite::SpriteCache;

use glam::Vec2;

use crate::Viewport;
use crate::sim::{DrawCommand, Frame};

/// How new paint combines with what's already there
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    SourceOver,
    /// Colors add up (glowing point clouds)
    Additive,
}

/// A drawing surface the overlay can paint on
///
/// `draw_glyph` blits the sprite cache attached at acquisition, centered on
/// `pos`. A painter without one ignores glyphs.
pub trait Painter {
    /// Match the backing store to new viewport bounds
    fn resize(&mut self, viewport: Viewport);

    /// Make the whole surface transparent
    fn clear(&mut self);

    fn set_blend(&mut self, blend: BlendMode);

    /// Blit the cached crystal, rotated about its center and scaled
    fn draw_glyph(&mut self, pos: Vec2, rotation: f32, scale: f32, alpha: f32);

    /// Fill an axis-aligned ellipse
    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: [u8; 3], alpha: f32);
}

/// Clear the surface and paint one simulator frame
pub fn paint_frame<P: Painter + ?Sized>(painter: &mut P, frame: &Frame) {
    painter.clear();
    painter.set_blend(BlendMode::SourceOver);

    for command in &frame.commands {
        match *command {
            DrawCommand::Glyph {
                pos,
                rotation,
                scale,
                alpha,
            } => painter.draw_glyph(pos, rotation, scale, alpha),
            DrawCommand::Blob { pos, radii, alpha } => {
                // Melted-through blobs are skipped
                if alpha > 0.0 {
                    painter.fill_ellipse(pos, radii, colors::SNOW, alpha);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::FrameStats;

    /// Records calls instead of drawing
    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
    }

    impl Painter for Recorder {
        fn resize(&mut self, _viewport: Viewport) {
            self.calls.push("resize");
        }
        fn clear(&mut self) {
            self.calls.push("clear");
        }
        fn set_blend(&mut self, _blend: BlendMode) {
            self.calls.push("blend");
        }
        fn draw_glyph(&mut self, _pos: Vec2, _rotation: f32, _scale: f32, _alpha: f32) {
            self.calls.push("glyph");
        }
        fn fill_ellipse(&mut self, _center: Vec2, _radii: Vec2, _color: [u8; 3], _alpha: f32) {
            self.calls.push("ellipse");
        }
    }

    #[test]
    fn test_paint_frame_order() {
        let frame = Frame {
            commands: vec![
                DrawCommand::Blob {
                    pos: Vec2::ZERO,
                    radii: Vec2::ONE,
                    alpha: 0.5,
                },
                DrawCommand::Glyph {
                    pos: Vec2::ZERO,
                    rotation: 0.0,
                    scale: 0.3,
                    alpha: 0.8,
                },
                DrawCommand::Blob {
                    pos: Vec2::ZERO,
                    radii: Vec2::ONE,
                    alpha: -0.001,
                },
            ],
            stats: FrameStats::default(),
        };
        let mut recorder = Recorder::default();
        paint_frame(&mut recorder, &frame);
        assert_eq!(recorder.calls, vec!["clear", "blend", "ellipse", "glyph"]);
    }
}
