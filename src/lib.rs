//! Snow Overlay - decorative snowfall that settles on page surfaces
//!
//! Core modules:
//! - `sim`: Deterministic snow simulation (particle pool, surface collision, frame orchestration)
//! - `renderer`: Sprite cache, painter abstraction and a software rasterizer
//! - `field`: Rotating point-cloud background
//! - `overlay`: Host-agnostic start/stop/resize lifecycle
//! - `platform`: Browser bindings (DOM surfaces, Canvas 2D, animation frames)
//! - `settings`: JSON-configurable settings

pub mod error;
pub mod field;
pub mod overlay;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::OverlayError;
pub use overlay::SnowOverlay;
pub use settings::Settings;

use serde::{Deserialize, Serialize};

/// Visual tuning constants shared by the simulator and renderers
pub mod consts {
    /// Viewport widths below this count as mobile (smaller pool)
    pub const MOBILE_BREAKPOINT: f32 = 768.0;
    /// Pool size under the mobile breakpoint
    pub const MOBILE_FLAKE_COUNT: usize = 350;
    /// Pool size at or above the mobile breakpoint
    pub const DESKTOP_FLAKE_COUNT: usize = 850;

    /// Side length of the cached crystal sprite (pixels)
    pub const SPRITE_SIZE: u32 = 32;

    /// Vertical radius of the header arch (matches its CSS curvature)
    pub const ARCH_RADIUS: f32 = 20.0;
    /// Curved landing band half-height (pixels)
    pub const CURVED_TOLERANCE: f32 = 4.0;
    /// Flat landing band above a surface's top edge
    pub const FLAT_TOLERANCE_ABOVE: f32 = 5.0;
    /// Flat landing band below a surface's top edge
    pub const FLAT_TOLERANCE_BELOW: f32 = 10.0;
    /// Random vertical jitter for flakes resting on flat surfaces
    pub const LANDING_JITTER: f32 = 2.0;

    /// Horizontal margin past which a flake wraps to the opposite edge
    pub const WRAP_MARGIN: f32 = 10.0;
    /// Spawn height for recycled flakes (above the visible area)
    pub const SPAWN_HEIGHT: f32 = -20.0;
}

/// Viewport size in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether this viewport is below the mobile breakpoint
    #[inline]
    pub fn is_mobile(&self, breakpoint: f32) -> bool {
        self.width < breakpoint
    }

    /// Pixel dimensions for backing buffers (at least 1x1)
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.width.max(1.0).round() as u32,
            self.height.max(1.0).round() as u32,
        )
    }
}

/// Wrap a horizontal coordinate across the viewport with a margin.
///
/// Exiting past `width + margin` re-enters at `-margin` and vice versa.
#[inline]
pub fn wrap_horizontal(x: f32, width: f32, margin: f32) -> f32 {
    if x > width + margin {
        -margin
    } else if x < -margin {
        width + margin
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_horizontal() {
        assert_eq!(wrap_horizontal(50.0, 100.0, 10.0), 50.0);
        assert_eq!(wrap_horizontal(110.5, 100.0, 10.0), -10.0);
        assert_eq!(wrap_horizontal(-10.5, 100.0, 10.0), 110.0);
        // Exactly on the margin stays put
        assert_eq!(wrap_horizontal(110.0, 100.0, 10.0), 110.0);
        assert_eq!(wrap_horizontal(-10.0, 100.0, 10.0), -10.0);
    }

    #[test]
    fn test_viewport_breakpoint() {
        assert!(Viewport::new(767.0, 900.0).is_mobile(consts::MOBILE_BREAKPOINT));
        assert!(!Viewport::new(768.0, 900.0).is_mobile(consts::MOBILE_BREAKPOINT));
        assert_eq!(Viewport::new(0.0, 10.4).pixel_size(), (1, 10));
    }
}
