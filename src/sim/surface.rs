//! Landing surfaces
//!
//! The host owns the geometry. Each frame the simulator asks a
//! [`SurfaceProvider`] for current bounds and keeps only a snapshot.

use serde::{Deserialize, Serialize};

/// Axis-aligned surface bounds (device pixels, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub right: f32,
    pub top: f32,
}

impl Rect {
    pub const fn new(left: f32, right: f32, top: f32) -> Self {
        Self { left, right, top }
    }

    /// Build from a left edge and width, as returned by layout queries
    pub fn from_left_width(left: f32, width: f32, top: f32) -> Self {
        Self {
            left,
            right: left + width,
            top,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Horizontal center
    #[inline]
    pub fn center_x(&self) -> f32 {
        self.left + self.width() / 2.0
    }
}

/// Source of live surface geometry
///
/// Queried once per frame; results are never cached across frames.
pub trait SurfaceProvider {
    /// Flat landing surfaces, in a stable order
    fn flat_surfaces(&self) -> Vec<Rect>;

    /// The single curved (arched) surface, if present
    fn curved_surface(&self) -> Option<Rect>;
}

/// Fixed surfaces, for headless hosts and tests
#[derive(Debug, Clone, Default)]
pub struct StaticSurfaces {
    pub flat: Vec<Rect>,
    pub curved: Option<Rect>,
}

impl StaticSurfaces {
    pub fn new(flat: Vec<Rect>, curved: Option<Rect>) -> Self {
        Self { flat, curved }
    }
}

impl SurfaceProvider for StaticSurfaces {
    fn flat_surfaces(&self) -> Vec<Rect> {
        self.flat.clone()
    }

    fn curved_surface(&self) -> Option<Rect> {
        self.curved
    }
}

/// Geometry sampled for a single frame
#[derive(Debug, Clone, Default)]
pub struct SurfaceSnapshot {
    pub flat: Vec<Rect>,
    pub curved: Option<Rect>,
}

impl SurfaceSnapshot {
    /// Re-sample all surfaces from the provider
    pub fn sample<P: SurfaceProvider + ?Sized>(&mut self, provider: &P) {
        self.flat = provider.flat_surfaces();
        self.curved = provider.curved_surface();
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty() && self.curved.is_none()
    }

    pub fn count(&self) -> usize {
        self.flat.len() + usize::from(self.curved.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_from_left_width() {
        let rect = Rect::from_left_width(100.0, 200.0, 50.0);
        assert_eq!(rect.right, 300.0);
        assert_eq!(rect.width(), 200.0);
        assert_eq!(rect.center_x(), 200.0);
    }

    #[test]
    fn test_snapshot_resamples() {
        let mut provider = StaticSurfaces::new(vec![Rect::new(0.0, 10.0, 5.0)], None);
        let mut snapshot = SurfaceSnapshot::default();
        snapshot.sample(&provider);
        assert_eq!(snapshot.count(), 1);

        provider.flat.clear();
        provider.curved = Some(Rect::new(0.0, 100.0, 0.0));
        snapshot.sample(&provider);
        assert!(snapshot.flat.is_empty());
        assert_eq!(snapshot.count(), 1);
        assert!(!snapshot.is_empty());
    }
}
