//! Flake/surface contact tests
//!
//! The arch is the awkward one: its visual top edge is the upper half of an
//! ellipse spanning the header width, so the landing height depends on x.
//! Flat surfaces are simple bands around the top edge. The curved surface is
//! tested first and the first match wins.

use glam::Vec2;

use super::config::LandingBands;
use super::surface::{Rect, SurfaceSnapshot};

/// Where a flake came to rest
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Landing {
    /// On the arch; `rest_y` lies exactly on the curve
    Curved { rest_y: f32 },
    /// On a flat surface whose top edge is `top`
    Flat { top: f32 },
}

impl Landing {
    /// Final resting height. `jitter` only applies to flat landings so
    /// accumulation along an edge isn't perfectly level.
    #[inline]
    pub fn rest_y(&self, jitter: f32) -> f32 {
        match *self {
            Landing::Curved { rest_y } => rest_y,
            Landing::Flat { top } => top + jitter,
        }
    }
}

/// Height of the arch's top edge at `x`, or `None` outside its span
///
/// With half-width `hw`, center `cx` and vertical radius `vr`:
/// `t = (x - cx) / hw`, `y = top + vr - vr * sqrt(1 - t²)`.
pub fn arch_top_at(arch: &Rect, x: f32, vertical_radius: f32) -> Option<f32> {
    if x < arch.left || x > arch.right {
        return None;
    }
    let half_width = arch.width() / 2.0;
    if half_width <= 0.0 {
        return None; // Degenerate arch
    }
    let t = (x - arch.center_x()) / half_width;
    if t.abs() > 1.0 {
        return None;
    }
    let curve_height = vertical_radius * (1.0 - t * t).sqrt();
    Some(arch.top + vertical_radius - curve_height)
}

/// Check a flake against the curved surface
pub fn curved_contact(pos: Vec2, arch: &Rect, bands: &LandingBands) -> Option<Landing> {
    let curve_y = arch_top_at(arch, pos.x, bands.arch_radius)?;
    if (pos.y - curve_y).abs() <= bands.curved_tolerance {
        Some(Landing::Curved { rest_y: curve_y })
    } else {
        None
    }
}

/// Check a flake against one flat surface
#[inline]
pub fn flat_contact(pos: Vec2, rect: &Rect, bands: &LandingBands) -> bool {
    pos.x > rect.left
        && pos.x < rect.right
        && pos.y >= rect.top - bands.flat_above
        && pos.y <= rect.top + bands.flat_below
}

/// Find the first surface a flake touches this frame
///
/// Flakes still above the top of the viewport (y <= 0) never land, so a
/// respawning flake can't stick to something mid-spawn.
pub fn resolve_landing(
    pos: Vec2,
    surfaces: &SurfaceSnapshot,
    bands: &LandingBands,
) -> Option<Landing> {
    if pos.y <= 0.0 {
        return None;
    }

    if let Some(arch) = &surfaces.curved {
        if let Some(landing) = curved_contact(pos, arch, bands) {
            return Some(landing);
        }
    }

    surfaces
        .flat
        .iter()
        .find(|rect| flat_contact(pos, rect, bands))
        .map(|rect| Landing::Flat { top: rect.top })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arch() -> Rect {
        Rect::new(100.0, 300.0, 50.0)
    }

    fn snapshot(flat: Vec<Rect>, curved: Option<Rect>) -> SurfaceSnapshot {
        SurfaceSnapshot { flat, curved }
    }

    #[test]
    fn test_arch_top_center_and_quarter() {
        let center = arch_top_at(&arch(), 200.0, 20.0).unwrap();
        assert!((center - 50.0).abs() < 1e-4);

        // t = -0.5
        let quarter = arch_top_at(&arch(), 150.0, 20.0).unwrap();
        let expected = 50.0 + 20.0 - 20.0 * 0.75_f32.sqrt();
        assert!((quarter - expected).abs() < 1e-4);
        assert!((quarter - 52.68).abs() < 0.01);
    }

    #[test]
    fn test_arch_edges_drop_to_full_radius() {
        let left = arch_top_at(&arch(), 100.0, 20.0).unwrap();
        let right = arch_top_at(&arch(), 300.0, 20.0).unwrap();
        assert!((left - 70.0).abs() < 1e-4);
        assert!((right - 70.0).abs() < 1e-4);
        assert!(arch_top_at(&arch(), 99.0, 20.0).is_none());
        assert!(arch_top_at(&arch(), 301.0, 20.0).is_none());
    }

    #[test]
    fn test_degenerate_arch_never_hits() {
        let flat_line = Rect::new(100.0, 100.0, 50.0);
        assert!(arch_top_at(&flat_line, 100.0, 20.0).is_none());
    }

    #[test]
    fn test_curved_contact_snaps_to_curve() {
        let bands = LandingBands::default();
        let landing = curved_contact(Vec2::new(150.0, 55.0), &arch(), &bands).unwrap();
        let rest_y = landing.rest_y(1.5);
        assert!((rest_y - 52.679).abs() < 0.01, "jitter must not apply to curves");

        // Outside the ±4 band
        assert!(curved_contact(Vec2::new(150.0, 57.0), &arch(), &bands).is_none());
        assert!(curved_contact(Vec2::new(200.0, 45.5), &arch(), &bands).is_none());
    }

    #[test]
    fn test_flat_contact_band() {
        let bands = LandingBands::default();
        let rect = Rect::new(100.0, 200.0, 100.0);
        assert!(flat_contact(Vec2::new(150.0, 95.0), &rect, &bands));
        assert!(flat_contact(Vec2::new(150.0, 110.0), &rect, &bands));
        assert!(!flat_contact(Vec2::new(150.0, 94.9), &rect, &bands));
        assert!(!flat_contact(Vec2::new(150.0, 110.1), &rect, &bands));
        // Edges are exclusive
        assert!(!flat_contact(Vec2::new(100.0, 100.0), &rect, &bands));
        assert!(!flat_contact(Vec2::new(200.0, 100.0), &rect, &bands));
    }

    #[test]
    fn test_no_landing_above_viewport() {
        let bands = LandingBands::default();
        let surfaces = snapshot(vec![Rect::new(0.0, 100.0, 0.0)], None);
        assert!(resolve_landing(Vec2::new(50.0, 0.0), &surfaces, &bands).is_none());
        assert!(resolve_landing(Vec2::new(50.0, -3.0), &surfaces, &bands).is_none());
        assert!(resolve_landing(Vec2::new(50.0, 0.5), &surfaces, &bands).is_some());

        // An arch poking above the viewport touches the flake but doesn't catch it
        let high_arch = Rect::new(0.0, 200.0, -10.0);
        let pos = Vec2::new(100.0, -8.0);
        assert!(curved_contact(pos, &high_arch, &bands).is_some());
        let surfaces = snapshot(Vec::new(), Some(high_arch));
        assert!(resolve_landing(pos, &surfaces, &bands).is_none());
    }

    #[test]
    fn test_curved_takes_priority() {
        let bands = LandingBands::default();
        // Flat surface overlapping the arch center
        let surfaces = snapshot(vec![Rect::new(150.0, 250.0, 50.0)], Some(arch()));
        let landing = resolve_landing(Vec2::new(200.0, 51.0), &surfaces, &bands).unwrap();
        assert!(matches!(landing, Landing::Curved { .. }));
    }

    #[test]
    fn test_first_flat_match_wins() {
        let bands = LandingBands::default();
        let surfaces = snapshot(
            vec![
                Rect::new(0.0, 300.0, 100.0),
                Rect::new(100.0, 200.0, 102.0),
            ],
            None,
        );
        let landing = resolve_landing(Vec2::new(150.0, 101.0), &surfaces, &bands).unwrap();
        assert_eq!(landing, Landing::Flat { top: 100.0 });
    }

    #[test]
    fn test_empty_snapshot_never_lands() {
        let bands = LandingBands::default();
        let surfaces = SurfaceSnapshot::default();
        assert!(resolve_landing(Vec2::new(10.0, 10.0), &surfaces, &bands).is_none());
    }
}
