//! Geometry for 2D primitives

use glam::Vec2;
use std::f32::consts::FRAC_PI_3;

/// Number of radial arms on the crystal glyph
pub const CRYSTAL_ARMS: u32 = 6;

/// A pair of side branches on one arm, mirrored across the arm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchPair {
    /// Where the branches leave the arm (fraction of arm length)
    pub root: f32,
    /// Radial position of the branch tips (fraction of arm length)
    pub tip: f32,
    /// Sideways reach of each tip (fraction of arm length)
    pub spread: f32,
}

/// Side branches on every arm
pub const CRYSTAL_BRANCHES: [BranchPair; 2] = [
    BranchPair {
        root: 0.6,
        tip: 0.7,
        spread: 0.25,
    },
    BranchPair {
        root: 0.8,
        tip: 0.85,
        spread: 0.15,
    },
];

/// Straight stroke between two points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
}

impl Segment {
    pub const fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }

    /// Distance from `p` to the closest point on the segment
    pub fn distance_to(&self, p: Vec2) -> f32 {
        let line = self.b - self.a;
        let len_sq = line.length_squared();
        if len_sq < 1e-8 {
            return (p - self.a).length(); // Degenerate segment
        }
        let t = ((p - self.a).dot(line) / len_sq).clamp(0.0, 1.0);
        (p - (self.a + line * t)).length()
    }
}

/// Line segments for the six-armed crystal centered at `center`
///
/// Arms sit at 60° intervals starting straight up (screen space, y down).
pub fn crystal_segments(center: Vec2, arm_length: f32) -> Vec<Segment> {
    let per_arm = 1 + CRYSTAL_BRANCHES.len() * 2;
    let mut segments = Vec::with_capacity(CRYSTAL_ARMS as usize * per_arm);

    for i in 0..CRYSTAL_ARMS {
        let dir = Vec2::from_angle(FRAC_PI_3 * i as f32).rotate(Vec2::NEG_Y);
        let side = dir.perp();

        segments.push(Segment::new(center, center + dir * arm_length));

        for branch in &CRYSTAL_BRANCHES {
            let root = center + dir * (branch.root * arm_length);
            let tip = center + dir * (branch.tip * arm_length);
            let reach = side * (branch.spread * arm_length);
            segments.push(Segment::new(root, tip + reach));
            segments.push(Segment::new(root, tip - reach));
        }
    }

    segments
}

/// Whether `p` is inside the axis-aligned ellipse
#[inline]
pub fn ellipse_contains(center: Vec2, radii: Vec2, p: Vec2) -> bool {
    if radii.x <= 0.0 || radii.y <= 0.0 {
        return false;
    }
    let d = (p - center) / radii;
    d.length_squared() <= 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crystal_segment_count() {
        let segments = crystal_segments(Vec2::splat(16.0), 12.0);
        assert_eq!(segments.len(), 6 * 5);
    }

    #[test]
    fn test_first_arm_points_up() {
        let segments = crystal_segments(Vec2::ZERO, 10.0);
        let arm = segments[0];
        assert!(arm.b.x.abs() < 1e-5);
        assert!((arm.b.y + 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_arms_sixty_degrees_apart() {
        let segments = crystal_segments(Vec2::ZERO, 10.0);
        let arms: Vec<Vec2> = segments.iter().step_by(5).map(|s| s.b).collect();
        for pair in arms.windows(2) {
            let angle = pair[0].angle_to(pair[1]).abs();
            assert!((angle - FRAC_PI_3).abs() < 1e-4);
        }
    }

    #[test]
    fn test_branches_mirror_across_arm() {
        let segments = crystal_segments(Vec2::ZERO, 10.0);
        let (left, right) = (segments[1], segments[2]);
        assert_eq!(left.a, right.a);
        assert!((left.a.y + 6.0).abs() < 1e-5);
        assert!((left.b.x + right.b.x).abs() < 1e-5);
        assert!((left.b.y - right.b.y).abs() < 1e-5);
        assert!((left.b.x.abs() - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_segment_distance() {
        let s = Segment::new(Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert!((s.distance_to(Vec2::new(5.0, 3.0)) - 3.0).abs() < 1e-5);
        assert!((s.distance_to(Vec2::new(-4.0, 3.0)) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_ellipse_contains() {
        let c = Vec2::new(10.0, 10.0);
        let r = Vec2::new(4.0, 2.0);
        assert!(ellipse_contains(c, r, Vec2::new(13.5, 10.0)));
        assert!(!ellipse_contains(c, r, Vec2::new(10.0, 12.5)));
        assert!(!ellipse_contains(c, Vec2::ZERO, c));
    }
}
