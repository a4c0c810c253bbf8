//! Background point cloud
//!
//! A cube of gold points slowly tumbling in front of a perspective camera,
//! drawn with additive blending underneath the page content.

use glam::{EulerRot, Mat4, Vec2, Vec3, Vec4Swizzles};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::renderer::{BlendMode, Painter, colors};
use crate::sim::config::{check, non_negative};
use crate::{OverlayError, Viewport};

/// Largest cloud a host may ask for
pub const MAX_FIELD_POINTS: usize = 50_000;

/// Point cloud tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub count: usize,
    /// Edge length of the cube the points are scattered in (world units)
    pub extent: f32,
    /// Rotation per frame about X and Y (radians)
    pub spin: Vec2,
    /// Camera distance from the cube center
    pub camera_distance: f32,
    pub fov_y_degrees: f32,
    /// Point diameter in world units, attenuated with distance
    pub point_size: f32,
    pub color: [u8; 3],
    pub alpha: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            count: 2500,
            extent: 30.0,
            spin: Vec2::new(0.0004, 0.0008),
            camera_distance: 8.0,
            fov_y_degrees: 75.0,
            point_size: 0.03,
            color: colors::FIELD_GOLD,
            alpha: 1.0,
        }
    }
}

impl FieldConfig {
    /// Reject values the projection can't work with
    pub fn validate(&self) -> Result<(), OverlayError> {
        check(self.count <= MAX_FIELD_POINTS, "field.count")?;
        check(non_negative(self.extent), "field.extent")?;
        check(self.spin.is_finite(), "field.spin")?;
        check(
            self.camera_distance.is_finite() && self.camera_distance > NEAR,
            "field.camera_distance",
        )?;
        check(
            self.fov_y_degrees > 0.0 && self.fov_y_degrees < 180.0,
            "field.fov_y_degrees",
        )?;
        check(non_negative(self.point_size), "field.point_size")?;
        check(self.alpha.is_finite(), "field.alpha")
    }
}

const NEAR: f32 = 0.1;
const FAR: f32 = 1000.0;
/// Smallest radius that always covers at least one pixel center
const MIN_DOT_RADIUS: f32 = 0.75;

/// A projected point ready to paint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dot {
    pub pos: Vec2,
    pub radius: f32,
}

/// Rotating point cloud
#[derive(Debug, Clone)]
pub struct ParticleField {
    config: FieldConfig,
    points: Vec<Vec3>,
    /// Accumulated rotation about X and Y
    rotation: Vec2,
}

impl ParticleField {
    pub fn new(config: FieldConfig, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let half = config.extent / 2.0;
        let points = (0..config.count)
            .map(|_| {
                Vec3::new(
                    rng.random::<f32>() * config.extent - half,
                    rng.random::<f32>() * config.extent - half,
                    rng.random::<f32>() * config.extent - half,
                )
            })
            .collect();
        Self {
            config,
            points,
            rotation: Vec2::ZERO,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn rotation(&self) -> Vec2 {
        self.rotation
    }

    /// Advance the tumble by one frame
    pub fn step(&mut self) {
        self.rotation += self.config.spin;
    }

    /// Combined model-view-projection for the current rotation
    fn transform(&self, viewport: Viewport) -> Mat4 {
        let aspect = viewport.width.max(1.0) / viewport.height.max(1.0);
        let projection =
            Mat4::perspective_rh(self.config.fov_y_degrees.to_radians(), aspect, NEAR, FAR);
        let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -self.config.camera_distance));
        let model = Mat4::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, 0.0);
        projection * view * model
    }

    /// Screen-space dots for every point in front of the camera and on screen
    pub fn project(&self, viewport: Viewport) -> impl Iterator<Item = Dot> + '_ {
        let mvp = self.transform(viewport);
        let half_height = viewport.height / 2.0;
        let point_size = self.config.point_size;

        self.points.iter().filter_map(move |p| {
            let clip = mvp * p.extend(1.0);
            if clip.w <= NEAR {
                return None; // Behind the camera
            }
            let ndc = clip.xyz() / clip.w;
            if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 || !(0.0..=1.0).contains(&ndc.z) {
                return None;
            }
            let pos = Vec2::new(
                (ndc.x + 1.0) / 2.0 * viewport.width,
                (1.0 - ndc.y) / 2.0 * viewport.height,
            );
            // clip.w is the view-space depth
            let diameter = point_size * half_height / clip.w;
            Some(Dot {
                pos,
                radius: (diameter / 2.0).max(MIN_DOT_RADIUS),
            })
        })
    }

    /// Clear and paint the cloud
    pub fn paint<P: Painter + ?Sized>(&self, painter: &mut P, viewport: Viewport) {
        painter.clear();
        painter.set_blend(BlendMode::Additive);
        for dot in self.project(viewport) {
            painter.fill_ellipse(
                dot.pos,
                Vec2::splat(dot.radius),
                self.config.color,
                self.config.alpha,
            );
        }
        painter.set_blend(BlendMode::SourceOver);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::PixelCanvas;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    #[test]
    fn test_points_inside_cube() {
        let field = ParticleField::new(FieldConfig::default(), 1);
        assert_eq!(field.len(), 2500);
        // Extent 30 means every coordinate is in [-15, 15)
        let bound = 15.0;
        assert!(field.points.iter().all(|p| p.abs().max_element() <= bound));
    }

    #[test]
    fn test_origin_projects_to_center() {
        let mut field = ParticleField::new(
            FieldConfig {
                count: 0,
                ..FieldConfig::default()
            },
            1,
        );
        field.points.push(Vec3::ZERO);
        let dots: Vec<Dot> = field.project(viewport()).collect();
        assert_eq!(dots.len(), 1);
        assert!((dots[0].pos - Vec2::new(400.0, 300.0)).length() < 1e-3);
        // 0.03 * 300 / 8 = 1.125px diameter, clamped up to the minimum radius
        assert_eq!(dots[0].radius, MIN_DOT_RADIUS);
    }

    #[test]
    fn test_points_behind_camera_are_culled() {
        let mut field = ParticleField::new(
            FieldConfig {
                count: 0,
                ..FieldConfig::default()
            },
            1,
        );
        field.points.push(Vec3::new(0.0, 0.0, 9.0));
        field.points.push(Vec3::new(0.0, 0.0, 12.0));
        assert_eq!(field.project(viewport()).count(), 0);
    }

    #[test]
    fn test_validate_field_config() {
        assert!(FieldConfig::default().validate().is_ok());
        let too_many = FieldConfig {
            count: MAX_FIELD_POINTS + 1,
            ..FieldConfig::default()
        };
        assert!(too_many.validate().is_err());
        let flat_fov = FieldConfig {
            fov_y_degrees: 180.0,
            ..FieldConfig::default()
        };
        assert!(flat_fov.validate().is_err());
    }

    #[test]
    fn test_step_accumulates_spin() {
        let mut field = ParticleField::new(FieldConfig::default(), 1);
        for _ in 0..1000 {
            field.step();
        }
        assert!((field.rotation().x - 0.4).abs() < 1e-3);
        assert!((field.rotation().y - 0.8).abs() < 1e-3);
    }

    #[test]
    fn test_paint_covers_pixels() {
        let field = ParticleField::new(FieldConfig::default(), 5);
        let mut canvas = PixelCanvas::new(viewport());
        field.paint(&mut canvas, viewport());
        assert!(canvas.covered_pixels() > 100);
    }
}
