//! Simulation tuning
//!
//! The landing bands are hand-tuned visual constants, fixed per run.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::{OverlayError, Viewport};

/// Largest pool a host may ask for
pub const MAX_FLAKE_COUNT: usize = 10_000;
/// Largest sprite edge a host may ask for
pub const MAX_SPRITE_SIZE: u32 = 256;

/// Half-open `[min, max)` range used for randomized flake parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Whether `v` lies in `[min, max)`
    #[inline]
    pub fn contains(&self, v: f32) -> bool {
        v >= self.min && v < self.max
    }

    /// Finite bounds with `min <= max`
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

pub(crate) fn check(ok: bool, what: &str) -> Result<(), OverlayError> {
    if ok {
        Ok(())
    } else {
        Err(OverlayError::InvalidSettings(what.to_string()))
    }
}

pub(crate) fn non_negative(v: f32) -> bool {
    v.is_finite() && v >= 0.0
}

/// Collision tolerance bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandingBands {
    /// Vertical radius of the curved header arch
    pub arch_radius: f32,
    /// Curved surface: flake lands within ± this of the curve
    pub curved_tolerance: f32,
    /// Flat surface: band starts this far above the top edge
    pub flat_above: f32,
    /// Flat surface: band ends this far below the top edge
    pub flat_below: f32,
    /// Flat surface: rest height jitter (±)
    pub jitter: f32,
}

impl Default for LandingBands {
    fn default() -> Self {
        Self {
            arch_radius: ARCH_RADIUS,
            curved_tolerance: CURVED_TOLERANCE,
            flat_above: FLAT_TOLERANCE_ABOVE,
            flat_below: FLAT_TOLERANCE_BELOW,
            jitter: LANDING_JITTER,
        }
    }
}

/// Complete snow simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Width below which the mobile flake count is used
    pub mobile_breakpoint: f32,
    pub mobile_count: usize,
    pub desktop_count: usize,

    /// Drawn-size multiplier
    pub scale: Span,
    /// Per-frame fall speed
    pub fall_speed: Span,
    /// Per-frame linear horizontal drift
    pub drift: Span,
    /// Sway amplitude applied to `sin(phase + sway_offset)`
    pub sway_amplitude: f32,
    /// Extra sway phase shift
    pub sway_offset: Span,
    /// Rotation speed magnitude (radians/frame, symmetric around 0)
    pub max_rotation_speed: f32,
    /// Starting opacity
    pub alpha: Span,
    /// Opacity lost per frame once landed
    pub melt_rate: Span,

    /// Y coordinate for flakes respawned above the view
    pub spawn_height: f32,
    /// Horizontal wrap margin
    pub wrap_margin: f32,

    pub landing: LandingBands,

    /// Accumulation blob radii as multiples of flake scale
    pub blob_radius_x: f32,
    pub blob_radius_y: f32,

    /// Cached sprite edge length in pixels
    pub sprite_size: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            mobile_breakpoint: MOBILE_BREAKPOINT,
            mobile_count: MOBILE_FLAKE_COUNT,
            desktop_count: DESKTOP_FLAKE_COUNT,

            scale: Span::new(0.2, 0.5),
            fall_speed: Span::new(1.0, 2.5),
            drift: Span::new(-0.5, 0.5),
            sway_amplitude: 0.5,
            sway_offset: Span::new(0.0, 100.0),
            max_rotation_speed: 0.025,
            alpha: Span::new(0.7, 1.0),
            melt_rate: Span::new(0.0005, 0.0035),

            spawn_height: SPAWN_HEIGHT,
            wrap_margin: WRAP_MARGIN,

            landing: LandingBands::default(),

            blob_radius_x: 10.0,
            blob_radius_y: 6.0,

            sprite_size: SPRITE_SIZE,
        }
    }
}

impl SimConfig {
    /// Pool size for a viewport; decided once at start
    pub fn flake_count(&self, viewport: Viewport) -> usize {
        if viewport.is_mobile(self.mobile_breakpoint) {
            self.mobile_count
        } else {
            self.desktop_count
        }
    }

    /// Reject values the pool, collision and sprite code can't work with
    pub fn validate(&self) -> Result<(), OverlayError> {
        check(non_negative(self.mobile_breakpoint), "snow.mobile_breakpoint")?;
        check(self.mobile_count <= MAX_FLAKE_COUNT, "snow.mobile_count")?;
        check(self.desktop_count <= MAX_FLAKE_COUNT, "snow.desktop_count")?;

        for (span, name) in [
            (self.scale, "snow.scale"),
            (self.fall_speed, "snow.fall_speed"),
            (self.drift, "snow.drift"),
            (self.sway_offset, "snow.sway_offset"),
            (self.alpha, "snow.alpha"),
            (self.melt_rate, "snow.melt_rate"),
        ] {
            check(span.is_valid(), name)?;
        }
        check(self.melt_rate.min > 0.0, "snow.melt_rate")?;

        check(self.sway_amplitude.is_finite(), "snow.sway_amplitude")?;
        check(non_negative(self.max_rotation_speed), "snow.max_rotation_speed")?;
        check(self.spawn_height.is_finite(), "snow.spawn_height")?;
        check(non_negative(self.wrap_margin), "snow.wrap_margin")?;

        let bands = &self.landing;
        check(non_negative(bands.arch_radius), "snow.landing.arch_radius")?;
        check(non_negative(bands.curved_tolerance), "snow.landing.curved_tolerance")?;
        check(bands.flat_above.is_finite(), "snow.landing.flat_above")?;
        check(bands.flat_below.is_finite(), "snow.landing.flat_below")?;
        check(non_negative(bands.jitter), "snow.landing.jitter")?;

        check(non_negative(self.blob_radius_x), "snow.blob_radius_x")?;
        check(non_negative(self.blob_radius_y), "snow.blob_radius_y")?;
        check(
            (1..=MAX_SPRITE_SIZE).contains(&self.sprite_size),
            "snow.sprite_size",
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flake_count_breakpoint() {
        let config = SimConfig::default();
        assert_eq!(config.flake_count(Viewport::new(375.0, 800.0)), 350);
        assert_eq!(config.flake_count(Viewport::new(1920.0, 1080.0)), 850);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{ "desktop_count": 100, "landing": { "jitter": 0.0 } }"#)
                .unwrap();
        assert_eq!(config.desktop_count, 100);
        assert_eq!(config.mobile_count, MOBILE_FLAKE_COUNT);
        assert_eq!(config.landing.jitter, 0.0);
        assert_eq!(config.landing.curved_tolerance, CURVED_TOLERANCE);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases = [
            SimConfig {
                sprite_size: 70_000,
                ..SimConfig::default()
            },
            SimConfig {
                sprite_size: 0,
                ..SimConfig::default()
            },
            SimConfig {
                desktop_count: MAX_FLAKE_COUNT + 1,
                ..SimConfig::default()
            },
            SimConfig {
                alpha: Span::new(1.0, 0.5),
                ..SimConfig::default()
            },
            SimConfig {
                fall_speed: Span::new(f32::NAN, 2.0),
                ..SimConfig::default()
            },
            SimConfig {
                melt_rate: Span::new(0.0, 0.001),
                ..SimConfig::default()
            },
            SimConfig {
                wrap_margin: -1.0,
                ..SimConfig::default()
            },
        ];
        for config in cases {
            let err = config.validate().unwrap_err();
            assert!(matches!(err, OverlayError::InvalidSettings(_)), "{:?}", config);
        }
    }
}
