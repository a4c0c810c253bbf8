//! Snowflake particle record

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Flake state - falling under sway and gravity, or resting on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlakeState {
    Falling,
    /// Frozen in place and melting
    Landed,
}

/// A single snowflake, owned by exactly one pool slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Position in device pixels
    pub pos: Vec2,
    /// Per-frame displacement (x = linear drift, y = fall speed)
    pub vel: Vec2,
    /// Drawn-size multiplier, fixed at creation
    pub scale: f32,
    /// Sway oscillation seed
    pub phase: f32,
    pub sway_offset: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub alpha: f32,
    /// Opacity lost per frame while landed
    pub melt_rate: f32,
    pub state: FlakeState,
}

impl Particle {
    #[inline]
    pub fn is_landed(&self) -> bool {
        self.state == FlakeState::Landed
    }

    #[inline]
    pub fn is_falling(&self) -> bool {
        self.state == FlakeState::Falling
    }

    /// Horizontal sway component for one frame
    #[inline]
    pub fn sway(&self, amplitude: f32) -> f32 {
        (self.phase + self.sway_offset).sin() * amplitude
    }

    /// Freeze the flake at `rest_y`
    pub fn land(&mut self, rest_y: f32) {
        self.pos.y = rest_y;
        self.state = FlakeState::Landed;
    }

    /// A landed flake has fully melted
    #[inline]
    pub fn is_depleted(&self) -> bool {
        self.is_landed() && self.alpha <= 0.0
    }
}
