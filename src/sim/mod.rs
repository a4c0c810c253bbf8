//! Deterministic snow simulation
//!
//! This module must stay pure and deterministic:
//! - One tick per displayed frame, no wall-clock time
//! - Seeded RNG only
//! - Stable iteration order (pool slot order, surface list order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod config;
pub mod particle;
pub mod pool;
pub mod surface;
pub mod tick;

pub use collision::{Landing, arch_top_at, curved_contact, flat_contact, resolve_landing};
pub use config::{LandingBands, SimConfig, Span};
pub use particle::{FlakeState, Particle};
pub use pool::ParticlePool;
pub use surface::{Rect, StaticSurfaces, SurfaceProvider, SurfaceSnapshot};
pub use tick::{DrawCommand, Frame, FrameStats, Simulator};
