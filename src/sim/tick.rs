//! Per-frame orchestration
//!
//! One call to [`Simulator::tick`] samples the surfaces, visits every flake
//! once in slot order, and records what to paint. The renderer consumes the
//! resulting [`Frame`]; the simulator itself never touches a drawing surface.

use glam::Vec2;

use super::collision::{Landing, resolve_landing};
use super::config::SimConfig;
use super::pool::ParticlePool;
use super::surface::{SurfaceProvider, SurfaceSnapshot};
use crate::Viewport;

/// A single paint operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    /// Cached crystal sprite, rotated and scaled about its center
    Glyph {
        pos: Vec2,
        rotation: f32,
        scale: f32,
        alpha: f32,
    },
    /// Accumulation blob for a landed flake
    Blob { pos: Vec2, radii: Vec2, alpha: f32 },
}

/// Counters for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub falling: usize,
    pub landed: usize,
    /// Flakes that touched down this frame
    pub new_landings: usize,
    /// Slots refilled this frame (melted or fell off the bottom)
    pub recycled: usize,
    /// Surfaces sampled this frame
    pub surfaces: usize,
}

/// Paint list for one frame, reused between frames
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub commands: Vec<DrawCommand>,
    pub stats: FrameStats,
}

impl Frame {
    fn reset(&mut self) {
        self.commands.clear();
        self.stats = FrameStats::default();
    }
}

/// The snow simulation: flake pool plus the per-frame surface snapshot
#[derive(Debug, Clone)]
pub struct Simulator {
    viewport: Viewport,
    pool: ParticlePool,
    surfaces: SurfaceSnapshot,
    frame: Frame,
    frame_count: u64,
}

impl Simulator {
    /// Create a simulator with a pool sized for `viewport`
    pub fn new(config: SimConfig, viewport: Viewport, seed: u64) -> Self {
        let pool = ParticlePool::new(config, viewport, seed);
        log::info!(
            "Snow simulator started: {} flakes, viewport {}x{}, seed {}",
            pool.len(),
            viewport.width,
            viewport.height,
            seed
        );
        Self {
            viewport,
            pool,
            surfaces: SurfaceSnapshot::default(),
            frame: Frame::default(),
            frame_count: 0,
        }
    }

    /// Adopt new viewport bounds. The pool size is kept; flakes pick up the
    /// new bounds on their next wrap or recycle.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut ParticlePool {
        &mut self.pool
    }

    pub fn config(&self) -> &SimConfig {
        self.pool.config()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Paint list produced by the last tick
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Advance every flake by one frame
    pub fn tick<P: SurfaceProvider + ?Sized>(&mut self, provider: &P) -> &Frame {
        self.surfaces.sample(provider);
        self.frame.reset();
        self.frame.stats.surfaces = self.surfaces.count();

        let viewport = self.viewport;
        let (blob_rx, blob_ry) = {
            let config = self.pool.config();
            (config.blob_radius_x, config.blob_radius_y)
        };
        let bands = self.pool.config().landing;

        for i in 0..self.pool.len() {
            if self.pool.particles()[i].is_landed() {
                self.pool.advance_slot(i, viewport);
                let flake = &self.pool.particles()[i];
                self.frame.commands.push(DrawCommand::Blob {
                    pos: flake.pos,
                    radii: Vec2::new(flake.scale * blob_rx, flake.scale * blob_ry),
                    alpha: flake.alpha,
                });

                if flake.is_depleted() {
                    self.pool.recycle(i, viewport, true);
                    self.frame.stats.recycled += 1;
                } else {
                    self.frame.stats.landed += 1;
                }
                continue;
            }

            self.pool.advance_slot(i, viewport);
            let pos = self.pool.particles()[i].pos;

            if pos.y > viewport.height {
                self.pool.recycle(i, viewport, false);
                self.frame.stats.recycled += 1;
                continue;
            }

            if let Some(landing) = resolve_landing(pos, &self.surfaces, &bands) {
                let jitter = match landing {
                    Landing::Flat { .. } => self.pool.landing_jitter(),
                    Landing::Curved { .. } => 0.0,
                };
                self.pool.particles_mut()[i].land(landing.rest_y(jitter));
                self.frame.stats.new_landings += 1;
                self.frame.stats.landed += 1;
                continue;
            }

            let flake = &self.pool.particles()[i];
            self.frame.commands.push(DrawCommand::Glyph {
                pos: flake.pos,
                rotation: flake.rotation,
                scale: flake.scale,
                alpha: flake.alpha,
            });
            self.frame.stats.falling += 1;
        }

        self.frame_count += 1;
        if self.frame_count % 600 == 0 {
            let stats = self.frame.stats;
            log::debug!(
                "Frame {}: {} falling, {} landed, {} recycled, {} surfaces",
                self.frame_count,
                stats.falling,
                stats.landed,
                stats.recycled,
                stats.surfaces
            );
        }

        &self.frame
    }
}
