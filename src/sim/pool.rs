//! Fixed-size flake pool
//!
//! The pool never grows or shrinks after construction. Spent flakes are
//! replaced in their slot by freshly randomized ones.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::config::{SimConfig, Span};
use super::particle::{FlakeState, Particle};
use crate::{Viewport, wrap_horizontal};

/// Draw a value from `[span.min, span.max)`; a zero-width span yields `min`
#[inline]
pub(crate) fn sample(rng: &mut Pcg32, span: Span) -> f32 {
    let v = span.min + rng.random::<f32>() * (span.max - span.min);
    // Rounding can land exactly on max for narrow spans
    if v < span.max { v } else { span.min }
}

/// Owner of every flake in the simulation
#[derive(Debug, Clone)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    /// Slot count, fixed at construction
    size: usize,
    config: SimConfig,
    rng: Pcg32,
}

impl ParticlePool {
    /// Fill a pool sized for `viewport`, with flakes spread over the full height
    pub fn new(config: SimConfig, viewport: Viewport, seed: u64) -> Self {
        let count = config.flake_count(viewport);
        let mut pool = Self {
            particles: Vec::with_capacity(count),
            size: count,
            config,
            rng: Pcg32::seed_from_u64(seed),
        };
        for _ in 0..count {
            let flake = pool.create(viewport, true);
            pool.particles.push(flake);
        }
        log::debug!("Flake pool filled with {} flakes", count);
        pool
    }

    /// Create a fresh falling flake
    ///
    /// With `randomize_start_height` the flake starts anywhere in the viewport
    /// (initial fill); otherwise it starts just above the visible area.
    pub fn create(&mut self, viewport: Viewport, randomize_start_height: bool) -> Particle {
        let config = &self.config;
        let rng = &mut self.rng;
        let size = self.size as f32;

        let x = sample(rng, Span::new(0.0, viewport.width));
        let y = if randomize_start_height {
            sample(rng, Span::new(0.0, viewport.height))
        } else {
            config.spawn_height
        };

        Particle {
            pos: Vec2::new(x, y),
            vel: Vec2::new(sample(rng, config.drift), sample(rng, config.fall_speed)),
            scale: sample(rng, config.scale),
            phase: rng.random::<f32>() * size,
            sway_offset: sample(rng, config.sway_offset),
            rotation: rng.random::<f32>() * std::f32::consts::TAU,
            rotation_speed: sample(
                rng,
                Span::new(-config.max_rotation_speed, config.max_rotation_speed),
            ),
            alpha: sample(rng, config.alpha),
            melt_rate: sample(rng, config.melt_rate),
            state: FlakeState::Falling,
        }
    }

    /// Advance a flake by one frame
    ///
    /// Falling flakes sway, drift, fall, spin and wrap horizontally.
    /// Landed flakes stay put and melt.
    pub fn advance(&self, particle: &mut Particle, viewport: Viewport) {
        step(particle, &self.config, viewport);
    }

    /// Replace the flake in `index` with a new one
    pub fn recycle(&mut self, index: usize, viewport: Viewport, randomize_start_height: bool) {
        let fresh = self.create(viewport, randomize_start_height);
        self.particles[index] = fresh;
    }

    /// Random landing jitter for flat surfaces
    pub fn landing_jitter(&mut self) -> f32 {
        let jitter = self.config.landing.jitter;
        sample(&mut self.rng, Span::new(-jitter, jitter))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable slot access; the slot count itself can't change
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Advance the flake in `index` in place
    pub(crate) fn advance_slot(&mut self, index: usize, viewport: Viewport) {
        step(&mut self.particles[index], &self.config, viewport);
    }
}

fn step(particle: &mut Particle, config: &SimConfig, viewport: Viewport) {
    match particle.state {
        FlakeState::Falling => {
            particle.pos.x += particle.sway(config.sway_amplitude) + particle.vel.x;
            particle.pos.y += particle.vel.y;
            particle.rotation += particle.rotation_speed;
            particle.pos.x = wrap_horizontal(particle.pos.x, viewport.width, config.wrap_margin);
        }
        FlakeState::Landed => {
            particle.alpha -= particle.melt_rate;
        }
    }
}
