//! Overlay lifecycle
//!
//! Ties a [`Simulator`] to a [`Painter`] and owns the start/stop/resize
//! transitions. Nothing here knows about the browser: the host supplies the
//! drawing surface through an acquire callback and calls [`SnowOverlay::frame`]
//! once per display refresh.
//!
//! Failures never surface to the page. If the surface can't be acquired the
//! overlay logs a warning and stays inert.

use crate::renderer::{Painter, SpriteCache, paint_frame};
use crate::settings::Settings;
use crate::sim::{FrameStats, Simulator, SurfaceProvider};
use crate::{OverlayError, Viewport};

/// A running simulation and the surface it paints on
#[derive(Debug)]
struct Session<P> {
    sim: Simulator,
    painter: P,
}

/// Snowfall overlay for one drawing surface
#[derive(Debug)]
pub struct SnowOverlay<P: Painter> {
    settings: Settings,
    seed: u64,
    /// Sessions started so far; mixed into the seed so restarts differ
    starts: u64,
    session: Option<Session<P>>,
}

impl<P: Painter> SnowOverlay<P> {
    /// Create an idle overlay. `fallback_seed` is used when the settings carry none.
    pub fn new(settings: Settings, fallback_seed: u64) -> Self {
        let seed = settings.seed_or(fallback_seed);
        Self {
            settings,
            seed,
            starts: 0,
            session: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    pub fn simulator(&self) -> Option<&Simulator> {
        self.session.as_ref().map(|s| &s.sim)
    }

    pub fn painter(&self) -> Option<&P> {
        self.session.as_ref().map(|s| &s.painter)
    }

    /// Start snowing if enabled and not already running
    ///
    /// `acquire` receives the freshly rendered sprite cache and the viewport
    /// and returns the painter to draw on. Returns whether the overlay is
    /// running afterwards.
    pub fn start<F>(&mut self, viewport: Viewport, acquire: F) -> bool
    where
        F: FnOnce(&SpriteCache, Viewport) -> Result<P, OverlayError>,
    {
        if self.session.is_some() {
            return true;
        }
        if !self.settings.effective_snow() {
            log::info!(
                "Snow overlay idle (enabled: {}, reduced motion: {})",
                self.settings.snow_enabled,
                self.settings.reduced_motion
            );
            return false;
        }
        if let Err(e) = self.settings.snow.validate() {
            log::warn!("Snow overlay disabled: {}", e);
            return false;
        }

        let sprite = SpriteCache::render(self.settings.snow.sprite_size);
        let painter = match acquire(&sprite, viewport) {
            Ok(painter) => painter,
            Err(e) => {
                log::warn!("Snow overlay disabled: {}", e);
                return false;
            }
        };

        let seed = self.seed.wrapping_add(self.starts);
        self.starts += 1;
        let sim = Simulator::new(self.settings.snow.clone(), viewport, seed);
        self.session = Some(Session { sim, painter });
        true
    }

    /// Tear down the running session, releasing the painter
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            log::info!(
                "Snow overlay stopped after {} frames",
                session.sim.frame_count()
            );
        }
    }

    /// Flip the snow toggle
    ///
    /// Disabling tears the session down immediately; enabling takes effect on
    /// the next [`start`](Self::start).
    pub fn set_enabled(&mut self, enabled: bool) {
        self.settings.snow_enabled = enabled;
        if !enabled {
            self.stop();
        }
    }

    /// Adopt new viewport bounds; the flake count stays as started
    pub fn resize(&mut self, viewport: Viewport) {
        if let Some(session) = self.session.as_mut() {
            session.sim.resize(viewport);
            session.painter.resize(viewport);
        }
    }

    /// Advance one frame and paint it. `None` while inert.
    pub fn frame<S: SurfaceProvider + ?Sized>(&mut self, surfaces: &S) -> Option<FrameStats> {
        let session = self.session.as_mut()?;
        let frame = session.sim.tick(surfaces);
        paint_frame(&mut session.painter, frame);
        Some(frame.stats)
    }
}
