//! Browser bindings
//!
//! DOM surface queries, a Canvas 2D painter, the animation-frame loop and
//! the `#[wasm_bindgen]` classes the page script talks to.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Once;

use glam::Vec2;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, ImageData, Window};

use crate::field::ParticleField;
use crate::renderer::{BlendMode, Painter, SpriteCache};
use crate::settings::Settings;
use crate::sim::{Rect, SurfaceProvider};
use crate::{OverlayError, SnowOverlay, Viewport};

/// Elements flakes settle on
pub const FLAT_SELECTOR: &str = ".prompt-box, .image-card";
/// The arched header
pub const CURVED_SELECTOR: &str = ".arched-header";

fn js_error(err: JsValue) -> OverlayError {
    OverlayError::Js(format!("{:?}", err))
}

fn window() -> Result<Window, OverlayError> {
    web_sys::window().ok_or(OverlayError::NoWindow)
}

fn document() -> Result<Document, OverlayError> {
    window()?.document().ok_or(OverlayError::NoWindow)
}

/// Current window size in CSS pixels
pub fn window_viewport() -> Result<Viewport, OverlayError> {
    let window = window()?;
    let width = window.inner_width().map_err(js_error)?.as_f64().unwrap_or(0.0);
    let height = window.inner_height().map_err(js_error)?.as_f64().unwrap_or(0.0);
    Ok(Viewport::new(width as f32, height as f32))
}

/// Look up a canvas element by id
pub fn canvas_by_id(id: &str) -> Result<HtmlCanvasElement, OverlayError> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| OverlayError::CanvasNotFound(id.to_string()))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| OverlayError::NotACanvas(id.to_string()))
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, OverlayError> {
    canvas
        .get_context("2d")
        .map_err(js_error)?
        .ok_or(OverlayError::ContextUnavailable)?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| OverlayError::ContextUnavailable)
}

fn element_rect(element: &Element) -> Rect {
    let bounds = element.get_bounding_client_rect();
    Rect::from_left_width(bounds.left() as f32, bounds.width() as f32, bounds.top() as f32)
}

/// Live page geometry, re-queried every frame
#[derive(Debug, Clone)]
pub struct DomSurfaces {
    document: Document,
}

impl DomSurfaces {
    pub fn new() -> Result<Self, OverlayError> {
        Ok(Self {
            document: document()?,
        })
    }
}

impl SurfaceProvider for DomSurfaces {
    fn flat_surfaces(&self) -> Vec<Rect> {
        let Ok(nodes) = self.document.query_selector_all(FLAT_SELECTOR) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| element_rect(&element))
            .collect()
    }

    fn curved_surface(&self) -> Option<Rect> {
        self.document
            .query_selector(CURVED_SELECTOR)
            .ok()
            .flatten()
            .map(|element| element_rect(&element))
    }
}

/// [`Painter`] backed by a `<canvas>` 2D context
pub struct Canvas2dPainter {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    /// Offscreen canvas holding the crystal sprite
    sprite: Option<HtmlCanvasElement>,
    viewport: Viewport,
}

impl Canvas2dPainter {
    pub fn new(canvas: HtmlCanvasElement, viewport: Viewport) -> Result<Self, OverlayError> {
        let ctx = context_2d(&canvas)?;
        let mut painter = Self {
            canvas,
            ctx,
            sprite: None,
            viewport,
        };
        painter.resize(viewport);
        Ok(painter)
    }

    pub fn from_id(id: &str, viewport: Viewport) -> Result<Self, OverlayError> {
        Self::new(canvas_by_id(id)?, viewport)
    }

    /// Upload the sprite cache into an offscreen canvas for `draw_glyph`
    pub fn with_sprite(mut self, sprite: &SpriteCache) -> Result<Self, OverlayError> {
        let offscreen = document()?
            .create_element("canvas")
            .map_err(js_error)?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| OverlayError::NotACanvas("sprite".to_string()))?;
        offscreen.set_width(sprite.size());
        offscreen.set_height(sprite.size());

        let image = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(sprite.as_bytes()),
            sprite.size(),
            sprite.size(),
        )
        .map_err(js_error)?;
        context_2d(&offscreen)?
            .put_image_data(&image, 0.0, 0.0)
            .map_err(js_error)?;

        self.sprite = Some(offscreen);
        Ok(self)
    }
}

impl Painter for Canvas2dPainter {
    fn resize(&mut self, viewport: Viewport) {
        let (width, height) = viewport.pixel_size();
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.viewport = viewport;
    }

    fn clear(&mut self) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.viewport.width as f64,
            self.viewport.height as f64,
        );
    }

    fn set_blend(&mut self, blend: BlendMode) {
        let op = match blend {
            BlendMode::SourceOver => "source-over",
            BlendMode::Additive => "lighter",
        };
        let _ = self.ctx.set_global_composite_operation(op);
    }

    fn draw_glyph(&mut self, pos: Vec2, rotation: f32, scale: f32, alpha: f32) {
        let Some(sprite) = self.sprite.as_ref() else {
            return;
        };
        let half = sprite.width() as f64 / 2.0;
        let ctx = &self.ctx;
        ctx.save();
        let _ = ctx.translate(pos.x as f64, pos.y as f64);
        let _ = ctx.rotate(rotation as f64);
        let _ = ctx.scale(scale as f64, scale as f64);
        ctx.set_global_alpha(alpha as f64);
        let _ = ctx.draw_image_with_html_canvas_element(sprite, -half, -half);
        ctx.restore();
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: [u8; 3], alpha: f32) {
        let ctx = &self.ctx;
        ctx.begin_path();
        ctx.set_fill_style_str(&format!(
            "rgba({}, {}, {}, {})",
            color[0], color[1], color[2], alpha
        ));
        let _ = ctx.ellipse(
            center.x as f64,
            center.y as f64,
            radii.x as f64,
            radii.y as f64,
            0.0,
            0.0,
            std::f64::consts::TAU,
        );
        ctx.fill();
    }
}

impl Drop for Canvas2dPainter {
    fn drop(&mut self) {
        // Leave nothing behind on the page canvas
        self.clear();
    }
}

/// Calls a step function once per animation frame until dropped
pub struct FrameLoop {
    handle: Rc<Cell<Option<i32>>>,
    callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
}

impl FrameLoop {
    pub fn start<F: FnMut() + 'static>(mut step: F) -> Result<Self, OverlayError> {
        let handle: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
        let callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));

        let next_handle = handle.clone();
        let next_callback = callback.clone();
        *callback.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |_time: f64| {
            step();
            // Re-arm unless stopped during `step`
            if let Some(cb) = next_callback.borrow().as_ref() {
                next_handle.set(request_frame(cb).ok());
            }
        }));

        let first = match callback.borrow().as_ref() {
            Some(cb) => request_frame(cb)?,
            None => return Err(OverlayError::Js("frame callback missing".to_string())),
        };
        handle.set(Some(first));
        Ok(Self { handle, callback })
    }

    pub fn stop(&self) {
        if let Some(id) = self.handle.take() {
            if let Ok(window) = window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
        // Breaks the closure's reference to itself
        self.callback.borrow_mut().take();
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn request_frame(cb: &Closure<dyn FnMut(f64)>) -> Result<i32, OverlayError> {
    window()?
        .request_animation_frame(cb.as_ref().unchecked_ref())
        .map_err(js_error)
}

/// `resize` listener on the window, removed when dropped
pub struct ResizeListener {
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

impl ResizeListener {
    pub fn new<F: FnMut(Viewport) + 'static>(mut on_resize: F) -> Result<Self, OverlayError> {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            match window_viewport() {
                Ok(viewport) => on_resize(viewport),
                Err(e) => log::warn!("Resize ignored: {}", e),
            }
        });
        window()?
            .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())
            .map_err(js_error)?;
        Ok(Self { closure })
    }
}

impl Drop for ResizeListener {
    fn drop(&mut self) {
        if let Ok(window) = window() {
            let _ = window
                .remove_event_listener_with_callback("resize", self.closure.as_ref().unchecked_ref());
        }
    }
}

static LOGGER: Once = Once::new();

/// Console logging and readable panics, once per page
pub fn init_logging() {
    LOGGER.call_once(|| {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }
    });
}

fn session_seed() -> u64 {
    js_sys::Date::now() as u64
}

/// Snowfall on a page canvas
#[wasm_bindgen]
pub struct WebSnowOverlay {
    canvas_id: String,
    overlay: Rc<RefCell<SnowOverlay<Canvas2dPainter>>>,
    frame_loop: Option<FrameLoop>,
    resize: Option<ResizeListener>,
}

#[wasm_bindgen]
impl WebSnowOverlay {
    /// Mount on the canvas with `canvas_id` and start if enabled
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, settings_json: &str) -> Result<WebSnowOverlay, JsValue> {
        init_logging();
        let settings =
            Settings::from_json(settings_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let mut mount = Self {
            canvas_id: canvas_id.to_string(),
            overlay: Rc::new(RefCell::new(SnowOverlay::new(settings, session_seed()))),
            frame_loop: None,
            resize: None,
        };
        mount.start();
        Ok(mount)
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.frame_loop.is_some()
    }

    /// Toggle snowfall. Disabling releases the canvas and the frame callback.
    #[wasm_bindgen(js_name = setEnabled)]
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled {
            self.overlay.borrow_mut().set_enabled(true);
            self.start();
        } else {
            self.stop();
            self.overlay.borrow_mut().set_enabled(false);
        }
    }

    /// Stop and release everything
    pub fn destroy(&mut self) {
        self.stop();
    }

    fn start(&mut self) {
        if self.frame_loop.is_some() {
            return;
        }
        if let Err(e) = self.try_start() {
            log::warn!("Snow overlay disabled: {}", e);
            self.stop();
        }
    }

    fn try_start(&mut self) -> Result<(), OverlayError> {
        let viewport = window_viewport()?;
        let canvas_id = self.canvas_id.clone();
        let started = self.overlay.borrow_mut().start(viewport, |sprite, viewport| {
            Canvas2dPainter::from_id(&canvas_id, viewport)?.with_sprite(sprite)
        });
        if !started {
            return Ok(());
        }

        let surfaces = DomSurfaces::new()?;
        let overlay = self.overlay.clone();
        self.frame_loop = Some(FrameLoop::start(move || {
            overlay.borrow_mut().frame(&surfaces);
        })?);

        let overlay = self.overlay.clone();
        self.resize = Some(ResizeListener::new(move |viewport| {
            overlay.borrow_mut().resize(viewport);
        })?);

        log::info!("Snow overlay mounted on #{}", self.canvas_id);
        Ok(())
    }

    fn stop(&mut self) {
        // Frame callback first so nothing paints after the painter is gone
        self.frame_loop = None;
        self.resize = None;
        self.overlay.borrow_mut().stop();
    }
}

impl Drop for WebSnowOverlay {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A running point cloud and its canvas
struct FieldSession {
    field: ParticleField,
    painter: Canvas2dPainter,
    viewport: Viewport,
}

/// Gold point cloud behind the page
#[wasm_bindgen]
pub struct WebParticleField {
    frame_loop: Option<FrameLoop>,
    resize: Option<ResizeListener>,
}

#[wasm_bindgen]
impl WebParticleField {
    /// Mount on the canvas with `canvas_id`. Stays inert when disabled or
    /// when the canvas can't be used.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, settings_json: &str) -> Result<WebParticleField, JsValue> {
        init_logging();
        let settings =
            Settings::from_json(settings_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        if !settings.effective_field() {
            log::info!("Particle field idle");
            return Ok(Self::inert());
        }
        match Self::mount(canvas_id, &settings) {
            Ok(field) => Ok(field),
            Err(e) => {
                log::warn!("Particle field disabled: {}", e);
                Ok(Self::inert())
            }
        }
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.frame_loop.is_some()
    }

    fn inert() -> Self {
        Self {
            frame_loop: None,
            resize: None,
        }
    }

    fn mount(canvas_id: &str, settings: &Settings) -> Result<Self, OverlayError> {
        let viewport = window_viewport()?;
        let painter = Canvas2dPainter::from_id(canvas_id, viewport)?;
        let field = ParticleField::new(settings.field.clone(), settings.seed_or(session_seed()));
        let session = Rc::new(RefCell::new(FieldSession {
            field,
            painter,
            viewport,
        }));

        let frame_session = session.clone();
        let frame_loop = FrameLoop::start(move || {
            let mut s = frame_session.borrow_mut();
            let FieldSession {
                field,
                painter,
                viewport,
            } = &mut *s;
            field.step();
            field.paint(painter, *viewport);
        })?;

        let resize = ResizeListener::new(move |viewport| {
            let mut s = session.borrow_mut();
            s.viewport = viewport;
            s.painter.resize(viewport);
        })?;

        log::info!("Particle field mounted on #{}", canvas_id);
        Ok(Self {
            frame_loop: Some(frame_loop),
            resize: Some(resize),
        })
    }
}
