//! Snow Overlay entry point
//!
//! On the web this mounts the overlay and the background field on the page
//! canvases and wires the snow toggle. Natively it runs the simulation
//! headless against a fixed page layout and logs what happened.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlInputElement;

    use snow_overlay::platform::web::{WebParticleField, WebSnowOverlay, init_logging};

    const SNOW_CANVAS_ID: &str = "snow-overlay";
    const FIELD_CANVAS_ID: &str = "field-canvas";
    const TOGGLE_ID: &str = "snow-toggle";
    /// Optional `<script type="application/json">` with settings
    const SETTINGS_ID: &str = "snow-settings";

    /// Everything mounted on the page
    struct App {
        _snow: Option<Rc<RefCell<WebSnowOverlay>>>,
        _field: Option<WebParticleField>,
    }

    thread_local! {
        static APP: RefCell<Option<App>> = const { RefCell::new(None) };
    }

    fn settings_json(document: &web_sys::Document) -> String {
        document
            .get_element_by_id(SETTINGS_ID)
            .and_then(|el| el.text_content())
            .unwrap_or_default()
    }

    pub fn run() {
        init_logging();
        log::info!("Snow overlay starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::warn!("No document; nothing to mount");
            return;
        };
        let json = settings_json(&document);

        // Each layer mounts on its own; one failing leaves the other running
        let snow = match WebSnowOverlay::new(SNOW_CANVAS_ID, &json) {
            Ok(snow) => Some(Rc::new(RefCell::new(snow))),
            Err(e) => {
                log::warn!("Snow overlay not mounted: {:?}", e);
                None
            }
        };
        let field = match WebParticleField::new(FIELD_CANVAS_ID, &json) {
            Ok(field) => Some(field),
            Err(e) => {
                log::warn!("Particle field not mounted: {:?}", e);
                None
            }
        };

        if let Some(snow) = &snow {
            setup_toggle(&document, snow.clone());
        }

        APP.with(|app| {
            *app.borrow_mut() = Some(App {
                _snow: snow,
                _field: field,
            });
        });
        log::info!("Snow overlay running!");
    }

    fn setup_toggle(document: &web_sys::Document, snow: Rc<RefCell<WebSnowOverlay>>) {
        let Some(toggle) = document
            .get_element_by_id(TOGGLE_ID)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        toggle.set_checked(snow.borrow().is_running());

        let input = toggle.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            snow.borrow_mut().set_enabled(input.checked());
        });
        let _ = toggle.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    web_app::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Snow overlay (native) starting...");
    log::info!("Native mode runs headless - serve the wasm build for the page overlay");

    let settings = match std::env::args().nth(1) {
        Some(path) => match load_settings(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("Failed to load settings from {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => snow_overlay::Settings::default(),
    };

    headless::run(settings, 1800);
}

#[cfg(not(target_arch = "wasm32"))]
fn load_settings(path: &str) -> Result<snow_overlay::Settings, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    Ok(snow_overlay::Settings::from_json(&json)?)
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use snow_overlay::field::ParticleField;
    use snow_overlay::renderer::PixelCanvas;
    use snow_overlay::sim::{Rect, StaticSurfaces};
    use snow_overlay::{Settings, SnowOverlay, Viewport};

    /// A desktop page: arched header over two rows of cards
    fn page_layout() -> StaticSurfaces {
        StaticSurfaces::new(
            vec![
                Rect::from_left_width(160.0, 440.0, 320.0),
                Rect::from_left_width(680.0, 440.0, 320.0),
                Rect::from_left_width(160.0, 960.0, 620.0),
            ],
            Some(Rect::from_left_width(240.0, 800.0, 60.0)),
        )
    }

    pub fn run(settings: Settings, frames: u64) {
        let viewport = Viewport::new(1280.0, 800.0);
        let surfaces = page_layout();
        let field_settings = settings.field.clone();
        let seed = settings.seed_or(0x5EED);

        let mut overlay = SnowOverlay::new(settings, seed);
        let started = overlay.start(viewport, |sprite, viewport| {
            Ok(PixelCanvas::new(viewport).with_sprite(sprite.clone()))
        });
        if started {
            simulate_snow(&mut overlay, &surfaces, frames);
        } else {
            log::info!("Snow disabled by settings");
        }

        if overlay.settings().effective_field() {
            let mut field = ParticleField::new(field_settings, seed);
            let mut canvas = PixelCanvas::new(viewport);
            for _ in 0..frames {
                field.step();
            }
            field.paint(&mut canvas, viewport);
            log::info!(
                "Particle field: {} points, {} pixels lit",
                field.len(),
                canvas.covered_pixels()
            );
        }
        overlay.stop();
    }

    fn simulate_snow(overlay: &mut SnowOverlay<PixelCanvas>, surfaces: &StaticSurfaces, frames: u64) {
        let mut new_landings = 0;
        let mut recycled = 0;
        for frame in 1..=frames {
            let Some(stats) = overlay.frame(surfaces) else {
                break;
            };
            new_landings += stats.new_landings;
            recycled += stats.recycled;
            if frame % 60 == 0 {
                log::info!(
                    "Frame {}: {} falling, {} landed",
                    frame,
                    stats.falling,
                    stats.landed
                );
            }
        }

        if let Some(canvas) = overlay.painter() {
            log::info!(
                "After {} frames: {} landings, {} recycled, {} pixels covered",
                frames,
                new_landings,
                recycled,
                canvas.covered_pixels()
            );
        }
    }
}
