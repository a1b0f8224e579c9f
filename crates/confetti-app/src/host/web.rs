//! Browser host: a full-viewport canvas with a WebGL2 context, driven by
//! `requestAnimationFrame`.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, WebGl2RenderingContext};

use confetti_engine::device::{Drawable, Error as EngineError};
use confetti_engine::logging::{init_logging, LoggingConfig};
use confetti_engine::sim::{Engine, SimulationConfig};

type WebEngine = Engine<glow::Context, WebSurface>;

/// The page's canvas as seen by the engine: its CSS box is the display size,
/// its `width`/`height` attributes the drawing buffer.
pub struct WebSurface {
    canvas: HtmlCanvasElement,
}

impl Drawable for WebSurface {
    fn display_size(&self) -> (u32, u32) {
        let w = self.canvas.client_width().max(0) as u32;
        let h = self.canvas.client_height().max(0) as u32;
        (w, h)
    }

    fn backing_size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn set_backing_size(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }
}

fn js_error(what: &'static str) -> impl Fn(JsValue) -> anyhow::Error {
    move |value| anyhow!("{what}: {value:?}")
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    init_logging(LoggingConfig::default());

    if let Err(e) = launch() {
        log::error!("confetti failed to start: {e:#}");
    }
    Ok(())
}

fn launch() -> Result<()> {
    let window = web_sys::window().ok_or_else(|| anyhow!("no global window"))?;
    let document = window.document().ok_or_else(|| anyhow!("no document"))?;

    let id = format!("_{}", window.crypto().map_err(js_error("crypto"))?.random_uuid());
    let canvas = spawn_canvas(&document, &id)?;
    let webgl = webgl2_context(&canvas)?;
    let gl = glow::Context::from_webgl2_context(webgl);

    let mut config = SimulationConfig::default();
    if let Some(side) = side_from_query(&window) {
        config.side = side;
    }

    let engine = Engine::new(Rc::new(gl), WebSurface { canvas }, config)
        .context("failed to build confetti engine")?;
    log::info!("canvas #{id} running {} particles", engine.instance_count());

    drive(engine)
}

/// Appends a canvas pinned over the whole viewport to `<body>`.
fn spawn_canvas(document: &Document, id: &str) -> Result<HtmlCanvasElement> {
    let style = document
        .create_element("style")
        .map_err(js_error("create <style>"))?;
    style.set_text_content(Some(&format!(
        "#{id} {{ position: fixed; inset: 0; width: 100%; height: 100%; }}"
    )));
    document
        .head()
        .ok_or_else(|| anyhow!("document has no <head>"))?
        .append_child(&style)
        .map_err(js_error("append <style>"))?;

    let canvas = document
        .create_element("canvas")
        .map_err(js_error("create <canvas>"))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| anyhow!("<canvas> is not an HtmlCanvasElement"))?;
    canvas.set_id(id);

    document
        .body()
        .ok_or_else(|| anyhow!("document has no <body>"))?
        .append_child(&canvas)
        .map_err(js_error("append <canvas>"))?;

    Ok(canvas)
}

fn webgl2_context(canvas: &HtmlCanvasElement) -> Result<WebGl2RenderingContext> {
    let options = js_sys::Object::new();
    js_sys::Reflect::set(&options, &"antialias".into(), &true.into())
        .map_err(js_error("context options"))?;

    let context = canvas
        .get_context_with_context_options("webgl2", &options)
        .map_err(js_error("getContext"))?
        .ok_or_else(|| EngineError::ContextUnavailable("browser has no WebGL2".into()))?;

    context
        .dyn_into::<WebGl2RenderingContext>()
        .map_err(|_| EngineError::ContextUnavailable("webgl2 context has an unexpected type".into()).into())
}

/// `?side=<n>` overrides the grid side length.
fn side_from_query(window: &web_sys::Window) -> Option<u32> {
    let search = window.location().search().ok()?;
    let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
    let raw = params.get("side")?;
    match raw.parse() {
        Ok(side) => Some(side),
        Err(_) => {
            log::warn!("ignoring ?side={raw}: not a whole number");
            None
        }
    }
}

/// Runs `frame` on every animation frame for as long as the page lives.
fn drive(mut engine: WebEngine) -> Result<()> {
    let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let reschedule = callback.clone();

    *callback.borrow_mut() = Some(Closure::new(move || {
        engine.frame();

        let next = reschedule.borrow();
        let Some(next) = next.as_ref() else { return };
        let scheduled = web_sys::window()
            .map(|w| w.request_animation_frame(next.as_ref().unchecked_ref()));
        if !matches!(scheduled, Some(Ok(_))) {
            log::error!("requestAnimationFrame failed; stopping");
        }
    }));

    let window = web_sys::window().ok_or_else(|| anyhow!("no global window"))?;
    let first = callback.borrow();
    let first = first.as_ref().ok_or_else(|| anyhow!("frame callback missing"))?;
    window
        .request_animation_frame(first.as_ref().unchecked_ref())
        .map_err(js_error("requestAnimationFrame"))?;

    Ok(())
}
