//! Desktop host: a winit window with a glutin GLES 3.0 context (OpenGL 3.3
//! core as fallback), redrawing continuously.

use std::num::NonZeroU32;
use std::rc::Rc;

use anyhow::{Context, Result};
use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{Display, GetGlDisplay};
use glutin::prelude::*;
use glutin::surface::{Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use confetti_engine::device::{Drawable, Error as EngineError};
use confetti_engine::shader::GlslDialect;
use confetti_engine::sim::{Engine, SimulationConfig};

/// Window and simulation settings of the desktop host.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub simulation: SimulationConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            title: "confetti".to_string(),
            initial_size: LogicalSize::new(1280.0, 800.0),
            simulation: SimulationConfig::default(),
        }
    }
}

/// The window's GL surface as seen by the engine.
///
/// Field order is drop order: the surface and context go before the window.
pub struct NativeSurface {
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    window: Window,
    backing: (u32, u32),
}

impl NativeSurface {
    fn present(&self) -> Result<()> {
        self.surface
            .swap_buffers(&self.context)
            .context("failed to swap buffers")
    }
}

impl Drawable for NativeSurface {
    fn display_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn backing_size(&self) -> (u32, u32) {
        self.backing
    }

    fn set_backing_size(&mut self, width: u32, height: u32) {
        // Minimized windows report zero; the surface keeps its last size.
        if let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
            self.surface.resize(&self.context, w, h);
        }
        self.backing = (width, height);
    }
}

type NativeEngine = Engine<glow::Context, NativeSurface>;

/// Opens the window and runs the simulation until it is closed.
pub fn run(config: HostConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    let mut state = HostState {
        config,
        engine: None,
        startup_error: None,
    };

    event_loop
        .run_app(&mut state)
        .context("winit event loop terminated with error")?;

    match state.startup_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct HostState {
    config: HostConfig,
    engine: Option<NativeEngine>,
    startup_error: Option<anyhow::Error>,
}

impl ApplicationHandler for HostState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.engine.is_some() {
            return;
        }

        match start(event_loop, &self.config) {
            Ok(engine) => {
                engine.drawable().window.request_redraw();
                self.engine = Some(engine);
            }
            Err(e) => {
                log::error!("failed to start confetti: {e:#}");
                self.startup_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        if let Some(engine) = &self.engine {
            engine.drawable().window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.engine = None;
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let Some(engine) = self.engine.as_mut() else {
                    return;
                };
                engine.frame();
                if let Err(e) = engine.drawable().present() {
                    log::error!("{e:#}");
                }
            }
            _ => {}
        }
    }
}

fn start(event_loop: &ActiveEventLoop, config: &HostConfig) -> Result<NativeEngine> {
    let attributes = Window::default_attributes()
        .with_title(config.title.clone())
        .with_inner_size(config.initial_size);

    let template = ConfigTemplateBuilder::new().with_alpha_size(8);
    let (window, gl_config) = DisplayBuilder::new()
        .with_window_attributes(Some(attributes.clone()))
        .build(event_loop, template, most_samples)
        .map_err(|e| EngineError::ContextUnavailable(e.to_string()))?;

    let raw_handle = window
        .as_ref()
        .and_then(|w| w.window_handle().ok())
        .map(|h| h.as_raw());
    let display = gl_config.display();
    let (context, dialect) = create_context(&display, &gl_config, raw_handle)?;

    let window = match window {
        Some(window) => window,
        None => glutin_winit::finalize_window(event_loop, attributes, &gl_config)
            .context("failed to create window")?,
    };

    let surface_attributes = window
        .build_surface_attributes(Default::default())
        .context("window has no usable handle")?;
    let surface = unsafe { display.create_window_surface(&gl_config, &surface_attributes) }
        .context("failed to create window surface")?;
    let context = context
        .make_current(&surface)
        .context("failed to make GL context current")?;

    if let Err(e) = surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN)) {
        log::warn!("vsync unavailable: {e}");
    }

    let gl = unsafe { glow::Context::from_loader_function_cstr(|name| display.get_proc_address(name)) };

    let size = window.inner_size();
    let drawable = NativeSurface {
        surface,
        context,
        window,
        backing: (size.width, size.height),
    };

    log::info!("GL context ready ({dialect:?}), {}x{}", size.width, size.height);

    Engine::with_dialect(Rc::new(gl), drawable, config.simulation.clone(), dialect)
        .context("failed to build confetti engine")
}

/// Prefers the most multisampled configuration.
fn most_samples(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|best, c| if c.num_samples() > best.num_samples() { c } else { best })
        .expect("display offered no GL configurations")
}

/// GLES 3.0 first; desktop OpenGL 3.3 core otherwise.
fn create_context(
    display: &Display,
    config: &Config,
    window: Option<RawWindowHandle>,
) -> Result<(NotCurrentContext, GlslDialect)> {
    let gles = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::Gles(Some(Version::new(3, 0))))
        .build(window);

    match unsafe { display.create_context(config, &gles) } {
        Ok(context) => Ok((context, GlslDialect::Es300)),
        Err(e) => {
            log::info!("GLES 3.0 unavailable ({e}); trying OpenGL 3.3 core");
            let core = ContextAttributesBuilder::new()
                .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
                .with_profile(GlProfile::Core)
                .build(window);
            let context = unsafe { display.create_context(config, &core) }
                .map_err(|e| EngineError::ContextUnavailable(format!("no GLES 3.0 or GL 3.3: {e}")))?;
            Ok((context, GlslDialect::Core330))
        }
    }
}
