//! Window harness driving one world.
//!
//! Owns the winit event loop plumbing: window creation, async GPU setup
//! (blocking on a tokio runtime natively, `spawn_local` plus a user-event
//! proxy on wasm) and the redraw-to-pump translation. Everything scene
//! related stays inside [`WorldRuntime`].

use std::sync::Arc;

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    lifecycle::{FrameRequest, FrameScheduler, MountPoint, World, WorldRuntime},
    renderer::GpuRenderer,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Mount point backed by a winit window.
pub struct WindowMount {
    window: Arc<Window>,
}

impl MountPoint for WindowMount {
    fn is_attached(&self) -> bool {
        // winit keeps the window alive as long as we hold it
        true
    }

    fn logical_size(&self) -> (u32, u32) {
        let size: winit::dpi::LogicalSize<f64> =
            self.window.inner_size().to_logical(self.window.scale_factor());
        (size.width as u32, size.height as u32)
    }

    fn pixel_ratio(&self) -> f64 {
        self.window.scale_factor()
    }
}

/// Scheduler backed by `request_redraw`.
pub struct RedrawScheduler {
    window: Arc<Window>,
    next_id: u64,
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.window.request_redraw();
        self.next_id += 1;
        FrameRequest(self.next_id)
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        // a requested redraw cannot be revoked from winit; the runtime is
        // already out of the animating phase and ignores the callback
        log::debug!("frame request {} cancelled", request.0);
    }
}

type Runtime<W> = WorldRuntime<W, GpuRenderer, RedrawScheduler, WindowMount>;

pub(crate) enum AppEvent {
    #[allow(dead_code)]
    RendererReady(Arc<Window>, anyhow::Result<GpuRenderer>),
}

pub struct App<W: World> {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: EventLoopProxy<AppEvent>,
    world: Option<W>,
    runtime: Option<Runtime<W>>,
    origin: Instant,
    init_error: Option<anyhow::Error>,
}

impl<W: World> App<W> {
    fn new(event_loop: &EventLoop<AppEvent>, world: W) -> anyhow::Result<Self> {
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy: event_loop.create_proxy(),
            world: Some(world),
            runtime: None,
            origin: Instant::now(),
            init_error: None,
        })
    }

    fn start_runtime(&mut self, window: Arc<Window>, renderer: GpuRenderer) {
        let Some(world) = self.world.take() else {
            return;
        };
        let mount = WindowMount {
            window: window.clone(),
        };
        let scheduler = RedrawScheduler { window, next_id: 0 };
        self.runtime = WorldRuntime::start(world, renderer, scheduler, mount);
        if self.runtime.is_none() {
            log::warn!("world was not started");
        }
    }
}

impl<W: World> ApplicationHandler<AppEvent> for App<W> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.runtime.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes();

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.init_error = Some(e.into());
                event_loop.exit();
                return;
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            let renderer = self
                .async_runtime
                .block_on(GpuRenderer::new(window.clone()));
            match renderer {
                Ok(renderer) => self.start_runtime(window, renderer),
                Err(e) => {
                    self.init_error = Some(e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let renderer = GpuRenderer::new(window.clone()).await;
                assert!(
                    proxy
                        .send_event(AppEvent::RendererReady(window, renderer))
                        .is_ok()
                );
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::RendererReady(window, Ok(renderer)) => {
                self.start_runtime(window, renderer);
            }
            AppEvent::RendererReady(_, Err(e)) => {
                self.init_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(runtime) = &mut self.runtime {
                    runtime.dispose();
                }
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let Some(runtime) = &mut self.runtime else {
                    return;
                };
                let timestamp_ms = self.origin.elapsed().as_secs_f64() * 1000.0;
                if let Err(e) = runtime.pump(timestamp_ms) {
                    log::error!("unable to render: {}", e);
                }
            }
            _ => {}
        }
    }
}

/// Open a window and run `world` until the window closes.
pub fn run<W: World + 'static>(world: W) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<AppEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, world)?;
    event_loop.run_app(&mut app)?;

    match app.init_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
