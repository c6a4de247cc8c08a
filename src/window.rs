//! The winit application driving the effect in a window.

use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow},
    window::{Window, WindowId},
};

use crate::animation::{CancelHandle, ResizeDebouncer};
use crate::canvas::Canvas;
use crate::engine::Dissipation;
use crate::error::DissipationError;
use crate::gpu::GpuState;
use crate::input::PointerInput;
use crate::source::ImageSource;
use crate::time::Clock;

/// Initial window size in logical pixels.
pub const WINDOW_WIDTH: u32 = 1280;
pub const WINDOW_HEIGHT: u32 = 720;

pub(crate) struct App {
    title: String,
    source: ImageSource,
    effect: Dissipation,
    input: PointerInput,
    clock: Clock,
    resize: ResizeDebouncer,
    cancel: CancelHandle,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    /// Last title pushed to the window, to avoid redundant updates.
    shown_title: String,
    /// First fatal error; returned from the runner after the loop exits.
    fatal: Option<DissipationError>,
}

impl App {
    pub(crate) fn new(title: String, source: ImageSource, effect: Dissipation) -> Self {
        let input = PointerInput::new(effect.target(), effect.viewport().x);
        let clock = Clock::new(effect.config().motion.time_scale);
        let resize = ResizeDebouncer::new(effect.config().resize_debounce());
        let cancel = effect.cancel_handle();
        Self {
            title,
            source,
            effect,
            input,
            clock,
            resize,
            cancel,
            window: None,
            gpu_state: None,
            shown_title: String::new(),
            fatal: None,
        }
    }

    pub(crate) fn take_error(&mut self) -> Option<DissipationError> {
        self.fatal.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: DissipationError) {
        log::error!("{}", error);
        self.fatal.get_or_insert(error);
        self.cancel.cancel();
        event_loop.exit();
    }

    fn window_title(&self) -> String {
        match self.effect.overlay_text() {
            Some(text) => format!("{} - {}", self.title, text),
            None => self.title.clone(),
        }
    }

    fn refresh_title(&mut self) {
        let title = self.window_title();
        if title != self.shown_title {
            if let Some(window) = &self.window {
                window.set_title(&title);
            }
            self.shown_title = title;
        }
    }

    /// Reconfigure the surface now and rebuild the field unless deferred.
    fn on_resized(&mut self, size: PhysicalSize<u32>) {
        let plan = self.resize.resized((size.width, size.height), Instant::now());
        if let Some(gpu_state) = &mut self.gpu_state {
            let (width, height) = plan.surface;
            gpu_state.resize(width, height);
        }
        if let Some((width, height)) = plan.rebuild {
            self.effect.resize(width, height);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu_state) = &mut self.gpu_state else {
            log::warn!("redraw requested without a render context");
            return;
        };

        self.clock.update();
        let running = self.effect.frame(self.clock.noise_time(), gpu_state).is_some();
        if !running {
            // Still show the background behind the status title
            gpu_state.clear();
        }

        match gpu_state.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                gpu_state.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                self.cancel.cancel();
                event_loop.exit();
                return;
            }
            Err(e) => log::warn!("render error: {:?}", e),
        }

        if running && !self.cancel.is_cancelled() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(self.window_title())
            .with_inner_size(winit::dpi::LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };
        let background = self.effect.config().appearance.background_rgba();
        let gpu_state = match pollster::block_on(GpuState::new(window.clone(), background)) {
            Ok(gpu_state) => gpu_state,
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let PhysicalSize { width, height } = window.inner_size();
        self.window = Some(window);
        self.gpu_state = Some(gpu_state);
        self.input.set_viewport_width(width);
        self.effect.resize(width, height);

        log::info!("loading {}", self.source.describe());
        self.effect.on_image_loaded(self.source.load());
        self.refresh_title();

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                self.cancel.cancel();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.on_resized(size);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }

        self.refresh_title();
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some((width, height)) = self.resize.poll(Instant::now()) {
            self.effect.resize(width, height);
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
        match self.resize.deadline() {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}
