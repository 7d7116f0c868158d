use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx};
use crate::device::{Gpu, GpuInit};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    /// Inner size in physical pixels.
    pub size: PhysicalSize<u32>,
    pub resizable: bool,
    /// Treat a press of Escape like the window's close button.
    pub close_on_escape: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "graph".to_string(),
            size: PhysicalSize::new(1280, 720),
            resizable: false,
            close_on_escape: true,
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, drives `app` until it exits, then tears everything
    /// down and hands the app back so callers can read its results.
    ///
    /// Errors from window/GPU creation, `App::on_start` and `App::on_frame`
    /// end the loop and are returned after teardown.
    pub fn run<A: App>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<A> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut state = RuntimeState::new(config, gpu_init, app);
        let outcome = event_loop.run_app(&mut state);

        // Covers event loops that return without an exit request.
        state.teardown();
        outcome.context("winit event loop terminated with error")?;

        if let Some(err) = state.fatal.take() {
            return Err(err);
        }
        Ok(state.app)
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// Where the app is between `on_start` and `on_teardown`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Lifecycle {
    Pending,
    Started,
    TornDown,
}

impl Lifecycle {
    /// Calls `on_teardown` if the app was started and has not been torn down.
    fn tear_down<A: App>(&mut self, app: &mut A) {
        if *self == Lifecycle::Started {
            app.on_teardown();
        }
        *self = Lifecycle::TornDown;
    }
}

/// A fresh Escape press; repeats and releases do not count.
fn is_escape_press(key: PhysicalKey, state: ElementState, repeat: bool) -> bool {
    key == PhysicalKey::Code(KeyCode::Escape) && state == ElementState::Pressed && !repeat
}

struct RuntimeState<A: App> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    lifecycle: Lifecycle,
    exit_requested: bool,
    fatal: Option<anyhow::Error>,
}

impl<A: App> RuntimeState<A> {
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            lifecycle: Lifecycle::Pending,
            exit_requested: false,
            fatal: None,
        }
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.size)
            .with_resizable(self.config.resizable);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        WindowEntryTryBuilder {
            window,
            gpu_builder: |w| {
                pollster::block_on(Gpu::new(w, gpu_init)).context("GPU initialization failed")
            },
        }
        .try_build()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        if self.fatal.is_none() {
            self.fatal = Some(err);
        }
        self.request_exit(event_loop);
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        self.teardown();
        event_loop.exit();
    }

    /// Lets the app release its GPU resources, then drops the GPU context and
    /// the window. Safe to call repeatedly; only the first call does work.
    fn teardown(&mut self) {
        self.lifecycle.tear_down(&mut self.app);

        if let Some(entry) = self.entry.take() {
            // ouroboros drops `gpu` before the `window` it borrows.
            drop(entry);
            log::debug!("window and GPU context destroyed");
        }
    }

    fn handle_close(&mut self, event_loop: &ActiveEventLoop) {
        match self.app.on_close_requested() {
            AppControl::Exit => self.request_exit(event_loop),
            AppControl::Continue => {
                if let Some(entry) = &self.entry {
                    entry.with_window(|w| w.request_redraw());
                }
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (app, entry) = (&mut self.app, &mut self.entry);
        let Some(entry) = entry.as_mut() else {
            return;
        };

        let control = entry.with_mut(|fields| {
            let mut ctx = FrameCtx {
                window: fields.window,
                gpu: fields.gpu,
            };
            app.on_frame(&mut ctx)
        });

        match control {
            Ok(AppControl::Continue) => {}
            Ok(AppControl::Exit) => self.request_exit(event_loop),
            Err(err) => self.fail(event_loop, err.context("frame failed")),
        }
    }
}

impl<A: App> ApplicationHandler for RuntimeState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.exit_requested {
            return;
        }

        let entry = match self.create_window_entry(event_loop) {
            Ok(entry) => entry,
            Err(err) => return self.fail(event_loop, err),
        };

        let started = entry.with_gpu(|gpu| self.app.on_start(gpu));
        entry.with_window(|w| w.request_redraw());

        // Teardown also runs after a failed start; the app may hold partial state.
        self.entry = Some(entry);
        self.lifecycle = Lifecycle::Started;

        if let Err(err) = started {
            self.fail(event_loop, err.context("application setup failed"));
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Continuous redraw: one frame per loop turn.
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        match &event {
            WindowEvent::CloseRequested => self.handle_close(event_loop),

            WindowEvent::KeyboardInput { event: key, .. }
                if self.config.close_on_escape
                    && is_escape_press(key.physical_key, key.state, key.repeat) =>
            {
                self.handle_close(event_loop)
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                }
                if self.app.on_window_event(&event) == AppControl::Exit {
                    self.request_exit(event_loop);
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {
                if self.app.on_window_event(&event) == AppControl::Exit {
                    self.request_exit(event_loop);
                }
            }
        }
    }
}
