use anyhow::Result;
use winit::event::WindowEvent;

use super::ctx::FrameCtx;
use crate::device::Gpu;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by `window::Runtime`.
///
/// Call order: `on_start` once, then any number of `on_window_event` /
/// `on_close_requested` / `on_frame`, then `on_teardown` exactly once while
/// the window and GPU context still exist.
pub trait App {
    /// Called once the window and GPU context exist, before the first frame.
    ///
    /// An error here aborts the runtime.
    fn on_start(&mut self, gpu: &Gpu<'_>) -> Result<()>;

    /// Called for window events other than close requests and redraws.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called when the user asks to close the window.
    ///
    /// Returning `Continue` keeps the loop alive, e.g. to render a final frame.
    fn on_close_requested(&mut self) -> AppControl {
        AppControl::Exit
    }

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl>;

    /// Releases GPU resources owned by the app.
    fn on_teardown(&mut self) {}
}
