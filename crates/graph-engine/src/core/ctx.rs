use anyhow::Result;
use winit::window::Window;

use crate::device::{Gpu, SurfaceErrorAction};

/// Result of a `FrameCtx::render` call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    /// The frame was submitted and presented.
    Presented,
    /// No surface texture could be acquired; nothing was drawn.
    Skipped(SurfaceErrorAction),
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    pub fn queue(&self) -> &wgpu::Queue {
        self.gpu.queue()
    }

    /// Clears color and depth, records `draw` into a single render pass, then
    /// submits and presents.
    ///
    /// Recoverable surface errors yield `FrameOutcome::Skipped`; an out of
    /// memory surface is an error.
    pub fn render<F>(&mut self, clear: wgpu::Color, draw: F) -> Result<FrameOutcome>
    where
        F: FnOnce(&mut wgpu::RenderPass<'_>),
    {
        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                let reason = err.to_string();
                let action = self.gpu.handle_surface_error(err);
                anyhow::ensure!(action.is_recoverable(), "surface lost: {reason}");
                log::warn!("frame skipped: {reason} ({action:?})");
                return Ok(FrameOutcome::Skipped(action));
            }
        };

        // Pass borrows the encoder; dropped before `present` takes the frame.
        {
            let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("graph frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.gpu.depth().view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            draw(&mut pass);
        }

        self.window.pre_present_notify();
        self.gpu.present(frame);

        Ok(FrameOutcome::Presented)
    }
}
