use anyhow::Result;
use graph_engine::core::{FrameCtx, FrameOutcome};
use graph_engine::render::{PointCloud, PointVertex};

/// Background of every frame.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

/// Where the benchmark loop sends its buffer writes and draws.
pub trait PointTarget {
    /// Overwrites points `[offset, offset + points.len())`.
    fn write_points(&mut self, offset: u32, points: &[PointVertex]) -> Result<()>;

    /// Clears, draws the first `count` points and presents.
    fn render_points(&mut self, count: u32) -> Result<FrameOutcome>;
}

/// `PointTarget` backed by the window's GPU context for one frame.
pub struct GpuTarget<'f, 'a, 'w> {
    ctx: &'f mut FrameCtx<'a, 'w>,
    cloud: &'f PointCloud,
}

impl<'f, 'a, 'w> GpuTarget<'f, 'a, 'w> {
    pub fn new(ctx: &'f mut FrameCtx<'a, 'w>, cloud: &'f PointCloud) -> Self {
        Self { ctx, cloud }
    }
}

impl PointTarget for GpuTarget<'_, '_, '_> {
    fn write_points(&mut self, offset: u32, points: &[PointVertex]) -> Result<()> {
        self.cloud.write(self.ctx.queue(), offset, points)
    }

    fn render_points(&mut self, count: u32) -> Result<FrameOutcome> {
        let cloud = self.cloud;
        self.ctx.render(CLEAR_COLOR, |pass| cloud.draw(pass, count))
    }
}
