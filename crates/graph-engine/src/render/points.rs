//! Point cloud renderer: one vertex buffer, one pipeline, one draw.

use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use naga::ShaderStage;
use wgpu::util::DeviceExt;

use super::{RenderCtx, WgslSource};

const POINTS_WGSL: WgslSource<'static> =
    WgslSource::new("graph points shader", include_str!("shaders/points.wgsl"));

const ENTRY_POINTS: [(ShaderStage, &str); 2] =
    [(ShaderStage::Vertex, "vs_main"), (ShaderStage::Fragment, "fs_main")];

/// One point in NDC.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct PointVertex {
    pub pos: [f32; 2],
}

impl PointVertex {
    /// Bytes per point in the vertex buffer.
    pub const SIZE: u64 = std::mem::size_of::<PointVertex>() as u64;

    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { pos: [x, y] }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }

    /// Byte size of a buffer holding `count` points.
    #[inline]
    pub fn buffer_size(count: u32) -> u64 {
        u64::from(count) * Self::SIZE
    }
}

/// GPU-resident point buffer plus the pipeline that draws it.
///
/// The buffer length is fixed at creation; `write` replaces contents in place.
/// Dropping the cloud destroys the buffer immediately rather than waiting for
/// the last wgpu handle to go away.
pub struct PointCloud {
    pipeline: wgpu::RenderPipeline,
    vbo: wgpu::Buffer,
    len: u32,
}

impl PointCloud {
    /// Uploads `points` and builds the pipeline.
    ///
    /// Fails if the shader does not validate.
    pub fn new(ctx: &RenderCtx<'_>, points: &[PointVertex]) -> Result<Self> {
        let len = u32::try_from(points.len()).context("point count exceeds u32::MAX")?;

        let shader = POINTS_WGSL
            .create_module(ctx.device, &ENTRY_POINTS)
            .context("point shader rejected")?;

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("graph points pipeline layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("graph points pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(ENTRY_POINTS[0].1),
                compilation_options: Default::default(),
                buffers: &[PointVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(ENTRY_POINTS[1].1),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::PointList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: ctx.depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let vbo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("graph points vbo"),
            contents: bytemuck::cast_slice(points),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        log::info!(
            "point buffer: {len} points, {} bytes",
            PointVertex::buffer_size(len)
        );

        Ok(Self { pipeline, vbo, len })
    }

    /// Overwrites points `[offset, offset + points.len())`.
    ///
    /// The copy is staged on the queue and executes with the next submission.
    pub fn write(&self, queue: &wgpu::Queue, offset: u32, points: &[PointVertex]) -> Result<()> {
        let count = u32::try_from(points.len()).context("patch exceeds u32::MAX points")?;
        let end = offset.checked_add(count);
        anyhow::ensure!(
            end.is_some_and(|end| end <= self.len),
            "patch [{offset}, +{count}) out of bounds for {} points",
            self.len
        );

        queue.write_buffer(
            &self.vbo,
            PointVertex::buffer_size(offset),
            bytemuck::cast_slice(points),
        );
        Ok(())
    }

    /// Records a draw of the first `count` points.
    ///
    /// `count` is clamped to the buffer length.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, count: u32) {
        let count = count.min(self.len);
        pass.set_pipeline(&self.pipeline);
        pass.set_vertex_buffer(0, self.vbo.slice(..));
        pass.draw(0..count, 0..1);
    }
}

impl Drop for PointCloud {
    fn drop(&mut self) {
        self.vbo.destroy();
        log::debug!("point buffer released");
    }
}
