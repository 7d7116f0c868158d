use crate::device::Gpu;

/// Renderer-facing context used when building GPU resources.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub surface_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        surface_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            device,
            surface_format,
            depth_format,
        }
    }

    pub fn from_gpu(gpu: &'a Gpu<'_>) -> Self {
        Self::new(
            gpu.device(),
            gpu.surface_format(),
            gpu.depth().format(),
        )
    }
}
