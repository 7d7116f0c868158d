use anyhow::Result;

/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior).
    ///
    /// FIFO is vsync-locked and always supported; `AutoNoVsync` lets frame
    /// times drop below the display refresh interval.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Required wgpu features.
    pub required_features: wgpu::Features,

    /// Baseline limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Size in bytes of the largest buffer the caller will allocate.
    ///
    /// `max_buffer_size` is raised to at least this value; the request fails
    /// if the adapter cannot provide it.
    pub min_buffer_size: u64,

    /// Format of the depth attachment created alongside the surface.
    pub depth_format: wgpu::TextureFormat,

    /// Desired maximum frame latency for the surface.
    ///
    /// This value is a hint; support depends on platform/backend.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            min_buffer_size: 0,
            depth_format: super::DepthTarget::DEFAULT_FORMAT,
            desired_maximum_frame_latency: 2,
        }
    }
}

impl GpuInit {
    /// Computes the limits to request given what the adapter supports.
    pub fn resolve_limits(&self, adapter: &wgpu::Limits) -> Result<wgpu::Limits> {
        anyhow::ensure!(
            self.min_buffer_size <= adapter.max_buffer_size,
            "adapter max_buffer_size is {} bytes but {} bytes are required",
            adapter.max_buffer_size,
            self.min_buffer_size
        );

        let mut limits = self.required_limits.clone();
        limits.max_buffer_size = limits.max_buffer_size.max(self.min_buffer_size);
        Ok(limits)
    }
}
