//! GPU rendering subsystem.
//!
//! Convention:
//! - vertex positions are supplied directly in NDC ([-1, 1] on both axes)
//! - every pipeline renders into the surface color target plus the depth
//!   target owned by `device::Gpu`

mod ctx;
pub mod points;
pub mod shader;

pub use ctx::RenderCtx;
pub use points::{PointCloud, PointVertex};
pub use shader::{ShaderError, WgslSource};
