//! Graph engine crate.
//!
//! Platform + GPU runtime pieces for the point-cloud benchmark: window and
//! event loop, wgpu device and surface, the point renderer and frame timing.

pub mod core;
pub mod device;
pub mod logging;
pub mod render;
pub mod time;
pub mod window;
