//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the single benchmark window, and wires them
//! to the GPU layer and the `core::App` contract.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
