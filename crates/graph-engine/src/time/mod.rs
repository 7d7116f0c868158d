//! Frame timing statistics.
//!
//! Kept free of any runtime or GPU dependency so the accumulation rules can be
//! tested directly.

mod frame_stats;

pub use frame_stats::FrameStats;
