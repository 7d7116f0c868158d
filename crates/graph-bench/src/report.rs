use std::io::{self, Write};
use std::time::Duration;

use rand::{Rng, SeedableRng};

use crate::bench::BenchLoop;

/// Final numbers of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub frames: u64,
    pub mean_ms: Option<f64>,
    pub min: Option<Duration>,
    pub max: Option<Duration>,
    pub patches: u32,
    /// Points past the last patch; never rewritten.
    pub unpatched: u32,
}

impl Report {
    pub(crate) fn from_loop<R: Rng + SeedableRng>(bench: &BenchLoop<R>) -> Self {
        let stats = bench.stats();
        Self {
            frames: stats.frames(),
            mean_ms: stats.mean_ms(),
            min: stats.min(),
            max: stats.max(),
            patches: bench.patches(),
            unpatched: bench.cursor().remaining(),
        }
    }

    /// The two result lines: mean frame time in ms, then the frame count.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self.mean_ms.unwrap_or(0.0))?;
        writeln!(out, "{}", self.frames)?;
        out.flush()
    }

    pub fn log_summary(&self) {
        match (self.mean_ms, self.min, self.max) {
            (Some(mean), Some(min), Some(max)) => log::info!(
                "{} frames, mean {mean:.3} ms (min {min:.3?}, max {max:.3?}); {} patches, {} points never patched",
                self.frames,
                self.patches,
                self.unpatched
            ),
            _ => log::warn!("no frames were rendered"),
        }
    }
}
