use std::time::Duration;

/// Running totals over recorded frame durations.
///
/// Every recorded frame counts equally toward the mean; there is no warm-up
/// exclusion and no clamping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    frames: u64,
    total: Duration,
    min: Option<Duration>,
    max: Option<Duration>,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one frame.
    pub fn record(&mut self, elapsed: Duration) {
        self.frames += 1;
        self.total = self.total.saturating_add(elapsed);
        self.min = Some(self.min.map_or(elapsed, |m| m.min(elapsed)));
        self.max = Some(self.max.map_or(elapsed, |m| m.max(elapsed)));
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn min(&self) -> Option<Duration> {
        self.min
    }

    pub fn max(&self) -> Option<Duration> {
        self.max
    }

    /// Mean frame duration; `None` before the first frame.
    pub fn mean(&self) -> Option<Duration> {
        if self.frames == 0 {
            return None;
        }
        let nanos = self.total.as_nanos() / u128::from(self.frames);
        Some(Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)))
    }

    /// Mean frame duration in milliseconds.
    pub fn mean_ms(&self) -> Option<f64> {
        if self.frames == 0 {
            return None;
        }
        Some(self.total.as_secs_f64() * 1_000.0 / self.frames as f64)
    }
}
