//! The benchmark loop: patch a batch, redraw everything, time it.

use std::time::Instant;

use anyhow::{Context, Result};
use graph_engine::core::{App, AppControl, FrameCtx, FrameOutcome};
use graph_engine::device::Gpu;
use graph_engine::render::{PointCloud, RenderCtx};
use graph_engine::time::FrameStats;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{BenchConfig, TimedSection};
use crate::cursor::BatchCursor;
use crate::points::PointGenerator;
use crate::report::Report;
use crate::target::{GpuTarget, PointTarget};

/// Lifecycle of a run.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RunState {
    Running,
    /// Stop requested; one more frame is rendered.
    Stopping,
    Stopped,
}

/// Per-iteration logic, independent of any window or GPU.
pub struct BenchLoop<R = StdRng> {
    point_count: u32,
    mutate: bool,
    timed: TimedSection,

    generator: PointGenerator<R>,
    cursor: BatchCursor,
    state: RunState,
    stats: FrameStats,
    /// Steps taken, presented or not. Seeds the patch of each iteration.
    iterations: u64,
    patches: u32,
}

impl<R: Rng + SeedableRng> BenchLoop<R> {
    pub fn new(config: &BenchConfig, generator: PointGenerator<R>) -> Self {
        Self {
            point_count: config.point_count,
            mutate: config.enable_batch_mutation,
            timed: config.timed_section,
            generator,
            cursor: BatchCursor::new(config.point_count, config.batch_size),
            state: RunState::Running,
            stats: FrameStats::new(),
            iterations: 0,
            patches: 0,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn cursor(&self) -> &BatchCursor {
        &self.cursor
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn patches(&self) -> u32 {
        self.patches
    }

    pub fn generator(&self) -> &PointGenerator<R> {
        &self.generator
    }

    /// External stop (window closed). The next step renders a final frame.
    pub fn request_stop(&mut self) {
        if self.state == RunState::Running {
            log::info!("stop requested after {} frames", self.stats.frames());
            self.state = RunState::Stopping;
        }
    }

    /// Runs one iteration against `target` and returns the resulting state.
    pub fn step<T: PointTarget>(&mut self, target: &mut T) -> Result<RunState> {
        if self.state == RunState::Stopped {
            return Ok(RunState::Stopped);
        }

        let frame_start = Instant::now();

        if self.state == RunState::Running && self.mutate {
            self.patch_next(target)?;
        }

        let render_start = Instant::now();
        let outcome = target.render_points(self.point_count)?;
        let end = Instant::now();
        self.iterations += 1;

        match outcome {
            FrameOutcome::Presented => {
                let start = match self.timed {
                    TimedSection::Render => render_start,
                    TimedSection::Frame => frame_start,
                };
                self.stats.record(end.saturating_duration_since(start));
            }
            FrameOutcome::Skipped(action) => {
                log::warn!("iteration {} not presented ({action:?})", self.iterations - 1);
            }
        }

        if self.state == RunState::Stopping {
            self.state = RunState::Stopped;
        }
        Ok(self.state)
    }

    /// Applies the next batch, or moves to `Stopping` when it would not fit.
    fn patch_next<T: PointTarget>(&mut self, target: &mut T) -> Result<()> {
        let Some(range) = self.cursor.peek() else {
            log::info!(
                "buffer rewritten after {} patches; {} tail points untouched",
                self.patches,
                self.cursor.remaining()
            );
            self.state = RunState::Stopping;
            return Ok(());
        };

        let seed = self.iterations;
        let points = self.generator.patch(self.cursor.batch_size(), seed);
        target
            .write_points(range.start, &points)
            .with_context(|| format!("failed to patch points {range:?}"))?;

        self.cursor.advance();
        self.patches += 1;
        log::trace!("patched {range:?} with seed {seed}");
        Ok(())
    }

    pub fn report(&self) -> Report {
        Report::from_loop(self)
    }
}

/// `core::App` wrapper: owns the GPU point cloud and feeds frames to `BenchLoop`.
pub struct Benchmark<R = StdRng> {
    bench: BenchLoop<R>,
    cloud: Option<PointCloud>,
}

impl<R: Rng + SeedableRng> Benchmark<R> {
    pub fn new(config: &BenchConfig, generator: PointGenerator<R>) -> Self {
        Self {
            bench: BenchLoop::new(config, generator),
            cloud: None,
        }
    }

    pub fn report(&self) -> Report {
        self.bench.report()
    }
}

impl<R: Rng + SeedableRng> App for Benchmark<R> {
    fn on_start(&mut self, gpu: &Gpu<'_>) -> Result<()> {
        let count = self.bench.point_count;
        let size = gpu.size();
        log::info!(
            "benchmarking {count} points on {} at {}x{}",
            gpu.adapter_info().name,
            size.width,
            size.height
        );

        let started = Instant::now();
        let points = self.bench.generator().initial(count);
        log::info!("generated {count} points in {:.1?}", started.elapsed());

        let cloud = PointCloud::new(&RenderCtx::from_gpu(gpu), &points)
            .context("failed to create point buffer")?;
        self.cloud = Some(cloud);
        Ok(())
    }

    fn on_close_requested(&mut self) -> AppControl {
        self.bench.request_stop();
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl> {
        let cloud = self.cloud.as_ref().context("point buffer not created")?;
        let mut target = GpuTarget::new(ctx, cloud);

        match self.bench.step(&mut target)? {
            RunState::Stopped => Ok(AppControl::Exit),
            RunState::Running | RunState::Stopping => Ok(AppControl::Continue),
        }
    }

    fn on_teardown(&mut self) {
        if self.cloud.take().is_some() {
            log::debug!("benchmark resources released");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use graph_engine::device::SurfaceErrorAction;
    use graph_engine::render::PointVertex;

    use super::*;

    /// Records what the loop asked for; holds the "buffer" on the CPU.
    struct RecordingTarget {
        buffer: Vec<PointVertex>,
        writes: Vec<(u32, usize)>,
        draws: Vec<u32>,
        skip_frames: Vec<usize>,
        render_delay: Duration,
    }

    impl RecordingTarget {
        fn new(initial: Vec<PointVertex>) -> Self {
            Self {
                buffer: initial,
                writes: Vec::new(),
                draws: Vec::new(),
                skip_frames: Vec::new(),
                render_delay: Duration::ZERO,
            }
        }
    }

    impl PointTarget for RecordingTarget {
        fn write_points(&mut self, offset: u32, points: &[PointVertex]) -> Result<()> {
            let start = offset as usize;
            let end = start + points.len();
            anyhow::ensure!(end <= self.buffer.len(), "write past end");
            self.buffer[start..end].copy_from_slice(points);
            self.writes.push((offset, points.len()));
            Ok(())
        }

        fn render_points(&mut self, count: u32) -> Result<FrameOutcome> {
            let index = self.draws.len();
            self.draws.push(count);
            if !self.render_delay.is_zero() {
                std::thread::sleep(self.render_delay);
            }
            if self.skip_frames.contains(&index) {
                return Ok(FrameOutcome::Skipped(SurfaceErrorAction::SkipFrame));
            }
            Ok(FrameOutcome::Presented)
        }
    }

    fn config(point_count: u32, batch_size: u32) -> BenchConfig {
        BenchConfig {
            point_count,
            batch_size,
            ..BenchConfig::default()
        }
    }

    fn setup(config: &BenchConfig) -> (BenchLoop, RecordingTarget) {
        let bench = BenchLoop::new(config, PointGenerator::default());
        let target = RecordingTarget::new(bench.generator().initial(config.point_count));
        (bench, target)
    }

    /// Steps until stopped; bails out if the loop never ends.
    fn run_to_end(bench: &mut BenchLoop, target: &mut RecordingTarget) -> usize {
        for i in 1..=10_000 {
            if bench.step(target).unwrap() == RunState::Stopped {
                return i;
            }
        }
        panic!("loop did not terminate");
    }

    // ── termination ───────────────────────────────────────────────────────

    #[test]
    fn even_split_runs_patches_plus_one_frame() {
        let (mut bench, mut target) = setup(&config(16, 4));
        let steps = run_to_end(&mut bench, &mut target);

        assert_eq!(steps, 5);
        assert_eq!(bench.patches(), 4);
        assert_eq!(bench.stats().frames(), 5);
        assert_eq!(target.writes, vec![(0, 4), (4, 4), (8, 4), (12, 4)]);
        assert_eq!(bench.cursor().offset(), 16);
    }

    #[test]
    fn uneven_split_leaves_tail_unpatched() {
        let cfg = config(10, 4);
        let (mut bench, mut target) = setup(&cfg);
        let initial = bench.generator().initial(10);

        assert_eq!(run_to_end(&mut bench, &mut target), 3);
        assert_eq!(target.writes, vec![(0, 4), (4, 4)]);
        assert_eq!(bench.cursor().remaining(), 2);
        assert_eq!(&target.buffer[8..], &initial[8..]);
        assert_ne!(&target.buffer[..8], &initial[..8]);
    }

    #[test]
    fn batch_larger_than_buffer_renders_one_frame() {
        let (mut bench, mut target) = setup(&config(10, 64));
        assert_eq!(run_to_end(&mut bench, &mut target), 1);
        assert!(target.writes.is_empty());
        assert_eq!(bench.stats().frames(), 1);
    }

    #[test]
    fn stopped_loop_does_nothing() {
        let (mut bench, mut target) = setup(&config(4, 4));
        run_to_end(&mut bench, &mut target);
        let draws = target.draws.len();

        assert_eq!(bench.step(&mut target).unwrap(), RunState::Stopped);
        assert_eq!(target.draws.len(), draws);
    }

    // ── per-frame behavior ────────────────────────────────────────────────

    #[test]
    fn every_frame_draws_whole_buffer() {
        let (mut bench, mut target) = setup(&config(100, 7));
        run_to_end(&mut bench, &mut target);

        assert_eq!(target.draws.len(), 100 / 7 + 1);
        assert!(target.draws.iter().all(|&count| count == 100));
    }

    #[test]
    fn patch_seed_is_frame_index() {
        let cfg = config(12, 4);
        let (mut bench, mut target) = setup(&cfg);
        run_to_end(&mut bench, &mut target);

        let generator = PointGenerator::default();
        for (frame, chunk) in target.buffer.chunks(4).enumerate() {
            assert_eq!(chunk, &generator.patch(4, frame as u64)[..], "frame {frame}");
        }
    }

    #[test]
    fn skipped_frames_are_not_counted() {
        let (mut bench, mut target) = setup(&config(16, 4));
        target.skip_frames = vec![1];
        run_to_end(&mut bench, &mut target);

        assert_eq!(target.draws.len(), 5);
        assert_eq!(bench.stats().frames(), 4);
        // Patches are still applied on the skipped iteration.
        assert_eq!(bench.patches(), 4);
        assert_eq!(bench.iterations(), 5);
    }

    #[test]
    fn skipped_frame_does_not_reuse_a_seed() {
        let (mut bench, mut target) = setup(&config(8, 4));
        target.skip_frames = vec![0];
        run_to_end(&mut bench, &mut target);

        assert_eq!(bench.stats().frames(), 2);
        assert_ne!(target.buffer[..4], target.buffer[4..]);

        let generator = PointGenerator::default();
        assert_eq!(&target.buffer[..4], &generator.patch(4, 0)[..]);
        assert_eq!(&target.buffer[4..], &generator.patch(4, 1)[..]);
    }

    // ── mutation disabled ─────────────────────────────────────────────────

    #[test]
    fn static_buffer_runs_until_stop_requested() {
        let cfg = BenchConfig {
            enable_batch_mutation: false,
            ..config(16, 4)
        };
        let (mut bench, mut target) = setup(&cfg);

        for _ in 0..50 {
            assert_eq!(bench.step(&mut target).unwrap(), RunState::Running);
        }
        assert!(target.writes.is_empty());

        bench.request_stop();
        assert_eq!(bench.state(), RunState::Stopping);
        assert_eq!(bench.step(&mut target).unwrap(), RunState::Stopped);
        assert_eq!(bench.stats().frames(), 51);
    }

    #[test]
    fn stop_request_skips_remaining_patches() {
        let (mut bench, mut target) = setup(&config(16, 4));
        bench.step(&mut target).unwrap();
        bench.request_stop();

        assert_eq!(bench.step(&mut target).unwrap(), RunState::Stopped);
        assert_eq!(bench.patches(), 1);
        assert_eq!(bench.stats().frames(), 2);
    }

    // ── timing ────────────────────────────────────────────────────────────

    #[test]
    fn every_frame_contributes_to_the_mean() {
        let (mut bench, mut target) = setup(&config(8, 4));
        target.render_delay = Duration::from_millis(2);
        run_to_end(&mut bench, &mut target);

        let stats = bench.stats();
        assert_eq!(stats.frames(), 3);
        assert!(stats.min().unwrap() >= Duration::from_millis(2));
        let mean = stats.mean_ms().unwrap();
        let expected = stats.total().as_secs_f64() * 1_000.0 / 3.0;
        assert!((mean - expected).abs() < 1e-9);
    }
}
