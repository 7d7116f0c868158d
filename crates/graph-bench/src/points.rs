//! Random point generation for the initial buffer and per-frame patches.

use std::marker::PhantomData;
use std::ops::Range;

use graph_engine::render::PointVertex;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seed of the initial buffer; identical on every run.
pub const DEFAULT_SEED: u64 = 1;

/// Initial points fill the left half of the viewport...
pub const INITIAL_X: Range<f32> = -1.0..0.0;
/// ...and patches land in the right half, so progress is visible on screen.
pub const PATCH_X: Range<f32> = 0.0..1.0;
pub const Y_RANGE: Range<f32> = -1.0..1.0;

/// Deterministic point source.
///
/// Every call seeds a fresh `R`, so output depends only on the seed and the
/// count. Swap `R` to change the underlying generator.
#[derive(Debug, Clone, Copy)]
pub struct PointGenerator<R = StdRng> {
    initial_seed: u64,
    _rng: PhantomData<fn() -> R>,
}

impl Default for PointGenerator {
    fn default() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }
}

impl<R: Rng + SeedableRng> PointGenerator<R> {
    pub fn with_seed(initial_seed: u64) -> Self {
        Self {
            initial_seed,
            _rng: PhantomData,
        }
    }

    pub fn initial_seed(&self) -> u64 {
        self.initial_seed
    }

    /// Points for the whole buffer: x in [-1, 0), y in [-1, 1).
    pub fn initial(&self, count: u32) -> Vec<PointVertex> {
        sample(&mut R::seed_from_u64(self.initial_seed), count, INITIAL_X, Y_RANGE)
    }

    /// Points for one batch: x in [0, 1), y in [-1, 1).
    pub fn patch(&self, count: u32, seed: u64) -> Vec<PointVertex> {
        sample(&mut R::seed_from_u64(seed), count, PATCH_X, Y_RANGE)
    }
}

/// Draws x then y for each point.
fn sample<R: Rng>(rng: &mut R, count: u32, x: Range<f32>, y: Range<f32>) -> Vec<PointVertex> {
    let xs = Uniform::from(x);
    let ys = Uniform::from(y);

    (0..count)
        .map(|_| {
            let px = xs.sample(rng);
            let py = ys.sample(rng);
            PointVertex::new(px, py)
        })
        .collect()
}
