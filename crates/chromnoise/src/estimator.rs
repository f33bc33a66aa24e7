use chromnoise_stats::{median_absolute_deviation, StatsError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::error::NoiseError;
use crate::sampler::WindowSampler;
use crate::signal::{IntensitySignal, WindowSpec};

pub const DEFAULT_WINDOW_POINTS: usize = 256;
pub const DEFAULT_WINDOW_COUNT: usize = 1024;

/// Outcome of one noise estimation run.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseReport {
    /// Smallest window MAD seen, or the signal range if no window beat it.
    pub level: f64,
    /// Start of the window that produced `level`.
    pub best_offset: Option<usize>,
    pub window_points: usize,
    /// Random draws made, duplicates included.
    pub draws: usize,
    /// Distinct windows scored.
    pub windows_scored: usize,
    /// Every valid offset was scored. Not an error.
    pub exhausted: bool,
}

/// Minimum-MAD noise estimator over randomly placed windows.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseEstimator {
    window: WindowSpec,
    window_count: usize,
    seed: Option<u64>,
}

impl Default for NoiseEstimator {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl NoiseEstimator {
    /// Create a builder with default settings.
    pub fn builder() -> NoiseEstimatorBuilder {
        NoiseEstimatorBuilder::new()
    }

    pub fn window(&self) -> WindowSpec {
        self.window
    }

    pub fn window_count(&self) -> usize {
        self.window_count
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Estimate the noise level of `signal`.
    ///
    /// A configured seed makes the result reproducible. Without one, each
    /// call draws from its own entropy-seeded generator.
    pub fn estimate(&self, signal: &IntensitySignal) -> Result<NoiseReport, NoiseError> {
        let mut rng = make_rng(self.seed);
        self.estimate_with_rng(signal, &mut rng)
    }

    /// Estimate the noise level using a caller-supplied random source.
    pub fn estimate_with_rng<R: Rng>(
        &self,
        signal: &IntensitySignal,
        rng: &mut R,
    ) -> Result<NoiseReport, NoiseError> {
        let window_points = signal.window_points(&self.window)?;
        scan_windows(signal.intensities(), window_points, self.window_count, rng)
    }
}

/// Return the minimum window MAD for a bare intensity array.
pub fn estimate_noise(
    intensities: &[f64],
    window_points: usize,
    window_count: usize,
    seed: Option<u64>,
) -> Result<f64, NoiseError> {
    let mut rng = make_rng(seed);
    scan_windows(intensities, window_points, window_count, &mut rng).map(|report| report.level)
}

fn make_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn scan_windows<R: Rng>(
    intensities: &[f64],
    window_points: usize,
    window_count: usize,
    rng: &mut R,
) -> Result<NoiseReport, NoiseError> {
    let sampler = WindowSampler::new(intensities.len(), window_points, window_count)?;
    let (min, max) = value_range(intensities)?;

    let mut level = (max - min).abs();
    let mut best_offset = None;
    let mut windows_scored = 0usize;

    let mut offsets = sampler.offsets(rng);
    for offset in offsets.by_ref() {
        let mad = median_absolute_deviation(&intensities[offset..offset + window_points])?;
        windows_scored += 1;
        // Strict comparison keeps the first window found on ties.
        if mad < level {
            level = mad;
            best_offset = Some(offset);
            debug!(offset, level, "new minimum window MAD");
        }
    }

    let exhausted = offsets.exhausted();
    if exhausted && offsets.draws() < window_count {
        debug!(
            offsets = sampler.offset_space(),
            draws = offsets.draws(),
            window_count,
            "offset space exhausted before window count"
        );
    }

    Ok(NoiseReport {
        level,
        best_offset,
        window_points,
        draws: offsets.draws(),
        windows_scored,
        exhausted,
    })
}

fn value_range(values: &[f64]) -> Result<(f64, f64), NoiseError> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for (index, &v) in values.iter().enumerate() {
        if !v.is_finite() {
            return Err(StatsError::NonFinite { index }.into());
        }
        min = min.min(v);
        max = max.max(v);
    }
    Ok((min, max))
}

/// Builder for configuring a NoiseEstimator.
#[derive(Debug, Clone)]
pub struct NoiseEstimatorBuilder {
    window: WindowSpec,
    window_count: usize,
    seed: Option<u64>,
}

impl Default for NoiseEstimatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseEstimatorBuilder {
    /// Create a builder with a 256 point window and 1024 windows.
    pub fn new() -> Self {
        Self {
            window: WindowSpec::Points(DEFAULT_WINDOW_POINTS),
            window_count: DEFAULT_WINDOW_COUNT,
            seed: None,
        }
    }

    /// Set the window width as a point count or duration.
    pub fn window(mut self, window: WindowSpec) -> Self {
        self.window = window;
        self
    }

    /// Set the window width in points.
    pub fn window_points(mut self, points: usize) -> Self {
        self.window = WindowSpec::Points(points);
        self
    }

    /// Set the number of random draws.
    pub fn window_count(mut self, count: usize) -> Self {
        self.window_count = count;
        self
    }

    /// Fix the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the estimator. Parameters are validated per call against the signal.
    pub fn build(self) -> NoiseEstimator {
        NoiseEstimator {
            window: self.window,
            window_count: self.window_count,
            seed: self.seed,
        }
    }
}
