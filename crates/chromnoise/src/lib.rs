//! Baseline noise estimation for one-dimensional intensity traces.
//!
//! The estimate is the smallest median absolute deviation found among
//! fixed-width windows placed at random offsets in the signal.

pub mod error;
pub mod estimator;
pub mod sampler;
pub mod signal;

pub use chromnoise_stats::{median, median_absolute_deviation, StatsError, MAD_SCALE};
pub use error::NoiseError;
pub use estimator::{
    estimate_noise, NoiseEstimator, NoiseEstimatorBuilder, NoiseReport, DEFAULT_WINDOW_COUNT,
    DEFAULT_WINDOW_POINTS,
};
pub use sampler::{Offsets, WindowSampler};
pub use signal::{IntensitySignal, WindowSpec};
