//! Robust location and dispersion statistics for intensity samples.

pub mod robust;

pub use robust::{median, median_absolute_deviation, StatsError, MAD_SCALE};
