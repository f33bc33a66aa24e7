use chromnoise_stats::StatsError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NoiseError {
    #[error("not a valid signal: intensity array is empty")]
    InvalidSignal,
    #[error("window larger than signal: {window} points requested, signal has {len}")]
    WindowTooLarge { window: usize, len: usize },
    #[error("window must span at least one point")]
    ZeroWindow,
    #[error("number of windows must be positive")]
    ZeroBudget,
    #[error("invalid window specification: {0}")]
    InvalidWindowSpec(String),
    #[error("window given as a duration but the signal has no time axis")]
    MissingTimes,
    #[error("invalid time axis: {0}")]
    InvalidTimes(String),
    #[error(transparent)]
    Stats(#[from] StatsError),
}

