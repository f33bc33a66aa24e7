use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use phf::phf_map;
use regex::Regex;

use crate::error::NoiseError;

/// Seconds per time unit accepted in a window duration.
static TIME_UNITS: phf::Map<&'static str, f64> = phf_map! {
    "ms" => 0.001,
    "s" => 1.0,
    "sec" => 1.0,
    "m" => 60.0,
    "min" => 60.0,
};

static WINDOW_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

fn window_pattern() -> Option<&'static Regex> {
    WINDOW_PATTERN
        .get_or_init(|| Regex::new(r"^(\d+(?:\.\d*)?|\.\d+)\s*([a-z]*)$").ok())
        .as_ref()
}

/// Width of a noise window, either as a point count or as a duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowSpec {
    Points(usize),
    /// Duration in seconds.
    Duration(f64),
}

impl Default for WindowSpec {
    fn default() -> Self {
        WindowSpec::Points(crate::estimator::DEFAULT_WINDOW_POINTS)
    }
}

impl fmt::Display for WindowSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowSpec::Points(points) => write!(f, "{} points", points),
            WindowSpec::Duration(secs) => write!(f, "{}s", secs),
        }
    }
}

impl FromStr for WindowSpec {
    type Err = NoiseError;

    /// Parse `"256"` as a point count, or `"5s"`, `"1.5m"`, `"500ms"` as a duration.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();
        let pattern = window_pattern()
            .ok_or_else(|| NoiseError::InvalidWindowSpec("window pattern unavailable".into()))?;
        let caps = pattern
            .captures(&text)
            .ok_or_else(|| NoiseError::InvalidWindowSpec(s.to_string()))?;
        let number = &caps[1];
        let unit = &caps[2];

        if unit.is_empty() {
            let points = number.parse::<usize>().map_err(|_| {
                NoiseError::InvalidWindowSpec(format!("{}: point count must be a whole number", s))
            })?;
            return Ok(WindowSpec::Points(points));
        }

        let scale = TIME_UNITS
            .get(unit)
            .ok_or_else(|| NoiseError::InvalidWindowSpec(format!("{}: unknown time unit", s)))?;
        let value = number
            .parse::<f64>()
            .map_err(|_| NoiseError::InvalidWindowSpec(s.to_string()))?;
        Ok(WindowSpec::Duration(value * scale))
    }
}

/// Intensity trace with an optional time axis in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensitySignal {
    intensities: Vec<f64>,
    times: Option<Vec<f64>>,
}

impl IntensitySignal {
    /// Wrap an intensity array. Empty or non-finite input is rejected.
    pub fn new(intensities: Vec<f64>) -> Result<Self, NoiseError> {
        check_intensities(&intensities)?;
        Ok(Self {
            intensities,
            times: None,
        })
    }

    /// Wrap an intensity array together with its sampling times.
    ///
    /// Times must match the intensities in length and increase strictly.
    pub fn with_times(intensities: Vec<f64>, times: Vec<f64>) -> Result<Self, NoiseError> {
        check_intensities(&intensities)?;
        if times.len() != intensities.len() {
            return Err(NoiseError::InvalidTimes(format!(
                "{} times for {} intensities",
                times.len(),
                intensities.len()
            )));
        }
        if let Some(index) = times.iter().position(|t| !t.is_finite()) {
            return Err(NoiseError::InvalidTimes(format!(
                "time at index {} is not finite",
                index
            )));
        }
        if let Some(index) = times.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(NoiseError::InvalidTimes(format!(
                "times not strictly increasing at index {}",
                index + 1
            )));
        }
        Ok(Self {
            intensities,
            times: Some(times),
        })
    }

    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    pub fn times(&self) -> Option<&[f64]> {
        self.times.as_deref()
    }

    pub fn len(&self) -> usize {
        self.intensities.len()
    }

    /// Always false for a constructed signal.
    pub fn is_empty(&self) -> bool {
        self.intensities.is_empty()
    }

    /// Mean spacing of the time axis, if there is one with at least two points.
    pub fn time_step(&self) -> Option<f64> {
        let times = self.times.as_ref()?;
        match (times.first(), times.last()) {
            (Some(first), Some(last)) if times.len() > 1 => {
                Some((last - first) / (times.len() - 1) as f64)
            }
            _ => None,
        }
    }

    /// Convert a window specification to a number of points.
    ///
    /// Durations are divided by the time step and rounded down.
    pub fn window_points(&self, spec: &WindowSpec) -> Result<usize, NoiseError> {
        let points = match *spec {
            WindowSpec::Points(points) => points,
            WindowSpec::Duration(secs) => {
                if self.times.is_none() {
                    return Err(NoiseError::MissingTimes);
                }
                let step = self.time_step().ok_or_else(|| {
                    NoiseError::InvalidTimes("a single sample has no time step".into())
                })?;
                (secs / step).floor() as usize
            }
        };
        if points == 0 {
            return Err(NoiseError::ZeroWindow);
        }
        Ok(points)
    }
}

fn check_intensities(intensities: &[f64]) -> Result<(), NoiseError> {
    if intensities.is_empty() {
        return Err(NoiseError::InvalidSignal);
    }
    if let Some(index) = intensities.iter().position(|v| !v.is_finite()) {
        return Err(chromnoise_stats::StatsError::NonFinite { index }.into());
    }
    Ok(())
}
