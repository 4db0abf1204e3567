//! Benchmark series - one configuration's timings within one trial
//!
//! Result documents are produced by the benchmark harness (hyperfine-style
//! JSON export with a parameter scan over `iter`):
//!
//! ```json
//! { "results": [
//!     { "parameters": { "iter": "10" }, "mean": 0.51, "stddev": 0.02, ... },
//!     { "parameters": { "iter": "20" }, "mean": 1.02, "stddev": 0.03, ... }
//! ] }
//! ```
//!
//! Numbers may be string-encoded. Durations are kept in seconds; conversion to
//! milliseconds only happens when the summary table is rendered.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// One recorded run of a configuration at a given iteration count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementPoint {
    iterations: u64,
    mean: f64,
    stddev: f64,
}

impl MeasurementPoint {
    /// Create a measurement point (durations in seconds).
    #[must_use]
    pub const fn new(iterations: u64, mean: f64, stddev: f64) -> Self {
        Self {
            iterations,
            mean,
            stddev,
        }
    }

    /// Number of command iterations in the run.
    #[must_use]
    pub const fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Mean duration in seconds.
    #[must_use]
    pub const fn mean(&self) -> f64 {
        self.mean
    }

    /// Standard deviation in seconds.
    #[must_use]
    pub const fn stddev(&self) -> f64 {
        self.stddev
    }
}

/// Ordered time series for one configuration.
///
/// Points are sorted by iteration count and iteration counts are unique, so
/// the three projections always line up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkSeries {
    configuration: String,
    points: Vec<MeasurementPoint>,
}

impl BenchmarkSeries {
    /// Build a series, sorting points by iteration count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSeries`] if two points share an iteration count
    /// or a duration is negative or not finite.
    pub fn new(configuration: impl Into<String>, mut points: Vec<MeasurementPoint>) -> Result<Self> {
        let configuration = configuration.into();
        points.sort_by_key(MeasurementPoint::iterations);

        if let Some(pair) = points
            .windows(2)
            .find(|w| w[0].iterations == w[1].iterations)
        {
            return Err(Error::InvalidSeries {
                reason: format!("duplicate iteration count {}", pair[0].iterations),
                configuration,
            });
        }
        if let Some(bad) = points
            .iter()
            .find(|p| !valid_duration(p.mean) || !valid_duration(p.stddev))
        {
            return Err(Error::InvalidSeries {
                reason: format!("invalid duration at iteration count {}", bad.iterations),
                configuration,
            });
        }

        Ok(Self {
            configuration,
            points,
        })
    }

    /// Configuration name this series belongs to.
    #[must_use]
    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    /// Points in ascending iteration order.
    #[must_use]
    pub fn points(&self) -> &[MeasurementPoint] {
        &self.points
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the series has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iteration counts, ascending.
    #[must_use]
    pub fn iterations(&self) -> Vec<u64> {
        self.points.iter().map(MeasurementPoint::iterations).collect()
    }

    /// Mean durations (seconds), aligned with [`Self::iterations`].
    #[must_use]
    pub fn means(&self) -> Vec<f64> {
        self.points.iter().map(MeasurementPoint::mean).collect()
    }

    /// Standard deviations (seconds), aligned with [`Self::iterations`].
    #[must_use]
    pub fn stddevs(&self) -> Vec<f64> {
        self.points.iter().map(MeasurementPoint::stddev).collect()
    }
}

fn valid_duration(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

/// Parses result documents into [`BenchmarkSeries`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesLoader;

impl SeriesLoader {
    /// Create a loader.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Load every record of a result file as a series.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not JSON, and
    /// [`Error::MalformedResult`] if a record lacks `parameters.iter`, `mean`
    /// or `stddev`, holds non-numeric values, or repeats an iteration count.
    pub fn load(&self, path: &Path, configuration: &str) -> Result<BenchmarkSeries> {
        let records = read_records(path)?;

        let points = records
            .iter()
            .enumerate()
            .map(|(i, record)| parse_record(path, i, record))
            .collect::<Result<Vec<_>>>()?;

        let series = BenchmarkSeries::new(configuration, points).map_err(|e| match e {
            Error::InvalidSeries { reason, .. } => Error::malformed(path, reason),
            other => other,
        })?;

        debug!(
            configuration,
            path = %path.display(),
            points = series.len(),
            "loaded series"
        );
        Ok(series)
    }

    /// Load only the first record of a result file: the representative
    /// `(mean, stddev)` pair used by the summary table.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`]; an empty `results` list is also malformed.
    pub fn load_representative(&self, path: &Path) -> Result<MeasurementPoint> {
        let records = read_records(path)?;
        let first = records
            .first()
            .ok_or_else(|| Error::malformed(path, "'results' is empty"))?;
        parse_record(path, 0, first)
    }
}

fn read_records(path: &Path) -> Result<Vec<Value>> {
    let raw = std::fs::read_to_string(path)?;
    let mut document: Value = serde_json::from_str(&raw)
        .map_err(|e| Error::malformed(path, format!("invalid JSON: {e}")))?;

    match document.get_mut("results").map(Value::take) {
        Some(Value::Array(records)) => Ok(records),
        Some(_) => Err(Error::malformed(path, "'results' is not a list")),
        None => Err(Error::malformed(path, "missing 'results'")),
    }
}

fn parse_record(path: &Path, index: usize, record: &Value) -> Result<MeasurementPoint> {
    let iter = record
        .get("parameters")
        .and_then(|p| p.get("iter"))
        .ok_or_else(|| Error::malformed(path, format!("record {index}: missing 'parameters.iter'")))?;
    let iterations = as_count(iter).ok_or_else(|| {
        Error::malformed(path, format!("record {index}: 'iter' is not an integer: {iter}"))
    })?;

    let duration = |key: &str| -> Result<f64> {
        let value = record
            .get(key)
            .ok_or_else(|| Error::malformed(path, format!("record {index}: missing '{key}'")))?;
        let seconds = as_number(value).ok_or_else(|| {
            Error::malformed(path, format!("record {index}: '{key}' is not numeric: {value}"))
        })?;
        if valid_duration(seconds) {
            Ok(seconds)
        } else {
            Err(Error::malformed(
                path,
                format!("record {index}: '{key}' must be a non-negative duration"),
            ))
        }
    };

    Ok(MeasurementPoint::new(iterations, duration("mean")?, duration("stddev")?))
}

/// Non-negative integer, possibly string-encoded.
fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Float, possibly string-encoded.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
