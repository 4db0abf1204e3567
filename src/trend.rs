//! Linear trend fitting
//!
//! Closed-form ordinary least squares over `(iterations, mean)` pairs,
//! computed on sums centered at the means to avoid cancellation:
//!
//! ```text
//! slope     = Σ(x − x̄)(y − ȳ) / Σ(x − x̄)²
//! intercept = ȳ − slope·x̄
//! ```
//!
//! Trends are only evaluated at the series' own iteration counts; no
//! extrapolation is implied.

use crate::series::BenchmarkSeries;
use crate::{Error, Result};

/// Fitted line `mean ≈ slope · iterations + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrend {
    slope: f64,
    intercept: f64,
}

impl LinearTrend {
    /// Create a trend from known parameters.
    #[must_use]
    pub const fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    /// Fit a trend to a series.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientData`] if the series has fewer than two
    /// points (or, equivalently, no spread in iteration counts).
    pub fn fit(series: &BenchmarkSeries) -> Result<Self> {
        let pairs: Vec<(f64, f64)> = series
            .points()
            .iter()
            .map(|p| (count_as_f64(p.iterations()), p.mean()))
            .collect();

        Self::fit_pairs(&pairs).ok_or_else(|| Error::InsufficientData {
            configuration: series.configuration().to_string(),
            points: series.len(),
        })
    }

    /// Least-squares fit over raw `(x, y)` pairs; `None` when undefined.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fit_pairs(pairs: &[(f64, f64)]) -> Option<Self> {
        if pairs.len() < 2 {
            return None;
        }

        let n = pairs.len() as f64;
        let x_bar = pairs.iter().map(|p| p.0).sum::<f64>() / n;
        let y_bar = pairs.iter().map(|p| p.1).sum::<f64>() / n;

        let (mut sxy, mut sxx) = (0.0, 0.0);
        for &(x, y) in pairs {
            let dx = x - x_bar;
            sxy = dx.mul_add(y - y_bar, sxy);
            sxx = dx.mul_add(dx, sxx);
        }

        // No spread in x (up to rounding of x̄): the slope is undefined.
        let rounding = f64::EPSILON * x_bar;
        if sxx <= n * rounding * rounding {
            return None;
        }

        let slope = sxy / sxx;
        let intercept = slope.mul_add(-x_bar, y_bar);
        Some(Self { slope, intercept })
    }

    /// Slope (seconds per iteration).
    #[must_use]
    pub const fn slope(&self) -> f64 {
        self.slope
    }

    /// Intercept (seconds).
    #[must_use]
    pub const fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Predicted mean at `x`.
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope.mul_add(x, self.intercept)
    }

    /// Predicted `(iterations, mean)` at each of the series' own iteration counts.
    #[must_use]
    pub fn predict_series(&self, series: &BenchmarkSeries) -> Vec<(f64, f64)> {
        series
            .points()
            .iter()
            .map(|p| {
                let x = count_as_f64(p.iterations());
                (x, self.predict(x))
            })
            .collect()
    }

    /// Coefficient of determination against `series`, clamped to `[0, 1]`.
    ///
    /// Returns 0 for a series without variance.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn r_squared(&self, series: &BenchmarkSeries) -> f64 {
        if series.is_empty() {
            return 0.0;
        }

        let mean = series.points().iter().map(|p| p.mean()).sum::<f64>() / series.len() as f64;
        let (mut ss_tot, mut ss_res) = (0.0, 0.0);
        for p in series.points() {
            let predicted = self.predict(count_as_f64(p.iterations()));
            ss_tot += (p.mean() - mean).powi(2);
            ss_res += (p.mean() - predicted).powi(2);
        }

        if ss_tot == 0.0 {
            return 0.0;
        }
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    }
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn count_as_f64(count: u64) -> f64 {
    count as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::MeasurementPoint;

    fn series(points: &[(u64, f64)]) -> BenchmarkSeries {
        BenchmarkSeries::new(
            "test",
            points.iter().map(|&(i, m)| MeasurementPoint::new(i, m, 0.0)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_fit_two_points() {
        let trend = LinearTrend::fit(&series(&[(0, 1.0), (10, 3.0)])).unwrap();
        assert!((trend.slope() - 0.2).abs() < 1e-12);
        assert!((trend.intercept() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_single_point_insufficient() {
        let err = LinearTrend::fit(&series(&[(10, 1.0)])).unwrap_err();
        assert!(matches!(err, Error::InsufficientData { points: 1, .. }));
    }

    #[test]
    fn test_fit_constant_x_undefined() {
        assert!(LinearTrend::fit_pairs(&[(5.0, 1.0), (5.0, 2.0)]).is_none());
    }

    #[test]
    fn test_predict_series_uses_own_iterations() {
        let s = series(&[(10, 1.0), (20, 2.0), (40, 4.0)]);
        let trend = LinearTrend::fit(&s).unwrap();
        let predicted = trend.predict_series(&s);
        let xs: Vec<f64> = predicted.iter().map(|&(x, _)| x).collect();
        assert_eq!(xs, vec![10.0, 20.0, 40.0]);
        assert!((predicted[2].1 - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_r_squared_perfect_and_flat() {
        let s = series(&[(1, 2.0), (2, 4.0), (3, 6.0)]);
        let trend = LinearTrend::fit(&s).unwrap();
        assert!((trend.r_squared(&s) - 1.0).abs() < 1e-12);

        let flat = series(&[(1, 2.0), (2, 2.0)]);
        let trend = LinearTrend::fit(&flat).unwrap();
        assert!(trend.r_squared(&flat).abs() < f64::EPSILON);
    }
}
