//! Integration tests for linear trend fitting

use cairn_report::{BenchmarkSeries, Error, LinearTrend, MeasurementPoint};

fn series(points: &[(u64, f64)]) -> BenchmarkSeries {
    BenchmarkSeries::new(
        "local",
        points
            .iter()
            .map(|&(i, m)| MeasurementPoint::new(i, m, 0.01))
            .collect(),
    )
    .unwrap()
}

#[test]
fn test_exact_line_recovered() {
    // mean = 0.05 * iterations + 0.3
    let s = series(&[(10, 0.8), (20, 1.3), (30, 1.8), (40, 2.3), (50, 2.8)]);
    let trend = LinearTrend::fit(&s).unwrap();
    assert!((trend.slope() - 0.05).abs() < 1e-9);
    assert!((trend.intercept() - 0.3).abs() < 1e-9);
    assert!((trend.r_squared(&s) - 1.0).abs() < 1e-9);
}

#[test]
fn test_noisy_fit_minimizes_residuals() {
    let s = series(&[(1, 1.0), (2, 3.0), (3, 2.0)]);
    let trend = LinearTrend::fit(&s).unwrap();
    // x̄ = 2, ȳ = 2, Sxy = 1, Sxx = 2
    assert!((trend.slope() - 0.5).abs() < 1e-12);
    assert!((trend.intercept() - 1.0).abs() < 1e-12);
    let r2 = trend.r_squared(&s);
    assert!(r2 > 0.0 && r2 < 1.0);
}

#[test]
fn test_fit_order_independent() {
    let a = series(&[(10, 1.0), (20, 2.5), (30, 2.9)]);
    let b = series(&[(30, 2.9), (10, 1.0), (20, 2.5)]);
    assert_eq!(LinearTrend::fit(&a).unwrap(), LinearTrend::fit(&b).unwrap());
}

#[test]
fn test_single_point_has_no_trend() {
    let err = LinearTrend::fit(&series(&[(10, 1.0)])).unwrap_err();
    assert!(matches!(
        err,
        Error::InsufficientData { ref configuration, points: 1 } if configuration == "local"
    ));
}

#[test]
fn test_empty_series_has_no_trend() {
    let empty = BenchmarkSeries::new("docker", Vec::new()).unwrap();
    assert!(matches!(
        LinearTrend::fit(&empty),
        Err(Error::InsufficientData { points: 0, .. })
    ));
}

#[test]
fn test_predict() {
    let trend = LinearTrend::new(2.0, 1.0);
    assert!((trend.predict(3.0) - 7.0).abs() < f64::EPSILON);
}

#[test]
fn test_clustered_large_iteration_counts() {
    // Uncentered sums around 3e18 lose every significant digit of n·Sxx = 6.
    let base = 1_000_000_000;
    let s = series(&[(base, 1.0), (base + 1, 1.25), (base + 2, 1.5)]);
    let trend = LinearTrend::fit(&s).unwrap();
    assert!((trend.slope() - 0.25).abs() < 1e-12);
    assert!((trend.intercept() + 249_999_999.0).abs() < 1e-6);
    assert!((trend.predict(1_000_000_001.0) - 1.25).abs() < 1e-6);
}
