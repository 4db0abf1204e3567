//! End-to-end tests for per-trial comparative plots

use cairn_report::locator::TrialDirectory;
use cairn_report::render::comparative::{PlotOptions, Y_LABEL};
use cairn_report::render::OutputFormat;
use cairn_report::{CatalogGeneration, ComparativePlotRenderer, Error, ResultLocator, Rgb};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Result document with `mean = slope * iter + 0.1` at the given counts.
fn result_json(iterations: &[u64], slope: f64) -> String {
    let records: Vec<String> = iterations
        .iter()
        .map(|&i| {
            #[allow(clippy::cast_precision_loss)]
            let mean = slope.mul_add(i as f64, 0.1);
            format!(r#"{{"parameters": {{"iter": {i}}}, "mean": {mean}, "stddev": 0.01}}"#)
        })
        .collect();
    format!(r#"{{"results": [{}]}}"#, records.join(", "))
}

fn trial(root: &Path, index: usize, files: &[(&str, &[u64])]) -> TrialDirectory {
    let dir = root.join(index.to_string());
    fs::create_dir_all(&dir).unwrap();
    for (name, iterations) in files {
        fs::write(dir.join(format!("{name}.json")), result_json(iterations, 0.02)).unwrap();
    }
    TrialDirectory::new(index, dir)
}

const FULL: &[u64] = &[10, 20, 30, 40, 50];
const SINGLE: &[u64] = &[10];
const NONE: &[u64] = &[];

fn core() -> ComparativePlotRenderer {
    ComparativePlotRenderer::new(CatalogGeneration::Core.catalog())
}

#[test]
fn test_three_configurations_three_trends() {
    let root = TempDir::new().unwrap();
    let t = trial(
        root.path(),
        1,
        &[("local", FULL), ("docker", FULL), ("cairn", FULL)],
    );

    let renderer = core();
    let figure = renderer.compose(&t, renderer.fresh_figure()).unwrap();
    assert_eq!(figure.legend_labels(), vec!["Local", "Docker", "Cairn"]);
    assert_eq!(figure.trend_line_count(), 3);
    assert_eq!(
        figure.colors(),
        vec![Rgb::BLUE, Rgb::BLUE, Rgb::GREEN, Rgb::GREEN, Rgb::RED, Rgb::RED]
    );
    assert_eq!(figure.y_label(), Y_LABEL);
}

#[test]
fn test_render_root_writes_plot_per_trial() {
    let root = TempDir::new().unwrap();
    trial(root.path(), 1, &[("local", FULL), ("docker", FULL), ("cairn", FULL)]);
    trial(root.path(), 2, &[("local", FULL)]);

    let written = core().render_root(root.path()).unwrap();
    assert_eq!(
        written,
        vec![root.path().join("1/plot.png"), root.path().join("2/plot.png")]
    );
    for path in &written {
        let png = fs::read(path).unwrap();
        assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));
    }
}

#[test]
fn test_svg_output_and_overwrite() {
    let root = TempDir::new().unwrap();
    trial(root.path(), 1, &[("local", FULL), ("cairn", FULL)]);
    let renderer =
        core().with_options(PlotOptions::default().format(OutputFormat::Svg).size(640, 480));

    let first = renderer.render_root(root.path()).unwrap();
    let again = renderer.render_root(root.path()).unwrap();
    assert_eq!(first, again);

    let svg = fs::read_to_string(&first[0]).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("Local"));
    let leftovers = fs::read_dir(root.path().join("1"))
        .unwrap()
        .filter(|e| {
            e.as_ref()
                .unwrap()
                .file_name()
                .to_string_lossy()
                .starts_with(".cairn-report-")
        })
        .count();
    assert_eq!(leftovers, 0);
}

#[test]
fn test_missing_configuration_omitted() {
    let root = TempDir::new().unwrap();
    let t = trial(root.path(), 1, &[("local", FULL), ("cairn", FULL)]);

    let renderer = core();
    let figure = renderer.compose(&t, renderer.fresh_figure()).unwrap();
    assert_eq!(figure.legend_labels(), vec!["Local", "Cairn"]);
    assert_eq!(figure.trend_line_count(), 2);
}

#[test]
fn test_single_point_has_no_trend_line() {
    let root = TempDir::new().unwrap();
    let t = trial(root.path(), 1, &[("local", FULL), ("docker", SINGLE)]);

    let renderer = core();
    let figure = renderer.compose(&t, renderer.fresh_figure()).unwrap();
    assert_eq!(figure.legend_labels(), vec!["Local", "Docker"]);
    assert_eq!(figure.trend_line_count(), 1);
}

#[test]
fn test_empty_series_skipped() {
    let root = TempDir::new().unwrap();
    let t = trial(root.path(), 1, &[("local", FULL), ("docker", NONE)]);

    let renderer = core();
    let figure = renderer.compose(&t, renderer.fresh_figure()).unwrap();
    assert_eq!(figure.legend_labels(), vec!["Local"]);
}

#[test]
fn test_trial_without_configurations_renders_empty_axes() {
    let root = TempDir::new().unwrap();
    trial(root.path(), 1, &[]);

    let written = core().render_root(root.path()).unwrap();
    assert!(written[0].exists());
}

#[test]
fn test_fresh_figure_per_trial() {
    let root = TempDir::new().unwrap();
    let first = trial(root.path(), 1, &[("local", FULL), ("docker", FULL)]);
    let second = trial(root.path(), 2, &[("cairn", FULL)]);

    let renderer = core();
    let a = renderer.compose(&first, renderer.fresh_figure()).unwrap();
    let b = renderer.compose(&second, renderer.fresh_figure()).unwrap();
    assert_eq!(a.legend_labels(), vec!["Local", "Docker"]);
    assert_eq!(b.legend_labels(), vec!["Cairn"]);
}

#[test]
fn test_malformed_file_fails_trial() {
    let root = TempDir::new().unwrap();
    let t = trial(root.path(), 1, &[("local", FULL)]);
    fs::write(t.path().join("docker.json"), r#"{"results": 3}"#).unwrap();

    let renderer = core();
    let err = renderer.compose(&t, renderer.fresh_figure()).unwrap_err();
    assert!(matches!(err, Error::MalformedResult { .. }));
    assert!(core().render_root(root.path()).is_err());
    assert!(!t.path().join("plot.png").exists());
}

#[test]
fn test_strict_locator_rejects_ambiguous_prefix() {
    let root = TempDir::new().unwrap();
    let t = trial(root.path(), 1, &[("local_a", FULL), ("local_b", FULL)]);

    let lenient = core();
    let figure = lenient.compose(&t, lenient.fresh_figure()).unwrap();
    assert_eq!(figure.legend_labels(), vec!["Local"]);

    let strict = core().with_locator(ResultLocator::new().strict(true));
    assert!(matches!(
        strict.compose(&t, strict.fresh_figure()),
        Err(Error::AmbiguousMatch { .. })
    ));
}
