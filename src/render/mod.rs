//! Rendering - per-trial figures and write-once report artifacts
//!
//! A [`Figure`] is the explicit render context: renderers build a fresh one per
//! trial, pass it through the composition step and hand it back, and only then
//! is it drawn. Nothing about a figure outlives the trial it was built for.
//!
//! Artifacts are written atomically: the backend draws into a temporary file
//! in the destination directory, which is renamed over the final path only
//! once drawing succeeded. A failed render leaves no partial file behind.
//!
//! - [`comparative`]: per-trial error-bar chart with trend overlays
//! - [`normalized`]: baseline-normalized, log-scale trend over commits
//! - [`table`]: LaTeX summary table across experiment groups

pub mod comparative;
pub mod normalized;
pub mod table;

use crate::catalog::Rgb;
use crate::{Error, Result};
use plotters::coord::{CoordTranslate, Shift};
use plotters::prelude::*;
use std::fmt;
use std::ops::Range;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Default canvas size in pixels.
pub const DEFAULT_SIZE: (u32, u32) = (1024, 768);

/// Image format of chart artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Raster PNG
    #[default]
    Png,
    /// Vector SVG
    Svg,
}

impl OutputFormat {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }

    /// Infer the format from a path's extension (defaults to PNG).
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => Self::Svg,
            _ => Self::Png,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            other => Err(Error::Render(format!("unsupported output format '{other}'"))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Vertical axis scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    /// Linear, starting at zero
    #[default]
    Linear,
    /// Base-10 logarithmic
    Log,
}

/// One drawable element of a figure.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    /// Points with vertical error bars: `(x, mean, stddev)`.
    ErrorBars {
        /// Legend label
        label: String,
        /// Marker color
        color: Rgb,
        /// `(x, mean, stddev)` triples
        points: Vec<(f64, f64, f64)>,
    },
    /// Polyline, optionally labelled.
    Line {
        /// Legend label (`None` keeps the line out of the legend)
        label: Option<String>,
        /// Stroke color
        color: Rgb,
        /// Stroke width in pixels
        width: u32,
        /// Vertices
        points: Vec<(f64, f64)>,
    },
}

impl Layer {
    fn label(&self) -> Option<&str> {
        match self {
            Self::ErrorBars { label, .. } => Some(label),
            Self::Line { label, .. } => label.as_deref(),
        }
    }

    const fn color(&self) -> Rgb {
        match self {
            Self::ErrorBars { color, .. } | Self::Line { color, .. } => *color,
        }
    }

    /// Extents as `(x, y_low, y_high)` samples.
    fn extents(&self) -> Vec<(f64, f64, f64)> {
        match self {
            Self::ErrorBars { points, .. } => points
                .iter()
                .map(|&(x, mean, stddev)| (x, mean - stddev, mean + stddev))
                .collect(),
            Self::Line { points, .. } => points.iter().map(|&(x, y)| (x, y, y)).collect(),
        }
    }
}

/// Render context for one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    title: Option<String>,
    x_label: String,
    y_label: String,
    y_scale: Scale,
    min_x_span: Option<Range<f64>>,
    layers: Vec<Layer>,
}

impl Figure {
    /// Empty figure with axis descriptions.
    #[must_use]
    pub fn new(x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: None,
            x_label: x_label.into(),
            y_label: y_label.into(),
            y_scale: Scale::Linear,
            min_x_span: None,
            layers: Vec::new(),
        }
    }

    /// Set a caption.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the vertical scale.
    #[must_use]
    pub fn y_scale(mut self, scale: Scale) -> Self {
        self.y_scale = scale;
        self
    }

    /// Guarantee the x axis covers at least this range.
    #[must_use]
    pub fn min_x_span(mut self, span: Range<f64>) -> Self {
        self.min_x_span = Some(span);
        self
    }

    /// Add a layer on top of the existing ones.
    pub fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Layers in drawing order.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Caption, if any.
    #[must_use]
    pub fn caption(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Horizontal axis description.
    #[must_use]
    pub fn x_label(&self) -> &str {
        &self.x_label
    }

    /// Vertical axis description.
    #[must_use]
    pub fn y_label(&self) -> &str {
        &self.y_label
    }

    /// Vertical scale.
    #[must_use]
    pub const fn scale(&self) -> Scale {
        self.y_scale
    }

    /// Legend entries in drawing order.
    #[must_use]
    pub fn legend_labels(&self) -> Vec<&str> {
        self.layers.iter().filter_map(Layer::label).collect()
    }

    /// Colors of all layers in drawing order.
    #[must_use]
    pub fn colors(&self) -> Vec<Rgb> {
        self.layers.iter().map(Layer::color).collect()
    }

    /// Number of unlabelled polylines (trend overlays).
    #[must_use]
    pub fn trend_line_count(&self) -> usize {
        self.layers
            .iter()
            .filter(|l| matches!(l, Layer::Line { label: None, .. }))
            .count()
    }

    /// Check if nothing has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Axis ranges covering every layer, padded.
    fn bounds(&self) -> (Range<f64>, Range<f64>) {
        let samples: Vec<(f64, f64, f64)> = self.layers.iter().flat_map(Layer::extents).collect();

        let mut x_min = samples.iter().map(|s| s.0).fold(f64::INFINITY, f64::min);
        let mut x_max = samples.iter().map(|s| s.0).fold(f64::NEG_INFINITY, f64::max);
        if let Some(span) = &self.min_x_span {
            x_min = x_min.min(span.start);
            x_max = x_max.max(span.end);
        }
        if !x_min.is_finite() || !x_max.is_finite() {
            (x_min, x_max) = (0.0, 1.0);
        }
        let x_pad = if x_max > x_min { (x_max - x_min) * 0.05 } else { 1.0 };
        let x_range = if self.min_x_span.is_some() {
            x_min..x_max.max(x_min + 1.0)
        } else {
            (x_min - x_pad)..(x_max + x_pad)
        };

        let y_high = samples.iter().map(|s| s.2).fold(f64::NEG_INFINITY, f64::max);
        let y_range = match self.y_scale {
            Scale::Linear => {
                let y_low = samples.iter().map(|s| s.1).fold(0.0, f64::min);
                let top = if y_high.is_finite() && y_high > 0.0 { y_high * 1.1 } else { 1.0 };
                let bottom = if y_low < 0.0 { y_low - 0.1 * (top - y_low) } else { 0.0 };
                bottom..top
            }
            Scale::Log => {
                let low = samples
                    .iter()
                    .map(|s| s.1)
                    .filter(|v| *v > 0.0)
                    .fold(f64::INFINITY, f64::min);
                let low = if low.is_finite() { low * 0.8 } else { 0.1 };
                let high = if y_high.is_finite() && y_high > low {
                    y_high * 1.25
                } else {
                    low * 10.0
                };
                low..high
            }
        };

        (x_range, y_range)
    }
}

/// Draw a figure to `path` in the given format, atomically.
///
/// # Errors
///
/// Returns [`Error::Render`] if the backend fails and [`Error::Io`] if the
/// artifact cannot be moved into place.
pub fn draw_figure(
    figure: &Figure,
    path: &Path,
    format: OutputFormat,
    size: (u32, u32),
) -> Result<()> {
    write_atomically(path, format.extension(), |tmp| {
        match format {
            OutputFormat::Png => {
                let root = BitMapBackend::new(tmp, size).into_drawing_area();
                draw_on(&root, figure)?;
                root.present().map_err(render_err)?;
            }
            OutputFormat::Svg => {
                let root = SVGBackend::new(tmp, size).into_drawing_area();
                draw_on(&root, figure)?;
                root.present().map_err(render_err)?;
            }
        }
        Ok(())
    })?;

    debug!(path = %path.display(), layers = figure.layers().len(), "wrote figure");
    Ok(())
}

/// Write an artifact through a temporary sibling file that is renamed over
/// `dest` only if `write` succeeds.
///
/// # Errors
///
/// Propagates the error of `write`; IO errors creating or persisting the
/// temporary file.
pub fn write_atomically<F>(dest: &Path, extension: &str, write: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp = tempfile::Builder::new()
        .prefix(".cairn-report-")
        .suffix(&format!(".{extension}"))
        .tempfile_in(dir)?
        .into_temp_path();

    // On error `tmp` is dropped here, which removes the partial file.
    write(&tmp)?;
    tmp.persist(dest).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

fn render_err<E: fmt::Display>(e: E) -> Error {
    Error::Render(e.to_string())
}

fn draw_on<DB>(root: &DrawingArea<DB, Shift>, figure: &Figure) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(render_err)?;
    let (x_range, y_range) = figure.bounds();

    let mut builder = ChartBuilder::on(root);
    builder
        .margin(20)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 50);
    if let Some(title) = figure.caption() {
        builder.caption(title, ("sans-serif", 24));
    }

    match figure.scale() {
        Scale::Linear => {
            let mut chart = builder
                .build_cartesian_2d(x_range, y_range)
                .map_err(render_err)?;
            chart
                .configure_mesh()
                .x_desc(figure.x_label())
                .y_desc(figure.y_label())
                .draw()
                .map_err(render_err)?;
            draw_layers(&mut chart, figure)
        }
        Scale::Log => {
            let mut chart = builder
                .build_cartesian_2d(x_range, y_range.log_scale())
                .map_err(render_err)?;
            chart
                .configure_mesh()
                .x_desc(figure.x_label())
                .y_desc(figure.y_label())
                .y_label_formatter(&|v| format!("{v:.2}"))
                .draw()
                .map_err(render_err)?;
            draw_layers(&mut chart, figure)
        }
    }
}

fn draw_layers<'a, DB, CT>(chart: &mut ChartContext<'a, DB, CT>, figure: &Figure) -> Result<()>
where
    DB: DrawingBackend + 'a,
    CT: CoordTranslate<From = (f64, f64)>,
{
    for layer in figure.layers() {
        match layer {
            Layer::ErrorBars {
                label,
                color,
                points,
            } => {
                let color = RGBColor::from(*color);
                chart
                    .draw_series(points.iter().map(|&(x, mean, stddev)| {
                        ErrorBar::new_vertical(
                            x,
                            mean - stddev,
                            mean,
                            mean + stddev,
                            color.stroke_width(1),
                            8,
                        )
                    }))
                    .map_err(render_err)?;
                chart
                    .draw_series(
                        points
                            .iter()
                            .map(|&(x, mean, _)| Circle::new((x, mean), 4, color.filled())),
                    )
                    .map_err(render_err)?
                    .label(label.as_str())
                    .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));
            }
            Layer::Line {
                label,
                color,
                width,
                points,
            } => {
                let color = RGBColor::from(*color);
                let width = *width;
                let anno = chart
                    .draw_series(LineSeries::new(
                        points.iter().copied(),
                        color.stroke_width(width),
                    ))
                    .map_err(render_err)?;
                if let Some(label) = label {
                    anno.label(label.as_str()).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(width))
                    });
                }
            }
        }
    }

    if !figure.legend_labels().is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperLeft)
            .draw()
            .map_err(render_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(points: Vec<(f64, f64, f64)>) -> Layer {
        Layer::ErrorBars {
            label: "local".to_string(),
            color: Rgb::BLUE,
            points,
        }
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("a/plot.SVG")), OutputFormat::Svg);
        assert_eq!(OutputFormat::from_path(Path::new("a/plot.png")), OutputFormat::Png);
        assert_eq!(OutputFormat::from_path(Path::new("a/log")), OutputFormat::Png);
        assert_eq!("svg".parse::<OutputFormat>().unwrap(), OutputFormat::Svg);
        assert!("gif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_linear_bounds_include_error_bars() {
        let mut figure = Figure::new("x", "y");
        figure.push(bars(vec![(10.0, 1.0, 0.5), (50.0, 5.0, 1.0)]));
        let (x, y) = figure.bounds();
        assert!(x.start < 10.0 && x.end > 50.0);
        assert!(y.start.abs() < f64::EPSILON);
        assert!(y.end >= 6.0);
    }

    #[test]
    fn test_linear_bounds_extend_below_zero() {
        let mut figure = Figure::new("x", "y");
        figure.push(bars(vec![(10.0, 0.05, 0.2)]));
        figure.push(Layer::Line {
            label: None,
            color: Rgb::BLUE,
            width: 2,
            points: vec![(10.0, -0.4), (50.0, 2.0)],
        });
        let (_, y) = figure.bounds();
        assert!(y.start < -0.4);
        assert!(y.end > 2.0);
    }

    #[test]
    fn test_log_bounds_positive() {
        let mut figure = Figure::new("x", "y").y_scale(Scale::Log).min_x_span(0.0..10.0);
        figure.push(Layer::Line {
            label: Some("make".to_string()),
            color: Rgb::BLACK,
            width: 2,
            points: vec![(0.0, 1.0), (1.0, 3.0)],
        });
        let (x, y) = figure.bounds();
        assert!((x.start - 0.0).abs() < f64::EPSILON);
        assert!((x.end - 10.0).abs() < f64::EPSILON);
        assert!(y.start > 0.0 && y.start < 1.0);
        assert!(y.end > 3.0);
    }

    #[test]
    fn test_empty_figure_bounds() {
        let (x, y) = Figure::new("x", "y").bounds();
        assert!(x.end > x.start);
        assert!(y.end > y.start);
    }

    #[test]
    fn test_write_atomically_discards_on_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("plot.png");
        let result = write_atomically(&dest, "png", |tmp| {
            std::fs::write(tmp, b"partial")?;
            Err(Error::Render("boom".to_string()))
        });
        assert!(result.is_err());
        assert!(!dest.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_write_atomically_replaces() {
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("results.tex");
        std::fs::write(&dest, "old").unwrap();
        write_atomically(&dest, "tex", |tmp| Ok(std::fs::write(tmp, "new")?)).unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "new");
    }
}
