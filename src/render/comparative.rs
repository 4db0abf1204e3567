//! Comparative per-trial plots
//!
//! For every configuration present in a trial: raw points with vertical error
//! bars (±1 stddev) and, when at least two points exist, the fitted linear
//! trend drawn over the series' own iteration range in the same color.
//!
//! Missing configurations are skipped: partial coverage across trials is
//! expected, so a configuration absent from a trial simply does not appear in
//! that trial's legend.

use super::{draw_figure, Figure, Layer, OutputFormat, DEFAULT_SIZE};
use crate::catalog::{ConfigurationCatalog, ConfigurationEntry};
use crate::locator::{enumerate_trials, ResultLocator, TrialDirectory};
use crate::series::SeriesLoader;
use crate::trend::{count_as_f64, LinearTrend};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Y axis description of comparative plots.
pub const Y_LABEL: &str = "Time (seconds)";

/// Base name of per-trial chart files.
pub const PLOT_STEM: &str = "plot";

/// Stroke width of trend overlays.
const TREND_WIDTH: u32 = 2;

/// What the x axis counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XAxis {
    /// Loop iterations inside one command
    #[default]
    Iterations,
    /// Repeated command invocations
    Runs,
}

impl XAxis {
    /// Axis description.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Iterations => "Number of iterations",
            Self::Runs => "Number of command runs",
        }
    }
}

/// Options for comparative plots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotOptions {
    format: OutputFormat,
    size: (u32, u32),
    x_axis: XAxis,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            size: DEFAULT_SIZE,
            x_axis: XAxis::Iterations,
        }
    }
}

impl PlotOptions {
    /// Set the image format
    #[must_use]
    pub const fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the canvas size in pixels
    #[must_use]
    pub const fn size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    /// Set what the x axis counts
    #[must_use]
    pub const fn x_axis(mut self, x_axis: XAxis) -> Self {
        self.x_axis = x_axis;
        self
    }
}

/// Renders one overlay chart per trial.
#[derive(Debug, Clone)]
pub struct ComparativePlotRenderer {
    catalog: ConfigurationCatalog,
    locator: ResultLocator,
    loader: SeriesLoader,
    options: PlotOptions,
}

impl ComparativePlotRenderer {
    /// Renderer over the given catalog with default options.
    #[must_use]
    pub fn new(catalog: ConfigurationCatalog) -> Self {
        Self {
            catalog,
            locator: ResultLocator::new(),
            loader: SeriesLoader::new(),
            options: PlotOptions::default(),
        }
    }

    /// Use a custom locator (extension, strict matching).
    #[must_use]
    pub fn with_locator(mut self, locator: ResultLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Use custom plot options.
    #[must_use]
    pub fn with_options(mut self, options: PlotOptions) -> Self {
        self.options = options;
        self
    }

    /// Active catalog.
    #[must_use]
    pub const fn catalog(&self) -> &ConfigurationCatalog {
        &self.catalog
    }

    /// Render every trial under `root`, in ascending trial order.
    ///
    /// # Errors
    ///
    /// Returns the first error of [`enumerate_trials`] or
    /// [`Self::render_trial`]. Trials rendered before the failure keep their
    /// charts; the failing trial leaves none.
    pub fn render_root(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let trials = enumerate_trials(root)?;
        let mut written = Vec::with_capacity(trials.len());
        for trial in &trials {
            written.push(self.render_trial(trial)?);
        }
        info!(root = %root.display(), trials = written.len(), "rendered comparative plots");
        Ok(written)
    }

    /// Compose and draw one trial's chart to [`Self::output_path`].
    ///
    /// # Errors
    ///
    /// See [`Self::compose`] and [`draw_figure`].
    pub fn render_trial(&self, trial: &TrialDirectory) -> Result<PathBuf> {
        let figure = self.compose(trial, self.fresh_figure())?;
        let path = self.output_path(trial);
        draw_figure(&figure, &path, self.options.format, self.options.size)?;

        info!(
            trial = trial.index(),
            configurations = figure.legend_labels().len(),
            path = %path.display(),
            "rendered trial"
        );
        Ok(path)
    }

    /// Empty render context with this renderer's axes.
    #[must_use]
    pub fn fresh_figure(&self) -> Figure {
        Figure::new(self.options.x_axis.label(), Y_LABEL)
    }

    /// `<trial>/plot.<ext>`: deterministic, so re-runs overwrite.
    #[must_use]
    pub fn output_path(&self, trial: &TrialDirectory) -> PathBuf {
        trial
            .path()
            .join(format!("{PLOT_STEM}.{}", self.options.format.extension()))
    }

    /// Add every present configuration of `trial` to `figure`, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns error if a trial directory cannot be listed, a result file is
    /// malformed, or (strict mode) a configuration matches several files.
    /// Absent configurations are skipped.
    pub fn compose(&self, trial: &TrialDirectory, mut figure: Figure) -> Result<Figure> {
        for entry in &self.catalog {
            self.add_configuration(trial, entry, &mut figure)?;
        }
        Ok(figure)
    }

    fn add_configuration(
        &self,
        trial: &TrialDirectory,
        entry: &ConfigurationEntry,
        figure: &mut Figure,
    ) -> Result<()> {
        let resolution = self.locator.resolve(trial.path(), entry.name())?;
        let Some(path) = resolution.path() else {
            debug!(trial = trial.index(), configuration = entry.name(), "absent, skipped");
            return Ok(());
        };

        let series = self.loader.load(path, entry.name())?;
        if series.is_empty() {
            debug!(trial = trial.index(), configuration = entry.name(), "empty series, skipped");
            return Ok(());
        }

        figure.push(Layer::ErrorBars {
            label: entry.display_label().to_string(),
            color: entry.color(),
            points: series
                .points()
                .iter()
                .map(|p| (count_as_f64(p.iterations()), p.mean(), p.stddev()))
                .collect(),
        });

        match LinearTrend::fit(&series) {
            Ok(trend) => {
                debug!(
                    trial = trial.index(),
                    configuration = entry.name(),
                    slope = trend.slope(),
                    intercept = trend.intercept(),
                    r_squared = trend.r_squared(&series),
                    "fitted trend"
                );
                figure.push(Layer::Line {
                    label: None,
                    color: entry.color(),
                    width: TREND_WIDTH,
                    points: trend.predict_series(&series),
                });
            }
            Err(Error::InsufficientData { points, .. }) => {
                debug!(
                    trial = trial.index(),
                    configuration = entry.name(),
                    points,
                    "single point, no trend line"
                );
            }
            Err(e) => return Err(e),
        }

        Ok(())
    }
}
