//! Baseline-normalized trend over commits
//!
//! Input logs hold one whitespace-separated record per line:
//!
//! ```text
//! <tool> <sample> <commit> <seconds>
//! make   0        3        1.82
//! rattle 0        3        4.10
//! ```
//!
//! Records of the baseline tool (`make` by default) form the baseline, every
//! other tool is the compared tool. Per log, durations are averaged per commit
//! ordinal and ordered by descending ordinal, so position 0 is the most recent
//! commit. Compared series are divided by the baseline **positionally**; the
//! two logs must therefore cover the same commits.

use super::{draw_figure, Figure, Layer, OutputFormat, Scale, DEFAULT_SIZE};
use crate::catalog::Rgb;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::ops::Index;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default name of the baseline tool in commit logs.
pub const DEFAULT_BASELINE_TOOL: &str = "make";

/// X axis description.
pub const X_LABEL: &str = "Commits from HEAD";

/// Y axis description.
pub const Y_LABEL: &str = "Runtime (log scale)";

/// The x axis always spans at least this many commits.
pub const MIN_COMMIT_SPAN: f64 = 10.0;

/// Which side of the comparison a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// Reference tool every series is divided by
    Baseline,
    /// Tool being compared against the baseline
    Compared,
}

/// One timed build at one commit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommitRecord {
    /// Baseline or compared
    pub tool: ToolKind,
    /// Repetition index at this commit
    pub sample: u64,
    /// Commit ordinal (higher = more recent)
    pub commit: u64,
    /// Wall-clock duration in seconds
    pub seconds: f64,
}

/// Parsed commit timing log.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitLog {
    path: PathBuf,
    records: Vec<CommitRecord>,
}

impl CommitLog {
    /// Read and parse a log file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or a line is malformed.
    pub fn load(path: &Path, baseline_tool: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(path, &raw, baseline_tool)
    }

    /// Parse log text; `path` is only used in error messages.
    ///
    /// Blank lines are ignored, tokens after the fourth are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedLog`] for lines with fewer than four fields,
    /// non-integer sample/commit values, or a negative/non-numeric duration.
    pub fn parse(path: &Path, raw: &str, baseline_tool: &str) -> Result<Self> {
        let mut records = Vec::new();

        for (i, line) in raw.lines().enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            let malformed = |reason: String| Error::MalformedLog {
                path: path.to_path_buf(),
                line: i + 1,
                reason,
            };
            if fields.len() < 4 {
                return Err(malformed(format!("expected 4 fields, found {}", fields.len())));
            }

            let tool = if fields[0] == baseline_tool {
                ToolKind::Baseline
            } else {
                ToolKind::Compared
            };
            let sample = fields[1]
                .parse()
                .map_err(|_| malformed(format!("sample index '{}' is not an integer", fields[1])))?;
            let commit = fields[2]
                .parse()
                .map_err(|_| malformed(format!("commit ordinal '{}' is not an integer", fields[2])))?;
            let seconds: f64 = fields[3]
                .parse()
                .map_err(|_| malformed(format!("duration '{}' is not numeric", fields[3])))?;
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(malformed(format!("duration {seconds} is not a valid duration")));
            }

            records.push(CommitRecord {
                tool,
                sample,
                commit,
                seconds,
            });
        }

        debug!(path = %path.display(), records = records.len(), "parsed commit log");
        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    /// Source path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records in file order.
    #[must_use]
    pub fn records(&self) -> &[CommitRecord] {
        &self.records
    }

    /// Per-commit mean duration of one tool kind, most recent commit first.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn per_commit_means(&self, tool: ToolKind) -> Samples {
        let mut groups: BTreeMap<u64, (f64, usize)> = BTreeMap::new();
        for record in self.records.iter().filter(|r| r.tool == tool) {
            let group = groups.entry(record.commit).or_insert((0.0, 0));
            group.0 += record.seconds;
            group.1 += 1;
        }

        Samples::new(
            groups
                .into_values()
                .rev()
                .map(|(sum, count)| sum / count as f64)
                .collect(),
        )
    }
}

/// A dense vector of per-position values with elementwise operations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Samples(Vec<f64>);

impl Samples {
    /// Wrap values.
    #[must_use]
    pub const fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Number of positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Values in position order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Elementwise division by `baseline`, position by position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if the lengths differ and
    /// [`Error::ZeroBaseline`] if any baseline value is zero.
    pub fn div(&self, baseline: &Self) -> Result<Self> {
        if self.len() != baseline.len() {
            return Err(Error::LengthMismatch {
                baseline: baseline.len(),
                compared: self.len(),
            });
        }
        if let Some(position) = baseline.0.iter().position(|v| *v == 0.0) {
            return Err(Error::ZeroBaseline { position });
        }

        Ok(Self(
            self.0
                .iter()
                .zip(&baseline.0)
                .map(|(value, base)| value / base)
                .collect(),
        ))
    }

    /// `(position, value)` pairs for plotting.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.0
            .iter()
            .enumerate()
            .map(|(i, v)| (i as f64, *v))
            .collect()
    }
}

impl Index<usize> for Samples {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

/// Baseline and both compared series, all divided by the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedComparison {
    /// Baseline against itself (all ones)
    pub baseline: Samples,
    /// Compared tool from the first log
    pub compared_a: Samples,
    /// Compared tool from the second log
    pub compared_b: Samples,
}

impl NormalizedComparison {
    /// Normalize the compared series of both logs by the first log's baseline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if the series are not positionally
    /// aligned and [`Error::ZeroBaseline`] if a baseline mean is zero.
    pub fn from_logs(log_a: &CommitLog, log_b: &CommitLog) -> Result<Self> {
        let baseline = log_a.per_commit_means(ToolKind::Baseline);
        if baseline.is_empty() {
            warn!(path = %log_a.path().display(), "no baseline records");
        }

        let comparison = Self {
            baseline: baseline.div(&baseline)?,
            compared_a: log_a.per_commit_means(ToolKind::Compared).div(&baseline)?,
            compared_b: log_b.per_commit_means(ToolKind::Compared).div(&baseline)?,
        };
        debug!(commits = baseline.len(), "normalized commit series");
        Ok(comparison)
    }
}

/// Options for the normalized trend chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendOptions {
    title: String,
    baseline_tool: String,
    labels: [String; 3],
    size: (u32, u32),
}

impl Default for TrendOptions {
    fn default() -> Self {
        Self {
            title: "Make vs Rattle(Cairn) vs Rattle(fsatrace)".to_string(),
            baseline_tool: DEFAULT_BASELINE_TOOL.to_string(),
            labels: [
                DEFAULT_BASELINE_TOOL.to_string(),
                "rattle (cairn)".to_string(),
                "rattle (fsatrace)".to_string(),
            ],
            size: DEFAULT_SIZE,
        }
    }
}

impl TrendOptions {
    /// Set the chart caption
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the tool name treated as baseline (also its legend label)
    #[must_use]
    pub fn baseline_tool(mut self, tool: impl Into<String>) -> Self {
        self.baseline_tool = tool.into();
        self.labels[0] = self.baseline_tool.clone();
        self
    }

    /// Set the legend labels of the two compared series
    #[must_use]
    pub fn compared_labels(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.labels[1] = a.into();
        self.labels[2] = b.into();
        self
    }

    /// Set the canvas size in pixels
    #[must_use]
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }
}

/// Line colors: baseline, compared A, compared B.
const LINE_COLORS: [Rgb; 3] = [Rgb(31, 119, 180), Rgb(255, 127, 14), Rgb(44, 160, 44)];

/// Renders the normalized commit trend of two logs.
#[derive(Debug, Clone, Default)]
pub struct NormalizedTrendRenderer {
    options: TrendOptions,
}

impl NormalizedTrendRenderer {
    /// Renderer with the given options.
    #[must_use]
    pub const fn new(options: TrendOptions) -> Self {
        Self { options }
    }

    /// Default output path: the first log's path with `.png` appended.
    #[must_use]
    pub fn default_output(log_a: &Path) -> PathBuf {
        let mut name = log_a.as_os_str().to_os_string();
        name.push(".png");
        PathBuf::from(name)
    }

    /// Load both logs, normalize, and draw to `output` (format from extension).
    ///
    /// # Errors
    ///
    /// Returns error if a log cannot be read or parsed, the series cannot be
    /// normalized, or drawing fails. Nothing is written on error.
    pub fn render(&self, log_a: &Path, log_b: &Path, output: &Path) -> Result<PathBuf> {
        let a = CommitLog::load(log_a, &self.options.baseline_tool)?;
        let b = CommitLog::load(log_b, &self.options.baseline_tool)?;
        let comparison = NormalizedComparison::from_logs(&a, &b)?;

        let figure = self.compose(&comparison, self.fresh_figure());
        draw_figure(&figure, output, OutputFormat::from_path(output), self.options.size)?;

        info!(path = %output.display(), commits = comparison.baseline.len(), "rendered commit trend");
        Ok(output.to_path_buf())
    }

    /// Empty log-scale figure with the commit axis.
    #[must_use]
    pub fn fresh_figure(&self) -> Figure {
        Figure::new(X_LABEL, Y_LABEL)
            .title(self.options.title.as_str())
            .y_scale(Scale::Log)
            .min_x_span(0.0..MIN_COMMIT_SPAN)
    }

    /// Add the three normalized lines to `figure`.
    #[must_use]
    pub fn compose(&self, comparison: &NormalizedComparison, mut figure: Figure) -> Figure {
        let series = [
            &comparison.baseline,
            &comparison.compared_a,
            &comparison.compared_b,
        ];
        for ((samples, label), color) in series.iter().zip(&self.options.labels).zip(LINE_COLORS) {
            figure.push(Layer::Line {
                label: Some(label.clone()),
                color,
                width: 2,
                points: samples.points(),
            });
        }
        figure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(raw: &str) -> CommitLog {
        CommitLog::parse(Path::new("log.txt"), raw, DEFAULT_BASELINE_TOOL).unwrap()
    }

    #[test]
    fn test_per_commit_means_descending() {
        let log = log("make 0 1 1.0\nmake 1 1 3.0\nmake 0 2 4.0\nrattle 0 2 8.0\n");
        let means = log.per_commit_means(ToolKind::Baseline);
        assert_eq!(means.as_slice(), &[4.0, 2.0]);
        assert_eq!(log.per_commit_means(ToolKind::Compared).as_slice(), &[8.0]);
    }

    #[test]
    fn test_blank_lines_and_extra_tokens() {
        let log = log("\nmake 0 1 1.0 trailing\n\n");
        assert_eq!(log.records().len(), 1);
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let err = CommitLog::parse(Path::new("log.txt"), "make 0 1 1.0\nmake x 1 1.0\n", "make")
            .unwrap_err();
        assert!(matches!(err, Error::MalformedLog { line: 2, .. }));
    }

    #[test]
    fn test_short_line_rejected() {
        let err = CommitLog::parse(Path::new("log.txt"), "make 0 1\n", "make").unwrap_err();
        assert!(err.to_string().contains("expected 4 fields"));
    }

    #[test]
    fn test_div_zero_baseline() {
        let err = Samples::new(vec![1.0, 2.0])
            .div(&Samples::new(vec![1.0, 0.0]))
            .unwrap_err();
        assert!(matches!(err, Error::ZeroBaseline { position: 1 }));
    }

    #[test]
    fn test_div_length_mismatch() {
        let err = Samples::new(vec![1.0])
            .div(&Samples::new(vec![1.0, 2.0]))
            .unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { baseline: 2, compared: 1 }));
    }

    #[test]
    fn test_default_output_appends_png() {
        assert_eq!(
            NormalizedTrendRenderer::default_output(Path::new("/logs/cairn.txt")),
            PathBuf::from("/logs/cairn.txt.png")
        );
    }

    #[test]
    fn test_compose_three_labelled_lines() {
        let a = log("make 0 1 2.0\nmake 0 2 4.0\nrattle 0 1 4.0\nrattle 0 2 12.0\n");
        let b = log("rattle 0 1 3.0\nrattle 0 2 4.0\n");
        let comparison = NormalizedComparison::from_logs(&a, &b).unwrap();
        assert_eq!(comparison.compared_a.as_slice(), &[3.0, 2.0]);
        assert_eq!(comparison.compared_b.as_slice(), &[1.0, 1.5]);

        let renderer = NormalizedTrendRenderer::default();
        let figure = renderer.compose(&comparison, renderer.fresh_figure());
        assert_eq!(
            figure.legend_labels(),
            vec!["make", "rattle (cairn)", "rattle (fsatrace)"]
        );
        assert_eq!(figure.scale(), Scale::Log);
    }
}
