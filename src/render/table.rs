//! LaTeX summary table
//!
//! One row per trial of every experiment group under the table root: the
//! trial's command line followed by one `mean(stddev)` cell per catalog entry,
//! both in milliseconds truncated towards zero.
//!
//! Unlike the plots, a table row cannot have holes, so a configuration missing
//! from any trial aborts the whole table.

use super::write_atomically;
use crate::catalog::ConfigurationCatalog;
use crate::locator::{enumerate_trials, experiment_groups, ResultLocator, TrialDirectory};
use crate::series::{MeasurementPoint, SeriesLoader};
use crate::Result;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File holding a trial's command line.
pub const COMMAND_FILE: &str = "run.sh";

/// File name of the table artifact under the table root.
pub const TABLE_FILE: &str = "results.tex";

const FOOTER: &str = r"    \bottomrule
    \end{tabularx}
    \caption{...}
    \label{tab:...}
\end{table}
";

/// Escape a string for use inside `\texttt{}`.
///
/// Only underscores appear in practice; they become `\_`.
#[must_use]
pub fn escape_latex(raw: &str) -> String {
    raw.replace('_', r"\_")
}

/// Format a measurement as `mean(stddev)` in whole milliseconds.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_cell(point: &MeasurementPoint) -> String {
    let mean = (point.mean() * 1000.0).trunc() as u64;
    let stddev = (point.stddev() * 1000.0).trunc() as u64;
    format!("{mean}({stddev})")
}

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialReportRow {
    command: String,
    cells: Vec<String>,
}

impl TrialReportRow {
    /// Build a row from a raw command line and formatted measurement cells.
    #[must_use]
    pub fn new(command: &str, cells: Vec<String>) -> Self {
        Self {
            command: format!(r"\texttt{{{}}}", escape_latex(command.trim_end())),
            cells,
        }
    }

    /// The escaped, `\texttt`-wrapped command cell.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Measurement cells in catalog order.
    #[must_use]
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Total cell count, command included.
    #[must_use]
    pub fn width(&self) -> usize {
        1 + self.cells.len()
    }

    /// `    a & b & c \\ `
    #[must_use]
    pub fn to_latex(&self) -> String {
        let mut line = String::from("    ");
        line.push_str(&self.command);
        for cell in &self.cells {
            line.push_str(" & ");
            line.push_str(cell);
        }
        line.push_str(r" \\ ");
        line
    }
}

/// Complete table document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryTable {
    labels: Vec<String>,
    rows: Vec<TrialReportRow>,
}

impl SummaryTable {
    /// Empty table whose columns follow `catalog`.
    #[must_use]
    pub fn new(catalog: &ConfigurationCatalog) -> Self {
        Self {
            labels: catalog
                .iter()
                .map(|e| e.display_label().to_string())
                .collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row.
    pub fn push(&mut self, row: TrialReportRow) {
        self.rows.push(row);
    }

    /// Rows in insertion order.
    #[must_use]
    pub fn rows(&self) -> &[TrialReportRow] {
        &self.rows
    }

    /// Column specification and header row, derived from the catalog labels.
    #[must_use]
    pub fn header(&self) -> String {
        let mut header = String::from("\n\\begin{table}[H]\n    \\centering\n");
        header.push_str("    \\begin{tabularx}{0.8\\textwidth}{\n        l\n");
        let _ = writeln!(
            header,
            "       *{{{}}}{{>{{\\centering\\arraybackslash}}X}}",
            self.labels.len()
        );
        header.push_str("    }\\toprule\n    ");
        for label in &self.labels {
            let _ = write!(header, "& {{{label}}} ");
        }
        header.truncate(header.trim_end().len());
        header.push_str("\\\\\\midrule\n");
        header
    }

    /// Full LaTeX document fragment.
    #[must_use]
    pub fn to_latex(&self) -> String {
        let mut out = self.header();
        for row in &self.rows {
            out.push_str(&row.to_latex());
            out.push('\n');
        }
        out.push_str(FOOTER);
        out
    }
}

/// Builds `results.tex` from grouped trial results.
#[derive(Debug, Clone)]
pub struct SummaryTableRenderer {
    catalog: ConfigurationCatalog,
    locator: ResultLocator,
    loader: SeriesLoader,
}

impl SummaryTableRenderer {
    /// Renderer over the given catalog.
    #[must_use]
    pub fn new(catalog: ConfigurationCatalog) -> Self {
        Self {
            catalog,
            locator: ResultLocator::new(),
            loader: SeriesLoader::new(),
        }
    }

    /// Use a custom locator (extension, strict matching).
    #[must_use]
    pub fn with_locator(mut self, locator: ResultLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Collect every row under `root` without writing anything.
    ///
    /// Groups in lexical order (`stress` excluded), trials ascending.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MissingInput`] if any configuration is absent
    /// from any trial, plus IO and parse errors of the inputs.
    pub fn build(&self, root: &Path) -> Result<SummaryTable> {
        let mut table = SummaryTable::new(&self.catalog);
        for group in experiment_groups(root)? {
            let trials = enumerate_trials(&group)?;
            debug!(group = %group.display(), trials = trials.len(), "collecting group");
            for trial in &trials {
                table.push(self.row(trial)?);
            }
        }
        Ok(table)
    }

    /// One row for one trial.
    ///
    /// # Errors
    ///
    /// Returns error if `run.sh` cannot be read or any configuration is
    /// missing or malformed.
    pub fn row(&self, trial: &TrialDirectory) -> Result<TrialReportRow> {
        let command = fs::read_to_string(trial.path().join(COMMAND_FILE))?;

        let mut cells = Vec::with_capacity(self.catalog.len());
        for entry in &self.catalog {
            let path = self.locator.require(trial.path(), entry.name())?;
            let point = self.loader.load_representative(&path)?;
            cells.push(format_cell(&point));
        }
        Ok(TrialReportRow::new(&command, cells))
    }

    /// Build the table and write it to `root/results.tex`.
    ///
    /// # Errors
    ///
    /// See [`Self::build`]. On error no table file is written.
    pub fn render_root(&self, root: &Path) -> Result<PathBuf> {
        let table = self.build(root)?;
        let path = root.join(TABLE_FILE);
        let latex = table.to_latex();
        write_atomically(&path, "tex", |tmp| Ok(fs::write(tmp, latex.as_bytes())?))?;

        info!(path = %path.display(), rows = table.rows().len(), "wrote summary table");
        Ok(path)
    }
}
