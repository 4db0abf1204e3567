//! Error types for cairn-report
//!
//! Every variant carries enough context (path, configuration, line) to tell the
//! operator which input file to look at.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// cairn-report error types
#[derive(Error, Debug)]
pub enum Error {
    /// No measurement file matches a configuration prefix in a trial
    #[error("no result file for configuration '{configuration}' in {}", .trial.display())]
    MissingInput {
        /// Catalog name that was looked up
        configuration: String,
        /// Trial directory that was searched
        trial: PathBuf,
    },

    /// More than one measurement file matches a configuration prefix (strict matching only)
    #[error(
        "configuration '{configuration}' matches {} files in {}: naming scheme is not unique",
        .candidates.len(),
        .trial.display()
    )]
    AmbiguousMatch {
        /// Catalog name that was looked up
        configuration: String,
        /// Trial directory that was searched
        trial: PathBuf,
        /// Every matching file, in lexical order
        candidates: Vec<PathBuf>,
    },

    /// Result document is missing expected keys or holds non-numeric values
    #[error("malformed result file {}: {reason}", .path.display())]
    MalformedResult {
        /// Offending file
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// Measurement points violate series invariants (unique counts, valid durations)
    #[error("invalid series for configuration '{configuration}': {reason}")]
    InvalidSeries {
        /// Configuration the series belongs to
        configuration: String,
        /// Which invariant was violated
        reason: String,
    },

    /// Commit timing log line could not be parsed
    #[error("malformed log {} at line {line}: {reason}", .path.display())]
    MalformedLog {
        /// Offending file
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// Fewer than two points for a trend fit
    #[error("cannot fit a trend for '{configuration}': {points} point(s), need at least 2")]
    InsufficientData {
        /// Series that was too short
        configuration: String,
        /// Number of points available
        points: usize,
    },

    /// Baseline duration of zero makes normalization undefined
    #[error("baseline mean is zero at commit position {position}: input is corrupted")]
    ZeroBaseline {
        /// Position (0 = most recent commit)
        position: usize,
    },

    /// Baseline and compared series are not positionally aligned
    #[error("series are not aligned: baseline has {baseline} commits, compared series has {compared}")]
    LengthMismatch {
        /// Baseline length
        baseline: usize,
        /// Compared series length
        compared: usize,
    },

    /// Trial numbering under a result root is not contiguous from 1
    #[error(
        "trial directory {missing} is missing under {} (expected trials 1..={expected})",
        .root.display()
    )]
    NonContiguousTrials {
        /// Result root
        root: PathBuf,
        /// First missing trial index
        missing: usize,
        /// Number of subdirectories found
        expected: usize,
    },

    /// Result root does not exist or is not a directory
    #[error("result root {} does not exist or is not a directory", .0.display())]
    ResultRootNotFound(PathBuf),

    /// Configuration catalog violates its invariants
    #[error("invalid configuration catalog: {0}")]
    InvalidCatalog(String),

    /// Chart backend failure
    #[error("render error: {0}")]
    Render(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for [`Error::MalformedResult`].
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedResult {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether a plotting consumer may skip the configuration and carry on.
    #[must_use]
    pub const fn is_skippable(&self) -> bool {
        matches!(self, Self::MissingInput { .. })
    }
}
