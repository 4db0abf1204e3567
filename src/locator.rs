//! Result discovery - trial enumeration and configuration file lookup
//!
//! Layout consumed:
//!
//! ```text
//! <root>/<trial>/<configuration>*.json          per-trial plots
//! <root>/<group>/<trial>/<configuration>*.json   summary table
//! <root>/<group>/<trial>/run.sh
//! <root>/stress/                                 reserved, never aggregated
//! ```
//!
//! Matching is a **prefix** match on the file name plus an extension check.
//! Candidates are always returned in lexical order, and when several match the
//! first one wins. That tie-break signals a non-unique naming scheme, so it is
//! reported with `warn!` (or rejected outright in strict mode).

use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory name reserved for stress runs, excluded from table aggregation.
pub const STRESS_DIR: &str = "stress";

/// Default extension of measurement files.
pub const DEFAULT_EXTENSION: &str = "json";

/// One numbered trial directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialDirectory {
    index: usize,
    path: PathBuf,
}

impl TrialDirectory {
    /// Create a trial directory handle (`index` starts at 1).
    #[must_use]
    pub fn new(index: usize, path: impl Into<PathBuf>) -> Self {
        Self {
            index,
            path: path.into(),
        }
    }

    /// Trial number.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Outcome of resolving a configuration within one trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing matched: the configuration is absent for this trial.
    Absent,
    /// Exactly one file matched.
    Unique(PathBuf),
    /// Several files matched; `chosen` is the lexically first.
    Ambiguous {
        /// File that will be used
        chosen: PathBuf,
        /// Remaining matches, in lexical order
        rejected: Vec<PathBuf>,
    },
}

impl Resolution {
    /// The file to use, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Absent => None,
            Self::Unique(path) | Self::Ambiguous { chosen: path, .. } => Some(path),
        }
    }
}

/// Finds measurement files by configuration prefix.
#[derive(Debug, Clone)]
pub struct ResultLocator {
    extension: String,
    strict: bool,
}

impl Default for ResultLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultLocator {
    /// Locator for `.json` files with first-match tie-breaking.
    #[must_use]
    pub fn new() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            strict: false,
        }
    }

    /// Match files with this extension instead (without the dot).
    #[must_use]
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Reject ambiguous matches with [`Error::AmbiguousMatch`] instead of warning.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// All files in `trial_dir` whose name starts with `configuration` and ends
    /// with the expected extension, in lexical order.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be listed.
    pub fn candidates(&self, trial_dir: &Path, configuration: &str) -> Result<Vec<PathBuf>> {
        let suffix = format!(".{}", self.extension);
        let mut matches = Vec::new();

        for entry in fs::read_dir(trial_dir)? {
            let entry = entry?;
            // Follows symlinks, unlike `DirEntry::file_type`.
            if !entry.path().is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if name.starts_with(configuration) && name.ends_with(&suffix) {
                matches.push(entry.path());
            }
        }

        matches.sort();
        Ok(matches)
    }

    /// Resolve a configuration to at most one file.
    ///
    /// Tie-break: the lexically first candidate wins.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be listed, or in strict mode
    /// when more than one file matches.
    pub fn resolve(&self, trial_dir: &Path, configuration: &str) -> Result<Resolution> {
        let mut candidates = self.candidates(trial_dir, configuration)?;

        match candidates.len() {
            0 => {
                debug!(configuration, trial = %trial_dir.display(), "no result file");
                Ok(Resolution::Absent)
            }
            1 => Ok(Resolution::Unique(candidates.remove(0))),
            _ if self.strict => Err(Error::AmbiguousMatch {
                configuration: configuration.to_string(),
                trial: trial_dir.to_path_buf(),
                candidates,
            }),
            n => {
                let chosen = candidates.remove(0);
                warn!(
                    configuration,
                    trial = %trial_dir.display(),
                    matches = n,
                    chosen = %chosen.display(),
                    "ambiguous result files, using the lexically first"
                );
                Ok(Resolution::Ambiguous {
                    chosen,
                    rejected: candidates,
                })
            }
        }
    }

    /// Resolve a configuration that must be present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingInput`] if nothing matches, plus the errors of
    /// [`Self::resolve`].
    pub fn require(&self, trial_dir: &Path, configuration: &str) -> Result<PathBuf> {
        match self.resolve(trial_dir, configuration)? {
            Resolution::Absent => Err(Error::MissingInput {
                configuration: configuration.to_string(),
                trial: trial_dir.to_path_buf(),
            }),
            Resolution::Unique(path) | Resolution::Ambiguous { chosen: path, .. } => Ok(path),
        }
    }
}

/// Immediate subdirectories of `dir` (symlinks followed), sorted by name.
fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::ResultRootNotFound(dir.to_path_buf()));
    }

    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Enumerate trials `1..=N` where N is the number of immediate subdirectories.
///
/// Trial numbering must be contiguous: every `root/i` for `i` in `1..=N` has
/// to exist, so a stray non-trial directory under the root is reported rather
/// than silently shifting the range.
///
/// # Errors
///
/// Returns [`Error::ResultRootNotFound`] if `root` is not a directory and
/// [`Error::NonContiguousTrials`] if an index in the range is missing.
pub fn enumerate_trials(root: &Path) -> Result<Vec<TrialDirectory>> {
    let count = subdirectories(root)?.len();

    let mut trials = Vec::with_capacity(count);
    for index in 1..=count {
        let path = root.join(index.to_string());
        if !path.is_dir() {
            return Err(Error::NonContiguousTrials {
                root: root.to_path_buf(),
                missing: index,
                expected: count,
            });
        }
        trials.push(TrialDirectory::new(index, path));
    }

    debug!(root = %root.display(), trials = trials.len(), "enumerated trials");
    Ok(trials)
}

/// Experiment groups of a table root: every subdirectory except
/// [`STRESS_DIR`], sorted by name.
///
/// # Errors
///
/// Returns [`Error::ResultRootNotFound`] if `root` is not a directory.
pub fn experiment_groups(root: &Path) -> Result<Vec<PathBuf>> {
    Ok(subdirectories(root)?
        .into_iter()
        .filter(|dir| dir.file_name().is_some_and(|name| name != STRESS_DIR))
        .collect())
}
