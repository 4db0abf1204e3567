//! Configuration catalog - the ordered registry of execution configurations
//!
//! A catalog maps each configuration name (the file-prefix key produced by the
//! benchmark harness) to a display label and a color. Exactly one catalog is
//! active per run and its order decides legend order, color assignment and the
//! column order of the summary table.
//!
//! ## Generations
//!
//! ```text
//! Core       local | docker | cairn
//! Isolation  local | docker | fuse_ll_docker | fuse_docker | cairn_I_ .. cairn_V_
//! ```
//!
//! Poka-Yoke: no name may be a strict prefix of another, otherwise prefix
//! matching in [`crate::locator`] would be ambiguous. This is checked once,
//! when the catalog is built.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Fallback colors, assigned by ordinal when an entry has none.
pub const PALETTE: [Rgb; 10] = [
    Rgb(31, 119, 180),
    Rgb(255, 127, 14),
    Rgb(44, 160, 44),
    Rgb(214, 39, 40),
    Rgb(148, 103, 189),
    Rgb(140, 86, 75),
    Rgb(227, 119, 194),
    Rgb(127, 127, 127),
    Rgb(188, 189, 34),
    Rgb(23, 190, 207),
];

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Pure blue.
    pub const BLUE: Self = Self(0, 0, 255);
    /// Dark green.
    pub const GREEN: Self = Self(0, 128, 0);
    /// Pure red.
    pub const RED: Self = Self(255, 0, 0);
    /// Black.
    pub const BLACK: Self = Self(0, 0, 0);

    /// Palette color for an ordinal (wraps around).
    #[must_use]
    pub const fn from_palette(ordinal: usize) -> Self {
        PALETTE[ordinal % PALETTE.len()]
    }
}

impl FromStr for Rgb {
    type Err = Error;

    /// Parses `#rrggbb` or one of a few named colors.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "blue" => return Ok(Self::BLUE),
            "green" => return Ok(Self::GREEN),
            "red" => return Ok(Self::RED),
            "black" => return Ok(Self::BLACK),
            "orange" => return Ok(Self(255, 165, 0)),
            "purple" => return Ok(Self(128, 0, 128)),
            "brown" => return Ok(Self(165, 42, 42)),
            "gray" | "grey" => return Ok(Self(128, 128, 128)),
            _ => {}
        }

        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.is_ascii())
            .ok_or_else(|| Error::InvalidCatalog(format!("unrecognised color '{s}'")))?;
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| Error::InvalidCatalog(format!("unrecognised color '{s}'")))
        };
        Ok(Self(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl From<Rgb> for plotters::style::RGBColor {
    fn from(c: Rgb) -> Self {
        Self(c.0, c.1, c.2)
    }
}

/// One configuration in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationEntry {
    name: String,
    display_label: String,
    color: Rgb,
    ordinal: usize,
}

impl ConfigurationEntry {
    /// File-prefix key, e.g. `fuse_ll_docker`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable label used in legends and table headers.
    #[must_use]
    pub fn display_label(&self) -> &str {
        &self.display_label
    }

    /// Color used for points and trend lines.
    #[must_use]
    pub const fn color(&self) -> Rgb {
        self.color
    }

    /// Position in the catalog, stable for the whole run.
    #[must_use]
    pub const fn ordinal(&self) -> usize {
        self.ordinal
    }
}

/// Historical catalog generations, selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogGeneration {
    /// Local vs Docker vs Cairn (per-trial plots)
    Core,
    /// Full isolation comparison including passthrough FUSE and Cairn variants (summary table)
    Isolation,
}

impl CatalogGeneration {
    /// Build the catalog for this generation.
    #[must_use]
    pub fn catalog(self) -> ConfigurationCatalog {
        let entries: Vec<(&str, &str, Option<Rgb>)> = match self {
            Self::Core => vec![
                ("local", "Local", Some(Rgb::BLUE)),
                ("docker", "Docker", Some(Rgb::GREEN)),
                ("cairn", "Cairn", Some(Rgb::RED)),
            ],
            Self::Isolation => vec![
                ("local", "Local", None),
                ("docker", "Docker", None),
                ("fuse_ll_docker", "Passthrough FUSE I", None),
                ("fuse_docker", "Passthrough FUSE II", None),
                ("cairn_I_", "Cairn I", None),
                ("cairn_II_", "Cairn II", None),
                ("cairn_III_", "Cairn III", None),
                ("cairn_IV_", "Cairn IV", None),
                ("cairn_V_", "Cairn V", None),
            ],
        };

        // Built-in generations are prefix-free (see tests), so skip validation.
        assemble(
            entries
                .into_iter()
                .map(|(name, label, color)| (name.to_string(), label.to_string(), color))
                .collect(),
        )
    }
}

impl FromStr for CatalogGeneration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "core" => Ok(Self::Core),
            "isolation" => Ok(Self::Isolation),
            other => Err(Error::InvalidCatalog(format!("unknown catalog generation '{other}'"))),
        }
    }
}

/// Ordered, validated registry of configurations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationCatalog {
    entries: Vec<ConfigurationEntry>,
}

/// Shape of one entry in a catalog JSON file.
#[derive(Debug, Deserialize)]
struct CatalogFileEntry {
    name: String,
    label: Option<String>,
    color: Option<String>,
}

impl ConfigurationCatalog {
    /// Start building a catalog.
    #[must_use]
    pub fn builder() -> ConfigurationCatalogBuilder {
        ConfigurationCatalogBuilder::default()
    }

    /// Load a catalog from a JSON list of `{ "name", "label"?, "color"? }` objects.
    ///
    /// Missing labels default to the name, missing colors to the palette.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, is not valid JSON, holds an
    /// unrecognised color, or violates the catalog invariants.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    /// Parse a catalog from JSON text (see [`Self::from_json_file`]).
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_json_file`], minus IO.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let file_entries: Vec<CatalogFileEntry> = serde_json::from_str(raw)?;
        let mut builder = Self::builder();
        for entry in file_entries {
            let color = entry.color.as_deref().map(str::parse).transpose()?;
            let label = entry.label.unwrap_or_else(|| entry.name.clone());
            builder = builder.entry(entry.name, label, color);
        }
        builder.build()
    }

    /// Entries in catalog order.
    #[must_use]
    pub fn entries(&self) -> &[ConfigurationEntry] {
        &self.entries
    }

    /// Iterate entries in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, ConfigurationEntry> {
        self.entries.iter()
    }

    /// Number of configurations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the catalog has no configurations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ConfigurationEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

impl<'a> IntoIterator for &'a ConfigurationCatalog {
    type Item = &'a ConfigurationEntry;
    type IntoIter = std::slice::Iter<'a, ConfigurationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Builder for `ConfigurationCatalog`.
#[derive(Debug, Default)]
pub struct ConfigurationCatalogBuilder {
    entries: Vec<(String, String, Option<Rgb>)>,
}

impl ConfigurationCatalogBuilder {
    /// Append an entry. Ordinals follow insertion order.
    #[must_use]
    pub fn entry(
        mut self,
        name: impl Into<String>,
        display_label: impl Into<String>,
        color: Option<Rgb>,
    ) -> Self {
        self.entries.push((name.into(), display_label.into(), color));
        self
    }

    /// Validate and build the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCatalog`] if the catalog is empty, a name is
    /// empty or duplicated, or one name is a strict prefix of another.
    pub fn build(self) -> Result<ConfigurationCatalog> {
        if self.entries.is_empty() {
            return Err(Error::InvalidCatalog("catalog has no entries".to_string()));
        }
        let names: Vec<&str> = self.entries.iter().map(|(name, _, _)| name.as_str()).collect();
        check_names(&names)?;
        Ok(assemble(self.entries))
    }
}

/// Names must be non-empty, unique and prefix-free.
fn check_names(names: &[&str]) -> Result<()> {
    for (i, name) in names.iter().enumerate() {
        if name.is_empty() {
            return Err(Error::InvalidCatalog(format!("entry {i} has an empty name")));
        }
        for other in &names[i + 1..] {
            if name == other {
                return Err(Error::InvalidCatalog(format!("duplicate name '{name}'")));
            }
            if other.starts_with(name) || name.starts_with(other) {
                let (short, long) = if name.len() < other.len() {
                    (name, other)
                } else {
                    (other, name)
                };
                return Err(Error::InvalidCatalog(format!(
                    "'{short}' is a prefix of '{long}': file matching would be ambiguous"
                )));
            }
        }
    }
    Ok(())
}

fn assemble(entries: Vec<(String, String, Option<Rgb>)>) -> ConfigurationCatalog {
    let entries = entries
        .into_iter()
        .enumerate()
        .map(|(ordinal, (name, display_label, color))| ConfigurationEntry {
            name,
            display_label,
            color: color.unwrap_or_else(|| Rgb::from_palette(ordinal)),
            ordinal,
        })
        .collect();
    ConfigurationCatalog { entries }
}
