//! # cairn-report: Benchmark Trial Reports
//!
//! **Version**: 0.1.0
//!
//! Turns repeated benchmark measurements (one result file per execution
//! configuration per numbered trial) into comparative charts and a LaTeX
//! summary table.
//!
//! ## Pipeline
//!
//! Data flows one way:
//!
//! - [`locator`]: enumerate trials, find each configuration's result file
//! - [`series`]: parse result files into ordered measurement series
//! - [`trend`]: fit a linear trend per series (closed-form least squares)
//! - [`render`]: per-trial charts, normalized commit trends, summary table
//!
//! The active [`catalog::ConfigurationCatalog`] fixes which configurations
//! exist, their labels, colors, and order.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use cairn_report::catalog::CatalogGeneration;
//! use cairn_report::render::comparative::ComparativePlotRenderer;
//! use std::path::Path;
//!
//! let renderer = ComparativePlotRenderer::new(CatalogGeneration::Core.catalog());
//! for chart in renderer.render_root(Path::new("results"))? {
//!     println!("wrote {}", chart.display());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod catalog;
pub mod error;
pub mod locator;
pub mod render;
pub mod series;
pub mod trend;

pub use catalog::{CatalogGeneration, ConfigurationCatalog, ConfigurationEntry, Rgb};
pub use error::{Error, Result};
pub use locator::{ResultLocator, TrialDirectory};
pub use render::comparative::ComparativePlotRenderer;
pub use render::normalized::NormalizedTrendRenderer;
pub use render::table::SummaryTableRenderer;
pub use series::{BenchmarkSeries, MeasurementPoint, SeriesLoader};
pub use trend::LinearTrend;
