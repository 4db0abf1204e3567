//! cairn-report CLI - charts and tables from benchmark trial results

use anyhow::{Context, Result};
use cairn_report::catalog::{CatalogGeneration, ConfigurationCatalog};
use cairn_report::locator::ResultLocator;
use cairn_report::render::comparative::{ComparativePlotRenderer, PlotOptions, XAxis};
use cairn_report::render::normalized::{
    NormalizedTrendRenderer, TrendOptions, DEFAULT_BASELINE_TOOL,
};
use cairn_report::render::table::SummaryTableRenderer;
use cairn_report::render::OutputFormat;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Benchmark trial charts and LaTeX summaries", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Per-trial comparative plots (or the summary table with --table)
    RenderComparative(ComparativeArgs),
    /// Baseline-normalized log-scale trend of two commit logs
    RenderTrend(TrendArgs),
}

#[derive(Args, Debug)]
struct ComparativeArgs {
    /// Result root: numbered trial directories (or experiment groups with --table)
    #[arg(value_hint = ValueHint::DirPath)]
    result_root: PathBuf,

    /// Built-in configuration catalog [default: core, isolation with --table]
    #[arg(long, value_enum)]
    catalog: Option<CatalogOpt>,

    /// JSON catalog file, overrides --catalog
    #[arg(long, value_hint = ValueHint::FilePath)]
    catalog_file: Option<PathBuf>,

    /// Chart image format
    #[arg(long, value_enum, default_value_t = FormatOpt::Png)]
    format: FormatOpt,

    /// What the x axis counts
    #[arg(long = "x-label", value_enum, default_value_t = XAxisOpt::Iterations)]
    x_label: XAxisOpt,

    /// Fail when a configuration prefix matches several files
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,

    /// Write results.tex instead of plots
    #[arg(long, action = ArgAction::SetTrue)]
    table: bool,
}

#[derive(Args, Debug)]
struct TrendArgs {
    /// Log supplying the baseline and the first compared series
    #[arg(value_hint = ValueHint::FilePath)]
    log_a: PathBuf,

    /// Log supplying the second compared series
    #[arg(value_hint = ValueHint::FilePath)]
    log_b: PathBuf,

    /// Output image [default: <LOG_A>.png]
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Tool name treated as the baseline
    #[arg(long, default_value = DEFAULT_BASELINE_TOOL)]
    baseline_tool: String,

    /// Legend label of the first compared series
    #[arg(long, default_value = "rattle (cairn)")]
    label_a: String,

    /// Legend label of the second compared series
    #[arg(long, default_value = "rattle (fsatrace)")]
    label_b: String,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CatalogOpt {
    Core,
    Isolation,
}

impl From<CatalogOpt> for CatalogGeneration {
    fn from(value: CatalogOpt) -> Self {
        match value {
            CatalogOpt::Core => Self::Core,
            CatalogOpt::Isolation => Self::Isolation,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FormatOpt {
    Png,
    Svg,
}

impl From<FormatOpt> for OutputFormat {
    fn from(value: FormatOpt) -> Self {
        match value {
            FormatOpt::Png => Self::Png,
            FormatOpt::Svg => Self::Svg,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum XAxisOpt {
    Iterations,
    Runs,
}

impl From<XAxisOpt> for XAxis {
    fn from(value: XAxisOpt) -> Self {
        match value {
            XAxisOpt::Iterations => Self::Iterations,
            XAxisOpt::Runs => Self::Runs,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let outcome = match cli.command {
        Command::RenderComparative(args) => handle_comparative(args),
        Command::RenderTrend(args) => handle_trend(args),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn handle_comparative(args: ComparativeArgs) -> Result<()> {
    let catalog = load_catalog(&args)?;
    let locator = ResultLocator::new().strict(args.strict);

    if args.table {
        let path = SummaryTableRenderer::new(catalog)
            .with_locator(locator)
            .render_root(&args.result_root)
            .with_context(|| format!("rendering table for {}", args.result_root.display()))?;
        info!(path = %path.display(), "done");
        return Ok(());
    }

    let options = PlotOptions::default()
        .format(args.format.into())
        .x_axis(args.x_label.into());
    let charts = ComparativePlotRenderer::new(catalog)
        .with_locator(locator)
        .with_options(options)
        .render_root(&args.result_root)
        .with_context(|| format!("rendering plots for {}", args.result_root.display()))?;
    info!(charts = charts.len(), "done");
    Ok(())
}

fn load_catalog(args: &ComparativeArgs) -> Result<ConfigurationCatalog> {
    if let Some(path) = &args.catalog_file {
        return ConfigurationCatalog::from_json_file(path)
            .with_context(|| format!("loading catalog {}", path.display()));
    }

    let generation = args.catalog.map_or(
        if args.table {
            CatalogGeneration::Isolation
        } else {
            CatalogGeneration::Core
        },
        CatalogGeneration::from,
    );
    Ok(generation.catalog())
}

fn handle_trend(args: TrendArgs) -> Result<()> {
    let output = args
        .output
        .unwrap_or_else(|| NormalizedTrendRenderer::default_output(&args.log_a));
    let options = TrendOptions::default()
        .baseline_tool(args.baseline_tool)
        .compared_labels(args.label_a, args.label_b);

    NormalizedTrendRenderer::new(options)
        .render(&args.log_a, &args.log_b, &output)
        .with_context(|| {
            format!(
                "rendering trend of {} and {}",
                args.log_a.display(),
                args.log_b.display()
            )
        })?;
    Ok(())
}
