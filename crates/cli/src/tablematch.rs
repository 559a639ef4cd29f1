//! tablematch - match a table template against detected line segments
//!
//! Reads a JSON job holding the template, the detected lines and the rough
//! alignment offset, and writes the reconstructed table region as JSON.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use serde::Deserialize;
use tablematch_core::geometry::split_by_orientation;
use tablematch_core::{
    Line, MatchConfig, MatchError, Offset, TableRegion, TableTemplate, TemplateMatcher,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Angle tolerance used when a job supplies one unsorted line list.
const ORIENTATION_TOLERANCE_DEG: f64 = 10.0;

/// A command line tool for reconstructing a table from a template and the
/// lines detected on a page.
#[derive(Parser, Debug)]
#[command(name = "tablematch")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the job JSON file
    job: PathBuf,

    /// Matching configuration JSON file; missing fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the output JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pretty: bool,

    /// Minimum search radius in pixels
    #[arg(long = "distance-threshold")]
    distance_threshold: Option<f64>,

    /// Allowed relative shrink of gridline spacing
    #[arg(long = "lower-variation")]
    lower_variation: Option<f64>,

    /// Allowed relative stretch of gridline spacing
    #[arg(long = "upper-variation")]
    upper_variation: Option<f64>,

    /// Solve horizontal and vertical borders in parallel
    #[arg(long, action = ArgAction::SetTrue)]
    parallel: bool,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,
}

/// Input of one matching run.
#[derive(Debug, Deserialize)]
struct Job {
    template: TableTemplate,
    #[serde(default)]
    horizontal: Vec<Line>,
    #[serde(default)]
    vertical: Vec<Line>,
    /// Unsorted lines, split by orientation and appended to the lists above.
    #[serde(default)]
    lines: Vec<Line>,
    #[serde(default)]
    offset: Offset,
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse '{}'", path.display()))
}

fn build_config(args: &Args) -> Result<MatchConfig> {
    let mut config = match &args.config {
        Some(path) => read_json::<MatchConfig>(path)?,
        None => MatchConfig::default(),
    };
    if let Some(d) = args.distance_threshold {
        config.distance_threshold = d;
    }
    if let Some(lower) = args.lower_variation {
        config.variation_lower = lower;
    }
    if let Some(upper) = args.upper_variation {
        config.variation_upper = upper;
    }
    config.parallel |= args.parallel;
    Ok(config)
}

fn write_region(region: &TableRegion, args: &Args) -> Result<()> {
    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("failed to create output file '{}'", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    };
    if args.pretty {
        serde_json::to_writer_pretty(&mut out, region)?;
    } else {
        serde_json::to_writer(&mut out, region)?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let config = build_config(args)?;
    let mut job: Job = read_json(&args.job)?;

    if !job.lines.is_empty() {
        let (h, v) = split_by_orientation(&job.lines, ORIENTATION_TOLERANCE_DEG);
        job.horizontal.extend(h);
        job.vertical.extend(v);
    }

    let region = TemplateMatcher::new(config)
        .with_template(job.template)
        .run(&job.horizontal, &job.vertical, job.offset)
        .with_context(|| format!("failed to match '{}'", args.job.display()))?;

    info!(
        cells = region.cells.len(),
        synthesized = region.stats.synthesized_borders,
        degenerate = region.degenerate_cells().count(),
        "table reconstructed"
    );
    write_region(&region, args)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .without_time()
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            let config_error = error
                .chain()
                .any(|cause| cause.downcast_ref::<MatchError>().is_some());
            if config_error {
                ExitCode::from(2)
            } else {
                ExitCode::from(1)
            }
        }
    }
}
