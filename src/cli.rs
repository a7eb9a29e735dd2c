//! Command line surface of the `p3` binary.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use p3_core::metrics::{application_efficiency, divergence, pp, FomOrdering};
use p3_core::{Projection, Table};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::{AnalysisConfig, ConfigLoader, OutputConfig};
use crate::data::load_table;
use crate::report::{OutputFormat, Report};

#[derive(Parser, Debug)]
#[command(name = "p3", version)]
#[command(about = "Performance, portability and productivity analysis of benchmark data")]
pub struct Cli {
    /// Config file (YAML or JSON). Falls back to $P3_CONFIG.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug-level logging unless RUST_LOG is set
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Performance portability per (problem, application)
    Pp {
        input: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Application efficiency relative to the best fom per (problem, platform)
    Efficiency {
        input: PathBuf,
        #[arg(long)]
        fom_column: Option<String>,
        /// Which fom direction is better: lower (time) or higher (throughput)
        #[arg(long, value_parser = parse_ordering)]
        ordering: Option<FomOrdering>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Code divergence per (problem, application) from coverage traces
    Divergence {
        input: PathBuf,
        /// Table of `coverage_key` and `coverage` columns joined on `coverage_key`.
        /// Without it the input must carry a `coverage` column.
        #[arg(long)]
        coverage: Option<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Map raw columns onto problem / application / platform
    Project {
        input: PathBuf,
        #[arg(long, num_args = 1.., required = true)]
        problem: Vec<String>,
        #[arg(long, num_args = 1.., required = true)]
        application: Vec<String>,
        #[arg(long, num_args = 1.., required = true)]
        platform: Vec<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug, Default)]
pub struct OutputArgs {
    #[arg(short, long, value_parser = parse_format)]
    pub format: Option<OutputFormat>,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub precision: Option<usize>,
}

impl OutputArgs {
    /// Command line flags override the config file.
    fn resolve(&self, config: &OutputConfig) -> OutputConfig {
        OutputConfig {
            format: self.format.unwrap_or(config.format),
            precision: self.precision.unwrap_or(config.precision),
        }
    }
}

fn parse_ordering(s: &str) -> std::result::Result<FomOrdering, String> {
    FomOrdering::parse(s).ok_or_else(|| format!("unknown ordering '{}' (lower, higher)", s))
}

fn parse_format(s: &str) -> std::result::Result<OutputFormat, String> {
    OutputFormat::parse(s).ok_or_else(|| format!("unknown format '{}' (table, json, csv, markdown)", s))
}

// ──────────────────────────────────────────────────────────────────────────────
// PIPELINES
// ──────────────────────────────────────────────────────────────────────────────

/// Configured projection, then optional efficiency derivation, then PP.
pub fn analyse(table: &Table, config: &AnalysisConfig) -> Result<Table> {
    let table = apply_projection(table, config.projection.as_ref())?;
    let table = if config.efficiency.derive_app_eff {
        debug!(fom_column = %config.efficiency.fom_column, "Deriving application efficiency");
        application_efficiency(&table, &config.efficiency.fom_column, config.efficiency.ordering)
            .context("failed to derive application efficiency")?
    } else {
        table
    };
    pp(&table).context("failed to compute performance portability")
}

fn apply_projection(table: &Table, projection: Option<&Projection>) -> Result<Table> {
    match projection {
        Some(p) if !p.is_identity() => {
            debug!(?p, "Applying projection");
            p.apply(table).context("failed to project input columns")
        }
        _ => Ok(table.clone()),
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// DISPATCH
// ──────────────────────────────────────────────────────────────────────────────

pub fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load(path)?,
        None => ConfigLoader::from_env()?,
    };

    match cli.command {
        Command::Pp { input, output } => {
            let table = read_input(&input)?;
            let result = analyse(&table, &config)?;
            info!(rows = result.n_rows(), "Computed performance portability");
            emit(&result, &output.resolve(&config.output), output.output.as_deref())
        }
        Command::Efficiency {
            input,
            fom_column,
            ordering,
            output,
        } => {
            let table = apply_projection(&read_input(&input)?, config.projection.as_ref())?;
            let fom_column = fom_column.unwrap_or(config.efficiency.fom_column);
            let ordering = ordering.unwrap_or(config.efficiency.ordering);
            let result = application_efficiency(&table, &fom_column, ordering)
                .context("failed to compute application efficiency")?;
            info!(rows = result.n_rows(), ?ordering, "Computed application efficiency");
            emit(&result, &output.resolve(&config.output), output.output.as_deref())
        }
        Command::Divergence {
            input,
            coverage,
            output,
        } => {
            let table = apply_projection(&read_input(&input)?, config.projection.as_ref())?;
            let coverage = coverage.as_deref().map(read_input).transpose()?;
            let result = divergence(&table, coverage.as_ref())
                .context("failed to compute code divergence")?;
            info!(rows = result.n_rows(), "Computed code divergence");
            emit(&result, &output.resolve(&config.output), output.output.as_deref())
        }
        Command::Project {
            input,
            problem,
            application,
            platform,
            output,
        } => {
            let projection = Projection::new(&problem[..], &application[..], &platform[..]);
            let result = apply_projection(&read_input(&input)?, Some(&projection))?;
            info!(rows = result.n_rows(), "Projected input columns");
            emit(&result, &output.resolve(&config.output), output.output.as_deref())
        }
    }
}

fn read_input(path: &Path) -> Result<Table> {
    let table = load_table(path).with_context(|| format!("failed to load {}", path.display()))?;
    info!(path = %path.display(), rows = table.n_rows(), cols = table.n_cols(), "Loaded input");
    Ok(table)
}

/// Writes `table` to `path`, or stdout when no path is given.
pub fn emit(table: &Table, output: &OutputConfig, path: Option<&Path>) -> Result<()> {
    let writer: Box<dyn Write> = match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    let mut report = Report::new(writer, output.format).with_precision(output.precision);
    report.write(table).context("failed to write report")?;
    report.into_inner().flush().context("failed to flush report")?;
    Ok(())
}
