//! `flowtable` entry point.
//!
//! Reads a materialized daily flow series, builds the ranked tree and
//! prints it as a text table, CSV or JSON. All logic lives in the library.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use flowtable::config::AppConfig;
use flowtable::instruments::InstrumentRegistry;
use flowtable::report::Report;
use flowtable::{ingest, logging, Aggregator, WeekNumbering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "flowtable", version, about = "Group a daily flow series by year, month and week")]
struct Cli {
    /// Series file (.json array of rows, or .csv)
    input: PathBuf,

    /// Configuration file (defaults to $FLOWTABLE_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Instrument registry file, overriding the configured one
    #[arg(long)]
    instruments: Option<PathBuf>,

    /// Week numbering: iso8601 or sunday_first
    #[arg(long)]
    week: Option<WeekNumbering>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::resolve(cli.config.as_deref()).context("loading configuration")?;
    logging::init_logger(
        config.logging.level,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    )
    .context("opening log file")?;

    let registry = match &cli.instruments {
        Some(path) => InstrumentRegistry::load(path)?,
        None => config.load_registry()?,
    };
    let aggregator = cli.week.map_or_else(|| config.aggregator(), Aggregator::new);

    let records = ingest::load_series(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let years = aggregator.build(records)?;
    let report = Report::for_observed_instruments(&years, &registry)?;
    logging::log_report_summary(&years, report.columns().len());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        OutputFormat::Table => out.write_all(report.render_text().as_bytes())?,
        OutputFormat::Csv => report.write_csv(&mut out)?,
        OutputFormat::Json => writeln!(out, "{}", report.to_json()?)?,
    }
    out.flush()?;
    Ok(())
}
