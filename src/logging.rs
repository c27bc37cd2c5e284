//! Structured logging for the flow table service
//!
//! Installs a `tracing` subscriber with a minimum level, optional file
//! output and optional timestamps. Library code logs through the `tracing`
//! macros directly; this module only wires the subscriber up and provides a
//! few summary helpers for the binary.

use std::fmt;
use std::fs::OpenOptions;
use std::sync::Mutex;

use serde::Deserialize;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::model::{all_months, YearBucket};

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl LogLevel {
    /// `EnvFilter` directive for this level.
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Subscriber setup
// ---------------------------------------------------------------------------

/// Initialize the global subscriber.
///
/// `RUST_LOG` overrides `min_level` when set. With `log_file`, output is
/// appended to that file without ANSI colors; otherwise it goes to stderr.
/// Calling this twice keeps the first subscriber.
pub fn init_logger(
    min_level: LogLevel,
    log_file: Option<&str>,
    console_timestamps: bool,
) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(min_level.directive()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match (log_file, console_timestamps) {
        (Some(path), _) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        (None, true) => builder.with_writer(std::io::stderr).try_init(),
        (None, false) => builder
            .without_time()
            .with_writer(std::io::stderr)
            .try_init(),
    };

    if installed.is_err() {
        warn!("logger already initialized; keeping existing subscriber");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Summary Logging
// ---------------------------------------------------------------------------

/// Log a one-line summary of a built tree and the report drawn from it.
pub fn log_report_summary(years: &[YearBucket], columns: usize) {
    let days: usize = years.iter().map(YearBucket::day_count).sum();
    let months = all_months(years).count();
    let net: f64 = years.iter().map(|y| y.total_period).sum();

    if days == 0 {
        warn!("flow series is empty; nothing to report");
        return;
    }

    let best = all_months(years).find(|m| m.rank == 1);
    match best {
        Some(month) => info!(
            days,
            months,
            columns,
            net,
            best_year = month.year_index,
            best_month = month.month_index + 1,
            best_total = month.total_period,
            "report ready"
        ),
        None => error!(days, months, "report has days but no ranked month"),
    }
}
