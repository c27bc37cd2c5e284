//! Application configuration.
//!
//! Loaded from a TOML file; every field has a default so an empty file (or
//! no file at all) is a valid configuration.
//!
//! ```toml
//! week_numbering = "sunday_first"
//! instruments_file = "config/instruments.toml"
//!
//! [logging]
//! level = "debug"
//! file = "flowtable.log"
//! timestamps = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::analysis::{Aggregator, WeekNumbering};
use crate::error::Result;
use crate::instruments::InstrumentRegistry;
use crate::logging::LogLevel;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "FLOWTABLE_CONFIG";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub week_numbering: WeekNumbering,
    /// Instrument registry file. The built-in bitcoin ETF registry is used
    /// when unset.
    pub instruments_file: Option<PathBuf>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
            timestamps: true,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads the file at `path`. A relative `instruments_file` is resolved
    /// against the config file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&text)?;

        if let Some(file) = config.instruments_file.take() {
            config.instruments_file = Some(match path.parent() {
                Some(dir) if file.is_relative() => dir.join(file),
                _ => file,
            });
        }
        Ok(config)
    }

    /// Loads `explicit` if given, else the file named by `FLOWTABLE_CONFIG`,
    /// else the defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => match std::env::var_os(CONFIG_ENV_VAR) {
                Some(path) => Self::load(PathBuf::from(path)),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn aggregator(&self) -> Aggregator {
        Aggregator::new(self.week_numbering)
    }

    pub fn load_registry(&self) -> Result<InstrumentRegistry> {
        let registry = match &self.instruments_file {
            Some(path) => InstrumentRegistry::load(path)?,
            None => InstrumentRegistry::bitcoin_etfs(),
        };
        Ok(registry)
    }
}
