//! Crate-level error type.
//!
//! The aggregation core only ever fails with [`DateParseError`]; this enum
//! collects it together with the loading, lookup and export failures the
//! binary and report layer can hit.

use thiserror::Error;

use crate::instruments::{ConfigLookupError, RegistryError};
use crate::model::DateParseError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    DateParse(#[from] DateParseError),

    #[error(transparent)]
    ConfigLookup(#[from] ConfigLookupError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid flow series: {0}")]
    Json(#[from] serde_json::Error),

    #[error("flow series line {line}, column '{column}': '{value}' is not a number")]
    InvalidNumber {
        line: u64,
        column: String,
        value: String,
    },

    #[error("flow series line {line}: no Total value")]
    MissingTotal { line: u64 },

    #[error("flow series has no '{0}' column")]
    MissingColumn(&'static str),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
