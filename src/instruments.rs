//! Instrument display registry for the flow table.
//!
//! Maps instrument tickers to the metadata the report layer needs to draw a
//! column: ordering index, color and an optional issuer link. The
//! aggregation core never consults this registry; instrument identifiers are
//! opaque there. Lookups only happen when a report is rendered.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Instrument metadata
// ---------------------------------------------------------------------------

/// Display configuration for one instrument column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    /// Ticker as it appears in the raw series, e.g. "IBIT".
    pub ticker: String,
    /// Column position; lower comes first.
    pub index: u32,
    /// `#rrggbb` color used for the ticker and its non-zero flows.
    pub color: String,
    /// Issuer page linked from the column header.
    #[serde(default)]
    pub url: Option<String>,
}

impl InstrumentConfig {
    fn new(ticker: &str, index: u32, color: &str, url: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            index,
            color: color.to_string(),
            url: Some(url.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// An instrument in the series has no display configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no display configuration for instrument '{ticker}'")]
pub struct ConfigLookupError {
    pub ticker: String,
}

/// Errors raised while loading or validating a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("cannot read instrument registry {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid instrument registry: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate ticker '{0}' in instrument registry")]
    DuplicateTicker(String),
    #[error("duplicate column index {index} (tickers '{first}' and '{second}')")]
    DuplicateIndex { index: u32, first: String, second: String },
    #[error("instrument '{ticker}' has invalid color '{color}' (expected #rrggbb)")]
    InvalidColor { ticker: String, color: String },
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(rename = "instrument", default)]
    instruments: Vec<InstrumentConfig>,
}

/// Validated set of instrument display configurations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstrumentRegistry {
    instruments: Vec<InstrumentConfig>,
}

impl InstrumentRegistry {
    /// Builds a registry, rejecting duplicate tickers, duplicate column
    /// indices and malformed colors.
    pub fn from_configs(instruments: Vec<InstrumentConfig>) -> Result<Self, RegistryError> {
        let registry = Self { instruments };
        registry.validate()?;
        Ok(registry)
    }

    /// Parses `[[instrument]]` tables from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = toml::from_str(text)?;
        Self::from_configs(file.instruments)
    }

    /// Reads and parses a TOML registry file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// US spot bitcoin ETFs in the column order of the upstream flow table.
    pub fn bitcoin_etfs() -> Self {
        Self {
            instruments: vec![
                InstrumentConfig::new("IBIT", 0, "#1a1a1a", "https://www.ishares.com"),
                InstrumentConfig::new("FBTC", 1, "#368727", "https://www.fidelity.com"),
                InstrumentConfig::new("BITB", 2, "#f7a600", "https://bitwiseinvestments.com"),
                InstrumentConfig::new("ARKB", 3, "#5b2be0", "https://www.ark-funds.com"),
                InstrumentConfig::new("BTCO", 4, "#0f3f8c", "https://www.invesco.com"),
                InstrumentConfig::new("EZBC", 5, "#0066b2", "https://www.franklintempleton.com"),
                InstrumentConfig::new("BRRR", 6, "#e4472f", "https://coinshares.com"),
                InstrumentConfig::new("HODL", 7, "#0a5fa8", "https://www.vaneck.com"),
                InstrumentConfig::new("BTCW", 8, "#0c2340", "https://www.wisdomtree.com"),
                InstrumentConfig::new("GBTC", 9, "#5f2d91", "https://www.grayscale.com"),
                InstrumentConfig::new("BTC", 10, "#8e6fc1", "https://www.grayscale.com"),
            ],
        }
    }

    pub fn validate(&self) -> Result<(), RegistryError> {
        let mut tickers = HashSet::new();
        let mut indices: Vec<(u32, &str)> = Vec::new();

        for instrument in &self.instruments {
            if !tickers.insert(instrument.ticker.as_str()) {
                return Err(RegistryError::DuplicateTicker(instrument.ticker.clone()));
            }
            if let Some((_, first)) = indices.iter().find(|(i, _)| *i == instrument.index) {
                return Err(RegistryError::DuplicateIndex {
                    index: instrument.index,
                    first: first.to_string(),
                    second: instrument.ticker.clone(),
                });
            }
            indices.push((instrument.index, instrument.ticker.as_str()));
            if !is_hex_color(&instrument.color) {
                return Err(RegistryError::InvalidColor {
                    ticker: instrument.ticker.clone(),
                    color: instrument.color.clone(),
                });
            }
        }
        Ok(())
    }

    /// Looks up an instrument by ticker. Returns `None` if not found.
    pub fn find(&self, ticker: &str) -> Option<&InstrumentConfig> {
        self.instruments.iter().find(|i| i.ticker == ticker)
    }

    /// Like [`find`](Self::find), but a missing ticker is an error.
    pub fn lookup(&self, ticker: &str) -> Result<&InstrumentConfig, ConfigLookupError> {
        self.find(ticker).ok_or_else(|| ConfigLookupError {
            ticker: ticker.to_string(),
        })
    }

    /// Orders `tickers` by column index (ticker name breaks ties).
    /// Fails on the first ticker without a configuration.
    pub fn sorted_tickers<S: AsRef<str>>(
        &self,
        tickers: &[S],
    ) -> Result<Vec<String>, ConfigLookupError> {
        let mut resolved = tickers
            .iter()
            .map(|t| self.lookup(t.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        resolved.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.ticker.cmp(&b.ticker)));
        resolved.dedup_by(|a, b| a.ticker == b.ticker);
        Ok(resolved.into_iter().map(|i| i.ticker.clone()).collect())
    }

    /// All configured tickers in column order.
    pub fn tickers(&self) -> Vec<&str> {
        let mut sorted: Vec<&InstrumentConfig> = self.instruments.iter().collect();
        sorted.sort_by_key(|i| i.index);
        sorted.into_iter().map(|i| i.ticker.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
