//! TOML configuration for the benchmark driver.
//!
//! Every key is optional:
//!
//! ```toml
//! input = "images/frank.png"
//! output = "out/blurred.png"
//! runs = 100
//! strategies = ["sequential", "pixel", "column", "row", "quadrant"]
//!
//! [synthetic]
//! width = 640
//! height = 480
//! seed = 7
//!
//! [spawn]
//! max_attempts = 64
//! initial_backoff_us = 50
//! max_backoff_ms = 20
//! max_in_flight = 0
//!
//! [logging]
//! filter = "info"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::dispatch::SpawnPolicy;
use crate::error::Result;
use crate::strategy::Strategy;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    /// Picture to blur. A synthetic picture is generated when absent.
    pub input: Option<PathBuf>,
    /// Where to save the last blurred picture.
    pub output: Option<PathBuf>,
    /// Timed passes per strategy.
    pub runs: usize,
    pub strategies: Vec<Strategy>,
    pub synthetic: SyntheticConfig,
    pub spawn: SpawnConfig,
    pub logging: LogConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            runs: 100,
            strategies: Strategy::ALL.to_vec(),
            synthetic: SyntheticConfig::default(),
            spawn: SpawnConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

impl BenchConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Random test picture used when no input file is configured.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyntheticConfig {
    pub width: usize,
    pub height: usize,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpawnConfig {
    pub max_attempts: u32,
    pub initial_backoff_us: u64,
    pub max_backoff_ms: u64,
    /// 0 means unlimited.
    pub max_in_flight: usize,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        let policy = SpawnPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            initial_backoff_us: policy.initial_backoff.as_micros() as u64,
            max_backoff_ms: policy.max_backoff.as_millis() as u64,
            max_in_flight: policy.max_in_flight.unwrap_or(0),
        }
    }
}

impl From<&SpawnConfig> for SpawnPolicy {
    fn from(config: &SpawnConfig) -> Self {
        SpawnPolicy {
            max_attempts: config.max_attempts,
            initial_backoff: Duration::from_micros(config.initial_backoff_us),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            max_in_flight: None,
        }
        .with_max_in_flight(config.max_in_flight)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `env_logger` filter string; `RUST_LOG` applies when unset.
    pub filter: Option<String>,
}
