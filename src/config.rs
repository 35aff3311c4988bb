//! Runtime configuration for the vanity address generator.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::crypto::{AddressFormat, PrivateKey};
use crate::matcher::{Pattern, PatternPosition};
use crate::worker::{SearchMode, SearchRequest};

/// Longest address produced by any supported format (taproot).
const MAX_ADDRESS_LEN: usize = 62;

/// Tuning knobs for a search unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceConfig {
    /// Addresses generated between yields in batch mode
    pub batch_size: usize,
    /// Attempts between progress reports in search mode
    #[serde(alias = "progressInterval")]
    pub progress_interval_attempts: u64,
    /// Attempts after which a unit gives up
    pub max_attempts: u64,
    /// Delay at each yield point; 0 yields the thread, negative never yields
    #[serde(alias = "workerDelay")]
    pub yield_delay_ms: i64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            progress_interval_attempts: 2000,
            max_attempts: 2_000_000,
            yield_delay_ms: 0,
        }
    }
}

impl PerformanceConfig {
    /// Loads a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidPerformance(
                "batch size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Bitcoin Vanity Address Generator
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Pattern to search for (case-insensitive)
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Address type: p2pkh, p2sh, p2wpkh or p2tr
    #[arg(short = 'a', long, default_value = "p2pkh")]
    pub address_type: AddressFormat,

    /// Pattern position: start, end, middle or anywhere
    #[arg(short = 'P', long, default_value = "start")]
    pub position: PatternPosition,

    /// Matches to find, or addresses to generate with --batch
    #[arg(short = 'n', long, default_value = "1")]
    pub count: usize,

    /// Number of worker threads (default: number of CPU cores)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Generate random addresses without pattern matching
    #[arg(long, default_value = "false")]
    pub batch: bool,

    /// Fixed private key (hex) for every generated address in batch mode
    #[arg(long, requires = "batch")]
    pub test_private_key: Option<String>,

    /// Addresses per batch between yields
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Attempts between progress reports from each worker
    #[arg(long)]
    pub progress_interval: Option<u64>,

    /// Attempts after which each worker gives up
    #[arg(long)]
    pub max_attempts: Option<u64>,

    /// Yield delay in milliseconds (negative disables yielding)
    #[arg(long, allow_negative_numbers = true)]
    pub yield_delay_ms: Option<i64>,

    /// JSON file with performance settings
    #[arg(long)]
    pub perf_config: Option<PathBuf>,

    /// Print raw worker messages as JSON lines
    #[arg(long, default_value = "false")]
    pub json: bool,

    /// Progress report interval in seconds
    #[arg(short = 'r', long, default_value = "5")]
    pub report_interval: u64,
}

impl Config {
    /// Returns the number of workers, defaulting to CPU count
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref key) = self.test_private_key {
            PrivateKey::from_hex(key)
                .map_err(|_| ConfigError::InvalidKey("expected 64 hex characters".into()))?;
        }

        if self.batch {
            return Ok(());
        }

        let pattern = self.pattern.as_deref().unwrap_or_default();
        if pattern.is_empty() {
            return Err(ConfigError::InvalidPattern(
                "Pattern is required unless --batch is given".into(),
            ));
        }

        if pattern.len() > MAX_ADDRESS_LEN {
            return Err(ConfigError::InvalidPattern(format!(
                "Pattern cannot be longer than {} characters",
                MAX_ADDRESS_LEN
            )));
        }

        let impossible = self.compiled_pattern().impossible_chars(self.address_type);
        if !impossible.is_empty() {
            return Err(ConfigError::InvalidPattern(format!(
                "{} addresses never contain {:?} at this position",
                self.address_type, impossible
            )));
        }

        if self.count == 0 {
            return Err(ConfigError::InvalidPattern(
                "Count must be at least 1 in search mode".into(),
            ));
        }

        Ok(())
    }

    /// Returns the compiled pattern
    pub fn compiled_pattern(&self) -> Pattern {
        Pattern::new(self.pattern.as_deref(), self.position)
    }

    /// Performance settings: file (if any), then command-line overrides.
    pub fn performance(&self) -> Result<PerformanceConfig, ConfigError> {
        let mut perf = match self.perf_config {
            Some(ref path) => PerformanceConfig::from_json_file(path)?,
            None => PerformanceConfig::default(),
        };
        if let Some(batch_size) = self.batch_size {
            perf.batch_size = batch_size;
        }
        if let Some(interval) = self.progress_interval {
            perf.progress_interval_attempts = interval;
        }
        if let Some(max_attempts) = self.max_attempts {
            perf.max_attempts = max_attempts;
        }
        if let Some(delay) = self.yield_delay_ms {
            perf.yield_delay_ms = delay;
        }
        perf.validate()?;
        Ok(perf)
    }

    /// Builds the request template handed to every worker.
    pub fn request(&self, performance: PerformanceConfig) -> SearchRequest {
        SearchRequest {
            mode: if self.batch {
                SearchMode::Batch
            } else {
                SearchMode::PatternSearch
            },
            address_format: self.address_type,
            pattern: self.pattern.clone(),
            pattern_position: self.position,
            count: self.count,
            target_count: Some(self.count),
            unit_id: 0,
            test_private_key: self.test_private_key.clone(),
            performance_config: Some(performance),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("Invalid private key: {0}")]
    InvalidKey(String),
    #[error("Invalid performance settings: {0}")]
    InvalidPerformance(String),
    #[error("Cannot read config: {0}")]
    Io(String),
    #[error("Cannot parse config: {0}")]
    Parse(String),
}
