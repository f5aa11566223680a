//! Run configuration
//!
//! Settings come from, in increasing priority: built-in defaults, a TOML
//! file, `BIGRAM_REDUCE_*` environment variables, and CLI flags.

pub mod loader;

pub use loader::{load_config, CONFIG_FILE_NAME};

use crate::error::{BigramError, ErrorCode, Result};
use crate::execution::{DriverConfig, Topology};
use crate::finalize::FormatType;
use crate::tokenizer::{WordTokenizer, DEFAULT_MAX_RECORD_BYTES};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BigramConfig {
    /// Number of in-memory partitions for a single input stream
    pub partitions: usize,
    pub topology: Topology,
    pub max_parallel: usize,
    pub max_retries: u32,
    pub top_k: usize,
    pub lowercase: bool,
    pub max_record_bytes: usize,
    pub log_level: Option<String>,
    pub format: FormatType,
}

impl Default for BigramConfig {
    fn default() -> Self {
        let driver = DriverConfig::default();
        Self {
            partitions: driver.max_parallel,
            topology: driver.topology,
            max_parallel: driver.max_parallel,
            max_retries: driver.max_retries,
            top_k: 10,
            lowercase: true,
            max_record_bytes: DEFAULT_MAX_RECORD_BYTES,
            log_level: Some("info".to_string()),
            format: FormatType::default(),
        }
    }
}

impl BigramConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `BIGRAM_REDUCE_*` overrides from the process environment
    pub fn merge_env_vars(&mut self) -> Result<()> {
        self.merge_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn merge_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("BIGRAM_REDUCE_PARTITIONS") {
            self.partitions = parse_env("BIGRAM_REDUCE_PARTITIONS", &value)?;
        }
        if let Some(value) = lookup("BIGRAM_REDUCE_TOPOLOGY") {
            self.topology = parse_env_enum("BIGRAM_REDUCE_TOPOLOGY", &value)?;
        }
        if let Some(value) = lookup("BIGRAM_REDUCE_MAX_PARALLEL") {
            self.max_parallel = parse_env("BIGRAM_REDUCE_MAX_PARALLEL", &value)?;
        }
        if let Some(value) = lookup("BIGRAM_REDUCE_MAX_RETRIES") {
            self.max_retries = parse_env("BIGRAM_REDUCE_MAX_RETRIES", &value)?;
        }
        if let Some(value) = lookup("BIGRAM_REDUCE_TOP_K") {
            self.top_k = parse_env("BIGRAM_REDUCE_TOP_K", &value)?;
        }
        if let Some(value) = lookup("BIGRAM_REDUCE_LOWERCASE") {
            self.lowercase = parse_env("BIGRAM_REDUCE_LOWERCASE", &value)?;
        }
        if let Some(value) = lookup("BIGRAM_REDUCE_MAX_RECORD_BYTES") {
            self.max_record_bytes = parse_env("BIGRAM_REDUCE_MAX_RECORD_BYTES", &value)?;
        }
        if let Some(value) = lookup("BIGRAM_REDUCE_FORMAT") {
            self.format = parse_env_enum("BIGRAM_REDUCE_FORMAT", &value)?;
        }
        if let Some(value) = lookup("BIGRAM_REDUCE_LOG_LEVEL") {
            self.log_level = Some(value);
        }
        Ok(())
    }

    /// Reject settings the driver cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.partitions == 0 {
            return Err(invalid("partitions must be at least 1"));
        }
        if self.max_parallel == 0 {
            return Err(invalid("max_parallel must be at least 1"));
        }
        if self.top_k == 0 {
            return Err(invalid("top_k must be at least 1"));
        }
        if self.max_record_bytes == 0 {
            return Err(invalid("max_record_bytes must be at least 1"));
        }
        Ok(())
    }

    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            topology: self.topology,
            max_parallel: self.max_parallel,
            max_retries: self.max_retries,
        }
    }

    pub fn tokenizer(&self) -> WordTokenizer {
        WordTokenizer::new()
            .with_lowercase(self.lowercase)
            .with_max_record_bytes(self.max_record_bytes)
    }
}

fn invalid(message: &str) -> BigramError {
    BigramError::config_with_code(ErrorCode::CONFIG_INVALID_VALUE, message)
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().map_err(|e| {
        BigramError::config_with_code(
            ErrorCode::CONFIG_INVALID_VALUE,
            format!("{} has invalid value '{}'", key, value),
        )
        .with_source(e)
    })
}

fn parse_env_enum<T: for<'de> Deserialize<'de>>(key: &str, value: &str) -> Result<T> {
    T::deserialize(serde::de::value::StrDeserializer::<serde::de::value::Error>::new(
        value.trim(),
    ))
    .map_err(|e| {
        BigramError::config_with_code(
            ErrorCode::CONFIG_INVALID_VALUE,
            format!("{} has invalid value '{}'", key, value),
        )
        .with_source(e)
    })
}
