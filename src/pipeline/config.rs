//! Batch pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::harness::WrapPolicy;
use crate::oracle::OracleConfig;

/// Configuration for one batch run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Transaction-envelope policy for the harness wrapper.
    pub wrap_policy: WrapPolicy,
    /// Maximum number of concurrent compile calls.
    pub max_concurrent: usize,
    /// Compiler oracle settings.
    pub oracle: OracleConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            wrap_policy: WrapPolicy::AlwaysWrap,
            max_concurrent: 4,
            oracle: OracleConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Creates configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FORGE_WRAP_POLICY`: `always` or `detect` (default: always)
    /// - `FORGE_MAX_CONCURRENT`: concurrent compile calls (default: 4)
    /// - `FORGE_COMPILER`: compiler binary (default: csc)
    /// - `FORGE_BASE_REFERENCES`: comma-separated base reference names
    /// - `FORGE_TARGET_API_LIBS`: comma-separated target-API library paths
    /// - `FORGE_COMPILE_TIMEOUT_SECS`: per-record compile timeout (default: 60)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("FORGE_WRAP_POLICY") {
            config.wrap_policy = val.parse()?;
        }

        if let Ok(val) = std::env::var("FORGE_MAX_CONCURRENT") {
            config.max_concurrent = parse_env_value(&val, "FORGE_MAX_CONCURRENT")?;
        }

        if let Ok(val) = std::env::var("FORGE_COMPILER") {
            config.oracle.compiler = val;
        }

        if let Ok(val) = std::env::var("FORGE_BASE_REFERENCES") {
            config.oracle.base_references =
                val.split(',').map(|s| s.trim().to_string()).collect();
        }

        if let Ok(val) = std::env::var("FORGE_TARGET_API_LIBS") {
            config.oracle.target_api_libraries =
                val.split(',').map(|s| PathBuf::from(s.trim())).collect();
        }

        if let Ok(val) = std::env::var("FORGE_COMPILE_TIMEOUT_SECS") {
            let secs: u64 = parse_env_value(&val, "FORGE_COMPILE_TIMEOUT_SECS")?;
            config.oracle.compile_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.oracle.compile_timeout.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "compile timeout must be non-zero".to_string(),
            ));
        }
        if self.oracle.compiler.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "compiler binary must be set".to_string(),
            ));
        }
        if self.oracle.target_api_libraries.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "at least one target-API library is required".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_env_value<T: std::str::FromStr>(val: &str, key: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    val.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}
