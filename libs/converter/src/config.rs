//! # Converter Configuration
//!
//! Tunables for scratch pooling and service id resolution. Loaded from a
//! TOML file or string with environment variable overrides on top; any
//! field left out takes its default.
//!
//! ```toml
//! [pool]
//! initial_size = 32
//! scratch_capacity = 2048
//!
//! [resolution]
//! cache_service_ids = false
//! ```

use crate::error::{ConversionError, ConversionResult};
use anyhow::{Context, Result};
use pool::DEFAULT_INITIAL_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Default capacity of pooled scratch buffers, sized for typical messages
pub const DEFAULT_SCRATCH_CAPACITY: usize = 1024;

/// Top-level converter configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Scratch buffer pool settings
    pub pool: PoolConfig,

    /// Service id resolution settings
    pub resolution: ResolutionConfig,
}

/// Scratch buffer pool settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Buffers manufactured up front
    pub initial_size: usize,

    /// Capacity reserved by each newly manufactured buffer (bytes)
    pub scratch_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_size: DEFAULT_INITIAL_SIZE,
            scratch_capacity: DEFAULT_SCRATCH_CAPACITY,
        }
    }
}

/// Service id resolution settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Remember ids returned by the callback instead of asking again
    pub cache_service_ids: bool,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            cache_service_ids: true,
        }
    }
}

impl ConverterConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config = Self::parse(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_overrides(path, |key| std::env::var(key).ok())
    }

    /// [`load`](Self::load) with overrides taken from `lookup`.
    ///
    /// Validation runs once, after the overrides, so an override can fix an
    /// invalid file value.
    pub fn load_with_overrides<F>(path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        info!("Loading converter config: {:?}", path);

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read converter config {:?}", path))?;
        let mut config = Self::parse(&content)?;

        config.apply_env_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `CONVERTER_*` variables found through `lookup`.
    ///
    /// Values that do not parse are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(size) = lookup("CONVERTER_INITIAL_SIZE").and_then(|v| v.parse::<usize>().ok()) {
            debug!(size, "initial_size overridden from environment");
            self.pool.initial_size = size;
        }

        if let Some(capacity) = lookup("CONVERTER_SCRATCH_CAPACITY").and_then(|v| v.parse::<usize>().ok()) {
            debug!(capacity, "scratch_capacity overridden from environment");
            self.pool.scratch_capacity = capacity;
        }

        if let Some(cache) = lookup("CONVERTER_CACHE_SERVICE_IDS").and_then(|v| v.parse::<bool>().ok()) {
            debug!(cache, "cache_service_ids overridden from environment");
            self.resolution.cache_service_ids = cache;
        }
    }

    fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse converter configuration")
    }

    /// Reject values the converter cannot run with
    pub fn validate(&self) -> ConversionResult<()> {
        if self.pool.scratch_capacity == 0 {
            return Err(ConversionError::invalid_config(
                "pool.scratch_capacity",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = ConverterConfig::default();
        assert_eq!(config.pool.initial_size, 16);
        assert_eq!(config.pool.scratch_capacity, DEFAULT_SCRATCH_CAPACITY);
        assert!(config.resolution.cache_service_ids);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ConverterConfig::from_toml_str(
            r#"
[pool]
initial_size = 64
"#,
        )
        .unwrap();

        assert_eq!(config.pool.initial_size, 64);
        assert_eq!(config.pool.scratch_capacity, DEFAULT_SCRATCH_CAPACITY);
        assert!(config.resolution.cache_service_ids);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(
            ConverterConfig::from_toml_str("").unwrap(),
            ConverterConfig::default()
        );
    }

    #[test]
    fn test_zero_scratch_capacity_rejected() {
        let err = ConverterConfig::from_toml_str("[pool]\nscratch_capacity = 0\n").unwrap_err();
        assert!(err.to_string().contains("pool.scratch_capacity"));
    }

    #[test]
    fn test_malformed_toml_reports_context() {
        let err = ConverterConfig::from_toml_str("[pool\ninitial_size = ").unwrap_err();
        assert!(err
            .to_string()
            .contains("Failed to parse converter configuration"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CONVERTER_INITIAL_SIZE", "4"),
            ("CONVERTER_SCRATCH_CAPACITY", "not-a-number"),
            ("CONVERTER_CACHE_SERVICE_IDS", "false"),
        ]
        .into_iter()
        .collect();

        let mut config = ConverterConfig::default();
        config.apply_env_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.pool.initial_size, 4);
        // Unparseable values leave the field alone
        assert_eq!(config.pool.scratch_capacity, DEFAULT_SCRATCH_CAPACITY);
        assert!(!config.resolution.cache_service_ids);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("converter.toml");

        fs::write(
            &config_path,
            r#"
[pool]
initial_size = 8
scratch_capacity = 4096

[resolution]
cache_service_ids = false
"#,
        )
        .unwrap();

        let config = ConverterConfig::load(&config_path).unwrap();
        assert_eq!(config.pool.scratch_capacity, 4096);
        assert!(!config.resolution.cache_service_ids);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = ConverterConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read converter config"));
    }

    #[test]
    fn test_env_override_repairs_file_value() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("converter.toml");
        fs::write(&config_path, "[pool]\nscratch_capacity = 0\n").unwrap();

        let vars: HashMap<&str, &str> = [("CONVERTER_SCRATCH_CAPACITY", "64")].into_iter().collect();
        let config = ConverterConfig::load_with_overrides(&config_path, |key| {
            vars.get(key).map(|v| v.to_string())
        })
        .unwrap();
        assert_eq!(config.pool.scratch_capacity, 64);

        // Without the override the file value is still rejected
        let err = ConverterConfig::load_with_overrides(&config_path, |_| None).unwrap_err();
        assert!(err.to_string().contains("pool.scratch_capacity"));
    }
}
