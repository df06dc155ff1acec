//! # Configuration File
//!
//! YAML configuration for the `convcode` binary. Every section is optional;
//! missing keys take their defaults.
//!
//! ## Configuration Search Path
//!
//! Configuration is loaded from the first file found:
//! 1. Path specified via `CONVCODE_CONFIG` environment variable
//! 2. `./convcode.yaml` (current directory)
//! 3. `~/.config/convcode/config.yaml` (user config)
//! 4. `/etc/convcode/config.yaml` (system config)
//!
//! ## Example Configuration
//!
//! ```yaml
//! code:
//!   constraint_length: 7
//!   generators: [121, 91]   # 0o171, 0o133
//!
//! logging:
//!   level: debug
//!   format: json
//!
//! sweep:
//!   block_length: 1000
//!   snr_db: [0.0, 1.0, 2.0, 3.0]
//!   num_blocks: 200
//!   decision: hard
//!   seed: 42
//! ```

use std::path::{Path, PathBuf};

use convcode_core::logging::LogConfig;
use convcode_core::CodeConfig;
use convcode_sim::SweepConfig;
use serde::{Deserialize, Serialize};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "CONVCODE_CONFIG";

/// Error type for configuration operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("config not found: {0}")]
    NotFound(String),
    /// Failed to read configuration file
    #[error("failed to read config: {0}")]
    ReadError(String),
    /// Failed to parse configuration
    #[error("failed to parse config: {0}")]
    ParseError(String),
    /// Invalid configuration value
    #[error("invalid config: {0}")]
    ValidationError(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Code parameters
    pub code: CodeConfig,
    /// Logging settings
    pub logging: LogConfig,
    /// Defaults for the `ber` subcommand
    pub sweep: SweepConfig,
}

impl AppConfig {
    /// Load configuration from the standard search path.
    ///
    /// Returns default config if no file is found. A `CONVCODE_CONFIG` that
    /// names a missing file is an error.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load_from(Path::new(&path));
        }

        for path in &Self::config_search_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading config");
                return Self::load_from(path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

        Self::parse(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Get configuration search paths (after the environment variable).
    pub fn config_search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./convcode.yaml")];

        if let Some(dirs) = directories::ProjectDirs::from("", "", "convcode") {
            paths.push(dirs.config_dir().join("config.yaml"));
        }

        paths.push(PathBuf::from("/etc/convcode/config.yaml"));

        paths
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.code
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        self.sweep
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
