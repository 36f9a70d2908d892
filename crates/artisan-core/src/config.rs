//! Configuration loading and typed config structures for the Artisan server.
//!
//! The server reads one YAML file (`config/artisan.yaml` by default) with
//! four sections: `crafting`, `pipeline`, `logging`, and `world`. Every
//! field has a default, so an empty file is a valid configuration.

use std::path::{Path, PathBuf};

use artisan_rules::CraftingConfig;
use serde::{Deserialize, Serialize};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A field parsed but holds a value that cannot be used.
    #[error("invalid config value for {field}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Crafting rules.
    #[serde(default)]
    pub crafting: CraftingConfig,

    /// Pipeline timing.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// World data and randomness.
    #[serde(default)]
    pub world: WorldConfig,
}

impl ServerConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a crafting value is unusable.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config
            .crafting
            .validate()
            .map_err(|field| ConfigError::Invalid { field })?;
        Ok(config)
    }
}

/// Delays for the deferred steps of a crafting attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Time to drop out of a combat stance, in milliseconds.
    #[serde(default = "default_stance_change_ms")]
    pub stance_change_ms: u64,

    /// Length of the crafting animation, in milliseconds.
    #[serde(default = "default_clap_ms")]
    pub clap_ms: u64,

    /// How long a confirmation dialog waits for an answer, in milliseconds.
    #[serde(default = "default_confirmation_timeout_ms")]
    pub confirmation_timeout_ms: u64,
}

const fn default_stance_change_ms() -> u64 {
    1_000
}

const fn default_clap_ms() -> u64 {
    1_500
}

const fn default_confirmation_timeout_ms() -> u64 {
    30_000
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stance_change_ms: default_stance_change_ms(),
            clap_ms: default_clap_ms(),
            confirmation_timeout_ms: default_confirmation_timeout_ms(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    String::from("info")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// World data and randomness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Seed for the shared generator. Seeded from the OS when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Recipe book and actor seed data.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// First guid handed to created items.
    #[serde(default = "default_first_dynamic_guid")]
    pub first_dynamic_guid: u32,
}

fn default_data_file() -> PathBuf {
    PathBuf::from("config/world.yaml")
}

const fn default_first_dynamic_guid() -> u32 {
    0x8000_0000
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: None,
            data_file: default_data_file(),
            first_dynamic_guid: default_first_dynamic_guid(),
        }
    }
}
