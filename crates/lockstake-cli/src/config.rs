//! CLI configuration types
//!
//! Loaded from `lockstake.toml` (optional) with environment overrides such as
//! `LOCKSTAKE_LEDGER__STATE_FILE` or `LOCKSTAKE_LOGGING__LEVEL`.

use lockstake_ledger::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "LOCKSTAKE";

/// Complete CLI configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Ledger location and initialization
    #[serde(default)]
    pub ledger: LedgerSettings,

    /// Engine policies and seed tiers
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CliConfig {
    /// Load from `path` (if present) and the environment
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

/// Ledger file settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Snapshot file path
    #[serde(default = "default_state_file")]
    pub state_file: String,

    /// Admin address (hex) used by `init`
    #[serde(default)]
    pub admin: Option<String>,

    /// Interest reserve deposited by `init`, in smallest units
    #[serde(default)]
    pub initial_reserve: u64,
}

fn default_state_file() -> String {
    "~/.lockstake/ledger.json".to_string()
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            admin: None,
            initial_reserve: 0,
        }
    }
}

/// Log output format
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}
