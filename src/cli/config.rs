//! Concord configuration file handling
//!
//! Provides default configuration generation and loading for the Concord CLI.
//! Configuration files are TOML format and stored under the user's data
//! directory next to the wallet state file.
//!
//! ## Operator vs Wallet Configuration
//!
//! This file contains OPERATOR configuration only: where the wallet state
//! lives and how the CLI logs.
//!
//! The owner set and the quorum policy are stored in the wallet state and
//! change only through approved governance proposals. The config file CANNOT
//! modify them.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

/// Default wallet name
const DEFAULT_WALLET_NAME: &str = "concord";

/// Concord CLI configuration (OPERATOR settings only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcordConfig {
    /// Wallet state configuration
    pub wallet: WalletConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Wallet state configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Path to the CBOR wallet snapshot
    pub state_path: PathBuf,

    /// Label the wallet address is derived from on `init`
    #[serde(default = "default_wallet_name")]
    pub name: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

fn default_wallet_name() -> String {
    DEFAULT_WALLET_NAME.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

impl Default for ConcordConfig {
    fn default() -> Self {
        Self::new(default_state_path())
    }
}

impl ConcordConfig {
    /// Create a new configuration with the given state path
    pub fn new(state_path: PathBuf) -> Self {
        Self {
            wallet: WalletConfig {
                state_path,
                name: default_wallet_name(),
            },
            logging: LoggingConfig::default(),
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: ConcordConfig = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        Ok(config)
    }

    /// Load an explicitly requested file, or the default file if one exists,
    /// or fall back to built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = default_config_path();
                if path.exists() {
                    Self::load(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(path, contents)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        Ok(())
    }

    /// Generate default configuration content as a string with comments
    pub fn generate_default_toml(state_path: &Path) -> String {
        format!(
            r#"# Concord Wallet Configuration (Operator Settings)
#
# This file contains OPERATOR configuration only: where the wallet state
# lives and how the CLI logs.
#
# OWNERS AND QUORUM are stored in the wallet state and change only through
# GOVERNANCE PROPOSALS approved by the owners (`concord govern ...`).

[wallet]
# Path to the CBOR wallet snapshot
state_path = "{state_path}"

# Label the wallet address is derived from
name = "{name}"

[logging]
# Log level: trace, debug, info, warn, error
# RUST_LOG overrides this when set
level = "{level}"

# Log file path (optional, logs to stderr if not specified)
# file = "/var/log/concord/concord.log"
"#,
            state_path = state_path.display(),
            name = DEFAULT_WALLET_NAME,
            level = DEFAULT_LOG_LEVEL,
        )
    }

    /// Create and save a default configuration file
    pub fn create_default(
        config_path: &Path,
        state_path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let contents = Self::generate_default_toml(state_path);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(config_path, contents).map_err(|e| {
            format!(
                "Failed to write config file '{}': {}",
                config_path.display(),
                e
            )
        })?;

        Ok(())
    }
}

/// Concord's data directory: `<data_dir>/concord`
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("concord")
}

/// Get the default config file path
pub fn default_config_path() -> PathBuf {
    default_data_dir().join("config.toml")
}

/// Get the default wallet state path
pub fn default_state_path() -> PathBuf {
    default_data_dir().join("wallet.cbor")
}

/// Config path that sits next to a state file
pub fn config_path_for_state(state_path: &Path) -> PathBuf {
    state_path
        .parent()
        .unwrap_or(state_path)
        .join("config.toml")
}
