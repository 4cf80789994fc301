//! Configuration management for ledgerdash
//!
//! This module handles loading, validation, and management of
//! ledgerdash configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8082
}

/// Location of the ledger executable and the journal it reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Path to the ledger executable
    #[serde(default = "default_exe_path")]
    pub exe_path: PathBuf,
    /// Journal passed with `-f`; when absent ledger falls back to its own defaults
    #[serde(default = "default_file_path")]
    pub file_path: Option<PathBuf>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            exe_path: default_exe_path(),
            file_path: default_file_path(),
        }
    }
}

fn default_exe_path() -> PathBuf {
    PathBuf::from("/bin/ledger")
}

fn default_file_path() -> Option<PathBuf> {
    Some(PathBuf::from("transactions.ledger"))
}

/// Dashboard behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Fold accounts without a second level into `<root>:Other`
    #[serde(default = "default_false")]
    pub collect_bottom_level: bool,
    /// Accounts shown on the expense charts
    #[serde(default = "default_expense_prefix")]
    pub expense_prefix: String,
    /// Accounts summed into the net worth line
    #[serde(default = "default_net_worth_prefixes")]
    pub net_worth_prefixes: Vec<String>,
    /// Trailing months warmed by a prefetch
    #[serde(default = "default_prefetch_months")]
    pub prefetch_months: u32,
    /// Warm the cache before the server starts accepting requests
    #[serde(default = "default_true")]
    pub prefetch_on_start: bool,
    /// First year covered by cumulative balance queries
    #[serde(default = "default_epoch_year")]
    pub epoch_year: i32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            collect_bottom_level: false,
            expense_prefix: default_expense_prefix(),
            net_worth_prefixes: default_net_worth_prefixes(),
            prefetch_months: default_prefetch_months(),
            prefetch_on_start: true,
            epoch_year: default_epoch_year(),
        }
    }
}

fn default_expense_prefix() -> String {
    "Expenses:".to_string()
}

fn default_net_worth_prefixes() -> Vec<String> {
    vec!["Assets:".to_string(), "Liabilities:".to_string()]
}

fn default_prefetch_months() -> u32 {
    12
}

fn default_epoch_year() -> i32 {
    1970
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Ledger executable and journal
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Dashboard settings
    #[serde(default)]
    pub dashboard: DashboardConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;

        Ok(config)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::InvalidYaml { message: e.to_string() })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.ledger.exe_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "ledger.exe_path".to_string(),
            });
        }

        if self.dashboard.prefetch_months == 0 || self.dashboard.prefetch_months > 120 {
            return Err(ConfigError::InvalidValue {
                field: "dashboard.prefetch_months".to_string(),
                reason: "Prefetch months must be between 1 and 120".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Log level must be one of: {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.server.port, 8082);
        assert_eq!(config.ledger.exe_path, PathBuf::from("/bin/ledger"));
        assert_eq!(config.ledger.file_path, Some(PathBuf::from("transactions.ledger")));
        assert_eq!(config.dashboard.prefetch_months, 12);
        assert_eq!(config.dashboard.epoch_year, 1970);
        assert_eq!(config.dashboard.expense_prefix, "Expenses:");
        assert!(!config.dashboard.collect_bottom_level);
    }

    #[test]
    fn test_partial_section() {
        let yaml = r#"
ledger:
  exe_path: /usr/local/bin/ledger
  file_path: ~
dashboard:
  collect_bottom_level: true
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.ledger.exe_path, PathBuf::from("/usr/local/bin/ledger"));
        assert_eq!(config.ledger.file_path, None);
        assert!(config.dashboard.collect_bottom_level);
        assert_eq!(config.dashboard.net_worth_prefixes.len(), 2);
    }

    #[test]
    fn test_default_template_is_valid() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:8082");
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_yaml("server:\n  port: 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "server.port"
        ));
    }

    #[test]
    fn test_invalid_log_level() {
        let err = Config::from_yaml("logging:\n  level: loud\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "logging.level"
        ));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("server: [").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidYaml { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load("/nonexistent/ledgerdash.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}
