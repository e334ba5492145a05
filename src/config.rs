//! Application configuration
//!
//! Loaded from `~/.config/tutoring-finance/config.toml` unless the
//! `FINANCE_CONFIG` environment variable points elsewhere. A missing file
//! is created with defaults on first load.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::infrastructure::database::DatabaseConfig;
use crate::shared::errors::InfraError;
use crate::shared::retry::RetryConfig;

pub const CONFIG_ENV_VAR: &str = "FINANCE_CONFIG";
const APP_DIR: &str = "tutoring-finance";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub logging: LoggingConfig,
    pub billing: BillingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for in-flight requests on shutdown.
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseSection {
    /// Full connection URL. Empty means a `finance.db` file next to the config.
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 5,
        }
    }
}

impl DatabaseSection {
    pub fn connection_url(&self) -> String {
        if !self.url.is_empty() {
            return self.url.clone();
        }
        let path = config_dir().join("finance.db");
        format!("sqlite://{}?mode=rwc", path.display())
    }

    pub fn to_database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.connection_url(),
            max_connections: self.max_connections.max(1),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `tutoring_finance=debug`.
    pub level: String,
    /// `text` or `json`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BillingConfig {
    pub invoice_prefix: String,
    /// Attempts per item insert, including the first.
    pub retry_attempts: u32,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            invoice_prefix: crate::application::services::DEFAULT_INVOICE_PREFIX.to_string(),
            retry_attempts: 3,
        }
    }
}

impl BillingConfig {
    pub fn retry(&self) -> RetryConfig {
        RetryConfig::with_attempts(self.retry_attempts)
    }
}

impl AppConfig {
    /// Read the config at `path`, writing the defaults there first if the
    /// file does not exist yet.
    pub fn load(path: &Path) -> Result<Self, InfraError> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| InfraError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), InfraError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = toml::to_string_pretty(self)
            .map_err(|e| InfraError::Config(format!("serialize config: {}", e)))?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), InfraError> {
        if self.billing.invoice_prefix.trim().is_empty() {
            return Err(InfraError::Config(
                "billing.invoice_prefix must not be empty".into(),
            ));
        }
        match self.logging.format.to_lowercase().as_str() {
            "text" | "json" => {}
            other => {
                return Err(InfraError::Config(format!(
                    "logging.format must be `text` or `json`, got `{}`",
                    other
                )))
            }
        }
        Ok(())
    }
}

fn config_dir() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Config location: `$FINANCE_CONFIG` if set, else the per-user config dir.
pub fn default_config_path() -> PathBuf {
    resolve_config_path(std::env::var(CONFIG_ENV_VAR).ok())
}

fn resolve_config_path(env_value: Option<String>) -> PathBuf {
    match env_value {
        Some(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => config_dir().join(CONFIG_FILE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("finance-config-{}", uuid::Uuid::new_v4()))
            .join(CONFIG_FILE)
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let path = scratch_path();
        let config = AppConfig::load(&path).unwrap();

        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let path = scratch_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            "[billing]\ninvoice_prefix = \"TUI\"\n\n[server]\napi_port = 9100\n",
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.billing.invoice_prefix, "TUI");
        assert_eq!(config.billing.retry_attempts, 3);
        assert_eq!(config.server.api_port, 9100);
        assert_eq!(config.logging.level, "info");
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let path = scratch_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[logging]\nformat = \"xml\"\n").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, InfraError::Config(_)));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn env_override_wins_over_default_location() {
        let path = resolve_config_path(Some("/etc/finance/config.toml".into()));
        assert_eq!(path, PathBuf::from("/etc/finance/config.toml"));

        let fallback = resolve_config_path(Some("  ".into()));
        assert!(fallback.ends_with(Path::new(APP_DIR).join(CONFIG_FILE)));
    }

    #[test]
    fn explicit_database_url_is_used_verbatim() {
        let section = DatabaseSection {
            url: "sqlite::memory:".into(),
            max_connections: 0,
        };
        let db = section.to_database_config();
        assert_eq!(db.url, "sqlite::memory:");
        assert_eq!(db.max_connections, 1);
    }
}
