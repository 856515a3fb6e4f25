//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/smslog/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/smslog/` (~/.config/smslog/)
//! - Data: `$XDG_DATA_HOME/smslog/` (~/.local/share/smslog/)
//! - State/Logs: `$XDG_STATE_HOME/smslog/` (~/.local/state/smslog/)

use crate::error::{Error, Result};
use chrono::FixedOffset;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Record log and fingerprint index locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Remote ingestion endpoint for `smslog push`
    #[serde(default)]
    pub forward: ForwardConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Message store configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding the record log and fingerprint index.
    /// Defaults to the XDG data directory.
    pub data_dir: Option<PathBuf>,

    /// Record log file name
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Fingerprint index file name
    #[serde(default = "default_index_file")]
    pub index_file: String,

    /// Fixed UTC offset used when rendering display timestamps
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_file: default_log_file(),
            index_file: default_index_file(),
            utc_offset_minutes: 0,
        }
    }
}

impl StorageConfig {
    /// Directory holding the store files.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(Config::data_dir)
    }

    /// Full path of the record log.
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join(&self.log_file)
    }

    /// Full path of the fingerprint index.
    pub fn index_path(&self) -> PathBuf {
        self.data_dir().join(&self.index_file)
    }

    /// The display offset as a chrono offset.
    pub fn display_offset(&self) -> Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                Error::Config(format!(
                    "storage.utc_offset_minutes out of range: {}",
                    self.utc_offset_minutes
                ))
            })
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.log_file.trim().is_empty() {
            return Err(Error::Config("storage.log_file must not be empty".to_string()));
        }
        if self.index_file.trim().is_empty() {
            return Err(Error::Config(
                "storage.index_file must not be empty".to_string(),
            ));
        }
        if self.log_file == self.index_file {
            return Err(Error::Config(
                "storage.log_file and storage.index_file must differ".to_string(),
            ));
        }
        if self.utc_offset_minutes.unsigned_abs() >= 24 * 60 {
            return Err(Error::Config(
                "storage.utc_offset_minutes must be within +/-1439".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_log_file() -> String {
    "messages.txt".to_string()
}

fn default_index_file() -> String {
    "message_hashes.txt".to_string()
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address the ingestion server binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

/// Forwarding client configuration
///
/// Used by `smslog push` to post events to a remote smslog server
/// in the same form shape phones use.
#[derive(Debug, Deserialize, Clone)]
pub struct ForwardConfig {
    /// Ingestion endpoint URL (e.g., `https://sms.example.com/messages`)
    pub server_url: Option<String>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_forward_timeout")]
    pub timeout_secs: u64,

    /// Max retry attempts for transient failures
    #[serde(default = "default_forward_max_retries")]
    pub max_retries: usize,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            timeout_secs: default_forward_timeout(),
            max_retries: default_forward_max_retries(),
        }
    }
}

impl ForwardConfig {
    /// Check if a remote endpoint is configured
    pub fn is_ready(&self) -> bool {
        self.server_url.is_some()
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.server_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "forward.server_url must be an http(s) URL, got {url}"
                )));
            }
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config(
                "forward.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_forward_timeout() -> u64 {
    30
}

fn default_forward_max_retries() -> usize {
    3
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.storage.validate()?;
        self.forward.validate()?;
        Ok(())
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/smslog/config.toml` (~/.config/smslog/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("smslog").join("config.toml")
    }

    /// Returns the data directory path (record log and fingerprint index)
    ///
    /// `$XDG_DATA_HOME/smslog/` (~/.local/share/smslog/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("smslog")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/smslog/` (~/.local/state/smslog/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("smslog")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/smslog/smslog.log` (~/.local/state/smslog/smslog.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("smslog.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path behavior
    /// before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_DATA_HOME").is_err() {
            std::env::set_var("XDG_DATA_HOME", home.join(".local/share"));
        }

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage.log_file, "messages.txt");
        assert_eq!(config.storage.index_file, "message_hashes.txt");
        assert_eq!(config.storage.utc_offset_minutes, 0);
        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[storage]
data_dir = "/srv/sms"
utc_offset_minutes = 180

[server]
bind_addr = "0.0.0.0:9000"

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.storage.data_dir(), PathBuf::from("/srv/sms"));
        assert_eq!(
            config.storage.log_path(),
            PathBuf::from("/srv/sms/messages.txt")
        );
        assert_eq!(config.storage.utc_offset_minutes, 180);
        assert_eq!(config.server.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.max_files, 5);
    }

    #[test]
    fn test_display_offset() {
        let storage = StorageConfig {
            utc_offset_minutes: 180,
            ..Default::default()
        };
        let offset = storage.display_offset().unwrap();
        assert_eq!(offset.local_minus_utc(), 3 * 3600);
    }

    #[test]
    fn test_storage_validation() {
        let storage = StorageConfig {
            utc_offset_minutes: 24 * 60,
            ..Default::default()
        };
        assert!(storage.validate().is_err());

        let storage = StorageConfig {
            index_file: "messages.txt".to_string(),
            ..Default::default()
        };
        assert!(storage.validate().is_err());

        let storage = StorageConfig {
            log_file: "  ".to_string(),
            ..Default::default()
        };
        assert!(storage.validate().is_err());
    }

    #[test]
    fn test_extreme_offsets_are_config_errors() {
        for minutes in [i32::MIN, i32::MAX, -1440] {
            let storage = StorageConfig {
                utc_offset_minutes: minutes,
                ..Default::default()
            };
            assert!(matches!(storage.validate(), Err(Error::Config(_))), "{minutes}");
            assert!(matches!(storage.display_offset(), Err(Error::Config(_))), "{minutes}");
        }

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage]\nutc_offset_minutes = -2147483648\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_forward_config_defaults() {
        let config = ForwardConfig::default();
        assert!(config.server_url.is_none());
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_retries, 3);
        assert!(!config.is_ready());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_forward_config_validation() {
        let config = ForwardConfig {
            server_url: Some("ftp://example.com".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ForwardConfig {
            server_url: Some("https://sms.example.com/messages".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.is_ready());
    }
}
