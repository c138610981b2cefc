//! Configuration management
//!
//! This module handles loading and parsing configuration for blogwire.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Record store configuration
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin, `*` for any
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_cors_origin() -> String {
    "*".to_string()
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Store backend (sqlite or memory)
    #[serde(default)]
    pub driver: DatabaseDriver,
    /// Database connection URL (ignored by the memory backend)
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::default(),
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/blogwire.db".to_string()
}

/// Record store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    /// SQLite through sqlx (default)
    #[default]
    Sqlite,
    /// Process-local store, contents are lost on exit
    Memory,
}

impl DatabaseDriver {
    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "sqlite" => Some(Self::Sqlite),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError {
        path: String,
        message: String,
    },
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist or is empty, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: format_yaml_error(&e),
        })
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables:
    /// - BLOGWIRE_SERVER_HOST
    /// - BLOGWIRE_SERVER_PORT (falls back to PORT)
    /// - BLOGWIRE_SERVER_CORS_ORIGIN
    /// - BLOGWIRE_DATABASE_DRIVER
    /// - BLOGWIRE_DATABASE_URL (falls back to DATABASE_URL)
    pub fn load_with_env(path: &std::path::Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("BLOGWIRE_SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_with_fallback("BLOGWIRE_SERVER_PORT", "PORT") {
            // Unparseable ports keep the file value
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("BLOGWIRE_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        if let Ok(driver) = std::env::var("BLOGWIRE_DATABASE_DRIVER") {
            if let Some(driver) = DatabaseDriver::parse(&driver) {
                self.database.driver = driver;
            }
        }
        if let Some(url) = env_with_fallback("BLOGWIRE_DATABASE_URL", "DATABASE_URL") {
            self.database.url = url;
        }
    }
}

fn env_with_fallback(primary: &str, fallback: &str) -> Option<String> {
    std::env::var(primary)
        .or_else(|_| std::env::var(fallback))
        .ok()
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());


/// Property-based tests for configuration parsing
#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn valid_driver_strategy() -> impl Strategy<Value = DatabaseDriver> {
        prop_oneof![Just(DatabaseDriver::Sqlite), Just(DatabaseDriver::Memory)]
    }

    fn valid_config_strategy() -> impl Strategy<Value = Config> {
        (
            "[a-z][a-z0-9]{0,10}",
            1u16..=65535,
            valid_driver_strategy(),
            "[a-z][a-z0-9_/]{0,20}\\.db",
        )
            .prop_map(|(host, port, driver, url)| Config {
                server: ServerConfig {
                    host,
                    port,
                    cors_origin: "*".to_string(),
                },
                database: DatabaseConfig { driver, url },
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// A serialized config loads back with identical values.
        #[test]
        fn config_survives_yaml_file(config in valid_config_strategy()) {
            let yaml = serde_yaml::to_string(&config).unwrap();
            let mut file = NamedTempFile::new().unwrap();
            write!(file, "{}", yaml).unwrap();

            let loaded = Config::load(file.path()).unwrap();
            prop_assert_eq!(loaded.server.host, config.server.host);
            prop_assert_eq!(loaded.server.port, config.server.port);
            prop_assert_eq!(loaded.database.driver, config.database.driver);
            prop_assert_eq!(loaded.database.url, config.database.url);
        }
    }
}
