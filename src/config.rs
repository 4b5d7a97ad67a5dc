use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::errors::{ConnectError, Result};

/// Prefix for environment variable overrides, e.g. `DOCDB_DATABASE__SEEDS`
pub const ENV_PREFIX: &str = "DOCDB";

/// Main configuration structure for the database bootstrap
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Comma separated seed list (e.g., "db1:27017,db2:27017")
    #[serde(default = "default_seeds")]
    pub seeds: String,

    /// Database name
    #[serde(default)]
    pub name: String,

    /// Replica set name
    #[serde(default)]
    pub replica_set: Option<String>,

    /// Database username
    #[serde(default)]
    pub username: String,

    /// Database password
    #[serde(default)]
    pub password: String,

    /// Enable TLS
    #[serde(default)]
    pub ssl: bool,

    /// Require certificate verification when TLS is enabled
    #[serde(default)]
    pub verify_ssl: bool,

    /// CA bundle used to verify the server certificate
    #[serde(default)]
    pub ca_path: Option<PathBuf>,

    /// Client private key
    #[serde(default)]
    pub ssl_keyfile: Option<PathBuf>,

    /// Client certificate
    #[serde(default)]
    pub ssl_certfile: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional)
    #[serde(default)]
    pub file: Option<String>,

    /// Enable console output
    #[serde(default = "default_console_output")]
    pub console: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            seeds: default_seeds(),
            name: String::new(),
            replica_set: None,
            username: String::new(),
            password: String::new(),
            ssl: false,
            verify_ssl: false,
            ca_path: None,
            ssl_keyfile: None,
            ssl_certfile: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            console: default_console_output(),
        }
    }
}

fn config_error(context: &str, detail: impl std::fmt::Display) -> ConnectError {
    ConnectError::Configuration(format!("{}: {}", context, detail))
}

// Default value functions
fn default_seeds() -> String { "localhost:27017".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_console_output() -> bool { true }

impl AppConfig {
    /// Load configuration from an optional file layered under `DOCDB_*`
    /// environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .and_then(|layered| layered.try_deserialize::<AppConfig>())
            .map_err(|e| config_error("Failed to load configuration", e))
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path.extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("json");

        let content = std::fs::read_to_string(path)
            .map_err(|e| config_error("Failed to read config file", e))?;

        match extension {
            "json" => serde_json::from_str(&content)
                .map_err(|e| config_error("Failed to parse JSON config", e)),
            "toml" => toml::from_str(&content)
                .map_err(|e| config_error("Failed to parse TOML config", e)),
            _ => Err(config_error("Unsupported config file format", extension)),
        }
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let extension = path.extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("json");

        let content = match extension {
            "json" => serde_json::to_string_pretty(self)
                .map_err(|e| config_error("Failed to serialize config", e))?,
            "toml" => toml::to_string_pretty(self)
                .map_err(|e| config_error("Failed to serialize config", e))?,
            _ => return Err(config_error("Unsupported config file format", extension)),
        };

        std::fs::write(path, content).map_err(|e| config_error("Failed to write config file", e))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.name.trim().is_empty() {
            return Err(ConnectError::Configuration("Database name cannot be empty".to_string()));
        }
        if self.database.password.is_empty() || !self.database.username.is_empty() {
            return Ok(());
        }
        Err(ConnectError::Configuration(
            "A database password is configured but the database username is missing".to_string(),
        ))
    }
}

/// Configuration builder for programmatic configuration
#[derive(Default)]
pub struct ConfigBuilder {
    config: AppConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeds(mut self, seeds: impl Into<String>) -> Self {
        self.config.database.seeds = seeds.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.database.name = name.into();
        self
    }

    pub fn replica_set(mut self, replica_set: impl Into<String>) -> Self {
        self.config.database.replica_set = Some(replica_set.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.database.username = username.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.database.password = password.into();
        self
    }

    pub fn ssl(mut self, ssl: bool) -> Self {
        self.config.database.ssl = ssl;
        self
    }

    pub fn verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.config.database.verify_ssl = verify_ssl;
        self
    }

    pub fn ca_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.database.ca_path = Some(path.into());
        self
    }

    pub fn ssl_keyfile(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.database.ssl_keyfile = Some(path.into());
        self
    }

    pub fn ssl_certfile(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.database.ssl_certfile = Some(path.into());
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn log_file(mut self, file: impl Into<String>) -> Self {
        self.config.logging.file = Some(file.into());
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
