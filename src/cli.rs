use clap::Parser;
use rpassword::prompt_password;
use std::path::PathBuf;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use crate::config::AppConfig;
use crate::connection::InitializeArgs;
use crate::errors::Result;
use crate::logging::{init_logging, parse_level, LogConfig};

#[derive(Parser, Debug, Clone)]
#[command(name = "docdb-connect")]
#[command(about = "Bootstrap and verify the document database connection")]
pub struct CommonArgs {
    /// Configuration file (JSON or TOML); DOCDB_* environment variables override it
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,
    /// Database name, overrides database.name
    #[arg(short = 'd', long)]
    pub name: Option<String>,
    /// Seed list in format host:port,host:port, overrides database.seeds
    #[arg(short = 's', long)]
    pub seeds: Option<String>,
    /// Connection pool size
    #[arg(long)]
    pub max_pool_size: Option<u32>,
    /// Replica set name, overrides database.replica_set
    #[arg(long)]
    pub replica_set: Option<String>,
    /// Upper bound in seconds for each retry delay
    #[arg(long)]
    pub max_timeout: Option<u64>,
    /// Prompt for the database password instead of reading it from config
    #[arg(long)]
    pub prompt_password: bool,
    // Logging options
    /// Log level (trace, debug, info, warn, error), overrides logging.level
    #[arg(long)]
    pub log_level: Option<String>,
    /// Log file path, overrides logging.file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Load configuration and apply the password prompt if requested
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        if self.prompt_password {
            config.database.password = prompt_password("Database password: ")?;
        }
        if let Some(name) = &self.name {
            config.database.name = name.clone();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn initialize_args(&self) -> InitializeArgs {
        InitializeArgs {
            name: self.name.clone(),
            seeds: self.seeds.clone(),
            max_pool_size: self.max_pool_size,
            replica_set: self.replica_set.clone(),
            max_timeout: self.max_timeout.map(Duration::from_secs),
        }
    }

    pub fn log_config(&self, config: &AppConfig) -> LogConfig {
        let mut log_config = LogConfig::from_config(&config.logging);
        if let Some(level) = &self.log_level {
            log_config = log_config.with_level(parse_level(level));
        }
        if let Some(path) = &self.log_file {
            log_config = log_config.with_file(true).with_file_path(path.clone());
        }
        if self.verbose {
            log_config = log_config.with_level(tracing::Level::DEBUG);
        }
        log_config
    }

    pub fn init_logging(&self, config: &AppConfig) -> Result<Option<WorkerGuard>> {
        init_logging(self.log_config(config))
    }

    pub fn print_connection_info(&self, config: &AppConfig) {
        println!("Connection Info:");
        println!("  Seeds: {}", self.seeds.as_deref().unwrap_or(&config.database.seeds));
        println!("  Database: {}", config.database.name);
        println!(
            "  Replica Set: {}",
            self.replica_set
                .as_deref()
                .or(config.database.replica_set.as_deref())
                .unwrap_or("(not specified)")
        );
        println!("  TLS: {}", if config.database.ssl { "enabled" } else { "disabled" });
    }
}
