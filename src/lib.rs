pub mod cli;
pub mod config;
pub mod connection;
pub mod connection_manager;
pub mod driver;
pub mod error_utils;
pub mod errors;
pub mod logging;
#[cfg(feature = "mongodb-driver")]
pub mod mongo;
pub mod retry;
pub mod state_machine;
pub mod version;

pub use cli::CommonArgs;
pub use config::{AppConfig, ConfigBuilder, DatabaseConfig, LoggingConfig};
pub use connection::{
    AuthMode, CertRequirement, ConnectionOptions, DEFAULT_MAX_POOL_SIZE, InitializeArgs,
    SeedAddress, parse_seeds,
};
pub use connection_manager::ConnectionManager;
pub use driver::{Connection, Database, DocumentHook, Driver, NamespaceInjector};
pub use error_utils::{ErrorCategory, ErrorContext, classify_error};
pub use errors::{ConnectError, DriverError, Result};
pub use logging::{LogConfig, init_default_logging, init_logging};
#[cfg(feature = "mongodb-driver")]
pub use mongo::{MongoConnection, MongoDatabase, MongoDriver};
pub use retry::{RetryConfig, Sleeper, TokioSleeper, retry_with_backoff};
pub use state_machine::BootstrapState;
pub use version::{MINIMUM_VERSION, ServerVersion, check_version};
