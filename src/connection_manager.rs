//! # Connection Manager
//!
//! Owns the process wide database connection. The entry point constructs one
//! manager, calls [`ConnectionManager::initialize`] once before serving
//! anything, and hands the manager to whatever needs the database handle.

use crate::config::DatabaseConfig;
use crate::connection::{parse_seeds, ConnectionOptions, InitializeArgs};
use crate::driver::{Connection, Database, Driver, NamespaceInjector};
use crate::error_utils::ErrorContext;
use crate::errors::{ConnectError, Result};
use crate::retry::{retry_with_backoff, RetryConfig, Sleeper, TokioSleeper};
use crate::state_machine::BootstrapState;
use crate::version::{check_version, MINIMUM_VERSION};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

pub struct ConnectionManager<D: Driver> {
    driver: D,
    config: DatabaseConfig,
    retry: RetryConfig,
    sleeper: Arc<dyn Sleeper>,
    state: BootstrapState,
    connection: Option<D::Connection>,
    database: Option<D::Database>,
    initialized_at: Option<DateTime<Utc>>,
}

impl<D: Driver> ConnectionManager<D> {
    pub fn new(driver: D, config: DatabaseConfig) -> Self {
        Self {
            driver,
            config,
            retry: RetryConfig::default(),
            sleeper: Arc::new(TokioSleeper),
            state: BootstrapState::Uninitialized,
            connection: None,
            database: None,
            initialized_at: None,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Connect, validate and publish the connection and database handles
    ///
    /// Transient connection failures are retried forever with backoff. Every
    /// other failure is logged as critical and returned, leaving the manager
    /// uninitialized. Calling this again after a successful run fails with
    /// [`ConnectError::AlreadyInitialized`] and keeps the existing handles.
    pub async fn initialize(&mut self, args: InitializeArgs) -> Result<()> {
        if self.connection.is_some() {
            error!("The database connection is already initialized");
            return Err(ConnectError::AlreadyInitialized);
        }

        self.transition(BootstrapState::BuildingOptions);
        let seeds = parse_seeds(args.seeds.as_deref().unwrap_or(&self.config.seeds));
        let options = ConnectionOptions::build(&self.config, &seeds, &args);

        let started = Instant::now();
        let mut attempts = 0;
        match self.bootstrap(&options, &args, &mut attempts).await {
            Ok((connection, database)) => {
                self.connection = Some(connection);
                self.database = Some(database);
                self.initialized_at = Some(Utc::now());
                self.transition(BootstrapState::Ready);
                info!(
                    database = %options.database_name,
                    attempts,
                    elapsed_secs = started.elapsed().as_secs_f64(),
                    "Database connection initialized"
                );
                Ok(())
            }
            Err(error) => {
                let mut context = ErrorContext::new("initialize")
                    .with_database(options.database_name.as_str())
                    .with_host(options.host.clone())
                    .with_attempt(attempts)
                    .with_duration(started.elapsed())
                    .with_info("max_pool_size", options.max_pool_size.to_string());
                if let Some(replica_set) = &options.replica_set {
                    context = context.with_info("replica_set", replica_set.as_str());
                }
                error!(
                    severity = "critical",
                    error = %error,
                    context = %context,
                    "Database initialization failed"
                );
                self.transition(BootstrapState::Failed(error.to_string()));
                Err(error)
            }
        }
    }

    async fn bootstrap(
        &mut self,
        options: &ConnectionOptions,
        args: &InitializeArgs,
        attempts: &mut usize,
    ) -> Result<(D::Connection, D::Database)> {
        options.validate()?;
        debug!("{}", options.auth_mode());
        debug!("Connection Arguments: {}", options.redacted());

        self.transition(BootstrapState::Connecting);
        let max_timeout = args.max_timeout.or(self.retry.max_timeout);
        let retry = self.retry.clone().with_max_timeout(max_timeout);
        let driver = &self.driver;
        let (connection, database) = retry_with_backoff(&retry, self.sleeper.as_ref(), move || {
            *attempts += 1;
            Self::connect_once(driver, options)
        })
        .await?;

        if let Some((username, password)) = options.credentials() {
            self.transition(BootstrapState::Authenticating);
            database.authenticate(username, password).await?;
        }

        self.transition(BootstrapState::CheckingVersion);
        let reported = connection.server_version().await?;
        let version = check_version(&reported, &MINIMUM_VERSION)?;
        debug!(version = %version, "Database server version is supported");

        Ok((connection, database))
    }

    async fn connect_once(
        driver: &D,
        options: &ConnectionOptions,
    ) -> Result<(D::Connection, D::Database)> {
        let connection = driver.connect(options).await?;
        let mut database = connection.database(&options.database_name)?;
        database.add_document_hook(Arc::new(NamespaceInjector));

        // Forces an authenticated round trip so problems surface here rather
        // than on the first real query.
        debug!("Querying the database to validate the connection.");
        database.collection_names().await?;

        Ok((connection, database))
    }

    fn transition(&mut self, next: BootstrapState) {
        debug!(from = %self.state, to = %next, "Bootstrap state transition");
        self.state = next;
    }

    pub fn get_connection(&self) -> Option<&D::Connection> {
        self.connection.as_ref()
    }

    pub fn get_database(&self) -> Option<&D::Database> {
        self.database.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.connection.is_some()
    }

    pub fn state(&self) -> &BootstrapState {
        &self.state
    }

    pub fn initialized_at(&self) -> Option<DateTime<Utc>> {
        self.initialized_at
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }
}
