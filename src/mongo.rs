//! # MongoDB Driver
//!
//! Adapts the `mongodb` crate to the [`Driver`] interface.

use crate::connection::{CertRequirement, ConnectionOptions};
use crate::driver::{apply_hooks, Connection, Database, DocumentHook, Driver};
use crate::errors::DriverError;
use async_trait::async_trait;
use bson::{doc, Bson, Document};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::options::{ClientOptions, Credential, ServerAddress, Tls, TlsOptions};
use mongodb::Client;
use std::path::PathBuf;
use std::sync::Arc;

const APP_NAME: &str = "docdb-connect";

impl From<MongoError> for DriverError {
    fn from(err: MongoError) -> Self {
        match err.kind.as_ref() {
            ErrorKind::Io(_)
            | ErrorKind::ServerSelection { .. }
            | ErrorKind::DnsResolve { .. }
            | ErrorKind::ConnectionPoolCleared { .. } => DriverError::Connection(err.to_string()),
            ErrorKind::Authentication { .. } => DriverError::Authentication(err.to_string()),
            ErrorKind::Command(command) => DriverError::OperationFailure {
                code: command.code,
                message: command.message.clone(),
            },
            _ => DriverError::Other(err.to_string()),
        }
    }
}

/// Translate the assembled options into driver client options
pub fn client_options(options: &ConnectionOptions) -> Result<ClientOptions, DriverError> {
    let mut client_options = ClientOptions::default();
    client_options.app_name = Some(APP_NAME.to_string());
    client_options.max_pool_size = Some(options.max_pool_size);
    client_options.repl_set_name = options.replica_set.clone();

    let address = match (&options.host, options.port) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.clone(),
        (None, _) => "localhost".to_string(),
    };
    client_options.hosts = vec![ServerAddress::parse(&address)?];

    if let Some(username) = &options.username {
        let mut credential = Credential::default();
        credential.username = Some(username.clone());
        credential.password = options.password.clone();
        credential.source = Some(options.database_name.clone());
        client_options.credential = Some(credential);
    }

    if options.ssl {
        let mut tls = TlsOptions::default();
        let verify = options.ssl_cert_reqs == Some(CertRequirement::Required);
        tls.allow_invalid_certificates = Some(!verify);
        tls.ca_file_path = options.ssl_ca_certs.clone();
        tls.cert_key_file_path = cert_key_file(options)?;
        client_options.tls = Some(Tls::Enabled(tls));
    }

    Ok(client_options)
}

/// The driver reads the client certificate and private key from one PEM file
fn cert_key_file(options: &ConnectionOptions) -> Result<Option<PathBuf>, DriverError> {
    match (&options.ssl_certfile, &options.ssl_keyfile) {
        (Some(certfile), Some(keyfile)) if certfile != keyfile => Err(DriverError::Other(format!(
            "ssl_certfile {} and ssl_keyfile {} differ; the driver needs a single PEM file \
             holding both the client certificate and its private key",
            certfile.display(),
            keyfile.display()
        ))),
        (Some(path), _) | (None, Some(path)) => Ok(Some(path.clone())),
        (None, None) => Ok(None),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MongoDriver;

impl MongoDriver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Driver for MongoDriver {
    type Connection = MongoConnection;
    type Database = MongoDatabase;

    async fn connect(&self, options: &ConnectionOptions) -> Result<MongoConnection, DriverError> {
        let client = Client::with_options(client_options(options)?)?;
        Ok(MongoConnection { client })
    }
}

#[derive(Debug, Clone)]
pub struct MongoConnection {
    client: Client,
}

impl MongoConnection {
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Connection for MongoConnection {
    type Database = MongoDatabase;

    fn database(&self, name: &str) -> Result<MongoDatabase, DriverError> {
        Ok(MongoDatabase {
            inner: self.client.database(name),
            hooks: Vec::new(),
        })
    }

    async fn server_version(&self) -> Result<String, DriverError> {
        let info = self
            .client
            .database("admin")
            .run_command(doc! { "buildInfo": 1 }, None)
            .await?;
        info.get_str("version")
            .map(str::to_string)
            .map_err(|e| DriverError::Other(format!("buildInfo has no version: {e}")))
    }
}

#[derive(Clone)]
pub struct MongoDatabase {
    inner: mongodb::Database,
    hooks: Vec<Arc<dyn DocumentHook>>,
}

impl MongoDatabase {
    pub fn inner(&self) -> &mongodb::Database {
        &self.inner
    }

    /// Apply the installed hooks to a document about to be written
    pub fn prepare_document(&self, collection: &str, document: Document) -> Document {
        apply_hooks(&self.hooks, document, collection)
    }
}

#[async_trait]
impl Database for MongoDatabase {
    fn add_document_hook(&mut self, hook: Arc<dyn DocumentHook>) {
        self.hooks.push(hook);
    }

    async fn collection_names(&self) -> Result<Vec<String>, DriverError> {
        Ok(self.inner.list_collection_names(None).await?)
    }

    /// Credentials are sent when the client connects; this confirms the
    /// server accepted them for `username`.
    async fn authenticate(&self, username: &str, _password: &str) -> Result<(), DriverError> {
        let status = self
            .inner
            .run_command(doc! { "connectionStatus": 1 }, None)
            .await?;
        let authenticated = status
            .get_document("authInfo")
            .and_then(|info| info.get_array("authenticatedUsers"))
            .map(|users| {
                users
                    .iter()
                    .filter_map(Bson::as_document)
                    .any(|user| user.get_str("user").ok() == Some(username))
            })
            .unwrap_or(false);

        if authenticated {
            Ok(())
        } else {
            Err(DriverError::Authentication(format!(
                "user {username} is not authenticated against {}",
                self.inner.name()
            )))
        }
    }
}
