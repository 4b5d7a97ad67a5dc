#![allow(dead_code)]

use async_trait::async_trait;
use docdb_connect::{
    Connection, ConnectionOptions, Database, DocumentHook, Driver, DriverError, Sleeper,
};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

/// Everything the fake driver was asked to do, plus scripted failures
#[derive(Default)]
pub struct FakeState {
    pub server_version: String,
    pub connect_results: VecDeque<Result<(), DriverError>>,
    pub connect_calls: Vec<ConnectionOptions>,
    pub database_error: Option<DriverError>,
    pub database_calls: Vec<String>,
    pub collection_names_results: VecDeque<Result<(), DriverError>>,
    pub collection_names_calls: usize,
    pub authenticate_calls: Vec<(String, String)>,
    pub authenticate_error: Option<DriverError>,
}

#[derive(Clone)]
pub struct FakeDriver {
    state: Arc<Mutex<FakeState>>,
}

impl FakeDriver {
    pub fn new(server_version: &str) -> Self {
        let state = FakeState {
            server_version: server_version.to_string(),
            ..FakeState::default()
        };
        Self { state: Arc::new(Mutex::new(state)) }
    }

    pub fn failing_connects(self, failures: impl IntoIterator<Item = DriverError>) -> Self {
        self.state().connect_results.extend(failures.into_iter().map(Err));
        self
    }

    pub fn failing_collection_names(self, failures: impl IntoIterator<Item = DriverError>) -> Self {
        self.state().collection_names_results.extend(failures.into_iter().map(Err));
        self
    }

    pub fn failing_database(self, error: DriverError) -> Self {
        self.state().database_error = Some(error);
        self
    }

    pub fn failing_authenticate(self, error: DriverError) -> Self {
        self.state().authenticate_error = Some(error);
        self
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn connect_calls(&self) -> Vec<ConnectionOptions> {
        self.state().connect_calls.clone()
    }
}

#[async_trait]
impl Driver for FakeDriver {
    type Connection = FakeConnection;
    type Database = FakeDatabase;

    async fn connect(&self, options: &ConnectionOptions) -> Result<FakeConnection, DriverError> {
        let mut state = self.state();
        state.connect_calls.push(options.clone());
        if let Some(Err(error)) = state.connect_results.pop_front() {
            return Err(error);
        }
        Ok(FakeConnection {
            id: state.connect_calls.len(),
            state: Arc::clone(&self.state),
        })
    }
}

pub struct FakeConnection {
    pub id: usize,
    state: Arc<Mutex<FakeState>>,
}

#[async_trait]
impl Connection for FakeConnection {
    type Database = FakeDatabase;

    fn database(&self, name: &str) -> Result<FakeDatabase, DriverError> {
        let mut state = self.state.lock().unwrap();
        state.database_calls.push(name.to_string());
        if let Some(error) = state.database_error.clone() {
            return Err(error);
        }
        Ok(FakeDatabase {
            name: name.to_string(),
            connection_id: self.id,
            hooks: Vec::new(),
            state: Arc::clone(&self.state),
        })
    }

    async fn server_version(&self) -> Result<String, DriverError> {
        Ok(self.state.lock().unwrap().server_version.clone())
    }
}

pub struct FakeDatabase {
    pub name: String,
    pub connection_id: usize,
    pub hooks: Vec<Arc<dyn DocumentHook>>,
    state: Arc<Mutex<FakeState>>,
}

#[async_trait]
impl Database for FakeDatabase {
    fn add_document_hook(&mut self, hook: Arc<dyn DocumentHook>) {
        self.hooks.push(hook);
    }

    async fn collection_names(&self) -> Result<Vec<String>, DriverError> {
        let mut state = self.state.lock().unwrap();
        state.collection_names_calls += 1;
        if let Some(Err(error)) = state.collection_names_results.pop_front() {
            return Err(error);
        }
        Ok(vec!["repos".to_string(), "units".to_string()])
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        state.authenticate_calls.push((username.to_string(), password.to_string()));
        match state.authenticate_error.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Records requested delays instead of waiting
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// Collects formatted log output for assertions
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

pub fn transient(message: &str) -> DriverError {
    DriverError::Connection(message.to_string())
}

pub fn secs(values: &[u64]) -> Vec<Duration> {
    values.iter().map(|s| Duration::from_secs(*s)).collect()
}
