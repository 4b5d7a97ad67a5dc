//! # Error Utilities
//!
//! Error classification and context for the bootstrap retry policy.

use crate::errors::ConnectError;
use std::collections::HashMap;
use std::time::Duration;

/// Error classification for different types of failures
pub fn classify_error(error: &ConnectError) -> ErrorCategory {
    match error {
        ConnectError::Connection(_) => ErrorCategory::Transient,
        ConnectError::Authentication(_)
        | ConnectError::Configuration(_)
        | ConnectError::AlreadyInitialized
        | ConnectError::IncompatibleVersion { .. }
        | ConnectError::InvalidVersion(_)
        | ConnectError::Database(_)
        | ConnectError::Driver(_)
        | ConnectError::Logging(_)
        | ConnectError::Io(_) => ErrorCategory::Permanent,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transient, // Retried with backoff
    Permanent, // Fails the bootstrap immediately
}

/// Context attached to a failed bootstrap when it is logged
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub operation: String,
    pub database: Option<String>,
    pub host: Option<String>,
    pub attempt: usize,
    pub duration: Duration,
    pub additional_info: HashMap<String, String>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            database: None,
            host: None,
            attempt: 0,
            duration: Duration::ZERO,
            additional_info: HashMap::new(),
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_host(mut self, host: Option<String>) -> Self {
        self.host = host;
        self
    }

    pub fn with_attempt(mut self, attempt: usize) -> Self {
        self.attempt = attempt;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_info(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_info.insert(key.into(), value.into());
        self
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "operation={} database={} host={} attempts={} elapsed={:.1}s",
            self.operation,
            self.database.as_deref().unwrap_or("-"),
            self.host.as_deref().unwrap_or("(driver default)"),
            self.attempt,
            self.duration.as_secs_f64(),
        )?;
        let mut keys: Vec<_> = self.additional_info.keys().collect();
        keys.sort();
        for key in keys {
            write!(f, " {}={}", key, self.additional_info[key])?;
        }
        Ok(())
    }
}
