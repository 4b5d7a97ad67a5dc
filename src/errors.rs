use thiserror::Error;

/// Driver error code reported when authentication fails
pub const AUTHENTICATION_FAILED_CODE: i32 = 18;

/// Main error type for the document database bootstrap
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Database connection is already initialized")]
    AlreadyInitialized,

    #[error("Database server version {found} is not supported, {required} or newer is required")]
    IncompatibleVersion { found: String, required: String },

    #[error("Invalid server version '{0}'")]
    InvalidVersion(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by the underlying database driver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriverError {
    /// Network or availability failure; the attempt may succeed later
    #[error("could not reach the database: {0}")]
    Connection(String),

    #[error("authentication rejected: {0}")]
    Authentication(String),

    #[error("operation failed with code {code}: {message}")]
    OperationFailure { code: i32, message: String },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ConnectError>;

impl From<DriverError> for ConnectError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::Connection(message) => ConnectError::Connection(message),
            DriverError::Authentication(message) => ConnectError::Authentication(message),
            DriverError::OperationFailure { code, message }
                if code == AUTHENTICATION_FAILED_CODE =>
            {
                ConnectError::Authentication(format!("Database authentication failed: {message}"))
            }
            DriverError::OperationFailure { code, message } => {
                ConnectError::Database(format!("operation failed with code {code}: {message}"))
            }
            DriverError::Other(message) => ConnectError::Driver(message),
        }
    }
}
