use std::fmt;

/// Represents the phases of the database bootstrap
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapState {
    Uninitialized,
    BuildingOptions,
    Connecting,
    Authenticating,
    CheckingVersion,
    Ready,
    Failed(String),
}

impl fmt::Display for BootstrapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapState::Uninitialized => write!(f, "Uninitialized"),
            BootstrapState::BuildingOptions => write!(f, "Building Connection Options"),
            BootstrapState::Connecting => write!(f, "Connecting to Database"),
            BootstrapState::Authenticating => write!(f, "Authenticating"),
            BootstrapState::CheckingVersion => write!(f, "Checking Server Version"),
            BootstrapState::Ready => write!(f, "Ready"),
            BootstrapState::Failed(msg) => write!(f, "Failed: {}", msg),
        }
    }
}
