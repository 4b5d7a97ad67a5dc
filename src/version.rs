//! # Server Version Gate
//!
//! Parses the version string reported by the database server and rejects
//! servers older than [`MINIMUM_VERSION`].

use crate::errors::{ConnectError, Result};
use std::fmt;
use tracing::error;

/// Oldest server release line the client supports
pub const MINIMUM_VERSION: ServerVersion = ServerVersion::new(2, 4, 0);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Marker after the first '-', e.g. "rc1"
    pub prerelease: Option<String>,
}

impl ServerVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch, prerelease: None }
    }

    /// Parse "major[.minor[.patch]][-marker]"; missing components are zero
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let (release, prerelease) = match raw.split_once('-') {
            Some((release, marker)) => (release, Some(marker.to_string())),
            None => (raw, None),
        };

        let components = release
            .split('.')
            .map(|part| part.parse::<u64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| ConnectError::InvalidVersion(raw.to_string()))?;
        if components.len() > 3 {
            return Err(ConnectError::InvalidVersion(raw.to_string()));
        }
        let component = |index: usize| components.get(index).copied().unwrap_or(0);

        Ok(Self {
            major: component(0),
            minor: component(1),
            patch: component(2),
            prerelease,
        })
    }

    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    pub fn release_line(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }

    /// A pre-release only passes when its release line is newer than the
    /// minimum's
    pub fn satisfies(&self, minimum: &ServerVersion) -> bool {
        let line = self.release_line();
        let required = minimum.release_line();
        if line < required {
            return false;
        }
        !(self.is_prerelease() && line <= required)
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(marker) = &self.prerelease {
            write!(f, "-{marker}")?;
        }
        Ok(())
    }
}

/// Check a server reported version against `minimum`
pub fn check_version(raw: &str, minimum: &ServerVersion) -> Result<ServerVersion> {
    let found = ServerVersion::parse(raw)?;
    if found.satisfies(minimum) {
        return Ok(found);
    }

    error!(
        found = %found,
        required = %minimum,
        "Database server version is not supported"
    );
    Err(ConnectError::IncompatibleVersion {
        found: raw.trim().to_string(),
        required: minimum.to_string(),
    })
}
