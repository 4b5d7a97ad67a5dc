//! # Connection Options
//!
//! Seed list parsing and assembly of the option set handed to the driver's
//! connect call.

use crate::config::DatabaseConfig;
use crate::errors::{ConnectError, Result};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Pool size used when the caller does not ask for one
pub const DEFAULT_MAX_POOL_SIZE: u32 = 10;

/// Placeholder logged in place of the password
pub const PASSWORD_MASK: &str = "*****";

/// A single seed host and its optional port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedAddress {
    pub host: String,
    pub port: Option<u16>,
}

/// Parse a comma separated seed list in format "host:port,host:port"
///
/// Malformed lists (a token with more than one ':', an empty host or a
/// non-numeric port) yield no seeds so the driver default applies.
pub fn parse_seeds(seeds: &str) -> Vec<SeedAddress> {
    let mut parsed = Vec::new();

    for token in seeds.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let parts: Vec<&str> = token.split(':').collect();
        let seed = match parts.as_slice() {
            [host] => SeedAddress { host: host.to_string(), port: None },
            [host, _] if host.trim().is_empty() => {
                warn!(seed = token, "Ignoring seed list, host is empty");
                return Vec::new();
            }
            [host, port] => match port.parse::<u16>() {
                Ok(port) => SeedAddress { host: host.to_string(), port: Some(port) },
                Err(_) => {
                    warn!(seed = token, "Ignoring seed list, port is not a number");
                    return Vec::new();
                }
            },
            _ => {
                warn!(seed = token, "Ignoring seed list, expected host or host:port");
                return Vec::new();
            }
        };
        parsed.push(seed);
    }

    parsed
}

/// Certificate verification policy for TLS connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertRequirement {
    Required,
    None,
}

/// How the connection will authenticate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    None,
    UsernameOnly,
    UsernameAndPassword,
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::None => write!(f, "Attempting to connect without authentication."),
            AuthMode::UsernameOnly => write!(f, "Attempting username authentication."),
            AuthMode::UsernameAndPassword => {
                write!(f, "Attempting username and password authentication.")
            }
        }
    }
}

/// Caller supplied overrides for a single `initialize` call
#[derive(Debug, Clone, Default)]
pub struct InitializeArgs {
    pub name: Option<String>,
    pub seeds: Option<String>,
    pub max_pool_size: Option<u32>,
    pub replica_set: Option<String>,
    /// Upper bound for each retry delay
    pub max_timeout: Option<Duration>,
}

impl InitializeArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn seeds(mut self, seeds: impl Into<String>) -> Self {
        self.seeds = Some(seeds.into());
        self
    }

    pub fn max_pool_size(mut self, max_pool_size: u32) -> Self {
        self.max_pool_size = Some(max_pool_size);
        self
    }

    pub fn replica_set(mut self, replica_set: impl Into<String>) -> Self {
        self.replica_set = Some(replica_set.into());
        self
    }

    pub fn max_timeout(mut self, max_timeout: Duration) -> Self {
        self.max_timeout = Some(max_timeout);
        self
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Full parameter set for the driver connect call
#[derive(Clone, PartialEq, Serialize)]
pub struct ConnectionOptions {
    #[serde(rename = "name")]
    pub database_name: String,
    pub max_pool_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(rename = "replicaset", skip_serializing_if = "Option::is_none")]
    pub replica_set: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub ssl: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_cert_reqs: Option<CertRequirement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_ca_certs: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_keyfile: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_certfile: Option<PathBuf>,
}

impl ConnectionOptions {
    /// Assemble the connect parameters from configuration, parsed seeds and
    /// caller overrides
    pub fn build(config: &DatabaseConfig, seeds: &[SeedAddress], args: &InitializeArgs) -> Self {
        let first_seed = seeds.first();
        let non_empty = |value: &str| (!value.is_empty()).then(|| value.to_string());

        let mut options = Self {
            database_name: args.name.clone().unwrap_or_else(|| config.name.clone()),
            max_pool_size: args.max_pool_size.unwrap_or(DEFAULT_MAX_POOL_SIZE),
            host: first_seed.map(|seed| seed.host.clone()),
            port: first_seed.and_then(|seed| seed.port),
            replica_set: args.replica_set.clone().or_else(|| config.replica_set.clone()),
            username: non_empty(&config.username),
            password: non_empty(&config.password),
            ssl: false,
            ssl_cert_reqs: None,
            ssl_ca_certs: None,
            ssl_keyfile: None,
            ssl_certfile: None,
        };

        if config.ssl {
            options.ssl = true;
            options.ssl_cert_reqs = Some(if config.verify_ssl {
                CertRequirement::Required
            } else {
                CertRequirement::None
            });
            options.ssl_ca_certs = config.ca_path.clone();
            options.ssl_keyfile = config.ssl_keyfile.clone();
            options.ssl_certfile = config.ssl_certfile.clone();
        }

        options
    }

    /// Reject option sets the driver cannot use
    pub fn validate(&self) -> Result<()> {
        if self.database_name.trim().is_empty() {
            return Err(ConnectError::Configuration("Database name cannot be empty".to_string()));
        }
        if self.password.is_some() && self.username.is_none() {
            return Err(ConnectError::Configuration(
                "The server config specified a database password, but is missing a database username."
                    .to_string(),
            ));
        }
        Ok(())
    }

    pub fn auth_mode(&self) -> AuthMode {
        match (&self.username, &self.password) {
            (Some(_), Some(_)) => AuthMode::UsernameAndPassword,
            (Some(_), None) => AuthMode::UsernameOnly,
            _ => AuthMode::None,
        }
    }

    /// Credentials for an explicit authenticate call, when both are set
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some((username.as_str(), password.as_str())),
            _ => None,
        }
    }

    /// Render the option set for logging with the password masked
    pub fn redacted(&self) -> String {
        let mut value = match serde_json::to_value(self) {
            Ok(value) => value,
            Err(e) => return format!("<unrenderable connection options: {e}>"),
        };
        if let Some(password) = value.get_mut("password") {
            *password = serde_json::Value::String(PASSWORD_MASK.to_string());
        }

        let rendered = value.to_string();
        match self.password.as_deref() {
            Some(password) if !password.is_empty() => rendered.replace(password, PASSWORD_MASK),
            _ => rendered,
        }
    }
}

impl fmt::Debug for ConnectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConnectionOptions({})", self.redacted())
    }
}

impl fmt::Display for ConnectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;

    fn database_config() -> DatabaseConfig {
        ConfigBuilder::new().name("pulp_database").build().database
    }

    fn build(config: &DatabaseConfig, args: &InitializeArgs) -> ConnectionOptions {
        let seeds = parse_seeds(args.seeds.as_deref().unwrap_or(&config.seeds));
        ConnectionOptions::build(config, &seeds, args)
    }

    #[test]
    fn test_parse_seeds() {
        assert_eq!(
            parse_seeds("firsthost:1234,secondhost:5678"),
            vec![
                SeedAddress { host: "firsthost".to_string(), port: Some(1234) },
                SeedAddress { host: "secondhost".to_string(), port: Some(5678) },
            ]
        );
    }

    #[test]
    fn test_parse_seeds_empty() {
        assert!(parse_seeds("").is_empty());
        assert!(parse_seeds("  ").is_empty());
    }

    #[test]
    fn test_parse_seeds_host_only() {
        assert_eq!(
            parse_seeds("db.example.com"),
            vec![SeedAddress { host: "db.example.com".to_string(), port: None }]
        );
    }

    #[test]
    fn test_parse_seeds_extra_colon_falls_back() {
        assert!(parse_seeds("localhost:27017:1234").is_empty());
        assert!(parse_seeds("good:1,localhost:27017:1234").is_empty());
        assert!(parse_seeds(":27017").is_empty());
        assert!(parse_seeds("good:1, :27017").is_empty());
        assert!(parse_seeds(":").is_empty());
    }

    #[test]
    fn test_parse_seeds_non_numeric_port_falls_back() {
        assert!(parse_seeds("localhost:mongo").is_empty());
    }

    #[test]
    fn test_host_and_port_from_seed() {
        for (seeds, host, port) in [
            ("localhost:27017", "localhost", 27017),
            ("champs.example.com:27018", "champs.example.com", 27018),
            ("10.0.0.1:1", "10.0.0.1", 1),
        ] {
            let options = build(&database_config(), &InitializeArgs::new().seeds(seeds));
            assert_eq!(options.host.as_deref(), Some(host));
            assert_eq!(options.port, Some(port));
        }
    }

    #[test]
    fn test_only_first_seed_is_forwarded() {
        let args = InitializeArgs::new().seeds("firsthost:1234,secondhost:5678");
        let options = build(&database_config(), &args);
        assert_eq!(options.host.as_deref(), Some("firsthost"));
        assert_eq!(options.port, Some(1234));
    }

    #[test]
    fn test_empty_and_malformed_seeds_omit_host_and_port() {
        let empty = build(&database_config(), &InitializeArgs::new().seeds(""));
        let malformed =
            build(&database_config(), &InitializeArgs::new().seeds("localhost:27017:1234"));
        assert_eq!(empty, malformed);
        assert!(empty.host.is_none());
        assert!(empty.port.is_none());

        let rendered = empty.redacted();
        assert!(!rendered.contains("\"host\""));
        assert!(!rendered.contains("\"port\""));
    }

    #[test]
    fn test_defaults() {
        let options = build(&database_config(), &InitializeArgs::new());
        assert_eq!(options.database_name, "pulp_database");
        assert_eq!(options.max_pool_size, DEFAULT_MAX_POOL_SIZE);
        assert_eq!(options.host.as_deref(), Some("localhost"));
        assert_eq!(options.port, Some(27017));
        assert!(options.replica_set.is_none());
        assert!(options.username.is_none());
        assert!(options.password.is_none());
        assert!(!options.ssl);
    }

    #[test]
    fn test_overrides_win() {
        let mut config = database_config();
        config.replica_set = Some("from_config".to_string());
        let args = InitializeArgs::new()
            .name("name_set_from_argument")
            .max_pool_size(5)
            .replica_set("from_argument");

        let options = build(&config, &args);
        assert_eq!(options.database_name, "name_set_from_argument");
        assert_eq!(options.max_pool_size, 5);
        assert_eq!(options.replica_set.as_deref(), Some("from_argument"));
    }

    #[test]
    fn test_replica_set_from_config() {
        let mut config = database_config();
        config.replica_set = Some("real_replica_set".to_string());
        let options = build(&config, &InitializeArgs::new());
        assert_eq!(options.replica_set.as_deref(), Some("real_replica_set"));
    }

    #[test]
    fn test_ssl_is_skipped_if_off() {
        let mut config = database_config();
        config.ca_path = Some(PathBuf::from("/etc/pki/ca.pem"));
        config.ssl_keyfile = Some(PathBuf::from("keyfilepath"));

        let options = build(&config, &InitializeArgs::new());
        assert!(!options.ssl);
        assert!(options.ssl_cert_reqs.is_none());
        assert!(options.ssl_ca_certs.is_none());
        assert!(options.ssl_keyfile.is_none());
        assert!(!options.redacted().contains("ssl"));
    }

    #[test]
    fn test_ssl_with_verify_on() {
        let mut config = database_config();
        config.ssl = true;
        config.verify_ssl = true;
        config.ca_path = Some(PathBuf::from("/etc/pki/ca.pem"));

        let options = build(&config, &InitializeArgs::new());
        assert!(options.ssl);
        assert_eq!(options.ssl_cert_reqs, Some(CertRequirement::Required));
        assert_eq!(options.ssl_ca_certs, Some(PathBuf::from("/etc/pki/ca.pem")));
        assert!(options.ssl_keyfile.is_none());
        assert!(options.ssl_certfile.is_none());
    }

    #[test]
    fn test_ssl_with_verify_off_and_client_files() {
        let mut config = database_config();
        config.ssl = true;
        config.ssl_keyfile = Some(PathBuf::from("keyfilepath"));
        config.ssl_certfile = Some(PathBuf::from("certfilepath"));

        let options = build(&config, &InitializeArgs::new());
        assert_eq!(options.ssl_cert_reqs, Some(CertRequirement::None));
        assert_eq!(options.ssl_keyfile, Some(PathBuf::from("keyfilepath")));
        assert_eq!(options.ssl_certfile, Some(PathBuf::from("certfilepath")));
        assert!(options.redacted().contains("\"ssl_cert_reqs\":\"NONE\""));
    }

    #[test]
    fn test_credentials_and_auth_mode() {
        let mut config = database_config();
        config.username = "larrybird".to_string();
        config.password = "celtics1981".to_string();
        let options = build(&config, &InitializeArgs::new());
        assert_eq!(options.auth_mode(), AuthMode::UsernameAndPassword);
        assert_eq!(options.credentials(), Some(("larrybird", "celtics1981")));
        assert!(options.validate().is_ok());

        config.password.clear();
        let options = build(&config, &InitializeArgs::new());
        assert_eq!(options.auth_mode(), AuthMode::UsernameOnly);
        assert!(options.password.is_none());
        assert!(options.credentials().is_none());
        assert!(options.validate().is_ok());

        config.username.clear();
        let options = build(&config, &InitializeArgs::new());
        assert_eq!(options.auth_mode(), AuthMode::None);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_password_without_username_is_invalid() {
        let mut config = database_config();
        config.password = "foo".to_string();
        let options = build(&config, &InitializeArgs::new());
        assert!(matches!(options.validate(), Err(ConnectError::Configuration(_))));
    }

    #[test]
    fn test_redacted_masks_password() {
        let mut config = database_config();
        config.username = "larrybird".to_string();
        config.password = "celtics1981".to_string();
        config.seeds = "champs.example.com:27018".to_string();
        let options = build(&config, &InitializeArgs::new());

        let rendered = options.redacted();
        assert!(rendered.contains("\"password\":\"*****\""));
        assert!(rendered.contains("\"username\":\"larrybird\""));
        assert!(rendered.contains("\"host\":\"champs.example.com\""));
        assert!(!rendered.contains("celtics1981"));
        assert!(!format!("{:?}", options).contains("celtics1981"));
        assert!(!options.to_string().contains("celtics1981"));
    }

    #[test]
    fn test_redacted_never_contains_password() {
        for (username, password, seeds) in [
            ("admin", "admin", "localhost:27017"),
            ("user", "localhost", "localhost:27017"),
            ("user", "27017", "localhost:27017"),
            ("user", "\"quoted\"", "db:1"),
            ("user", "name", "db:1"),
        ] {
            let mut config = database_config();
            config.username = username.to_string();
            config.password = password.to_string();
            config.seeds = seeds.to_string();
            let options = build(&config, &InitializeArgs::new());
            assert!(
                !options.redacted().contains(password),
                "password {password:?} leaked into {}",
                options.redacted()
            );
        }
    }
}
