//! Database connection settings.
//!
//! Settings come either from a TOML file with a `[postgresql]` table or from
//! the libpq-style `PG*` environment variables:
//!
//! ```toml
//! [postgresql]
//! host = "localhost"
//! port = 5432
//! dbname = "jobs"
//! user = "postgres"
//! password = "secret"
//! connect_timeout_secs = 5
//! ```
//!
//! The result is loaded once at startup and handed to the connector.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

/// Bound applied to both connecting and querying unless configured otherwise.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Errors raised while loading or validating connection settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("settings file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot read settings file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("settings file has no [postgresql] section")]
    MissingSection,

    #[error("missing required setting '{0}'")]
    MissingKey(&'static str),

    #[error("invalid value for '{key}': {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Connection parameters for the job-listings database.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
    /// Applied separately to connection establishment and to each query.
    pub timeout: Duration,
}

impl DbConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        dbname: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            dbname: dbname.into(),
            user: user.into(),
            password: password.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reject values that can never produce a working connection.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [("host", &self.host), ("dbname", &self.dbname), ("user", &self.user)] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key,
                    value: value.clone(),
                });
            }
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "port",
                value: "0".into(),
            });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "connect_timeout_secs",
                value: "0".into(),
            });
        }
        Ok(())
    }

    /// Build sqlx connect options after validating the settings.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        self.validate()?;
        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.dbname)
            .username(&self.user)
            .password(&self.password))
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Raw settings
// ---------------------------------------------------------------------------

/// Accepts both `port = 5432` and `port = "5432"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Text(String),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SettingsFile {
    postgresql: Option<RawSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    host: Option<String>,
    port: Option<Scalar>,
    dbname: Option<String>,
    user: Option<String>,
    password: Option<String>,
    connect_timeout_secs: Option<Scalar>,
}

impl RawSettings {
    fn into_config(self) -> Result<DbConfig, ConfigError> {
        let host = self.host.ok_or(ConfigError::MissingKey("host"))?;
        let port = self.port.ok_or(ConfigError::MissingKey("port"))?.into_string();
        let dbname = self.dbname.ok_or(ConfigError::MissingKey("dbname"))?;
        let user = self.user.ok_or(ConfigError::MissingKey("user"))?;
        let password = self.password.ok_or(ConfigError::MissingKey("password"))?;

        let port: u16 = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: "port",
            value: port.clone(),
        })?;

        let timeout_secs = match self.connect_timeout_secs {
            Some(raw) => {
                let raw = raw.into_string();
                raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                    key: "connect_timeout_secs",
                    value: raw.clone(),
                })?
            }
            None => DEFAULT_TIMEOUT_SECS,
        };

        let config = DbConfig::new(host, port, dbname, user, password)
            .with_timeout(Duration::from_secs(timeout_secs));
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

/// Load settings from the `[postgresql]` table of a TOML file.
pub fn load_config(path: &Path) -> Result<DbConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_settings(&content)
}

/// Load settings from `PGHOST`, `PGPORT`, `PGDATABASE`, `PGUSER`,
/// `PGPASSWORD` and the optional `PGCONNECT_TIMEOUT`.
pub fn load_config_from_env() -> Result<DbConfig, ConfigError> {
    from_lookup(|key| std::env::var(key).ok())
}

fn parse_settings(content: &str) -> Result<DbConfig, ConfigError> {
    let file: SettingsFile = toml::from_str(content)?;
    file.postgresql
        .ok_or(ConfigError::MissingSection)?
        .into_config()
}

fn from_lookup<F>(lookup: F) -> Result<DbConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    RawSettings {
        host: lookup("PGHOST"),
        port: lookup("PGPORT").map(Scalar::Text),
        dbname: lookup("PGDATABASE"),
        user: lookup("PGUSER"),
        password: lookup("PGPASSWORD"),
        connect_timeout_secs: lookup("PGCONNECT_TIMEOUT").map(Scalar::Text),
    }
    .into_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const FULL: &str = r#"
        [postgresql]
        host = "db.internal"
        port = 5433
        dbname = "jobs"
        user = "reader"
        password = "hunter2"
    "#;

    #[test]
    fn parses_complete_section() {
        let config = parse_settings(FULL).unwrap();
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 5433);
        assert_eq!(config.dbname, "jobs");
        assert_eq!(config.user, "reader");
        assert_eq!(config.password, "hunter2");
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn port_may_be_quoted() {
        let content = FULL.replace("port = 5433", "port = \"5433\"");
        assert_eq!(parse_settings(&content).unwrap().port, 5433);
    }

    #[test]
    fn custom_timeout_is_honoured() {
        let content = format!("{FULL}\nconnect_timeout_secs = 2\n");
        let config = parse_settings(&content).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(2));
    }

    #[test]
    fn missing_key_is_reported_by_name() {
        let content = FULL.replace("password = \"hunter2\"", "");
        let err = parse_settings(&content).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey("password")));
    }

    #[test]
    fn missing_section_is_rejected() {
        let err = parse_settings("[mysql]\nhost = \"x\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection));
    }

    #[test]
    fn malformed_toml_is_rejected() {
        let err = parse_settings("[postgresql\nhost = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn non_numeric_port_is_rejected() {
        let content = FULL.replace("port = 5433", "port = \"abc\"");
        let err = parse_settings(&content).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "port", .. }));
    }

    #[test]
    fn empty_host_is_rejected() {
        let content = FULL.replace("\"db.internal\"", "\"  \"");
        let err = parse_settings(&content).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "host", .. }));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("database.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.dbname, "jobs");
    }

    #[test]
    fn env_lookup_builds_config() {
        let vars: HashMap<&str, &str> = [
            ("PGHOST", "localhost"),
            ("PGPORT", "5432"),
            ("PGDATABASE", "jobs"),
            ("PGUSER", "postgres"),
            ("PGPASSWORD", "postgres"),
            ("PGCONNECT_TIMEOUT", "3"),
        ]
        .into_iter()
        .collect();

        let config = from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.port, 5432);
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn env_lookup_requires_every_key() {
        let err = from_lookup(|key| (key == "PGHOST").then(|| "localhost".to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey("port")));
    }

    #[test]
    fn debug_output_hides_password() {
        let config = DbConfig::new("localhost", 5432, "jobs", "postgres", "hunter2");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
