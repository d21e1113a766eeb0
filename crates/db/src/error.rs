//! Typed error type for the db crate.

use thiserror::Error;

use crate::ConfigError;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("connection error: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("connection attempt timed out after {seconds}s")]
    ConnectTimeout { seconds: u64 },

    #[error("query error: {0}")]
    Query(#[source] sqlx::Error),

    #[error("query timed out after {seconds}s")]
    QueryTimeout { seconds: u64 },

    #[error("closing connection timed out after {seconds}s")]
    CloseTimeout { seconds: u64 },
}

/// Coarse classification surfaced to HTTP callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Connection,
    Query,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration_error",
            Self::Connection => "connection_error",
            Self::Query => "query_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DbError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Connection(_) | Self::CloseTimeout { .. } => ErrorKind::Connection,
            // Either bound expiring reaches callers as a query failure.
            Self::Query(_) | Self::ConnectTimeout { .. } | Self::QueryTimeout { .. } => {
                ErrorKind::Query
            }
        }
    }
}
