//! `db` crate — pure persistence layer.
//!
//! Loads connection settings, opens one Postgres connection per call, runs
//! the fixed job-listing queries and maps rows into typed records.
//! No HTTP concerns live here.

pub mod config;
pub mod connection;
pub mod error;
pub mod mock;
pub mod models;
pub mod repository;

pub use config::{load_config, load_config_from_env, ConfigError, DbConfig};
pub use connection::{Connector, JobConnection, PgConnector};
pub use error::{DbError, ErrorKind};
pub use models::{JobPosting, JobRecord};
pub use repository::jobs::{JobRepository, JobStore};
