//! Per-call Postgres connections.
//!
//! There is no pool: every repository call opens one connection through a
//! [`Connector`], runs a single query on it and closes it again. The
//! connector bounds the connect; the repository bounds queries and close
//! with the same [`Connector::timeout`].

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{Connection, PgConnection};
use tracing::debug;

use crate::{DbConfig, DbError, JobPosting, JobRecord};

/// Postings joined with their remuneration and experience rows.
///
/// Postings missing either related row are excluded. No ORDER BY: callers
/// must not rely on row order.
pub const ALL_JOBS_SQL: &str = r#"
SELECT j."id", j."job_post_id", j."job_title", j."status", j."created_date",
       j."start_date", j."end_date", j."cig_sagc", j."work_type", j."employer",
       j."location", j."occupation", j."sub_industry", j."industry",
       e."required_education_level", e."years_experience",
       r."hours_per_week", r."currency", r."pay_frequency", r."description",
       r."min_salary", r."max_salary", r."annualised_min", r."annualised_max",
       r."mean_annualised_salary"
FROM "jobs" AS j
JOIN "renumerations" AS r ON r."job_post_id" = j."job_post_id"
JOIN "experiences" AS e ON e."job_post_id" = j."job_post_id"
"#;

pub const JOB_POSTINGS_SQL: &str = r#"
SELECT "id", "job_post_id", "job_title", "status", "created_date", "start_date",
       "end_date", "cig_sagc", "work_type", "employer", "location", "occupation",
       "sub_industry", "industry"
FROM "jobs"
"#;

/// Opens connections to the job-listings store.
#[async_trait]
pub trait Connector: Send + Sync {
    type Conn: JobConnection;

    async fn connect(&self) -> Result<Self::Conn, DbError>;

    /// Bound applied by the repository to each query and to closing.
    fn timeout(&self) -> Duration;
}

/// An open connection able to run the job-listing queries.
#[async_trait]
pub trait JobConnection: Send {
    async fn query_all_jobs(&mut self) -> Result<Vec<JobRecord>, DbError>;

    async fn query_job_postings(&mut self) -> Result<Vec<JobPosting>, DbError>;

    /// Terminate the session. Consumes the handle so it cannot be reused.
    async fn close(self) -> Result<(), DbError>;
}

// ---------------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------------

/// Connects to Postgres with settings loaded once at startup.
#[derive(Debug, Clone)]
pub struct PgConnector {
    config: DbConfig,
}

impl PgConnector {
    pub fn new(config: DbConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Conn = PgJobConnection;

    async fn connect(&self) -> Result<PgJobConnection, DbError> {
        let options = self.config.connect_options()?;
        let limit = self.config.timeout;

        debug!(
            host = %self.config.host,
            port = self.config.port,
            dbname = %self.config.dbname,
            "opening database connection"
        );

        let conn = tokio::time::timeout(limit, PgConnection::connect_with(&options))
            .await
            .map_err(|_| DbError::ConnectTimeout {
                seconds: limit.as_secs(),
            })?
            .map_err(DbError::Connection)?;

        Ok(PgJobConnection { conn })
    }

    fn timeout(&self) -> Duration {
        self.config.timeout
    }
}

/// A live Postgres session.
#[derive(Debug)]
pub struct PgJobConnection {
    conn: PgConnection,
}

#[async_trait]
impl JobConnection for PgJobConnection {
    async fn query_all_jobs(&mut self) -> Result<Vec<JobRecord>, DbError> {
        sqlx::query_as::<_, JobRecord>(ALL_JOBS_SQL)
            .fetch_all(&mut self.conn)
            .await
            .map_err(DbError::Query)
    }

    async fn query_job_postings(&mut self) -> Result<Vec<JobPosting>, DbError> {
        sqlx::query_as::<_, JobPosting>(JOB_POSTINGS_SQL)
            .fetch_all(&mut self.conn)
            .await
            .map_err(DbError::Query)
    }

    async fn close(self) -> Result<(), DbError> {
        self.conn.close().await.map_err(DbError::Connection)
    }
}
