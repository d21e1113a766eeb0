//! Job listing reads.
//!
//! Each call is scoped to a single connection: opened on entry, closed on
//! every path once the connect succeeded. Queries and the close are bounded
//! by the connector's timeout. A close failure after a successful query is
//! logged and does not discard the rows already read.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{Connector, DbError, JobConnection, JobPosting, JobRecord};

/// Read access to job listings, as seen by the HTTP layer.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// All postings that have both a remuneration and an experience row.
    async fn fetch_all_jobs(&self) -> Result<Vec<JobRecord>, DbError>;

    /// Base posting columns only, without the join.
    async fn fetch_job_postings_only(&self) -> Result<Vec<JobPosting>, DbError>;
}

/// Job listing repository backed by a `Connector`.
#[derive(Debug, Clone)]
pub struct JobRepository<C> {
    connector: C,
}

impl<C: Connector> JobRepository<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Open a connection. The caller must close it.
    pub async fn connect(&self) -> Result<C::Conn, DbError> {
        self.connector.connect().await
    }
}

async fn bounded<T, F>(limit: Duration, query: F) -> Result<T, DbError>
where
    F: Future<Output = Result<T, DbError>>,
{
    tokio::time::timeout(limit, query)
        .await
        .unwrap_or(Err(DbError::QueryTimeout {
            seconds: limit.as_secs(),
        }))
}

/// Close `conn`; on expiry the handle is dropped, which shuts the socket.
async fn release<T: JobConnection>(conn: T, limit: Duration) {
    let err = match tokio::time::timeout(limit, conn.close()).await {
        Ok(Ok(())) => return,
        Ok(Err(e)) => e,
        Err(_) => DbError::CloseTimeout {
            seconds: limit.as_secs(),
        },
    };
    warn!(error = %err, "failed to close database connection");
}

#[async_trait]
impl<C: Connector> JobStore for JobRepository<C> {
    async fn fetch_all_jobs(&self) -> Result<Vec<JobRecord>, DbError> {
        let limit = self.connector.timeout();
        let mut conn = self.connect().await?;
        let result = bounded(limit, conn.query_all_jobs()).await;
        release(conn, limit).await;

        let jobs = result?;
        debug!(count = jobs.len(), "fetched job records");
        Ok(jobs)
    }

    async fn fetch_job_postings_only(&self) -> Result<Vec<JobPosting>, DbError> {
        let limit = self.connector.timeout();
        let mut conn = self.connect().await?;
        let result = bounded(limit, conn.query_job_postings()).await;
        release(conn, limit).await;

        let postings = result?;
        debug!(count = postings.len(), "fetched job postings");
        Ok(postings)
    }
}
