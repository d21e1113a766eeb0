//! `MockConnector` — a connection-tracking test double for `Connector`.
//!
//! Useful in unit and router tests where a live Postgres is unavailable.
//! Every connection it hands out is counted when opened and when closed,
//! so tests can assert that no connection outlives a repository call.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};

use crate::config::DEFAULT_TIMEOUT_SECS;
use crate::{Connector, DbError, JobConnection, JobPosting, JobRecord};

/// Behaviour injected into `MockConnector` at construction time.
#[derive(Debug, Clone)]
pub enum MockBehaviour {
    /// Connect succeeds and queries return the canned rows.
    Rows,
    /// Connect fails as if the server refused the connection.
    Unreachable,
    /// Connect succeeds but every query fails with this message.
    FailQuery(String),
    /// Connect succeeds but queries never complete.
    Hang,
    /// Queries succeed but closing never completes.
    HangOnClose,
}

/// Open/close counters shared between a connector and its connections.
#[derive(Debug, Default)]
pub struct ConnectionTracker {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

impl ConnectionTracker {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Connections opened but not yet closed.
    pub fn open_now(&self) -> usize {
        self.opened() - self.closed()
    }
}

/// A connector that serves canned rows and records every connection.
#[derive(Debug, Clone)]
pub struct MockConnector {
    jobs: Vec<JobRecord>,
    postings: Vec<JobPosting>,
    behaviour: MockBehaviour,
    timeout: Duration,
    tracker: Arc<ConnectionTracker>,
}

impl MockConnector {
    /// Create a mock whose queries return `jobs`; postings are derived from them.
    pub fn returning(jobs: Vec<JobRecord>) -> Self {
        let postings = jobs.iter().map(posting_of).collect();
        Self {
            jobs,
            postings,
            behaviour: MockBehaviour::Rows,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            tracker: Arc::default(),
        }
    }

    /// Create a mock that refuses every connection attempt.
    pub fn unreachable() -> Self {
        Self {
            behaviour: MockBehaviour::Unreachable,
            ..Self::returning(Vec::new())
        }
    }

    /// Create a mock whose connections fail every query.
    pub fn failing_query(msg: impl Into<String>) -> Self {
        Self {
            behaviour: MockBehaviour::FailQuery(msg.into()),
            ..Self::returning(Vec::new())
        }
    }

    /// Create a mock whose queries never return.
    pub fn hanging() -> Self {
        Self {
            behaviour: MockBehaviour::Hang,
            ..Self::returning(Vec::new())
        }
    }

    /// Keep the canned rows but never finish closing a connection.
    pub fn hanging_on_close(mut self) -> Self {
        self.behaviour = MockBehaviour::HangOnClose;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the rows returned for the postings-only query.
    pub fn with_postings(mut self, postings: Vec<JobPosting>) -> Self {
        self.postings = postings;
        self
    }

    pub fn tracker(&self) -> Arc<ConnectionTracker> {
        Arc::clone(&self.tracker)
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Conn = MockConnection;

    async fn connect(&self) -> Result<MockConnection, DbError> {
        if let MockBehaviour::Unreachable = self.behaviour {
            return Err(DbError::Connection(sqlx::Error::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))));
        }

        self.tracker.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockConnection {
            jobs: self.jobs.clone(),
            postings: self.postings.clone(),
            behaviour: self.behaviour.clone(),
            tracker: Arc::clone(&self.tracker),
        })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// A connection handed out by `MockConnector`.
#[derive(Debug)]
pub struct MockConnection {
    jobs: Vec<JobRecord>,
    postings: Vec<JobPosting>,
    behaviour: MockBehaviour,
    tracker: Arc<ConnectionTracker>,
}

impl MockConnection {
    async fn check(&self) -> Result<(), DbError> {
        match &self.behaviour {
            MockBehaviour::FailQuery(msg) => Err(DbError::Query(sqlx::Error::Protocol(msg.clone()))),
            MockBehaviour::Hang => std::future::pending().await,
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl JobConnection for MockConnection {
    async fn query_all_jobs(&mut self) -> Result<Vec<JobRecord>, DbError> {
        self.check().await?;
        Ok(self.jobs.clone())
    }

    async fn query_job_postings(&mut self) -> Result<Vec<JobPosting>, DbError> {
        self.check().await?;
        Ok(self.postings.clone())
    }

    async fn close(self) -> Result<(), DbError> {
        if let MockBehaviour::HangOnClose = self.behaviour {
            std::future::pending::<()>().await;
        }
        self.tracker.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A fully populated record; `n` varies the ids, dates and salaries.
pub fn sample_job(n: u32) -> JobRecord {
    let created = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.checked_add_days(Days::new(u64::from(n.saturating_sub(1)))));
    let min = 40_000.0 + f64::from(n) * 1_000.0;

    JobRecord {
        id: n as i32,
        job_post_id: format!("JOB-{n:04}"),
        job_title: Some(format!("Analyst {n}")),
        status: Some("Open".into()),
        created_date: created,
        start_date: created.and_then(|d| d.checked_add_days(Days::new(14))),
        end_date: created.and_then(|d| d.checked_add_days(Days::new(60))),
        cig_sagc: Some(format!("{:05}", 10_000 + n)),
        work_type: Some("Full Time".into()),
        employer: Some(format!("Employer {n}")),
        location: Some("George Town".into()),
        occupation: Some("Data Analyst".into()),
        sub_industry: Some("Software".into()),
        industry: Some("Information Technology".into()),
        required_education_level: Some("Bachelor's Degree".into()),
        years_experience: Some((n % 10) as i32),
        hours_per_week: Some(40.0),
        currency: Some("KYD".into()),
        pay_frequency: Some("Annually".into()),
        description: Some("Salary range".into()),
        min_salary: Some(min),
        max_salary: Some(min + 20_000.0),
        annualised_min: Some(min),
        annualised_max: Some(min + 20_000.0),
        mean_annualised_salary: Some(min + 10_000.0),
    }
}

/// The base posting columns of [`sample_job`].
pub fn sample_posting(n: u32) -> JobPosting {
    posting_of(&sample_job(n))
}

fn posting_of(job: &JobRecord) -> JobPosting {
    JobPosting {
        id: job.id,
        job_post_id: Some(job.job_post_id.clone()),
        job_title: job.job_title.clone(),
        status: job.status.clone(),
        created_date: job.created_date,
        start_date: job.start_date,
        end_date: job.end_date,
        cig_sagc: job.cig_sagc.clone(),
        work_type: job.work_type.clone(),
        employer: job.employer.clone(),
        location: job.location.clone(),
        occupation: job.occupation.clone(),
        sub_industry: job.sub_industry.clone(),
        industry: job.industry.clone(),
    }
}
