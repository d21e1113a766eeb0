//! Row structs for the job-listing queries.
//!
//! These are read projections, not tables: each struct is bound by column
//! name through `FromRow`, and its field order is the JSON key order sent
//! to clients.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// jobs ⋈ renumerations ⋈ experiences
// ---------------------------------------------------------------------------

/// One posting together with its remuneration and experience requirements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct JobRecord {
    pub id: i32,
    pub job_post_id: String,
    pub job_title: Option<String>,
    pub status: Option<String>,
    pub created_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Occupational classification code.
    pub cig_sagc: Option<String>,
    pub work_type: Option<String>,
    pub employer: Option<String>,
    pub location: Option<String>,
    pub occupation: Option<String>,
    pub sub_industry: Option<String>,
    pub industry: Option<String>,
    pub required_education_level: Option<String>,
    pub years_experience: Option<i32>,
    pub hours_per_week: Option<f64>,
    pub currency: Option<String>,
    pub pay_frequency: Option<String>,
    pub description: Option<String>,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
    pub annualised_min: Option<f64>,
    pub annualised_max: Option<f64>,
    pub mean_annualised_salary: Option<f64>,
}

// ---------------------------------------------------------------------------
// jobs
// ---------------------------------------------------------------------------

/// The base posting columns, without remuneration or experience data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct JobPosting {
    pub id: i32,
    /// Nullable here: without the join nothing filters out NULL keys.
    pub job_post_id: Option<String>,
    pub job_title: Option<String>,
    pub status: Option<String>,
    pub created_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub cig_sagc: Option<String>,
    pub work_type: Option<String>,
    pub employer: Option<String>,
    pub location: Option<String>,
    pub occupation: Option<String>,
    pub sub_industry: Option<String>,
    pub industry: Option<String>,
}
