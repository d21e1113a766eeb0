use axum::{extract::State, Json};
use db::JobRecord;

use crate::{ApiError, AppState};

/// `GET /` — the full joined job list, in database order.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<JobRecord>>, ApiError> {
    let jobs = state.store.fetch_all_jobs().await?;
    tracing::info!(count = jobs.len(), "serving job list");
    Ok(Json(jobs))
}
