//! HTTP error mapping.
//!
//! Every data-access failure becomes a 500 with a JSON body of the form
//! `{"error": "<message>", "kind": "<connection_error|query_error|...>"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use db::DbError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] DbError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Store(e) => {
                let kind = e.kind();
                tracing::error!(%kind, error = %e, "job listing request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": e.to_string(),
                        "kind": kind.as_str(),
                    })),
                )
                    .into_response()
            }
        }
    }
}

/// Errors that stop the server itself.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
