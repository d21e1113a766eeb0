//! `api` crate — HTTP layer.
//!
//! Exposes:
//!   GET /         every posting with its remuneration and experience data
//!   GET /healthz  liveness check, never touches the database
//!
//! CORS is permissive: the service is called from a browser client served
//! from another origin.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use db::JobStore;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use error::{ApiError, ServerError};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JobStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }
}

/// Build the router with CORS and request tracing applied.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::jobs::list))
        .route("/healthz", get(handlers::health::healthz))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `bind` and serve until Ctrl+C or SIGTERM.
pub async fn serve(bind: &str, store: Arc<dyn JobStore>) -> Result<(), ServerError> {
    let app = router(AppState::new(store));

    let listener = TcpListener::bind(bind).await?;
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => warn!("Received Ctrl+C, starting shutdown"),
        _ = terminate => warn!("Received SIGTERM, starting shutdown"),
    }
}
