//! # ectd-api — HTTP Surface of the Sequence Assembler
//!
//! ## API Surface
//!
//! | Route                                  | Method | Purpose                         |
//! |----------------------------------------|--------|---------------------------------|
//! | `/v1/sequences`                        | POST   | Assemble and publish a sequence |
//! | `/v1/sequences/missing`                | POST   | Checker preview for a plan      |
//! | `/v1/sequences/:sequence_id/missing`   | GET    | Audit a committed sequence      |
//! | `/v1/regions`                          | GET    | Current rule table              |
//! | `/v1/regions/reload`                   | POST   | Hot-reload rules from YAML      |
//! | `/health/liveness`, `/health/readiness`| GET    | Unauthenticated probes          |
//!
//! Error responses are structured JSON bodies with a machine-readable code;
//! validation failures are 422 with the specifics under `details`.

pub mod error;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use crate::error::{AppError, ErrorBody, ErrorDetail};
pub use crate::state::{AppConfig, AppState};

/// Assemble the application router.
///
/// Health probes are mounted beside the API routes and stay reachable
/// without credentials.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::sequences::router())
        .merge(routes::regions::router())
        // Plans are small JSON documents; 2 MiB is generous headroom.
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .with_state(state);

    Router::new().merge(health).merge(api)
}

/// GET /health/liveness — process is up.
async fn liveness() -> &'static str {
    "ok"
}

/// GET /health/readiness — the submission root is usable.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match std::fs::metadata(&state.config.root) {
        Ok(meta) if meta.is_dir() => (StatusCode::OK, "ready"),
        _ => (StatusCode::SERVICE_UNAVAILABLE, "submission root unavailable"),
    }
}
