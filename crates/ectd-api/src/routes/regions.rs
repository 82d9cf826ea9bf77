//! # Region Routes
//!
//! - `GET /v1/regions` — the current rule table.
//! - `POST /v1/regions/reload` — re-read the configured YAML without a
//!   redeploy. Requires a configured config path.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use ectd_region::RegionProfile;

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/regions", get(list_regions))
        .route("/v1/regions/reload", post(reload_regions))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegionsResponse {
    pub regions: Vec<RegionProfile>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub profiles: usize,
}

/// GET /v1/regions — every configured profile, ordered by region.
async fn list_regions(State(state): State<AppState>) -> Json<RegionsResponse> {
    let regions = state.regions.read().profiles().cloned().collect();
    Json(RegionsResponse { regions })
}

/// POST /v1/regions/reload — hot-reload the rule table from disk.
async fn reload_regions(
    State(state): State<AppState>,
) -> Result<Json<ReloadResponse>, AppError> {
    let path = state
        .config
        .regions_config
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("no region config path configured".to_string()))?;
    state
        .regions
        .reload(path)
        .map_err(|e| AppError::Validation {
            message: e.to_string(),
            details: None,
        })?;
    let profiles = state.regions.read().len();
    Ok(Json(ReloadResponse { profiles }))
}
