//! # Sequence Routes
//!
//! - `POST /v1/sequences` — assemble and publish a sequence from a plan.
//! - `POST /v1/sequences/missing` — run the required-document checker over
//!   an unassembled plan, no side effects.
//! - `GET /v1/sequences/:sequence_id/missing` — audit a committed sequence
//!   against the current region rules.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use ectd_assembler::SubmissionPlan;
use ectd_core::{ModulePath, Region, SequenceId};

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/sequences", post(assemble_sequence))
        .route("/v1/sequences/missing", post(preview_missing))
        .route("/v1/sequences/:sequence_id/missing", get(sequence_missing))
}

/// Response body for a published sequence.
#[derive(Debug, Serialize, Deserialize)]
pub struct AssembleResponse {
    pub sequence_id: SequenceId,
    pub region: Region,
}

/// Response body for both missing-module endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct MissingResponse {
    pub region: Region,
    pub missing: Vec<ModulePath>,
    pub count: usize,
}

/// POST /v1/sequences — assemble, publish, 201 on success.
async fn assemble_sequence(
    State(state): State<AppState>,
    Json(plan): Json<SubmissionPlan>,
) -> Result<(StatusCode, Json<AssembleResponse>), AppError> {
    let receipt = state.assembler.assemble(&plan)?;
    Ok((
        StatusCode::CREATED,
        Json(AssembleResponse {
            sequence_id: receipt.sequence_id,
            region: receipt.region,
        }),
    ))
}

/// POST /v1/sequences/missing — checker preview for an unassembled plan.
async fn preview_missing(
    State(state): State<AppState>,
    Json(plan): Json<SubmissionPlan>,
) -> Result<Json<MissingResponse>, AppError> {
    let missing = state.assembler.preview_missing(&plan)?;
    Ok(Json(MissingResponse {
        region: plan.region,
        count: missing.len(),
        missing,
    }))
}

/// GET /v1/sequences/:sequence_id/missing — audit a committed sequence.
async fn sequence_missing(
    State(state): State<AppState>,
    Path(sequence_id): Path<String>,
) -> Result<Json<MissingResponse>, AppError> {
    let sequence_id = SequenceId::parse(&sequence_id).map_err(|e| AppError::Validation {
        message: e.to_string(),
        details: None,
    })?;
    let (region, missing) = state.assembler.missing_required(&sequence_id)?;
    Ok(Json(MissingResponse {
        region,
        count: missing.len(),
        missing,
    }))
}
