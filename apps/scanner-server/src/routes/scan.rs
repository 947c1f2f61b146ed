//! Scan trigger endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::error::{AppError, Result};
use crate::scanner::{run_scan, ScanRequest, ScanResponse};
use crate::state::AppState;

/// Run the scan script and return the PDF it produced
pub async fn start_scan(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanResponse>> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    request.validate()?;

    let _guard = state
        .try_begin_scan()
        .ok_or_else(|| AppError::Conflict("A scan is already running".to_string()))?;

    let response = run_scan(state.runner(), state.library(), &request).await?;
    Ok(Json(response))
}
