//! Scanner status endpoint

use axum::{extract::State, Json};

use crate::scanner::ScannerStatus;
use crate::state::AppState;

/// Report attached scanners and whether the scan script is installed
pub async fn scanner_status(State(state): State<AppState>) -> Json<ScannerStatus> {
    let script_available = state.runner().script_available();
    Json(state.probe().status(script_available).await)
}
