//! Scan file routes
//!
//! Listing, download and deletion of the PDFs in the scans directory.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::library::ScanFile;
use crate::state::AppState;

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// List the most recent scans, newest first
pub async fn list_scans(State(state): State<AppState>) -> Result<Json<Vec<ScanFile>>> {
    let scans = state.library().list().await?;
    tracing::debug!("Listing {} scans", scans.len());
    Ok(Json(scans))
}

/// Download a scanned PDF
pub async fn download_scan(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response> {
    let bytes = state.library().read(&filename).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_LENGTH, bytes.len())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(&filename),
        )
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Delete a scanned PDF
pub async fn delete_scan(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.library().delete(&filename).await?;
    Ok(Json(DeleteResponse { success: true }))
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 name
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}
