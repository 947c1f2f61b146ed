//! A single scan run: script invocation plus locating its output

use std::time::SystemTime;

use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::Result;
use crate::library::ScanLibrary;

use super::request::ScanRequest;
use super::runner::ScanRunner;

pub const NO_PDF_ERROR: &str = "No PDF was created";

/// Body of `POST /api/scan`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub success: bool,
    pub scan_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run the script and report the PDF it produced
///
/// The caller is responsible for serializing runs; the output is identified
/// by diffing the directory against a snapshot taken before the script ran.
pub async fn run_scan(
    runner: &ScanRunner,
    library: &ScanLibrary,
    request: &ScanRequest,
) -> Result<ScanResponse> {
    let scan_id = Uuid::new_v4();
    let span = tracing::info_span!("scan", %scan_id, name = request.name());

    execute(runner, library, request, scan_id)
        .instrument(span)
        .await
}

async fn execute(
    runner: &ScanRunner,
    library: &ScanLibrary,
    request: &ScanRequest,
    scan_id: Uuid,
) -> Result<ScanResponse> {
    let before = library.snapshot().await?;
    let started = SystemTime::now();

    let output = runner.run(request).await?;

    match library.find_new_scan(&before, started).await? {
        Some(file) => {
            tracing::info!("Scan produced {} ({} bytes)", file.filename, file.size);
            Ok(ScanResponse {
                success: true,
                scan_id,
                output: Some(output.stdout),
                filename: Some(file.filename),
                download_url: Some(file.download_url),
                error: None,
            })
        }
        None => {
            tracing::warn!("Scan finished without a new PDF in {}", library.dir().display());
            Ok(ScanResponse {
                success: false,
                scan_id,
                output: Some(output.combined()),
                filename: None,
                download_url: None,
                error: Some(NO_PDF_ERROR.to_string()),
            })
        }
    }
}
