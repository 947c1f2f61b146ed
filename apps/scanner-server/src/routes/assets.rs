//! Static asset routes
//!
//! Serves the web interface and the PWA shell (manifest, service worker,
//! icons, favicon) from the configured static directory.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};

use crate::error::{AppError, Result};
use crate::state::AppState;

const ROOT_ASSETS: &[&str] = &["manifest.json", "service-worker.js", "favicon.ico"];

/// Serve the web interface
pub async fn index(State(state): State<AppState>) -> Result<Response> {
    serve_asset(&state, "index.html").await
}

/// Serve a root-level PWA asset
pub async fn root_asset(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response> {
    if !is_root_asset(&name) {
        return Err(AppError::NotFound(format!("Not found: {}", name)));
    }
    serve_asset(&state, &name).await
}

/// Names reachable at the root: fixed assets and `icon-<size>.png`
fn is_root_asset(name: &str) -> bool {
    ROOT_ASSETS.contains(&name) || is_icon_name(name)
}

fn is_icon_name(name: &str) -> bool {
    name.strip_prefix("icon-")
        .and_then(|rest| rest.strip_suffix(".png"))
        .is_some_and(|size| !size.is_empty() && size.bytes().all(|b| b.is_ascii_digit()))
}

async fn serve_asset(state: &AppState, name: &str) -> Result<Response> {
    let path = state.static_dir().join(name);

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("Missing static asset {}", path.display());
            return Err(AppError::NotFound(format!("{} not found", name)));
        }
        Err(e) => return Err(e.into()),
    };

    let content_type = mime_guess::from_path(name).first_or_octet_stream();
    // The service worker must be revalidated or clients never pick up updates
    let cache_control = if name == "service-worker.js" || name == "index.html" {
        "no-cache"
    } else {
        "public, max-age=86400"
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, bytes.len())
        .header(header::CACHE_CONTROL, cache_control)
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_asset_names() {
        assert!(is_root_asset("manifest.json"));
        assert!(is_root_asset("service-worker.js"));
        assert!(is_root_asset("favicon.ico"));
        assert!(is_root_asset("icon-192.png"));
        assert!(is_root_asset("icon-512.png"));

        assert!(!is_root_asset("icon-.png"));
        assert!(!is_root_asset("icon-large.png"));
        assert!(!is_root_asset("icon-192.jpg"));
        assert!(!is_root_asset("index.html"));
        assert!(!is_root_asset(".env"));
    }
}
