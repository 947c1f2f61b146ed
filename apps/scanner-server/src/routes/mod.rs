//! Route modules for Scanner Server

pub mod assets;
pub mod health;
pub mod scan;
pub mod scans;
pub mod status;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;

/// Create the API router
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/scan", post(scan::start_scan))
        .route("/scans", get(scans::list_scans))
        .route("/download/:filename", get(scans::download_scan))
        .route("/delete/:filename", delete(scans::delete_scan))
        .route("/status", get(status::scanner_status))
}

/// Create the router for the web interface and PWA assets
pub fn assets_router() -> Router<AppState> {
    Router::new()
        .route("/", get(assets::index))
        .route("/:asset", get(assets::root_asset))
}
