//! Scanner Server Library
//!
//! HTTP front-end for a network scanner: triggers the scan script, lists
//! the PDFs it writes, and serves them for download or deletion.
//!
//! # Modules
//!
//! - `scanner`: Scan script invocation and the `scanimage` status probe
//! - `library`: The scans directory (listing, path checks, file access)
//! - `routes`: HTTP handlers

pub mod config;
pub mod error;
pub mod library;
pub mod routes;
pub mod scanner;
pub mod state;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the complete application router
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", routes::api_router())
        .merge(routes::assets_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
