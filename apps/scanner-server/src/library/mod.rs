//! Scan library module
//!
//! Handles the directory of PDFs produced by the scan script: listing,
//! download, deletion and locating the output of a finished scan.

mod store;
mod types;

pub use store::ScanLibrary;
pub use types::{download_url, format_created, ScanFile, CREATED_FORMAT};
