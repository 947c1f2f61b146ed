//! Scan file types

use chrono::{DateTime, Local};
use serde::Serialize;
use std::time::SystemTime;

/// Timestamp format used in listings
pub const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A scanned PDF as returned by the listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanFile {
    pub filename: String,
    pub size: u64,
    pub created: String,
    pub download_url: String,
}

impl ScanFile {
    pub fn new(filename: impl Into<String>, size: u64, created: SystemTime) -> Self {
        let filename = filename.into();
        Self {
            download_url: download_url(&filename),
            created: format_created(created),
            size,
            filename,
        }
    }
}

/// URL under which a scan can be downloaded
pub fn download_url(filename: &str) -> String {
    format!("/api/download/{}", urlencoding::encode(filename))
}

pub fn format_created(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format(CREATED_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_url_is_encoded() {
        assert_eq!(download_url("scan.pdf"), "/api/download/scan.pdf");
        assert_eq!(
            download_url("my scan #2.pdf"),
            "/api/download/my%20scan%20%232.pdf"
        );
    }

    #[test]
    fn test_created_format() {
        let formatted = format_created(SystemTime::now());
        assert_eq!(formatted.len(), 19);
        assert!(chrono::NaiveDateTime::parse_from_str(&formatted, CREATED_FORMAT).is_ok());
    }

    #[test]
    fn test_serializes_camel_case() {
        let file = ScanFile::new("a.pdf", 12, SystemTime::UNIX_EPOCH);
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["filename"], "a.pdf");
        assert_eq!(json["size"], 12);
        assert_eq!(json["downloadUrl"], "/api/download/a.pdf");
    }
}
