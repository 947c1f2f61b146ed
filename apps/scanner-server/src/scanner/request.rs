//! Scan request parameters and their command-line form

use serde::Deserialize;

use crate::error::{AppError, Result};

pub const DEFAULT_NAME: &str = "scan";
pub const MIN_RESOLUTION: u32 = 50;
pub const MAX_RESOLUTION: u32 = 1200;
const MAX_NAME_LEN: usize = 100;

/// Color mode passed to the scan script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Color,
    #[serde(alias = "grey")]
    Gray,
    Lineart,
}

impl ColorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMode::Color => "color",
            ColorMode::Gray => "gray",
            ColorMode::Lineart => "lineart",
        }
    }
}

/// Paper source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanSource {
    /// Automatic document feeder
    #[serde(alias = "feeder")]
    Adf,
    Flatbed,
}

impl ScanSource {
    pub fn flag(&self) -> &'static str {
        match self {
            ScanSource::Adf => "--adf",
            ScanSource::Flatbed => "--flatbed",
        }
    }
}

/// Body of `POST /api/scan`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanRequest {
    pub name: Option<String>,
    pub resolution: u32,
    pub mode: ColorMode,
    pub source: ScanSource,
    pub compress: bool,
    pub ocr: bool,
}

impl Default for ScanRequest {
    fn default() -> Self {
        Self {
            name: Some(DEFAULT_NAME.to_string()),
            resolution: 150,
            mode: ColorMode::Color,
            source: ScanSource::Adf,
            compress: true,
            ocr: false,
        }
    }
}

impl ScanRequest {
    /// Document name handed to the script; `null` falls back to the default
    pub fn name(&self) -> &str {
        self.name.as_deref().map(str::trim).unwrap_or(DEFAULT_NAME)
    }

    /// Reject parameters the script must never see
    pub fn validate(&self) -> Result<()> {
        let name = self.name();

        if name.is_empty() {
            return Err(AppError::BadRequest("Name must not be empty".to_string()));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(AppError::BadRequest(format!(
                "Name must be at most {} characters",
                MAX_NAME_LEN
            )));
        }
        if name.starts_with('-') {
            return Err(AppError::BadRequest(
                "Name must not start with '-'".to_string(),
            ));
        }
        if name
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_control())
        {
            return Err(AppError::BadRequest(
                "Name must not contain path separators or control characters".to_string(),
            ));
        }

        if !(MIN_RESOLUTION..=MAX_RESOLUTION).contains(&self.resolution) {
            return Err(AppError::BadRequest(format!(
                "Resolution must be between {} and {} dpi",
                MIN_RESOLUTION, MAX_RESOLUTION
            )));
        }

        Ok(())
    }

    /// Arguments for the scan script, in the order it expects them
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-n".to_string(),
            self.name().to_string(),
            "-r".to_string(),
            self.resolution.to_string(),
            "-m".to_string(),
            self.mode.as_str().to_string(),
            self.source.flag().to_string(),
        ];

        if !self.compress {
            args.push("--no-compress".to_string());
        }
        if self.ocr {
            args.push("--ocr".to_string());
        }

        args
    }
}
