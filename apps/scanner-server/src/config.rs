//! Configuration management for Scanner Server

use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub scanner: ScannerConfig,
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    /// Script invoked for every scan request
    pub script: PathBuf,
    /// Directory the script writes its PDFs into
    pub scans_dir: PathBuf,
    pub timeout_secs: u64,
    /// Maximum number of files returned by the listing
    pub list_limit: usize,
    /// Binary used by the status probe (`scanimage -L`)
    pub scanimage_bin: String,
    pub status_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
    pub static_dir: PathBuf,
}

impl ScannerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            scanner: ScannerConfig {
                script: PathBuf::from("/home/cy/airscan.sh"),
                scans_dir: PathBuf::from("/home/cy/scans"),
                timeout_secs: 300,
                list_limit: 50,
                scanimage_bin: "scanimage".to_string(),
                status_timeout_secs: 15,
            },
            assets: AssetsConfig {
                static_dir: PathBuf::from("./static"),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port),
            },
            scanner: ScannerConfig {
                script: env::var("SCAN_SCRIPT")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.scanner.script),
                scans_dir: env::var("SCANS_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.scanner.scans_dir),
                timeout_secs: parse_var("SCAN_TIMEOUT_SECS", defaults.scanner.timeout_secs),
                list_limit: parse_var("SCAN_LIST_LIMIT", defaults.scanner.list_limit),
                scanimage_bin: env::var("SCANIMAGE_BIN").unwrap_or(defaults.scanner.scanimage_bin),
                status_timeout_secs: parse_var(
                    "STATUS_TIMEOUT_SECS",
                    defaults.scanner.status_timeout_secs,
                ),
            },
            assets: AssetsConfig {
                static_dir: env::var("STATIC_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.assets.static_dir),
            },
        }
    }
}

/// Read a numeric variable, keeping the default when unset or malformed
fn parse_var<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value {:?} for {}, using {}", raw, key, default);
            default
        }),
        Err(_) => default,
    }
}
