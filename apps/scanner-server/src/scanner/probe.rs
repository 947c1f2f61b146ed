//! Scanner presence probe built on `scanimage -L`

use std::time::Duration;

use serde::Serialize;

use super::runner::{run_command, RunError};

/// A device reported by `scanimage -L`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScannerDevice {
    pub name: String,
    pub description: String,
}

/// Body of `GET /api/status`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannerStatus {
    pub available: bool,
    pub devices: Vec<ScannerDevice>,
    pub script_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Lists attached scanners through the SANE frontend binary
#[derive(Debug, Clone)]
pub struct StatusProbe {
    binary: String,
    timeout: Duration,
}

impl StatusProbe {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Query the devices; failures are reported in the result, never raised
    pub async fn probe(&self) -> std::result::Result<Vec<ScannerDevice>, String> {
        let program = which::which(&self.binary)
            .map_err(|_| format!("{} not found", self.binary))?;

        match run_command(&program, &["-L".to_string()], self.timeout).await {
            Ok(output) if output.success() => Ok(parse_device_list(&output.stdout)),
            Ok(output) => Err(format!(
                "{} exited with {:?}: {}",
                self.binary,
                output.code,
                output.stderr.trim()
            )),
            Err(RunError::Timeout(secs)) => {
                Err(format!("{} timed out after {} seconds", self.binary, secs))
            }
            Err(e) => Err(e.to_string()),
        }
    }

    pub async fn status(&self, script_available: bool) -> ScannerStatus {
        match self.probe().await {
            Ok(devices) => {
                tracing::debug!("Status probe found {} device(s)", devices.len());
                ScannerStatus {
                    available: !devices.is_empty(),
                    devices,
                    script_available,
                    error: None,
                }
            }
            Err(error) => {
                tracing::warn!("Status probe failed: {}", error);
                ScannerStatus {
                    available: false,
                    devices: Vec::new(),
                    script_available,
                    error: Some(error),
                }
            }
        }
    }
}

/// Parse lines like ``device `airscan:e0:Brother' is a eSCL Brother ADS``
pub fn parse_device_list(output: &str) -> Vec<ScannerDevice> {
    output.lines().filter_map(parse_device_line).collect()
}

fn parse_device_line(line: &str) -> Option<ScannerDevice> {
    let rest = line.trim().strip_prefix("device `")?;
    let (name, description) = rest.split_once("' is a ")?;
    if name.is_empty() {
        return None;
    }
    Some(ScannerDevice {
        name: name.to_string(),
        description: description.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_device_list() {
        let output = "device `airscan:e0:Brother ADS-1700W' is a eSCL Brother ADS-1700W ip=192.168.1.20\n\
                      device `escl:https://192.168.1.20:443' is a Brother ADS-1700W adf,platen scanner\n";

        let devices = parse_device_list(output);
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].name, "airscan:e0:Brother ADS-1700W");
        assert_eq!(
            devices[0].description,
            "eSCL Brother ADS-1700W ip=192.168.1.20"
        );
        assert_eq!(devices[1].name, "escl:https://192.168.1.20:443");
    }

    #[test]
    fn test_parse_no_devices() {
        let output = "\nNo scanners were identified. If you were expecting something different,\n\
                      check that the scanner is plugged in, turned on and detected by the\n\
                      sane-find-scanner tool (if appropriate).\n";
        assert!(parse_device_list(output).is_empty());
    }

    #[tokio::test]
    async fn test_missing_binary_reports_error() {
        let probe = StatusProbe::new("scanner-server-no-such-scanimage", Duration::from_secs(1));
        let status = probe.status(true).await;

        assert!(!status.available);
        assert!(status.devices.is_empty());
        assert!(status.script_available);
        assert!(status.error.unwrap().contains("not found"));
    }
}
