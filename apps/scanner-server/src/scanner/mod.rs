//! Scanner module
//!
//! Wraps the external tools that do the actual scanning: the scan script
//! that writes PDFs and `scanimage`, used to detect attached devices.

mod job;
mod probe;
mod request;
mod runner;

pub use job::{run_scan, ScanResponse, NO_PDF_ERROR};
pub use probe::{parse_device_list, ScannerDevice, ScannerStatus, StatusProbe};
pub use request::{ColorMode, ScanRequest, ScanSource, MAX_RESOLUTION, MIN_RESOLUTION};
pub use runner::{run_command, CommandOutput, RunError, ScanRunner};
