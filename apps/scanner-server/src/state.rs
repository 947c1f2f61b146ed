//! Application state management

use std::path::Path;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::config::Config;
use crate::library::ScanLibrary;
use crate::scanner::{ScanRunner, StatusProbe};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    runner: ScanRunner,
    probe: StatusProbe,
    library: ScanLibrary,
    /// Held for the duration of a scan; the output directory is shared
    scan_lock: Mutex<()>,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Self {
        let scanner = &config.scanner;
        let runner = ScanRunner::new(&scanner.script, scanner.timeout());
        let probe = StatusProbe::new(&scanner.scanimage_bin, scanner.status_timeout());
        let library = ScanLibrary::new(&scanner.scans_dir, scanner.list_limit);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                runner,
                probe,
                library,
                scan_lock: Mutex::new(()),
            }),
        }
    }

    /// Get the scan script runner
    pub fn runner(&self) -> &ScanRunner {
        &self.inner.runner
    }

    /// Get the scanner status probe
    pub fn probe(&self) -> &StatusProbe {
        &self.inner.probe
    }

    /// Get the scans directory
    pub fn library(&self) -> &ScanLibrary {
        &self.inner.library
    }

    pub fn static_dir(&self) -> &Path {
        &self.inner.config.assets.static_dir
    }

    /// Claim the scanner, or `None` when a scan is already running
    pub fn try_begin_scan(&self) -> Option<MutexGuard<'_, ()>> {
        self.inner.scan_lock.try_lock().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_lock_is_exclusive() {
        let state = AppState::new(Config::default());

        let guard = state.try_begin_scan();
        assert!(guard.is_some());
        assert!(state.clone().try_begin_scan().is_none());

        drop(guard);
        assert!(state.try_begin_scan().is_some());
    }
}
