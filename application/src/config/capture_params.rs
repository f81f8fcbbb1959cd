//! Capture parameters used by the baseline generator.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use warden_domain::capture::{DEFAULT_COLS, DEFAULT_ROWS};

/// Terminal geometry and time limit for one capture.
///
/// A wide terminal keeps help text from wrapping, which would otherwise make
/// the fingerprint depend on the caller's window size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureParams {
    pub rows: u16,
    pub cols: u16,
    pub timeout: Duration,
}

impl Default for CaptureParams {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            timeout: Duration::from_secs(30),
        }
    }
}

impl CaptureParams {
    pub fn with_size(mut self, rows: u16, cols: u16) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
