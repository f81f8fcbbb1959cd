//! Capture configuration from TOML (`[capture]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;
use warden_application::CaptureParams;
use warden_domain::capture::{DEFAULT_COLS, DEFAULT_ROWS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCaptureConfig {
    pub rows: u16,
    pub cols: u16,
    pub timeout_secs: u64,
}

impl Default for FileCaptureConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            timeout_secs: 30,
        }
    }
}

impl FileCaptureConfig {
    pub fn to_params(&self) -> CaptureParams {
        CaptureParams::default()
            .with_size(self.rows, self.cols)
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}
