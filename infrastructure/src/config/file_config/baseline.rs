//! Baseline batch configuration from TOML (`[baseline]` section)

use serde::{Deserialize, Serialize};
use warden_application::{BatchParams, DEFAULT_MAX_WORKERS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBaselineConfig {
    pub max_workers: usize,
}

impl Default for FileBaselineConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

impl FileBaselineConfig {
    pub fn to_params(&self) -> BatchParams {
        BatchParams::new(self.max_workers)
    }
}
