//! Discovery configuration from TOML (`[discovery]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDiscoveryConfig {
    /// Directories to scan for executables; empty means `$PATH`
    pub paths: Vec<PathBuf>,
}
