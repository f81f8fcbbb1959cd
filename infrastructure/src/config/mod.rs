//! Configuration file loading for toolwarden
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `TOOLWARDEN_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./toolwarden.toml` or `./.toolwarden.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/toolwarden/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileBaselineConfig, FileCaptureConfig, FileConfig, FileDiscoveryConfig, FileOutputConfig,
};
pub use loader::ConfigLoader;
