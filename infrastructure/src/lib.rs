//! Infrastructure layer for toolwarden
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod capture;
pub mod config;
pub mod store;
pub mod tools;

// Re-export commonly used types
pub use capture::PtyCapturer;
pub use config::{
    ConfigLoader, FileBaselineConfig, FileCaptureConfig, FileConfig, FileDiscoveryConfig,
    FileOutputConfig,
};
pub use store::{FsToolStore, JsonToolIndexStore};
pub use tools::{PathToolDiscovery, ProcessCommandRunner, TargetError, expand_targets};
