//! Application-level configuration.
//!
//! These types control how use cases behave:
//!
//! - [`CaptureParams`]: terminal geometry and timeout for `--help` captures
//! - [`BatchParams`]: worker pool size for baseline batches

pub mod batch_params;
pub mod capture_params;

pub use batch_params::{BatchParams, DEFAULT_MAX_WORKERS, MAX_WORKERS_LIMIT};
pub use capture_params::CaptureParams;
