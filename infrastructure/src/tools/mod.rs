//! Environment-facing tool adapters
//!
//! - [`PathToolDiscovery`]: executable names on `$PATH` or configured directories
//! - [`ProcessCommandRunner`]: runs dispatched commands with inherited stdio
//! - [`expand_targets`]: turns file arguments and glob patterns into paths

mod discovery;
mod runner;
mod targets;

pub use discovery::PathToolDiscovery;
pub use runner::ProcessCommandRunner;
pub use targets::{TargetError, expand_targets};
