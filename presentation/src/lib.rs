//! Presentation layer for toolwarden
//!
//! This crate contains the CLI definitions, the action registry, output
//! formatters and progress reporters.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::{
    ActionInvocation, ActionRegistry, ActionSpec, BaselineArgs, CaptureArgs, Cli, Command,
    DispatchArgs, parse_assignment,
};
pub use output::{ConsoleFormatter, JsonFormatter, OutputFormatter, formatter_for};
pub use progress::{ProgressReporter, SimpleProgress};
