//! Command-line surface

pub mod actions;
pub mod commands;

pub use actions::{ActionInvocation, ActionOption, ActionRegistry, ActionSpec, parse_assignment};
pub use commands::{BaselineArgs, CaptureArgs, Cli, Command, DispatchArgs};
