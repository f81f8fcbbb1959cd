//! Command runner port
//!
//! Runs a dispatched tool invocation with inherited stdio.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Empty command")]
    EmptyCommand,

    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed waiting for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `argv` to completion and return its exit code.
    async fn run(&self, argv: &[String]) -> Result<i32, RunnerError>;
}
