//! Subprocess runner for dispatched actions

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;
use warden_application::{CommandRunner, RunnerError};

/// Runs commands with the caller's stdin/stdout/stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessCommandRunner;

impl ProcessCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessCommandRunner {
    async fn run(&self, argv: &[String]) -> Result<i32, RunnerError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(RunnerError::EmptyCommand);
        };

        let mut child = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                program: program.clone(),
                source,
            })?;

        let status = child.wait().await.map_err(|source| RunnerError::Wait {
            program: program.clone(),
            source,
        })?;
        debug!("{} exited with {}", program, status);

        Ok(exit_code(status))
    }
}

#[cfg(unix)]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|signo| 128 + signo))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_exit_code_returned() {
        let runner = ProcessCommandRunner::new();
        assert_eq!(runner.run(&argv(&["true"])).await.unwrap(), 0);
        assert_eq!(runner.run(&argv(&["sh", "-c", "exit 4"])).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let err = ProcessCommandRunner::new()
            .run(&argv(&["definitely-not-a-real-tool-xyz"]))
            .await
            .unwrap_err();
        assert!(matches!(err, RunnerError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_empty_command() {
        let err = ProcessCommandRunner::new().run(&[]).await.unwrap_err();
        assert!(matches!(err, RunnerError::EmptyCommand));
    }
}
