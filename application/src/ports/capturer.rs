//! Capturer port
//!
//! Runs a command inside a pseudo-terminal and collects everything it writes.
//! Tools behave as if attached to an interactive terminal, so help text is
//! rendered the way a developer would see it.

use std::time::Duration;
use thiserror::Error;
use tracing::warn;
use warden_domain::capture::{CaptureResult, EXIT_CAPTURE_FAILED, EXIT_TIMED_OUT};

/// Errors raised while setting up or supervising a capture
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Empty command")]
    EmptyCommand,

    #[error("Failed to allocate pseudo-terminal: {0}")]
    PtyAllocation(#[source] std::io::Error),

    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error during capture: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Pseudo-terminal capture is not supported on this platform")]
    Unsupported,
}

impl CaptureError {
    /// Sentinel exit code reported for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            CaptureError::TimedOut(_) => EXIT_TIMED_OUT,
            _ => EXIT_CAPTURE_FAILED,
        }
    }
}

/// One capture invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub command: Vec<String>,
    pub rows: u16,
    pub cols: u16,
    pub timeout: Duration,
}

impl CaptureRequest {
    pub fn new(command: Vec<String>, rows: u16, cols: u16, timeout: Duration) -> Self {
        Self {
            command,
            rows,
            cols,
            timeout,
        }
    }
}

/// Port for pseudo-terminal capture
///
/// Captures are blocking; async callers run them on the blocking pool.
pub trait Capturer: Send + Sync {
    /// Run the command to completion.
    ///
    /// A timed-out child is killed and reported through `Ok` with
    /// [`EXIT_TIMED_OUT`] so partial output survives; `Err` is reserved for
    /// failures before or around the child's lifetime.
    fn try_capture(&self, request: &CaptureRequest) -> Result<CaptureResult, CaptureError>;

    /// Like [`try_capture`](Self::try_capture), with failures folded into a
    /// sentinel exit code and empty output.
    fn capture(&self, request: &CaptureRequest) -> CaptureResult {
        match self.try_capture(request) {
            Ok(result) => result,
            Err(e) => {
                warn!("Capture of {:?} failed: {}", request.command, e);
                CaptureResult::new(Vec::new(), e.exit_code())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing(fn() -> CaptureError);

    impl Capturer for Failing {
        fn try_capture(&self, _request: &CaptureRequest) -> Result<CaptureResult, CaptureError> {
            Err((self.0)())
        }
    }

    fn request() -> CaptureRequest {
        CaptureRequest::new(vec!["x".into()], 24, 80, Duration::from_secs(1))
    }

    #[test]
    fn test_failures_become_sentinels() {
        let result = Failing(|| CaptureError::EmptyCommand).capture(&request());
        assert_eq!(result.exit_code, EXIT_CAPTURE_FAILED);
        assert!(result.stdout.is_empty());

        let result = Failing(|| CaptureError::TimedOut(Duration::from_secs(1))).capture(&request());
        assert_eq!(result.exit_code, EXIT_TIMED_OUT);
    }
}
