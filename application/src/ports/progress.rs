//! Progress notification port
//!
//! Defines the interface for reporting progress during a baseline batch.

/// Callback for progress updates during a baseline batch
///
/// Implementations live in the presentation layer.
pub trait BaselineProgressNotifier: Send + Sync {
    /// Called once, before any job starts
    fn on_batch_start(&self, total: usize);

    /// Called as each job finishes (in completion order)
    fn on_tool_complete(&self, tool_id: &str, success: bool, detail: &str);

    /// Called after every job has been joined
    fn on_batch_complete(&self, succeeded: usize, failed: usize);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl BaselineProgressNotifier for NoProgress {
    fn on_batch_start(&self, _total: usize) {}
    fn on_tool_complete(&self, _tool_id: &str, _success: bool, _detail: &str) {}
    fn on_batch_complete(&self, _succeeded: usize, _failed: usize) {}
}
