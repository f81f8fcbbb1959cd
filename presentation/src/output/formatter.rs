//! Output formatter trait

use warden_application::{AuditReport, BatchSummary, DispatchOutcome, ReconcileOutput};
use warden_domain::OutputFormat;

/// Renders command results for the terminal
pub trait OutputFormatter {
    /// Every name with its reconciliation status
    fn format_reconcile(&self, output: &ReconcileOutput) -> String;

    /// Per-tool baseline outcomes of a batch
    fn format_batch(&self, summary: &BatchSummary) -> String;

    /// Stored definitions with their audit status
    fn format_tools(&self, report: &AuditReport) -> String;

    /// Planned (and possibly executed) dispatch commands
    fn format_dispatch(&self, outcome: &DispatchOutcome) -> String;
}

/// Pick the formatter for `format`.
pub fn formatter_for(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(super::console::ConsoleFormatter),
        OutputFormat::Json => Box::new(super::json::JsonFormatter),
    }
}
