//! JSON output formatter

use crate::output::formatter::OutputFormatter;
use serde_json::{Value, json};
use warden_application::{AuditReport, BatchSummary, DispatchOutcome, ReconcileOutput};

/// Formats results as pretty-printed JSON
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn reconcile_value(output: &ReconcileOutput) -> Value {
        json!({
            "statuses": output.report,
            "violations": output.report.violations(),
            "clean": output.report.is_clean(),
            "load_errors": Self::errors(output.load_errors.iter().map(|e| e.to_string())),
        })
    }

    pub fn batch_value(summary: &BatchSummary) -> Value {
        let failures: Vec<Value> = summary
            .failures
            .iter()
            .map(|failure| {
                json!({
                    "tool_id": failure.tool_id(),
                    "error": failure.to_string(),
                })
            })
            .collect();

        json!({
            "reports": summary.reports,
            "failures": failures,
            "success": summary.is_success(),
        })
    }

    pub fn tools_value(report: &AuditReport) -> Value {
        let tools: Vec<Value> = report
            .entries
            .iter()
            .map(|entry| {
                let metadata = &entry.definition.metadata;
                json!({
                    "tool_id": entry.definition.tool_id(),
                    "command_sequence": entry.definition.command_sequence,
                    "capabilities": metadata.provides_capabilities,
                    "filetypes": metadata.supported_filetypes,
                    "ground_truth_crc": metadata.ground_truth_crc,
                    "audit": entry.audit,
                })
            })
            .collect();

        json!({
            "tools": tools,
            "load_errors": Self::errors(report.load_errors.iter().map(|e| e.to_string())),
        })
    }

    pub fn dispatch_value(outcome: &DispatchOutcome) -> Value {
        json!({
            "commands": outcome.commands,
            "unmatched": outcome.unmatched,
            "exit_code": outcome.exit_code(),
        })
    }

    fn errors(errors: impl Iterator<Item = String>) -> Value {
        Value::Array(errors.map(Value::String).collect())
    }

    fn render(value: &Value) -> String {
        let mut text = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
        text.push('\n');
        text
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_reconcile(&self, output: &ReconcileOutput) -> String {
        Self::render(&Self::reconcile_value(output))
    }

    fn format_batch(&self, summary: &BatchSummary) -> String {
        Self::render(&Self::batch_value(summary))
    }

    fn format_tools(&self, report: &AuditReport) -> String {
        Self::render(&Self::tools_value(report))
    }

    fn format_dispatch(&self, outcome: &DispatchOutcome) -> String {
        Self::render(&Self::dispatch_value(outcome))
    }
}
