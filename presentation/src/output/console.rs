//! Console output formatter

use crate::output::formatter::OutputFormatter;
use colored::{ColoredString, Colorize};
use warden_application::{
    AuditReport, BaselineOutcome, BatchSummary, DispatchOutcome, ReconcileOutput,
};
use warden_domain::{ConfigIssue, DefinitionAudit, ReconciliationStatus, Severity};

/// Formats results as colored, human-readable text
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn format_reconcile(output: &ReconcileOutput) -> String {
        let report = &output.report;
        let mut out = String::new();

        out.push_str(&Self::header("Tool Reconciliation"));
        out.push('\n');

        if report.is_empty() {
            out.push_str(&format!("\n{}\n", "No tools found.".dimmed()));
        }
        let width = Self::name_width(report.statuses().keys().map(String::as_str));
        for (name, status) in report.statuses() {
            out.push_str(&format!(
                "  {:<width$}  {}\n",
                name,
                Self::status_label(*status),
                width = width
            ));
        }

        let violations = report.violations();
        if !violations.is_empty() {
            out.push_str(&Self::section_header("Violations"));
            for violation in &violations {
                out.push_str(&format!(
                    "  {} {} - {}\n",
                    "✗".red().bold(),
                    violation.name.bold(),
                    violation.status.reason()
                ));
            }
        }

        Self::push_load_errors(&mut out, output.load_errors.iter().map(|e| e.to_string()));

        let summary: Vec<String> = ReconciliationStatus::ALL
            .iter()
            .map(|status| (status, report.count(*status)))
            .filter(|(_, count)| *count > 0)
            .map(|(status, count)| format!("{} {}", count, status.as_str().to_lowercase()))
            .collect();
        if !summary.is_empty() {
            out.push_str(&format!("\n{} {}\n", "Summary:".cyan().bold(), summary.join(", ")));
        }

        out.push_str(&Self::footer());
        out
    }

    pub fn format_batch(summary: &BatchSummary) -> String {
        let mut out = String::new();

        out.push_str(&Self::header("Baselines"));
        out.push('\n');

        if summary.total() == 0 {
            out.push_str(&format!("\n{}\n", "Nothing to capture.".dimmed()));
        }

        for report in &summary.reports {
            let label = match report.outcome {
                BaselineOutcome::Updated => format!("{:<10}", report.outcome.as_str()).yellow(),
                BaselineOutcome::UpToDate => format!("{:<10}", report.outcome.as_str()).green(),
            };
            let mut line = format!("  {} {} {}", label, report.tool_id.bold(), report.fingerprint);
            if let Some(previous) = report.previous.filter(|p| *p != report.fingerprint) {
                line.push_str(&format!(" {}", format!("(was {})", previous).dimmed()));
            }
            if report.skeleton_created {
                line.push_str(&format!(" {}", "[new definition]".cyan()));
            }
            out.push_str(&line);
            out.push('\n');
        }

        for failure in &summary.failures {
            out.push_str(&format!(
                "  {} {} {}\n",
                format!("{:<10}", "FAILED").red().bold(),
                failure.tool_id().bold(),
                failure.to_string().dimmed()
            ));
        }

        out.push_str(&format!(
            "\n{} {} updated, {} up to date, {} failed\n",
            "Summary:".cyan().bold(),
            summary.count(BaselineOutcome::Updated),
            summary.count(BaselineOutcome::UpToDate),
            summary.failures.len()
        ));

        out.push_str(&Self::footer());
        out
    }

    pub fn format_tools(report: &AuditReport) -> String {
        let mut out = String::new();

        out.push_str(&Self::header("Tool Definitions"));
        out.push('\n');

        if report.entries.is_empty() {
            out.push_str(&format!("\n{}\n", "No tool definitions.".dimmed()));
        }

        let ids: Vec<String> = report
            .entries
            .iter()
            .map(|e| e.definition.tool_id())
            .collect();
        let width = Self::name_width(ids.iter().map(String::as_str));

        for (id, entry) in ids.iter().zip(&report.entries) {
            let metadata = &entry.definition.metadata;
            out.push_str(&format!(
                "  {:<width$}  {:<11}  {}",
                id,
                Self::audit_label(entry.audit),
                metadata.provides_capabilities.join(",").cyan(),
                width = width
            ));
            if !metadata.supported_filetypes.is_empty() {
                out.push_str(&format!(
                    " {}",
                    format!("[{}]", metadata.supported_filetypes.join(", ")).dimmed()
                ));
            }
            out.push('\n');
        }

        Self::push_load_errors(&mut out, report.load_errors.iter().map(|e| e.to_string()));

        out.push_str(&Self::footer());
        out
    }

    pub fn format_dispatch(outcome: &DispatchOutcome) -> String {
        let mut out = String::new();

        if outcome.commands.is_empty() {
            out.push_str(&format!("{}\n", "Nothing to run.".dimmed()));
        }

        for command in &outcome.commands {
            let line = shell_words::join(&command.argv);
            match command.exit_code {
                None => out.push_str(&format!("{} {}\n", "$".dimmed(), line)),
                Some(0) => out.push_str(&format!("{} {}\n", "✓".green(), line)),
                Some(code) => out.push_str(&format!(
                    "{} {} {}\n",
                    "✗".red().bold(),
                    line,
                    format!("(exit {})", code).red()
                )),
            }
        }

        if !outcome.unmatched.is_empty() {
            let heading = if outcome.strict {
                "No tool for:".red().bold()
            } else {
                "No tool for:".yellow().bold()
            };
            out.push_str(&format!("\n{}\n", heading));
            for path in &outcome.unmatched {
                out.push_str(&format!("  {}\n", path.display()));
            }
        }

        out
    }

    pub fn format_config_issues(issues: &[ConfigIssue]) -> String {
        issues
            .iter()
            .map(|issue| {
                let level = match issue.severity {
                    Severity::Error => "error:".red().bold(),
                    Severity::Warning => "warning:".yellow().bold(),
                };
                format!("{} {}\n", level, issue.message)
            })
            .collect()
    }

    fn status_label(status: ReconciliationStatus) -> ColoredString {
        match status {
            ReconciliationStatus::ManagedOk => status.as_str().green(),
            ReconciliationStatus::WhitelistedNoDefs => status.as_str().cyan(),
            ReconciliationStatus::BlacklistedInEnv => status.as_str().dimmed(),
            ReconciliationStatus::NewEnvTool => status.as_str().yellow(),
            ReconciliationStatus::ErrorMissingWhitelisted
            | ReconciliationStatus::ErrorBlacklistedHasDefs
            | ReconciliationStatus::ErrorOrphanHasDefs => status.as_str().red().bold(),
        }
    }

    fn audit_label(audit: DefinitionAudit) -> ColoredString {
        match audit {
            DefinitionAudit::Verified => audit.as_str().green(),
            DefinitionAudit::Stale => audit.as_str().red().bold(),
            DefinitionAudit::Unverified => audit.as_str().yellow(),
            DefinitionAudit::NoBaseline => audit.as_str().dimmed(),
        }
    }

    fn push_load_errors(out: &mut String, errors: impl Iterator<Item = String>) {
        let errors: Vec<String> = errors.collect();
        if errors.is_empty() {
            return;
        }
        out.push_str(&Self::section_header("Unreadable definitions"));
        for error in errors {
            out.push_str(&format!("  {} {}\n", "!".yellow().bold(), error));
        }
    }

    fn name_width<'a>(names: impl Iterator<Item = &'a str>) -> usize {
        names.map(str::len).max().unwrap_or(0).clamp(8, 40)
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_reconcile(&self, output: &ReconcileOutput) -> String {
        Self::format_reconcile(output)
    }

    fn format_batch(&self, summary: &BatchSummary) -> String {
        Self::format_batch(summary)
    }

    fn format_tools(&self, report: &AuditReport) -> String {
        Self::format_tools(report)
    }

    fn format_dispatch(&self, outcome: &DispatchOutcome) -> String {
        Self::format_dispatch(outcome)
    }
}
