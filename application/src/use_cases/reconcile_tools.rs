//! Reconcile Tools use case
//!
//! Joins environment discovery, the definition store and the configured
//! lists into one [`ReconciliationReport`].

use crate::ports::discovery::ToolDiscovery;
use crate::ports::tool_store::{StoreError, ToolStore};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use warden_domain::{CommandSequence, ReconciliationReport, ToolTree, Violation, reconcile};

/// Errors surfaced by a reconciliation pass
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Every offending name, collected before failing.
    #[error("{} tool(s) failed reconciliation: {}", .0.len(), format_violations(.0))]
    Violations(Vec<Violation>),
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("{} ({})", v.name, v.status))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Input for the ReconcileTools use case
#[derive(Debug, Clone, Default)]
pub struct ReconcileInput {
    pub whitelist: ToolTree,
    pub blacklist: ToolTree,
}

impl ReconcileInput {
    pub fn new(whitelist: ToolTree, blacklist: ToolTree) -> Self {
        Self {
            whitelist,
            blacklist,
        }
    }
}

#[derive(Debug)]
pub struct ReconcileOutput {
    pub report: ReconciliationReport,
    /// Definition files that could not be read; they count as absent.
    pub load_errors: Vec<StoreError>,
}

impl ReconcileOutput {
    pub fn ensure_clean(&self) -> Result<(), ReconcileError> {
        if self.report.is_clean() {
            Ok(())
        } else {
            Err(ReconcileError::Violations(self.report.violations()))
        }
    }
}

/// Use case for classifying every known tool name
pub struct ReconcileToolsUseCase<D: ToolDiscovery, S: ToolStore> {
    discovery: Arc<D>,
    store: Arc<S>,
}

impl<D: ToolDiscovery, S: ToolStore> ReconcileToolsUseCase<D, S> {
    pub fn new(discovery: Arc<D>, store: Arc<S>) -> Self {
        Self { discovery, store }
    }

    pub fn execute(&self, input: &ReconcileInput) -> ReconcileOutput {
        let env_tools = self.discovery.discover();
        let loaded = self.store.load_definitions();
        for e in &loaded.errors {
            warn!("Skipping unreadable definition: {}", e);
        }
        let defined_tools = loaded.defined_tools();

        info!(
            "Reconciling {} environment tools against {} defined tools",
            env_tools.len(),
            defined_tools.len()
        );

        let report = reconcile(&env_tools, &defined_tools, &input.whitelist, &input.blacklist);

        ReconcileOutput {
            report,
            load_errors: loaded.errors,
        }
    }
}

/// Command sequences whose baselines a clean report allows generating:
/// every manageable tool, plus every explicit whitelisted sub-command path
/// of a manageable tool that the blacklist does not cover.
pub fn baseline_targets(
    report: &ReconciliationReport,
    whitelist: &ToolTree,
    blacklist: &ToolTree,
) -> Vec<CommandSequence> {
    let manageable = report.manageable();
    let mut targets = Vec::new();

    for path in whitelist.command_paths() {
        let refs: Vec<&str> = path.iter().map(String::as_str).collect();
        let Some(base) = refs.first() else {
            continue;
        };
        if !manageable.contains(base) || blacklist.covers(&refs) {
            continue;
        }
        match CommandSequence::new(refs.iter().copied()) {
            Ok(sequence) => targets.push(sequence),
            Err(e) => warn!("Skipping whitelist entry {:?}: {}", path, e),
        }
    }

    // Wildcard whitelists (`"*" = true`) admit tools that have no path of
    // their own in the tree.
    for name in manageable {
        if !targets.iter().any(|s| s.tokens().len() == 1 && s.tool_name() == name) {
            match CommandSequence::new([name]) {
                Ok(sequence) => targets.push(sequence),
                Err(e) => warn!("Skipping tool {}: {}", name, e),
            }
        }
    }

    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::tool_store::LoadedDefinitions;
    use std::collections::BTreeSet;
    use std::path::PathBuf;
    use warden_domain::{ReconciliationStatus, ToolDefinition};

    struct FixedDiscovery(Vec<&'static str>);

    impl ToolDiscovery for FixedDiscovery {
        fn discover(&self) -> BTreeSet<String> {
            self.0.iter().map(|s| s.to_string()).collect()
        }
    }

    struct DefinitionsOnly(Vec<ToolDefinition>, bool);

    impl ToolStore for DefinitionsOnly {
        fn load_definitions(&self) -> LoadedDefinitions {
            LoadedDefinitions {
                definitions: self.0.clone(),
                errors: if self.1 {
                    vec![StoreError::io(
                        "broken.json",
                        std::io::Error::from(std::io::ErrorKind::InvalidData),
                    )]
                } else {
                    Vec::new()
                },
            }
        }
        fn write_baseline(&self, _: &str, _: &str) -> Result<PathBuf, StoreError> {
            unreachable!()
        }
        fn ensure_skeleton(&self, _: &ToolDefinition) -> Result<bool, StoreError> {
            unreachable!()
        }
    }

    fn def(tokens: &[&str]) -> ToolDefinition {
        ToolDefinition::skeleton(CommandSequence::new(tokens.iter().copied()).unwrap())
    }

    fn use_case(
        env: Vec<&'static str>,
        defs: Vec<ToolDefinition>,
    ) -> ReconcileToolsUseCase<FixedDiscovery, DefinitionsOnly> {
        ReconcileToolsUseCase::new(
            Arc::new(FixedDiscovery(env)),
            Arc::new(DefinitionsOnly(defs, false)),
        )
    }

    #[test]
    fn test_subcommand_definitions_count_for_base_tool() {
        let uc = use_case(vec!["git"], vec![def(&["git", "commit"])]);
        let input = ReconcileInput::new(ToolTree::new().with_path(&["git"]), ToolTree::new());
        let output = uc.execute(&input);
        assert_eq!(
            output.report.status("git"),
            Some(ReconciliationStatus::ManagedOk)
        );
        assert!(output.ensure_clean().is_ok());
    }

    #[test]
    fn test_violations_collect_every_offender() {
        let uc = use_case(vec!["rm", "stray"], vec![def(&["rm"]), def(&["stray"])]);
        let input = ReconcileInput::new(
            ToolTree::new().with_wildcard(&["missing"]),
            ToolTree::new().with_wildcard(&["rm"]),
        );
        let err = uc.execute(&input).ensure_clean().unwrap_err();
        let ReconcileError::Violations(violations) = &err;
        let names: Vec<&str> = violations.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["missing", "rm", "stray"]);
        assert!(err.to_string().contains("3 tool(s)"));
    }

    #[test]
    fn test_unreadable_definitions_are_reported_not_fatal() {
        let uc = ReconcileToolsUseCase::new(
            Arc::new(FixedDiscovery(vec!["a"])),
            Arc::new(DefinitionsOnly(Vec::new(), true)),
        );
        let output = uc.execute(&ReconcileInput::default());
        assert_eq!(output.load_errors.len(), 1);
        assert_eq!(output.report.status("a"), Some(ReconciliationStatus::NewEnvTool));
    }

    #[test]
    fn test_baseline_targets_include_whitelisted_subcommands() {
        let whitelist = ToolTree::new()
            .with_path(&["git", "commit"])
            .with_path(&["git", "push"])
            .with_wildcard(&["ruff"])
            .with_wildcard(&["absent"]);
        let blacklist = ToolTree::new().with_path(&["git", "push"]);
        let uc = use_case(vec!["git", "ruff"], Vec::new());
        let output = uc.execute(&ReconcileInput::new(whitelist.clone(), blacklist.clone()));

        let targets: Vec<String> = baseline_targets(&output.report, &whitelist, &blacklist)
            .iter()
            .map(CommandSequence::tool_id)
            .collect();
        assert_eq!(targets, vec!["git", "git_commit", "ruff"]);
    }

    #[test]
    fn test_root_wildcard_whitelist_targets_env_tools() {
        let whitelist = ToolTree::new().with_wildcard(&["*"]);
        let uc = use_case(vec!["a", "b"], Vec::new());
        let output = uc.execute(&ReconcileInput::new(whitelist.clone(), ToolTree::new()));

        let targets: Vec<String> = baseline_targets(&output.report, &whitelist, &ToolTree::new())
            .iter()
            .map(CommandSequence::tool_id)
            .collect();
        assert_eq!(targets, vec!["a", "b"]);
    }
}
