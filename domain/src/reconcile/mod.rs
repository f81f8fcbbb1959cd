//! Tool reconciliation
//!
//! Every tool name seen in the environment, the whitelist or the blacklist
//! receives exactly one [`ReconciliationStatus`]. Rules are evaluated top to
//! bottom, first match wins:
//!
//! | # | Condition | Status |
//! |---|-----------|--------|
//! | 1 | blacklisted (name or ancestor) | `ERROR_BLACKLISTED_HAS_DEFS` if defined, else `BLACKLISTED_IN_ENV` |
//! | 2 | whitelisted, in environment | `MANAGED_OK` if defined, else `WHITELISTED_NO_DEFS` |
//! | 3 | whitelisted, not in environment | `ERROR_MISSING_WHITELISTED` |
//! | 4 | in environment, defined | `ERROR_ORPHAN_HAS_DEFS` |
//! | 5 | in environment, not defined | `NEW_ENV_TOOL` |
//!
//! An orphan with definitions is an error rather than a warning: a definition
//! for a tool nobody whitelisted means the lists and the definition store
//! disagree.

pub mod status;
pub mod tree;

pub use status::ReconciliationStatus;
pub use tree::{RawNode, ToolTree, WILDCARD};

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A build-breaking classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub name: String,
    pub status: ReconciliationStatus,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.name, self.status, self.status.reason())
    }
}

/// Classify a single name.
pub fn classify(
    name: &str,
    in_env: bool,
    has_defs: bool,
    whitelist: &ToolTree,
    blacklist: &ToolTree,
) -> ReconciliationStatus {
    let path = [name];

    if blacklist.covers(&path) {
        return if has_defs {
            ReconciliationStatus::ErrorBlacklistedHasDefs
        } else {
            ReconciliationStatus::BlacklistedInEnv
        };
    }

    let whitelisted = whitelist.contains(&path);
    match (whitelisted, in_env, has_defs) {
        (true, true, true) => ReconciliationStatus::ManagedOk,
        (true, true, false) => ReconciliationStatus::WhitelistedNoDefs,
        (true, false, _) => ReconciliationStatus::ErrorMissingWhitelisted,
        (false, _, true) => ReconciliationStatus::ErrorOrphanHasDefs,
        (false, _, false) => ReconciliationStatus::NewEnvTool,
    }
}

/// Classify every name in `env_tools ∪ whitelist ∪ blacklist`.
///
/// `defined_tools` holds the base tool names that have at least one stored
/// definition.
pub fn reconcile(
    env_tools: &BTreeSet<String>,
    defined_tools: &BTreeSet<String>,
    whitelist: &ToolTree,
    blacklist: &ToolTree,
) -> ReconciliationReport {
    let names: BTreeSet<&str> = env_tools
        .iter()
        .map(String::as_str)
        .chain(whitelist.names())
        .chain(blacklist.names())
        .collect();

    let statuses = names
        .into_iter()
        .map(|name| {
            let status = classify(
                name,
                env_tools.contains(name),
                defined_tools.contains(name),
                whitelist,
                blacklist,
            );
            (name.to_string(), status)
        })
        .collect();

    ReconciliationReport { statuses }
}

/// Result of a reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReconciliationReport {
    statuses: BTreeMap<String, ReconciliationStatus>,
}

impl ReconciliationReport {
    pub fn status(&self, name: &str) -> Option<ReconciliationStatus> {
        self.statuses.get(name).copied()
    }

    pub fn statuses(&self) -> &BTreeMap<String, ReconciliationStatus> {
        &self.statuses
    }

    /// Every offending name, not just the first.
    pub fn violations(&self) -> Vec<Violation> {
        self.statuses
            .iter()
            .filter(|(_, status)| status.is_error())
            .map(|(name, status)| Violation {
                name: name.clone(),
                status: *status,
            })
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        !self.statuses.values().any(ReconciliationStatus::is_error)
    }

    /// Names whose baselines should be generated.
    pub fn manageable(&self) -> Vec<&str> {
        self.statuses
            .iter()
            .filter(|(_, status)| status.is_manageable())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn count(&self, status: ReconciliationStatus) -> usize {
        self.statuses.values().filter(|s| **s == status).count()
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn list(names: &[&str]) -> ToolTree {
        names
            .iter()
            .fold(ToolTree::new(), |tree, name| tree.with_wildcard(&[*name]))
    }

    #[test]
    fn test_whitelisted_without_definitions() {
        let report = reconcile(&set(&["a"]), &set(&[]), &list(&["a"]), &list(&[]));
        assert_eq!(report.status("a"), Some(ReconciliationStatus::WhitelistedNoDefs));
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_whitelisted_with_definitions() {
        let report = reconcile(&set(&["a"]), &set(&["a"]), &list(&["a"]), &list(&[]));
        assert_eq!(report.status("a"), Some(ReconciliationStatus::ManagedOk));
        assert!(report.is_clean());
    }

    #[test]
    fn test_missing_whitelisted() {
        let report = reconcile(&set(&[]), &set(&[]), &list(&["a"]), &list(&[]));
        assert_eq!(
            report.status("a"),
            Some(ReconciliationStatus::ErrorMissingWhitelisted)
        );
        assert!(!report.is_clean());
    }

    #[test]
    fn test_blacklisted_with_definitions() {
        let report = reconcile(&set(&["x"]), &set(&["x"]), &list(&[]), &list(&["x"]));
        assert_eq!(
            report.status("x"),
            Some(ReconciliationStatus::ErrorBlacklistedHasDefs)
        );
    }

    #[test]
    fn test_blacklist_wins_over_whitelist() {
        let report = reconcile(&set(&["x"]), &set(&[]), &list(&["x"]), &list(&["x"]));
        assert_eq!(report.status("x"), Some(ReconciliationStatus::BlacklistedInEnv));
    }

    #[test]
    fn test_blacklisted_absent_from_env_is_still_classified() {
        let report = reconcile(&set(&[]), &set(&[]), &list(&[]), &list(&["rm"]));
        assert_eq!(report.status("rm"), Some(ReconciliationStatus::BlacklistedInEnv));
    }

    #[test]
    fn test_orphan_with_definitions_is_fatal() {
        let report = reconcile(&set(&["o"]), &set(&["o"]), &list(&[]), &list(&[]));
        assert_eq!(report.status("o"), Some(ReconciliationStatus::ErrorOrphanHasDefs));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_new_env_tool() {
        let report = reconcile(&set(&["n"]), &set(&[]), &list(&[]), &list(&[]));
        assert_eq!(report.status("n"), Some(ReconciliationStatus::NewEnvTool));
        assert!(report.is_clean());
    }

    #[test]
    fn test_blacklisted_subcommand_does_not_blacklist_tool() {
        let blacklist = ToolTree::new().with_path(&["git", "push"]);
        let report = reconcile(&set(&["git"]), &set(&[]), &list(&["git"]), &blacklist);
        assert_eq!(report.status("git"), Some(ReconciliationStatus::WhitelistedNoDefs));
    }

    #[test]
    fn test_root_wildcard_blacklist() {
        let blacklist = ToolTree::new().with_wildcard(&["*"]);
        let report = reconcile(&set(&["a", "b"]), &set(&["b"]), &list(&["a"]), &blacklist);
        assert_eq!(report.status("a"), Some(ReconciliationStatus::BlacklistedInEnv));
        assert_eq!(
            report.status("b"),
            Some(ReconciliationStatus::ErrorBlacklistedHasDefs)
        );
    }

    #[test]
    fn test_total_over_union_and_all_violations_collected() {
        let report = reconcile(
            &set(&["env_only", "orphan", "managed", "banned"]),
            &set(&["orphan", "managed", "banned"]),
            &list(&["managed", "missing"]),
            &list(&["banned", "gone"]),
        );

        assert_eq!(report.len(), 6);
        let violations: Vec<String> = report.violations().into_iter().map(|v| v.name).collect();
        assert_eq!(violations, vec!["banned", "missing", "orphan"]);
        assert_eq!(report.manageable(), vec!["managed"]);
        assert_eq!(report.count(ReconciliationStatus::BlacklistedInEnv), 1);
        assert_eq!(report.count(ReconciliationStatus::NewEnvTool), 1);
    }

    #[test]
    fn test_violation_display() {
        let v = Violation {
            name: "rm".to_string(),
            status: ReconciliationStatus::ErrorBlacklistedHasDefs,
        };
        assert!(v.to_string().starts_with("rm: ERROR_BLACKLISTED_HAS_DEFS"));
    }
}
