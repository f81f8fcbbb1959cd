//! Reconciliation status of a single tool name

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of classifying one tool name. Exactly one per name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconciliationStatus {
    /// Whitelisted, present, with definitions
    ManagedOk,
    /// Whitelisted and present, no definitions yet
    WhitelistedNoDefs,
    /// Blacklisted and has no definitions
    BlacklistedInEnv,
    /// Present in the environment but neither listed nor defined
    NewEnvTool,
    /// Whitelisted but not installed
    ErrorMissingWhitelisted,
    /// Blacklisted yet definitions exist
    ErrorBlacklistedHasDefs,
    /// Definitions exist for a tool that is not whitelisted
    ErrorOrphanHasDefs,
}

impl ReconciliationStatus {
    pub const ALL: [ReconciliationStatus; 7] = [
        ReconciliationStatus::ManagedOk,
        ReconciliationStatus::WhitelistedNoDefs,
        ReconciliationStatus::BlacklistedInEnv,
        ReconciliationStatus::NewEnvTool,
        ReconciliationStatus::ErrorMissingWhitelisted,
        ReconciliationStatus::ErrorBlacklistedHasDefs,
        ReconciliationStatus::ErrorOrphanHasDefs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReconciliationStatus::ManagedOk => "MANAGED_OK",
            ReconciliationStatus::WhitelistedNoDefs => "WHITELISTED_NO_DEFS",
            ReconciliationStatus::BlacklistedInEnv => "BLACKLISTED_IN_ENV",
            ReconciliationStatus::NewEnvTool => "NEW_ENV_TOOL",
            ReconciliationStatus::ErrorMissingWhitelisted => "ERROR_MISSING_WHITELISTED",
            ReconciliationStatus::ErrorBlacklistedHasDefs => "ERROR_BLACKLISTED_HAS_DEFS",
            ReconciliationStatus::ErrorOrphanHasDefs => "ERROR_ORPHAN_HAS_DEFS",
        }
    }

    /// Build-breaking statuses
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            ReconciliationStatus::ErrorMissingWhitelisted
                | ReconciliationStatus::ErrorBlacklistedHasDefs
                | ReconciliationStatus::ErrorOrphanHasDefs
        )
    }

    /// Whether baselines should be generated for a tool with this status
    pub fn is_manageable(&self) -> bool {
        matches!(
            self,
            ReconciliationStatus::ManagedOk | ReconciliationStatus::WhitelistedNoDefs
        )
    }

    /// Operator-facing explanation
    pub fn reason(&self) -> &'static str {
        match self {
            ReconciliationStatus::ManagedOk => "whitelisted, installed and defined",
            ReconciliationStatus::WhitelistedNoDefs => {
                "whitelisted and installed; definitions will be generated"
            }
            ReconciliationStatus::BlacklistedInEnv => "blacklisted; ignored",
            ReconciliationStatus::NewEnvTool => "found in environment but not listed",
            ReconciliationStatus::ErrorMissingWhitelisted => {
                "whitelisted but not found in the environment"
            }
            ReconciliationStatus::ErrorBlacklistedHasDefs => {
                "blacklisted but tool definitions exist; remove them"
            }
            ReconciliationStatus::ErrorOrphanHasDefs => {
                "tool definitions exist but the tool is not whitelisted"
            }
        }
    }
}

impl fmt::Display for ReconciliationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_statuses() {
        let errors: Vec<_> = ReconciliationStatus::ALL
            .iter()
            .filter(|s| s.is_error())
            .collect();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|s| s.as_str().starts_with("ERROR_")));
    }

    #[test]
    fn test_serde_matches_display() {
        for status in ReconciliationStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status));
        }
    }

    #[test]
    fn test_manageable() {
        assert!(ReconciliationStatus::ManagedOk.is_manageable());
        assert!(ReconciliationStatus::WhitelistedNoDefs.is_manageable());
        assert!(!ReconciliationStatus::NewEnvTool.is_manageable());
        assert!(!ReconciliationStatus::ErrorOrphanHasDefs.is_manageable());
    }
}
