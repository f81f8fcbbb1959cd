//! Definition audit: does a definition still describe the captured baseline?

use super::entities::ToolDefinition;
use crate::index::ToolIndex;
use serde::Serialize;
use std::fmt;

/// Agreement between a definition's `ground_truth_crc` and the tool index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionAudit {
    /// Written against the current baseline
    Verified,
    /// Written against an older baseline; the tool's help text has drifted
    Stale,
    /// Still carries the all-zero sentinel
    Unverified,
    /// The index has no fingerprint for this tool
    NoBaseline,
}

impl DefinitionAudit {
    pub fn as_str(&self) -> &str {
        match self {
            DefinitionAudit::Verified => "verified",
            DefinitionAudit::Stale => "stale",
            DefinitionAudit::Unverified => "unverified",
            DefinitionAudit::NoBaseline => "no-baseline",
        }
    }

    pub fn is_problem(&self) -> bool {
        matches!(self, DefinitionAudit::Stale)
    }
}

impl fmt::Display for DefinitionAudit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn audit_definition(definition: &ToolDefinition, index: &ToolIndex) -> DefinitionAudit {
    let Some(current) = index.lookup(&definition.command_sequence) else {
        return DefinitionAudit::NoBaseline;
    };

    let recorded = definition.metadata.ground_truth_crc;
    if recorded.is_unverified() {
        DefinitionAudit::Unverified
    } else if recorded == current {
        DefinitionAudit::Verified
    } else {
        DefinitionAudit::Stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{CommandSequence, Fingerprint};

    fn ruff() -> CommandSequence {
        CommandSequence::new(["ruff"]).unwrap()
    }

    #[test]
    fn test_no_baseline() {
        let def = ToolDefinition::skeleton(ruff());
        assert_eq!(
            audit_definition(&def, &ToolIndex::new()),
            DefinitionAudit::NoBaseline
        );
    }

    #[test]
    fn test_states_against_index() {
        let mut index = ToolIndex::new();
        index.record(&ruff(), Fingerprint::new(42));

        let skeleton = ToolDefinition::skeleton(ruff());
        assert_eq!(audit_definition(&skeleton, &index), DefinitionAudit::Unverified);

        let verified = skeleton.clone().with_ground_truth(Fingerprint::new(42));
        assert_eq!(audit_definition(&verified, &index), DefinitionAudit::Verified);

        let stale = skeleton.with_ground_truth(Fingerprint::new(41));
        assert_eq!(audit_definition(&stale, &index), DefinitionAudit::Stale);
        assert!(DefinitionAudit::Stale.is_problem());
    }
}
