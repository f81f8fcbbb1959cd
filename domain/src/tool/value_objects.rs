//! Tool identity value objects

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator used to derive a tool id from a command sequence.
pub const TOOL_ID_SEPARATOR: &str = "_";

/// Ordered command tokens identifying a tool and optional sub-command,
/// e.g. `["git", "commit"]`.
///
/// Tokens are non-empty and contain no whitespace or path separators, so the
/// derived [`tool_id`](Self::tool_id) is always usable as a file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct CommandSequence(Vec<String>);

impl CommandSequence {
    pub fn new<I, S>(tokens: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        if tokens.is_empty() {
            return Err(DomainError::EmptyCommandSequence);
        }
        if let Some(bad) = tokens.iter().find(|t| !is_valid_token(t)) {
            return Err(DomainError::InvalidCommandToken(bad.clone()));
        }
        Ok(Self(tokens))
    }

    /// Deterministic identity: tokens joined by `_`.
    pub fn tool_id(&self) -> String {
        self.0.join(TOOL_ID_SEPARATOR)
    }

    /// First token (the executable).
    pub fn tool_name(&self) -> &str {
        &self.0[0]
    }

    /// Sub-command tokens joined by a space, if any.
    pub fn command_name(&self) -> Option<String> {
        if self.0.len() > 1 {
            Some(self.0[1..].join(" "))
        } else {
            None
        }
    }

    pub fn is_subcommand(&self) -> bool {
        self.0.len() > 1
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Extend with a further sub-command token.
    pub fn child(&self, token: impl Into<String>) -> Result<Self, DomainError> {
        let mut tokens = self.0.clone();
        tokens.push(token.into());
        Self::new(tokens)
    }
}

fn is_valid_token(token: &str) -> bool {
    !token.is_empty()
        && !token
            .chars()
            .any(|c| c.is_whitespace() || c == '/' || c == '\\' || c == '\0')
}

impl TryFrom<Vec<String>> for CommandSequence {
    type Error = DomainError;

    fn try_from(tokens: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(tokens)
    }
}

impl From<CommandSequence> for Vec<String> {
    fn from(seq: CommandSequence) -> Self {
        seq.0
    }
}

impl fmt::Display for CommandSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_id_joins_tokens() {
        let seq = CommandSequence::new(["git", "commit"]).unwrap();
        assert_eq!(seq.tool_id(), "git_commit");
        assert_eq!(seq.tool_name(), "git");
        assert_eq!(seq.command_name().as_deref(), Some("commit"));
        assert!(seq.is_subcommand());
    }

    #[test]
    fn test_single_token_has_no_command_name() {
        let seq = CommandSequence::new(["ruff"]).unwrap();
        assert_eq!(seq.tool_id(), "ruff");
        assert!(seq.command_name().is_none());
        assert!(!seq.is_subcommand());
    }

    #[test]
    fn test_rejects_empty_and_invalid_tokens() {
        assert!(matches!(
            CommandSequence::new(Vec::<String>::new()),
            Err(DomainError::EmptyCommandSequence)
        ));
        assert!(CommandSequence::new(["git", ""]).is_err());
        assert!(CommandSequence::new(["../evil"]).is_err());
        assert!(CommandSequence::new(["two words"]).is_err());
    }

    #[test]
    fn test_child_appends_token() {
        let base = CommandSequence::new(["cargo"]).unwrap();
        assert_eq!(base.child("fmt").unwrap().tool_id(), "cargo_fmt");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: CommandSequence = serde_json::from_str(r#"["uv", "pip"]"#).unwrap();
        assert_eq!(ok.to_string(), "uv pip");
        assert!(serde_json::from_str::<CommandSequence>("[]").is_err());
    }
}
