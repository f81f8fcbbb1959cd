//! Tool domain entities

use super::fingerprint::Fingerprint;
use super::value_objects::CommandSequence;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Wildcard entry in `supported_filetypes`.
pub const WILDCARD_FILETYPE: &str = "*";

/// How a declared option is rendered on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// Bare flag (`--verbose`)
    Flag,
    /// Flag followed by a value (`--config c.toml`)
    Value,
    /// Value only, no flag token
    Positional,
}

impl OptionKind {
    pub fn as_str(&self) -> &str {
        match self {
            OptionKind::Flag => "flag",
            OptionKind::Value => "value",
            OptionKind::Positional => "positional",
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A tool-native option and the canonical option it implements (if any)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOption {
    pub kind: OptionKind,
    #[serde(default)]
    pub canonical_name: Option<String>,
}

impl ToolOption {
    pub fn flag(canonical_name: impl Into<String>) -> Self {
        Self {
            kind: OptionKind::Flag,
            canonical_name: Some(canonical_name.into()),
        }
    }

    pub fn value(canonical_name: impl Into<String>) -> Self {
        Self {
            kind: OptionKind::Value,
            canonical_name: Some(canonical_name.into()),
        }
    }

    pub fn positional(canonical_name: impl Into<String>) -> Self {
        Self {
            kind: OptionKind::Positional,
            canonical_name: Some(canonical_name.into()),
        }
    }

    /// An option with no canonical mapping (documented but never emitted).
    pub fn unmapped(kind: OptionKind) -> Self {
        Self {
            kind,
            canonical_name: None,
        }
    }
}

/// Ordered mapping from tool-native token to [`ToolOption`].
///
/// Serialised as a JSON object; declaration order is preserved because the
/// argument builder emits flags in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionTable(Vec<(String, ToolOption)>);

impl OptionTable {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert or replace, keeping the original position on replace.
    pub fn insert(&mut self, token: impl Into<String>, option: ToolOption) {
        let token = token.into();
        if let Some(slot) = self.0.iter_mut().find(|(t, _)| *t == token) {
            slot.1 = option;
        } else {
            self.0.push((token, option));
        }
    }

    pub fn with(mut self, token: impl Into<String>, option: ToolOption) -> Self {
        self.insert(token, option);
        self
    }

    pub fn get(&self, token: &str) -> Option<&ToolOption> {
        self.0.iter().find(|(t, _)| t == token).map(|(_, o)| o)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ToolOption)> {
        self.0.iter().map(|(t, o)| (t.as_str(), o))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for OptionTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (token, option) in &self.0 {
            map.serialize_entry(token, option)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OptionTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = OptionTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of option tokens to option specs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut table = OptionTable::new();
                while let Some((token, option)) = access.next_entry::<String, ToolOption>()? {
                    table.insert(token, option);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// Capability and identity metadata of a tool definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub tool_name: String,
    #[serde(default)]
    pub command_name: Option<String>,
    #[serde(default)]
    pub provides_capabilities: Vec<String>,
    #[serde(default)]
    pub supported_filetypes: Vec<String>,
    #[serde(default)]
    pub ground_truth_crc: Fingerprint,
}

/// JSON record describing a tool's invocation shape, option mapping and
/// capability metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub command_sequence: CommandSequence,
    #[serde(default)]
    pub options: OptionTable,
    #[serde(default)]
    pub arguments: OptionTable,
    pub metadata: ToolMetadata,
}

impl ToolDefinition {
    /// Minimal definition written next to a freshly captured baseline.
    pub fn skeleton(command_sequence: CommandSequence) -> Self {
        let metadata = ToolMetadata {
            tool_name: command_sequence.tool_name().to_string(),
            command_name: command_sequence.command_name(),
            provides_capabilities: Vec::new(),
            supported_filetypes: Vec::new(),
            ground_truth_crc: Fingerprint::UNVERIFIED,
        };
        Self {
            command_sequence,
            options: OptionTable::new(),
            arguments: OptionTable::new(),
            metadata,
        }
    }

    pub fn tool_id(&self) -> String {
        self.command_sequence.tool_id()
    }

    pub fn with_option(mut self, token: impl Into<String>, option: ToolOption) -> Self {
        self.options.insert(token, option);
        self
    }

    pub fn with_argument(mut self, name: impl Into<String>, option: ToolOption) -> Self {
        self.arguments.insert(name, option);
        self
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        let capability = capability.into();
        if !self.metadata.provides_capabilities.contains(&capability) {
            self.metadata.provides_capabilities.push(capability);
        }
        self
    }

    pub fn with_filetype(mut self, filetype: impl Into<String>) -> Self {
        let filetype = filetype.into();
        if !self.metadata.supported_filetypes.contains(&filetype) {
            self.metadata.supported_filetypes.push(filetype);
        }
        self
    }

    pub fn with_ground_truth(mut self, crc: Fingerprint) -> Self {
        self.metadata.ground_truth_crc = crc;
        self
    }

    pub fn provides(&self, capability: &str) -> bool {
        self.metadata
            .provides_capabilities
            .iter()
            .any(|c| c == capability)
    }

    /// Whether `extension` (without the leading dot) is listed explicitly.
    /// Entries may be written as `"py"` or `".py"`.
    pub fn supports_extension(&self, extension: &str) -> bool {
        self.metadata
            .supported_filetypes
            .iter()
            .any(|ft| ft != WILDCARD_FILETYPE && ft.trim_start_matches('.') == extension)
    }

    pub fn supports_any_filetype(&self) -> bool {
        self.metadata
            .supported_filetypes
            .iter()
            .any(|ft| ft == WILDCARD_FILETYPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(tokens: &[&str]) -> CommandSequence {
        CommandSequence::new(tokens.iter().copied()).unwrap()
    }

    #[test]
    fn test_skeleton_defaults() {
        let def = ToolDefinition::skeleton(seq(&["git", "commit"]));
        assert_eq!(def.tool_id(), "git_commit");
        assert_eq!(def.metadata.tool_name, "git");
        assert_eq!(def.metadata.command_name.as_deref(), Some("commit"));
        assert!(def.options.is_empty());
        assert!(def.arguments.is_empty());
        assert!(def.metadata.ground_truth_crc.is_unverified());
    }

    #[test]
    fn test_skeleton_json_shape() {
        let def = ToolDefinition::skeleton(seq(&["ruff"]));
        let value = serde_json::to_value(&def).unwrap();
        assert_eq!(value["command_sequence"], serde_json::json!(["ruff"]));
        assert_eq!(value["options"], serde_json::json!({}));
        assert_eq!(value["metadata"]["ground_truth_crc"], "0x00000000");
        assert_eq!(value["metadata"]["command_name"], serde_json::Value::Null);
    }

    #[test]
    fn test_option_table_preserves_declaration_order() {
        let json = r#"{
            "command_sequence": ["black"],
            "options": {
                "--verbose": {"kind": "flag", "canonical_name": "verbose"},
                "--config": {"kind": "value", "canonical_name": "config"},
                "--check": {"kind": "flag", "canonical_name": "check"}
            },
            "metadata": {"tool_name": "black"}
        }"#;
        let def: ToolDefinition = serde_json::from_str(json).unwrap();
        let tokens: Vec<&str> = def.options.iter().map(|(t, _)| t).collect();
        assert_eq!(tokens, vec!["--verbose", "--config", "--check"]);

        let back = serde_json::to_string(&def).unwrap();
        let verbose = back.find("--verbose").unwrap();
        let config = back.find("--config").unwrap();
        let check = back.find("--check").unwrap();
        assert!(verbose < config && config < check);
    }

    #[test]
    fn test_option_table_replace_keeps_position() {
        let table = OptionTable::new()
            .with("-a", ToolOption::flag("a"))
            .with("-b", ToolOption::flag("b"))
            .with("-a", ToolOption::value("alpha"));
        let entries: Vec<_> = table.iter().collect();
        assert_eq!(entries[0].0, "-a");
        assert_eq!(entries[0].1.kind, OptionKind::Value);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_filetype_matching() {
        let def = ToolDefinition::skeleton(seq(&["ruff"]))
            .with_filetype(".py")
            .with_filetype("pyi");
        assert!(def.supports_extension("py"));
        assert!(def.supports_extension("pyi"));
        assert!(!def.supports_extension("rs"));
        assert!(!def.supports_any_filetype());

        let any = ToolDefinition::skeleton(seq(&["prettier"])).with_filetype("*");
        assert!(any.supports_any_filetype());
        assert!(!any.supports_extension("*"));
    }

    #[test]
    fn test_capabilities_are_deduplicated() {
        let def = ToolDefinition::skeleton(seq(&["ruff"]))
            .with_capability("Linter")
            .with_capability("Linter")
            .with_capability("Formatter");
        assert_eq!(def.metadata.provides_capabilities.len(), 2);
        assert!(def.provides("Formatter"));
        assert!(!def.provides("Tester"));
    }

    #[test]
    fn test_invalid_kind_is_rejected() {
        let json = r#"{
            "command_sequence": ["x"],
            "options": {"--y": {"kind": "switch"}},
            "metadata": {"tool_name": "x"}
        }"#;
        assert!(serde_json::from_str::<ToolDefinition>(json).is_err());
    }
}
