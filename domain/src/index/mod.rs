//! Tool index: the single source of truth for baseline fingerprints.
//!
//! Persisted as one JSON object keyed by base tool id:
//!
//! ```json
//! {
//!   "git": {
//!     "crc": "0x1C291CA3",
//!     "subcommands": { "git_commit": { "crc": "0x7A0F44B2" } }
//!   }
//! }
//! ```
//!
//! Sub-command fingerprints are nested under their base tool. Lookups check
//! the nested entry first and fall back to a top-level entry keyed by the full
//! tool id, which keeps older flat indexes readable.

use crate::tool::{CommandSequence, Fingerprint};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fingerprint record of a single sub-command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcommandEntry {
    #[serde(default, with = "optional_crc")]
    pub crc: Option<Fingerprint>,
}

/// Fingerprint record of a base tool and its sub-commands
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolIndexEntry {
    /// `None` when only sub-commands have been captured.
    #[serde(default, with = "optional_crc")]
    pub crc: Option<Fingerprint>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub subcommands: BTreeMap<String, SubcommandEntry>,
}

/// In-memory tool index. Loaded once, mutated by a single owner, saved
/// wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolIndex {
    entries: BTreeMap<String, ToolIndexEntry>,
}

impl ToolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current fingerprint for a command sequence.
    pub fn lookup(&self, sequence: &CommandSequence) -> Option<Fingerprint> {
        let tool_id = sequence.tool_id();

        if sequence.is_subcommand()
            && let Some(crc) = self
                .entries
                .get(sequence.tool_name())
                .and_then(|base| base.subcommands.get(&tool_id))
                .and_then(|sub| sub.crc)
        {
            return Some(crc);
        }

        self.entries.get(&tool_id).and_then(|entry| entry.crc)
    }

    /// Record a fingerprint. Returns the previous value (as seen by
    /// [`lookup`](Self::lookup)).
    pub fn record(&mut self, sequence: &CommandSequence, crc: Fingerprint) -> Option<Fingerprint> {
        let previous = self.lookup(sequence);

        if sequence.is_subcommand() {
            let base = self
                .entries
                .entry(sequence.tool_name().to_string())
                .or_default();
            base.subcommands
                .insert(sequence.tool_id(), SubcommandEntry { crc: Some(crc) });
        } else {
            self.entries
                .entry(sequence.tool_id())
                .or_default()
                .crc = Some(crc);
        }

        previous
    }

    pub fn get(&self, tool_id: &str) -> Option<&ToolIndexEntry> {
        self.entries.get(tool_id)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &ToolIndexEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Empty-string crc (written by some producers for base entries that only
/// hold sub-commands) reads as "no fingerprint".
mod optional_crc {
    use crate::tool::Fingerprint;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        crc: &Option<Fingerprint>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match crc {
            Some(fp) => serializer.serialize_str(&fp.to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Fingerprint>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}
