//! Tool store port
//!
//! The tool directory holds one `<tool_id>.json` definition and one
//! `<tool_id>.txt` baseline per managed command sequence.

use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;
use warden_domain::ToolDefinition;

/// Persistence errors. Always carry the offending path.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StoreError::Json {
            path: path.into(),
            source,
        }
    }

    pub fn path(&self) -> &PathBuf {
        match self {
            StoreError::Io { path, .. } | StoreError::Json { path, .. } => path,
        }
    }
}

/// Result of loading every definition in the store.
///
/// A broken file never hides the others; it is reported in `errors`.
#[derive(Debug, Default)]
pub struct LoadedDefinitions {
    /// In declaration order (sorted file name)
    pub definitions: Vec<ToolDefinition>,
    pub errors: Vec<StoreError>,
}

impl LoadedDefinitions {
    /// Base tool names with at least one definition.
    pub fn defined_tools(&self) -> BTreeSet<String> {
        self.definitions
            .iter()
            .map(|d| d.command_sequence.tool_name().to_string())
            .collect()
    }
}

/// Port for the definition/baseline store
pub trait ToolStore: Send + Sync {
    fn load_definitions(&self) -> LoadedDefinitions;

    /// Overwrite the baseline text for `tool_id`. Returns the written path.
    fn write_baseline(&self, tool_id: &str, text: &str) -> Result<PathBuf, StoreError>;

    /// Write `definition` unless a definition file already exists.
    /// Returns `true` if a file was created.
    fn ensure_skeleton(&self, definition: &ToolDefinition) -> Result<bool, StoreError>;
}
