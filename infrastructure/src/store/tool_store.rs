//! Tool directory: `<tool_id>.json` definitions and `<tool_id>.txt` baselines

use super::write_new;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use warden_application::{LoadedDefinitions, StoreError, ToolStore};
use warden_domain::ToolDefinition;

pub const DEFINITION_EXTENSION: &str = "json";
pub const BASELINE_EXTENSION: &str = "txt";

#[derive(Debug, Clone)]
pub struct FsToolStore {
    tool_dir: PathBuf,
}

impl FsToolStore {
    pub fn new(tool_dir: impl Into<PathBuf>) -> Self {
        Self {
            tool_dir: tool_dir.into(),
        }
    }

    pub fn tool_dir(&self) -> &Path {
        &self.tool_dir
    }

    pub fn definition_path(&self, tool_id: &str) -> PathBuf {
        self.tool_dir
            .join(format!("{}.{}", tool_id, DEFINITION_EXTENSION))
    }

    pub fn baseline_path(&self, tool_id: &str) -> PathBuf {
        self.tool_dir.join(format!("{}.{}", tool_id, BASELINE_EXTENSION))
    }

    fn ensure_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.tool_dir).map_err(|e| StoreError::io(&self.tool_dir, e))
    }

    fn read_definition(path: &Path) -> Result<ToolDefinition, StoreError> {
        let raw = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        serde_json::from_str(&raw).map_err(|e| StoreError::json(path, e))
    }
}

impl ToolStore for FsToolStore {
    /// Definitions in sorted file-name order, which is the declaration
    /// order the dispatcher breaks ties with.
    fn load_definitions(&self) -> LoadedDefinitions {
        let mut loaded = LoadedDefinitions::default();

        let entries = match fs::read_dir(&self.tool_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Tool directory {} does not exist", self.tool_dir.display());
                return loaded;
            }
            Err(e) => {
                loaded.errors.push(StoreError::io(&self.tool_dir, e));
                return loaded;
            }
        };

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.extension().and_then(|e| e.to_str()) == Some(DEFINITION_EXTENSION)
                        && path.is_file()
                    {
                        paths.push(path);
                    }
                }
                Err(e) => loaded.errors.push(StoreError::io(&self.tool_dir, e)),
            }
        }
        paths.sort();

        for path in paths {
            match Self::read_definition(&path) {
                Ok(definition) => loaded.definitions.push(definition),
                Err(e) => loaded.errors.push(e),
            }
        }

        debug!(
            "Loaded {} definitions from {} ({} unreadable)",
            loaded.definitions.len(),
            self.tool_dir.display(),
            loaded.errors.len()
        );
        loaded
    }

    fn write_baseline(&self, tool_id: &str, text: &str) -> Result<PathBuf, StoreError> {
        self.ensure_dir()?;
        let path = self.baseline_path(tool_id);
        fs::write(&path, text).map_err(|e| StoreError::io(&path, e))?;
        Ok(path)
    }

    fn ensure_skeleton(&self, definition: &ToolDefinition) -> Result<bool, StoreError> {
        self.ensure_dir()?;
        let path = self.definition_path(&definition.tool_id());

        let mut json =
            serde_json::to_string_pretty(definition).map_err(|e| StoreError::json(&path, e))?;
        json.push('\n');
        write_new(&path, json.as_bytes())
    }
}
