//! JSON tool index file

use super::write_atomic;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use warden_application::{StoreError, ToolIndexRepository};
use warden_domain::ToolIndex;

/// Tool index persisted as a single pretty-printed JSON object
#[derive(Debug, Clone)]
pub struct JsonToolIndexStore {
    path: PathBuf,
}

impl JsonToolIndexStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ToolIndexRepository for JsonToolIndexStore {
    fn load(&self) -> Result<ToolIndex, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No index at {}, starting empty", self.path.display());
                return Ok(ToolIndex::new());
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        if raw.trim().is_empty() {
            return Ok(ToolIndex::new());
        }
        serde_json::from_str(&raw).map_err(|e| StoreError::json(&self.path, e))
    }

    fn save(&self, index: &ToolIndex) -> Result<(), StoreError> {
        let mut json =
            serde_json::to_string_pretty(index).map_err(|e| StoreError::json(&self.path, e))?;
        json.push('\n');
        write_atomic(&self.path, json.as_bytes())?;
        debug!("Saved {} index entries to {}", index.len(), self.path.display());
        Ok(())
    }
}
