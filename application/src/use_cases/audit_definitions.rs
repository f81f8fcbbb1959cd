//! Audit Definitions use case
//!
//! Reports whether each stored definition was written against the baseline
//! the index currently holds.

use crate::ports::tool_index::ToolIndexRepository;
use crate::ports::tool_store::{StoreError, ToolStore};
use std::sync::Arc;
use tracing::debug;
use warden_domain::{DefinitionAudit, ToolDefinition, audit_definition};

#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub definition: ToolDefinition,
    pub audit: DefinitionAudit,
}

#[derive(Debug, Default)]
pub struct AuditReport {
    pub entries: Vec<AuditEntry>,
    pub load_errors: Vec<StoreError>,
}

impl AuditReport {
    pub fn count(&self, audit: DefinitionAudit) -> usize {
        self.entries.iter().filter(|e| e.audit == audit).count()
    }

    pub fn has_problems(&self) -> bool {
        !self.load_errors.is_empty() || self.entries.iter().any(|e| e.audit.is_problem())
    }
}

pub struct AuditDefinitionsUseCase<S: ToolStore, I: ToolIndexRepository> {
    store: Arc<S>,
    index: Arc<I>,
}

impl<S: ToolStore, I: ToolIndexRepository> AuditDefinitionsUseCase<S, I> {
    pub fn new(store: Arc<S>, index: Arc<I>) -> Self {
        Self { store, index }
    }

    /// Fails only if the index itself cannot be read.
    pub fn execute(&self) -> Result<AuditReport, StoreError> {
        let index = self.index.load()?;
        let loaded = self.store.load_definitions();

        let entries = loaded
            .definitions
            .into_iter()
            .map(|definition| {
                let audit = audit_definition(&definition, &index);
                debug!("{}: {}", definition.tool_id(), audit);
                AuditEntry { definition, audit }
            })
            .collect();

        Ok(AuditReport {
            entries,
            load_errors: loaded.errors,
        })
    }
}
