//! Tool index repository port

use super::tool_store::StoreError;
use warden_domain::ToolIndex;

/// Loads and saves the tool index wholesale.
pub trait ToolIndexRepository: Send + Sync {
    /// A missing index file yields an empty index.
    fn load(&self) -> Result<ToolIndex, StoreError>;

    fn save(&self, index: &ToolIndex) -> Result<(), StoreError>;
}
