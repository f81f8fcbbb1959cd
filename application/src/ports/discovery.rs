//! Tool discovery port

use std::collections::BTreeSet;

/// Lists executable tool names available in the environment.
pub trait ToolDiscovery: Send + Sync {
    fn discover(&self) -> BTreeSet<String>;

    /// Whether a single tool can be resolved.
    fn is_available(&self, name: &str) -> bool {
        self.discover().contains(name)
    }
}
