//! Capability dispatcher: pick the most specific definition per file.

use crate::tool::ToolDefinition;
use std::path::{Path, PathBuf};

/// How a definition matched a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Extension listed explicitly
    Exact,
    /// Matched through `"*"`
    Wildcard,
}

/// Decide whether `definition` can handle `path` for `capability`.
pub fn match_definition(
    definition: &ToolDefinition,
    capability: &str,
    path: &Path,
) -> Option<MatchKind> {
    if !definition.provides(capability) {
        return None;
    }

    let extension = path.extension().and_then(|e| e.to_str());
    match extension {
        Some(ext) if definition.supports_extension(ext) => Some(MatchKind::Exact),
        _ if definition.supports_any_filetype() => Some(MatchKind::Wildcard),
        _ => None,
    }
}

/// Select a definition for one file: the first exact-extension match in
/// declaration order, otherwise the first wildcard match.
pub fn select_for_file<'a>(
    capability: &str,
    path: &Path,
    definitions: &'a [ToolDefinition],
) -> Option<&'a ToolDefinition> {
    let mut wildcard: Option<&ToolDefinition> = None;

    for definition in definitions {
        match match_definition(definition, capability, path) {
            Some(MatchKind::Exact) => return Some(definition),
            Some(MatchKind::Wildcard) if wildcard.is_none() => wildcard = Some(definition),
            _ => {}
        }
    }

    wildcard
}

/// One file and the tool chosen for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSelection {
    pub path: PathBuf,
    pub tool_id: Option<String>,
}

/// Map every file to a tool id (or `None`), preserving input order.
pub fn select(
    capability: &str,
    files: &[PathBuf],
    definitions: &[ToolDefinition],
) -> Vec<FileSelection> {
    files
        .iter()
        .map(|path| FileSelection {
            path: path.clone(),
            tool_id: select_for_file(capability, path, definitions).map(ToolDefinition::tool_id),
        })
        .collect()
}

/// Files grouped by the tool that will process them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchPlan {
    /// `(tool_id, files)` in first-seen order
    pub groups: Vec<(String, Vec<PathBuf>)>,
    /// Files no definition can handle
    pub unmatched: Vec<PathBuf>,
}

impl DispatchPlan {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

pub fn group_by_tool(selections: Vec<FileSelection>) -> DispatchPlan {
    let mut plan = DispatchPlan::default();

    for selection in selections {
        match selection.tool_id {
            Some(tool_id) => match plan.groups.iter_mut().find(|(id, _)| *id == tool_id) {
                Some((_, files)) => files.push(selection.path),
                None => plan.groups.push((tool_id, vec![selection.path])),
            },
            None => plan.unmatched.push(selection.path),
        }
    }

    plan
}
