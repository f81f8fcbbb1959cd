//! Hierarchical whitelist / blacklist trees.
//!
//! A [`ToolTree`] is a trie keyed by command path segment. A wildcard node
//! covers its whole sub-tree, so lookups short-circuit as soon as one is
//! reached.
//!
//! TOML shape (the same for both lists):
//!
//! ```toml
//! [whitelist]
//! ruff = true                  # ruff and any sub-command
//! git = ["commit", "log"]      # git, git commit, git log
//! cargo = { fmt = true, "*" = false }
//! legacy = false               # ignored
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Wildcard key / list entry.
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TreeNode {
    wildcard: bool,
    children: BTreeMap<String, TreeNode>,
}

impl TreeNode {
    /// Terminal nodes cover everything beneath them.
    fn is_terminal(&self) -> bool {
        self.wildcard || self.children.is_empty()
    }
}

/// Trie of command paths with wildcard sub-trees
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, RawNode>", into = "BTreeMap<String, RawNode>")]
pub struct ToolTree {
    root: TreeNode,
}

impl ToolTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exact path (each segment becomes a node).
    pub fn insert(&mut self, path: &[&str]) {
        self.node_mut(path);
    }

    /// Add a path whose whole sub-tree is covered.
    pub fn insert_wildcard(&mut self, path: &[&str]) {
        self.node_mut(path).wildcard = true;
    }

    pub fn with_path(mut self, path: &[&str]) -> Self {
        self.insert(path);
        self
    }

    pub fn with_wildcard(mut self, path: &[&str]) -> Self {
        self.insert_wildcard(path);
        self
    }

    fn node_mut(&mut self, path: &[&str]) -> &mut TreeNode {
        let mut node = &mut self.root;
        for segment in path {
            if *segment == WILDCARD {
                node.wildcard = true;
                break;
            }
            node = node.children.entry(segment.to_string()).or_default();
        }
        node
    }

    /// Whether the path is listed: every segment exists, or a wildcard node
    /// is reached on the way.
    pub fn contains(&self, path: &[&str]) -> bool {
        let mut node = &self.root;
        for segment in path {
            if node.wildcard {
                return true;
            }
            match node.children.get(*segment) {
                Some(child) => node = child,
                None => return false,
            }
        }
        true
    }

    /// Whether the path or one of its ancestors is a terminal node.
    ///
    /// Unlike [`contains`](Self::contains), a node that only exists to hold
    /// children does not cover itself: with `git = ["push"]`, `git push` is
    /// covered but `git` is not.
    pub fn covers(&self, path: &[&str]) -> bool {
        if self.root.wildcard {
            return true;
        }
        let mut node = &self.root;
        for segment in path {
            match node.children.get(*segment) {
                Some(child) if child.is_terminal() => return true,
                Some(child) => node = child,
                None => return false,
            }
        }
        false
    }

    /// Top-level tool names (wildcards excluded).
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.root.children.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty() && !self.root.wildcard
    }

    /// Every explicitly listed path, depth-first in sorted order. Wildcard
    /// sub-trees contribute only their own node.
    pub fn command_paths(&self) -> Vec<Vec<String>> {
        fn walk(node: &TreeNode, prefix: &mut Vec<String>, out: &mut Vec<Vec<String>>) {
            for (name, child) in &node.children {
                prefix.push(name.clone());
                out.push(prefix.clone());
                walk(child, prefix, out);
                prefix.pop();
            }
        }

        let mut out = Vec::new();
        walk(&self.root, &mut Vec::new(), &mut out);
        out
    }

    /// Paths listed in both trees (as exact nodes).
    pub fn overlap(&self, other: &ToolTree) -> Vec<Vec<String>> {
        self.command_paths()
            .into_iter()
            .filter(|path| {
                let refs: Vec<&str> = path.iter().map(String::as_str).collect();
                other.covers(&refs)
            })
            .collect()
    }
}

/// Serialized form of a tree node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNode {
    Flag(bool),
    Name(String),
    List(Vec<String>),
    Table(BTreeMap<String, RawNode>),
}

impl RawNode {
    /// `None` for nodes that are switched off (`false`).
    fn into_node(self) -> Option<TreeNode> {
        match self {
            RawNode::Flag(false) => None,
            RawNode::Flag(true) => Some(TreeNode {
                wildcard: true,
                children: BTreeMap::new(),
            }),
            RawNode::Name(name) => Some(node_from_names(vec![name])),
            RawNode::List(names) => Some(node_from_names(names)),
            RawNode::Table(table) => Some(node_from_table(table)),
        }
    }

    fn from_node(node: &TreeNode) -> RawNode {
        if node.children.is_empty() {
            return if node.wildcard {
                RawNode::Flag(true)
            } else {
                RawNode::Table(BTreeMap::new())
            };
        }

        let all_exact_leaves = node
            .children
            .values()
            .all(|c| c.children.is_empty() && !c.wildcard);
        if all_exact_leaves && !node.wildcard {
            return RawNode::List(node.children.keys().cloned().collect());
        }

        let mut table: BTreeMap<String, RawNode> = node
            .children
            .iter()
            .map(|(k, v)| (k.clone(), RawNode::from_node(v)))
            .collect();
        if node.wildcard {
            table.insert(WILDCARD.to_string(), RawNode::Flag(true));
        }
        RawNode::Table(table)
    }
}

fn node_from_names(names: Vec<String>) -> TreeNode {
    let mut node = TreeNode::default();
    for name in names {
        if name == WILDCARD {
            node.wildcard = true;
        } else {
            node.children.entry(name).or_default();
        }
    }
    node
}

fn node_from_table(table: BTreeMap<String, RawNode>) -> TreeNode {
    let mut node = TreeNode::default();
    for (key, raw) in table {
        if key == WILDCARD {
            if !matches!(raw, RawNode::Flag(false)) {
                node.wildcard = true;
            }
            continue;
        }
        if let Some(child) = raw.into_node() {
            node.children.insert(key, child);
        }
    }
    node
}

impl From<BTreeMap<String, RawNode>> for ToolTree {
    fn from(table: BTreeMap<String, RawNode>) -> Self {
        Self {
            root: node_from_table(table),
        }
    }
}

impl From<ToolTree> for BTreeMap<String, RawNode> {
    fn from(tree: ToolTree) -> Self {
        match RawNode::from_node(&tree.root) {
            RawNode::Table(table) => table,
            RawNode::List(names) => names
                .into_iter()
                .map(|n| (n, RawNode::Table(BTreeMap::new())))
                .collect(),
            RawNode::Flag(true) => BTreeMap::from([(WILDCARD.to_string(), RawNode::Flag(true))]),
            RawNode::Flag(false) | RawNode::Name(_) => BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(json: &str) -> ToolTree {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_contains_walks_path() {
        let t = tree(r#"{"git": ["commit", "log"], "ruff": true}"#);
        assert!(t.contains(&["git"]));
        assert!(t.contains(&["git", "commit"]));
        assert!(!t.contains(&["git", "push"]));
        assert!(t.contains(&["ruff", "check"]));
        assert!(!t.contains(&["black"]));
    }

    #[test]
    fn test_covers_requires_terminal_node() {
        let t = tree(r#"{"git": ["push"], "rm": true, "curl": {}}"#);
        assert!(!t.covers(&["git"]));
        assert!(t.covers(&["git", "push"]));
        assert!(t.covers(&["git", "push", "--force"]));
        assert!(t.covers(&["rm"]));
        assert!(t.covers(&["rm", "anything"]));
        assert!(t.covers(&["curl"]));
        assert!(!t.covers(&["wget"]));
    }

    #[test]
    fn test_root_wildcard_covers_everything() {
        let t = tree(r#"{"*": true}"#);
        assert!(t.covers(&["anything"]));
        assert!(t.contains(&["anything", "at", "all"]));
        assert_eq!(t.names().count(), 0);
        assert!(!t.is_empty());
    }

    #[test]
    fn test_nested_wildcard_short_circuits() {
        let t = tree(r#"{"cargo": {"*": true, "fmt": true}}"#);
        assert!(t.contains(&["cargo", "clippy"]));
        assert!(t.covers(&["cargo", "clippy"]));
    }

    #[test]
    fn test_false_entries_are_dropped() {
        let t = tree(r#"{"legacy": false, "ruff": true}"#);
        assert_eq!(t.names().collect::<Vec<_>>(), vec!["ruff"]);
    }

    #[test]
    fn test_command_paths_depth_first() {
        let t = tree(r#"{"git": ["log", "commit"], "black": true}"#);
        assert_eq!(
            t.command_paths(),
            vec![
                vec!["black".to_string()],
                vec!["git".to_string()],
                vec!["git".to_string(), "commit".to_string()],
                vec!["git".to_string(), "log".to_string()],
            ]
        );
    }

    #[test]
    fn test_builder_matches_deserialized() {
        let built = ToolTree::new()
            .with_path(&["git", "commit"])
            .with_path(&["git", "log"])
            .with_wildcard(&["ruff"]);
        assert_eq!(built, tree(r#"{"git": ["commit", "log"], "ruff": true}"#));
    }

    #[test]
    fn test_serialize_round_trip() {
        let t = tree(r#"{"git": ["commit"], "ruff": true, "cargo": {"fmt": true, "*": true}}"#);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(tree(&json), t);
    }

    #[test]
    fn test_overlap_reports_shared_paths() {
        let white = tree(r#"{"git": ["push", "log"]}"#);
        let black = tree(r#"{"git": ["push"]}"#);
        assert_eq!(
            white.overlap(&black),
            vec![vec!["git".to_string(), "push".to_string()]]
        );
    }
}
