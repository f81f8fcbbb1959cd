//! Target file expansion for dispatched actions

use glob::{MatchOptions, glob_with};
use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum TargetError {
    #[error("Invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

fn is_pattern(arg: &str) -> bool {
    arg.contains(['*', '?', '['])
}

/// Expand glob patterns into matching files. Plain arguments are kept as
/// given even if they do not exist, so the tool can report them. Order is
/// preserved and duplicates are dropped.
pub fn expand_targets(args: &[String]) -> Result<Vec<PathBuf>, TargetError> {
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };

    let mut seen = BTreeSet::new();
    let mut targets = Vec::new();

    for arg in args {
        if !is_pattern(arg) {
            let path = PathBuf::from(arg);
            if seen.insert(path.clone()) {
                targets.push(path);
            }
            continue;
        }

        let matches = glob_with(arg, options).map_err(|source| TargetError::Pattern {
            pattern: arg.clone(),
            source,
        })?;

        let mut matched = 0usize;
        for entry in matches {
            match entry {
                Ok(path) if path.is_file() => {
                    matched += 1;
                    if seen.insert(path.clone()) {
                        targets.push(path);
                    }
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable path: {}", e),
            }
        }
        if matched == 0 {
            warn!("Pattern '{}' matched no files", arg);
        }
    }

    Ok(targets)
}
