//! Executable discovery
//!
//! Scans search directories for executable files. With no configured
//! directories the process `$PATH` is used, and single-name lookups go
//! through `which` so they resolve exactly the way a shell would.

use std::collections::BTreeSet;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use warden_application::ToolDiscovery;

#[derive(Debug, Clone, Default)]
pub struct PathToolDiscovery {
    /// Empty = `$PATH`
    search_paths: Vec<PathBuf>,
}

impl PathToolDiscovery {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    /// Discovery over the process `$PATH`.
    pub fn from_env() -> Self {
        Self::default()
    }

    fn directories(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        env::var_os("PATH")
            .map(|path| env::split_paths(&path).collect())
            .unwrap_or_default()
    }

    fn joined_paths(&self) -> Option<OsString> {
        env::join_paths(&self.search_paths).ok()
    }
}

impl ToolDiscovery for PathToolDiscovery {
    fn discover(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();

        for dir in self.directories() {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    trace!("Skipping {}: {}", dir.display(), e);
                    continue;
                }
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if !is_executable(&path) {
                    continue;
                }
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.insert(name.to_string());
                }
            }
        }

        debug!("Discovered {} executables", names.len());
        names
    }

    fn is_available(&self, name: &str) -> bool {
        if self.search_paths.is_empty() {
            return which::which(name).is_ok();
        }
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        which::which_in(name, self.joined_paths(), cwd).is_ok()
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("exe"))
}
