//! Filesystem persistence adapters
//!
//! - [`JsonToolIndexStore`]: the tool index, saved wholesale and atomically
//! - [`FsToolStore`]: per-tool definition and baseline files

mod index_store;
mod tool_store;

pub use index_store::JsonToolIndexStore;
pub use tool_store::{BASELINE_EXTENSION, DEFINITION_EXTENSION, FsToolStore};

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use warden_application::StoreError;

/// Write `contents` to a sibling temp file, then rename it over `path`.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let tmp = write_temp(path, contents)?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        StoreError::io(path, e)
    })
}

/// Write `contents` to a sibling temp file, then hard-link it to `path`.
///
/// Returns `false` without touching `path` when it already exists. A failed
/// write never leaves a partial file at `path`.
pub(crate) fn write_new(path: &Path, contents: &[u8]) -> Result<bool, StoreError> {
    if path.exists() {
        return Ok(false);
    }

    let tmp = write_temp(path, contents)?;
    let linked = fs::hard_link(&tmp, path);
    let _ = fs::remove_file(&tmp);

    match linked {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    PathBuf::from(tmp_name)
}

fn write_temp(path: &Path, contents: &[u8]) -> Result<PathBuf, StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let tmp = temp_path(path);
    let written = fs::File::create(&tmp).and_then(|mut file| {
        file.write_all(contents)?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(StoreError::io(&tmp, e));
    }
    Ok(tmp)
}
