//! Level resolution: logical level names to existing absolute directories.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolves configured levels against the workspace root.
///
/// Keeps only paths that exist on disk, in input order. A level listed twice
/// resolves once. Probe failures (permissions, races) count as missing.
pub fn resolve_levels<S: AsRef<str>>(root: &Path, levels: &[S]) -> Vec<PathBuf> {
    let mut seen = HashSet::with_capacity(levels.len());
    let mut resolved = Vec::with_capacity(levels.len());

    for level in levels {
        let path = root.join(level.as_ref());
        if !seen.insert(path.clone()) {
            continue;
        }
        if path_exists(&path) {
            resolved.push(path);
        } else {
            log::debug!("bem level skipped level={} reason=missing", path.display());
        }
    }

    resolved
}

/// Best-effort existence probe; never fails.
pub fn path_exists(path: &Path) -> bool {
    fs::metadata(path).is_ok()
}
