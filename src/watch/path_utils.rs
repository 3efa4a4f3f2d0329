// src/watch/path_utils.rs

//! Path normalisation for watch events.

use std::path::Path;

/// Convert `path` into a string relative to `root`, with forward slashes.
///
/// Tries a plain `strip_prefix` first; if the watcher reported a different
/// absolute prefix for the same directory (symlinks, `/private/var` on
/// macOS), both sides are canonicalized and compared again. A path that was
/// just deleted can't be canonicalized, so its parent is tried instead.
///
/// Returns `None` if the path is not under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(normalize(rel));
    }

    let root_canon = root.canonicalize().ok()?;
    if let Ok(path_canon) = path.canonicalize() {
        return path_canon.strip_prefix(&root_canon).ok().map(normalize);
    }

    let parent = path.parent()?.canonicalize().ok()?;
    let rel_parent = parent.strip_prefix(&root_canon).ok()?;
    Some(normalize(&rel_parent.join(path.file_name()?)))
}

fn normalize(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}
