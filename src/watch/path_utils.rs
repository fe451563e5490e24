// src/watch/path_utils.rs

//! Utility functions for path handling in the scanner.

use std::path::{Component, Path};

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// `./` components are dropped on both sides, so `./src/main.go` under root
/// `.` becomes `src/main.go`. Returns `None` if `path` is not under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

/// Extension of the final path component, including the leading dot.
///
/// Everything from the last `.` of the file name counts, so `.gitignore`
/// yields `.gitignore` and `Makefile` yields `None`.
pub fn extension_of(rel_path: &str) -> Option<&str> {
    let name = rel_path.rsplit('/').next().unwrap_or(rel_path);
    name.rfind('.').map(|idx| &name[idx..])
}
