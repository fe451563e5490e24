// src/watch/filter.rs

use std::fmt;

use crate::config::WatchConfig;
use crate::watch::path_utils::extension_of;

/// Eligibility rule for watched files.
///
/// A relative path (e.g. `"cmd/api/main.go"`) is eligible when:
/// - it does not contain any excluded-directory fragment as a substring, and
/// - its extension is one of the included extensions.
///
/// The exclusion test is applied to directories too; an excluded directory
/// is never descended.
#[derive(Clone, Default)]
pub struct WatchFilter {
    exclude_dirs: Vec<String>,
    include_exts: Vec<String>,
}

impl fmt::Debug for WatchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchFilter")
            .field("exclude_dirs", &self.exclude_dirs)
            .field("include_exts", &self.include_exts)
            .finish()
    }
}

impl WatchFilter {
    pub fn new(exclude_dirs: Vec<String>, include_exts: Vec<String>) -> Self {
        Self {
            exclude_dirs,
            include_exts,
        }
    }

    pub fn from_config(cfg: &WatchConfig) -> Self {
        Self::new(cfg.exclude_dirs.clone(), cfg.include_exts.clone())
    }

    /// True if the path falls under an excluded fragment.
    pub fn is_excluded(&self, rel_path: &str) -> bool {
        self.exclude_dirs
            .iter()
            .any(|fragment| rel_path.contains(fragment.as_str()))
    }

    /// True if the path's extension is watched.
    pub fn has_watched_extension(&self, rel_path: &str) -> bool {
        match extension_of(rel_path) {
            Some(ext) => self.include_exts.iter().any(|e| e == ext),
            None => false,
        }
    }

    /// Full eligibility test for a file path.
    pub fn matches(&self, rel_path: &str) -> bool {
        !self.is_excluded(rel_path) && self.has_watched_extension(rel_path)
    }
}
