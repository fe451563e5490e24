// src/watch/detector.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use anyhow::Context;
use tracing::{debug, info};

use crate::config::WatchConfig;
use crate::errors::{Result, WindError};
use crate::fs::FileSystem;
use crate::watch::filter::WatchFilter;
use crate::watch::index::{FileIndex, Observation};
use crate::watch::path_utils::relative_str;

/// Result of one completed scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Eligible files visited by the walk.
    pub visited: usize,
    /// Files seen for the first time (not changes).
    pub new_files: Vec<String>,
    /// Tracked files whose modification time advanced.
    pub changed: Vec<String>,
}

impl ScanReport {
    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }
}

/// Polling change detector.
///
/// Walks the project tree, applies the [`WatchFilter`], and compares every
/// eligible file's modification time against the [`FileIndex`]. The index is
/// only updated once a walk has completed; a walk that fails halfway leaves
/// it untouched.
#[derive(Debug)]
pub struct ChangeDetector {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    filter: WatchFilter,
    index: FileIndex,
}

impl ChangeDetector {
    pub fn new(fs: Arc<dyn FileSystem>, root: impl Into<PathBuf>, filter: WatchFilter) -> Self {
        Self {
            fs,
            root: root.into(),
            filter,
            index: FileIndex::new(),
        }
    }

    pub fn from_config(fs: Arc<dyn FileSystem>, cfg: &WatchConfig) -> Self {
        Self::new(fs, cfg.root.clone(), WatchFilter::from_config(cfg))
    }

    pub fn index(&self) -> &FileIndex {
        &self.index
    }

    pub fn filter(&self) -> &WatchFilter {
        &self.filter
    }

    /// Populate the index without reporting changes.
    ///
    /// Returns the number of tracked files afterwards.
    pub fn scan_files(&mut self) -> Result<usize> {
        self.scan()?;
        Ok(self.index.len())
    }

    /// Re-scan and return whether any tracked file was modified.
    ///
    /// Newly created files are recorded but do not count as a change.
    pub fn check_for_changes(&mut self) -> Result<bool> {
        let report = self.scan()?;
        for path in report.changed.iter() {
            info!(path = %path, "file changed");
        }
        Ok(report.has_changes())
    }

    /// Walk the tree once and fold the results into the index.
    pub fn scan(&mut self) -> Result<ScanReport> {
        let observed = self
            .collect_eligible()
            .map_err(|err| WindError::ScanError(format!("{err:#}")))?;

        let mut report = ScanReport {
            visited: observed.len(),
            ..ScanReport::default()
        };

        for (path, modified) in observed {
            match self.index.observe(&path, modified) {
                Observation::FirstSight => {
                    debug!(path = %path, "tracking new file");
                    report.new_files.push(path);
                }
                Observation::Advanced => report.changed.push(path),
                Observation::Unchanged => {}
            }
        }

        Ok(report)
    }

    /// Collect `(relative path, modification time)` for every eligible file.
    ///
    /// Excluded directories are pruned before they are read, and symlinks
    /// are never followed into.
    fn collect_eligible(&self) -> anyhow::Result<Vec<(String, SystemTime)>> {
        let fs = self.fs.as_ref();
        let mut files = Vec::new();
        let mut stack = vec![self.root.clone()];

        while let Some(dir) = stack.pop() {
            let mut entries = fs.read_dir(&dir)?;
            entries.sort();

            let mut subdirs = Vec::new();

            for path in entries {
                let Some(rel) = relative_str(&self.root, &path) else {
                    continue;
                };
                if self.filter.is_excluded(&rel) {
                    continue;
                }
                if fs.is_dir(&path) && !fs.is_symlink(&path) {
                    subdirs.push(path);
                } else if self.filter.has_watched_extension(&rel) {
                    let modified = fs
                        .modified(&path)
                        .with_context(|| format!("stat {rel}"))?;
                    files.push((rel, modified));
                }
            }

            // Reversed so subdirectories are popped in lexical order.
            stack.extend(subdirs.into_iter().rev());
        }

        Ok(files)
    }
}
