#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::TempDir;
use wind::config::WatchConfig;

/// A throwaway project directory on the real filesystem.
///
/// Removed when dropped.
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp project dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Write a file (creating parent dirs) and return its absolute path.
    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, contents).expect("write fixture file");
        path
    }

    /// Pin a file's modification time, so tests never depend on the
    /// timestamp granularity of the host filesystem.
    pub fn set_mtime(&self, rel: &str, time: SystemTime) {
        let file = fs::File::options()
            .write(true)
            .open(self.path(rel))
            .expect("open fixture file");
        file.set_modified(time).expect("set mtime");
    }

    /// Move a file's modification time `secs` seconds into the future.
    pub fn bump_mtime(&self, rel: &str, secs: u64) {
        let current = fs::metadata(self.path(rel))
            .and_then(|m| m.modified())
            .expect("read mtime");
        self.set_mtime(rel, current + Duration::from_secs(secs));
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `WatchConfig` with short timings suitable for tests.
pub struct WatchConfigBuilder {
    config: WatchConfig,
}

impl WatchConfigBuilder {
    pub fn new(root: impl Into<PathBuf>, build_cmd: &str) -> Self {
        Self {
            config: WatchConfig::new(root, build_cmd)
                .with_poll_interval(Duration::from_millis(100))
                .with_debounce_delay(Duration::from_millis(300))
                .with_stop_timeout(Duration::from_secs(2)),
        }
    }

    pub fn run_cmd(mut self, cmd: &str) -> Self {
        self.config = self.config.with_run_cmd(cmd);
        self
    }

    pub fn poll_ms(mut self, ms: u64) -> Self {
        self.config = self.config.with_poll_interval(Duration::from_millis(ms));
        self
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.config = self.config.with_debounce_delay(Duration::from_millis(ms));
        self
    }

    pub fn stop_timeout_ms(mut self, ms: u64) -> Self {
        self.config = self.config.with_stop_timeout(Duration::from_millis(ms));
        self
    }

    pub fn build(self) -> WatchConfig {
        self.config
    }
}
