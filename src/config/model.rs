// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use crate::config::layout::ProjectLayout;

/// Command used to launch the freshly built binary.
pub const DEFAULT_RUN_CMD: &str = "./tmp/main";

/// Directory (relative to the project root) that receives build artifacts.
pub const DEFAULT_OUTPUT_DIR: &str = "tmp";

/// Build artifact removed on shutdown (relative to the project root).
pub const DEFAULT_ARTIFACT: &str = "tmp/main";

/// Path fragments that exclude a file or a whole directory subtree.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] =
    &["vendor", ".git", "node_modules", "tmp", ".idea", ".vscode"];

/// File extensions (with the leading dot) that are watched.
pub const DEFAULT_INCLUDE_EXTS: &[&str] =
    &[".go", ".html", ".css", ".js", ".json", ".yaml", ".yml"];

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Grace period between SIGTERM and SIGKILL when stopping the application.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Immutable configuration snapshot for one watcher run.
///
/// Built once at startup (layout detection + defaults + CLI overrides) and
/// shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    /// Project root. Scans, builds and the application all run here.
    pub root: PathBuf,
    /// Shell command that builds the project.
    pub build_cmd: String,
    /// Shell command that starts the built application.
    pub run_cmd: String,
    /// Substrings of relative paths that are never watched.
    pub exclude_dirs: Vec<String>,
    /// Watched extensions, e.g. `".go"`.
    pub include_exts: Vec<String>,
    pub poll_interval: Duration,
    pub debounce_delay: Duration,
    pub stop_timeout: Duration,
    /// Created before the first build, relative to `root`.
    pub output_dir: PathBuf,
    /// Removed during shutdown, relative to `root`.
    pub artifact: PathBuf,
}

impl WatchConfig {
    /// Config with the default run command, filters and timings.
    pub fn new(root: impl Into<PathBuf>, build_cmd: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            build_cmd: build_cmd.into(),
            run_cmd: DEFAULT_RUN_CMD.to_string(),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
            include_exts: DEFAULT_INCLUDE_EXTS.iter().map(|s| s.to_string()).collect(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            debounce_delay: DEFAULT_DEBOUNCE_DELAY,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            artifact: PathBuf::from(DEFAULT_ARTIFACT),
        }
    }

    /// Config whose build command comes from a detected project layout.
    pub fn from_layout(root: impl Into<PathBuf>, layout: &ProjectLayout) -> Self {
        Self::new(root, layout.build_cmd.clone())
    }

    pub fn with_run_cmd(mut self, run_cmd: impl Into<String>) -> Self {
        self.run_cmd = run_cmd.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }

    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    pub fn with_exclude_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_include_exts<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_exts = exts.into_iter().map(Into::into).collect();
        self
    }

    pub fn output_dir_path(&self) -> PathBuf {
        self.root.join(&self.output_dir)
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.root.join(&self.artifact)
    }
}
