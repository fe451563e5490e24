// src/config/layout.rs

//! Project layout detection.
//!
//! Picks the `go build` target by probing a handful of conventional Go
//! project layouts, in order:
//!
//! 1. `cmd/api/main.go`
//! 2. `cmd/main.go`
//! 3. `main.go`
//! 4. the first `cmd/<name>/main.go` (directories in sorted order)
//! 5. fallback: the root directory

use std::path::Path;

use tracing::debug;

use crate::fs::FileSystem;

/// Build command and a human-readable description of the detected layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub build_cmd: String,
    pub label: String,
}

impl ProjectLayout {
    fn new(target: &str, label: impl Into<String>) -> Self {
        Self {
            build_cmd: format!("go build -o ./tmp/main {target}"),
            label: label.into(),
        }
    }
}

/// Inspect `root` and choose a build command.
pub fn detect_project_layout(fs: &dyn FileSystem, root: &Path) -> ProjectLayout {
    if fs.is_file(&root.join("cmd/api/main.go")) {
        return ProjectLayout::new("./cmd/api", "Standard layout (cmd/api/)");
    }

    if fs.is_file(&root.join("cmd/main.go")) {
        return ProjectLayout::new("./cmd", "Standard layout (cmd/)");
    }

    if fs.is_file(&root.join("main.go")) {
        return ProjectLayout::new(".", "Simple layout (root main.go)");
    }

    if let Some(name) = first_cmd_subdir_with_main(fs, root) {
        return ProjectLayout::new(
            &format!("./cmd/{name}"),
            format!("Standard layout (cmd/{name}/)"),
        );
    }

    ProjectLayout::new(".", "Fallback (current directory)")
}

fn first_cmd_subdir_with_main(fs: &dyn FileSystem, root: &Path) -> Option<String> {
    let cmd_dir = root.join("cmd");
    let mut entries = match fs.read_dir(&cmd_dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(error = %err, "no cmd/ directory to inspect");
            return None;
        }
    };
    entries.sort();

    entries
        .iter()
        .filter(|path| fs.is_dir(path) && fs.is_file(&path.join("main.go")))
        .find_map(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
}
