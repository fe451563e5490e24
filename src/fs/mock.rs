use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(SystemTime),
    Dir(Vec<String>), // List of child names
}

#[derive(Debug)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    /// Synthetic clock used for modification times. Every write advances it
    /// by one second so successive touches are always strictly newer.
    clock: SystemTime,
    failing_dirs: HashSet<PathBuf>,
}

/// In-memory filesystem with controllable modification times.
///
/// Paths are normalised (`./src/main.go` and `src/main.go` are the same
/// entry) and the root `.` always exists.
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        // Ensure root exists
        entries.insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            state: Arc::new(Mutex::new(MockState {
                entries,
                clock: SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000),
                failing_dirs: HashSet::new(),
            })),
        }
    }

    /// Create (or overwrite) a file, stamping it with a fresh modification time.
    pub fn add_file(&self, path: impl AsRef<Path>) {
        let path = normalize(path.as_ref());
        let mut state = self.lock();
        let now = advance_clock(&mut state);
        state.entries.insert(path.clone(), MockEntry::File(now));
        link_into_parent(&mut state.entries, &path);
    }

    /// Create an empty directory (and its parents).
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = normalize(path.as_ref());
        let mut state = self.lock();
        ensure_dir_entry(&mut state.entries, &path);
    }

    /// Advance the modification time of an existing file.
    ///
    /// Returns the new timestamp, or `None` if the file does not exist.
    pub fn touch(&self, path: impl AsRef<Path>) -> Option<SystemTime> {
        let path = normalize(path.as_ref());
        let mut state = self.lock();
        if !matches!(state.entries.get(&path), Some(MockEntry::File(_))) {
            return None;
        }
        let now = advance_clock(&mut state);
        state.entries.insert(path, MockEntry::File(now));
        Some(now)
    }

    /// Set an explicit modification time (may move it backwards).
    pub fn set_modified(&self, path: impl AsRef<Path>, time: SystemTime) {
        let path = normalize(path.as_ref());
        let mut state = self.lock();
        if let Some(MockEntry::File(modified)) = state.entries.get_mut(&path) {
            *modified = time;
        }
    }

    /// Remove a file or an entire directory subtree.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = normalize(path.as_ref());
        let mut state = self.lock();
        state.entries.retain(|p, _| !p.starts_with(&path));
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            return;
        };
        let parent = parent_of(&path);
        if let Some(MockEntry::Dir(children)) = state.entries.get_mut(&parent) {
            children.retain(|c| c != &name);
        }
    }

    /// Make every subsequent `read_dir` of `path` fail.
    pub fn fail_read_dir(&self, path: impl AsRef<Path>) {
        let path = normalize(path.as_ref());
        self.lock().failing_dirs.insert(path);
    }

    /// Undo [`fail_read_dir`](Self::fail_read_dir).
    pub fn heal_read_dir(&self, path: impl AsRef<Path>) {
        let path = normalize(path.as_ref());
        self.lock().failing_dirs.remove(&path);
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A poisoned mock only happens after a test already panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.lock().entries.contains_key(&normalize(path))
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(&normalize(path)), Some(MockEntry::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(&normalize(path)), Some(MockEntry::Dir(_)))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let key = normalize(path);
        let state = self.lock();
        if state.failing_dirs.contains(&key) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        match state.entries.get(&key) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        match self.lock().entries.get(&normalize(path)) {
            Some(MockEntry::File(time)) => Ok(*time),
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let key = normalize(path);
        let mut state = self.lock();
        if let Some(MockEntry::File(_)) = state.entries.get(&key) {
            return Err(anyhow!("File exists: {:?}", path));
        }
        ensure_dir_entry(&mut state.entries, &key);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        if !self.is_file(path) {
            return Err(anyhow!("File not found: {:?}", path));
        }
        self.remove(path);
        Ok(())
    }
}

fn advance_clock(state: &mut MockState) -> SystemTime {
    state.clock += Duration::from_secs(1);
    state.clock
}

fn normalize(path: &Path) -> PathBuf {
    let normalized: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

fn parent_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn link_into_parent(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    let parent = parent_of(path);
    if parent == path {
        return; // Avoid infinite loop at root
    }
    ensure_dir_entry(entries, &parent);
    if let (Some(MockEntry::Dir(children)), Some(name)) = (
        entries.get_mut(&parent),
        path.file_name().and_then(|n| n.to_str()),
    ) {
        if !children.iter().any(|c| c == name) {
            children.push(name.to_string());
        }
    }
}

fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if entries.contains_key(path) {
        return;
    }
    entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
    link_into_parent(entries, path);
}
