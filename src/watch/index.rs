// src/watch/index.rs

use std::collections::HashMap;
use std::time::SystemTime;

/// What happened to a path when it was recorded in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Never seen before; recorded but not a change.
    FirstSight,
    /// Modification time moved strictly forward.
    Advanced,
    /// Same or older modification time.
    Unchanged,
}

/// Last-seen modification time of every watched file.
///
/// Keys are `/`-separated paths relative to the project root. Entries are
/// never removed: a deleted file keeps its last timestamp until the watcher
/// exits.
#[derive(Debug, Default, Clone)]
pub struct FileIndex {
    modified: HashMap<String, SystemTime>,
}

impl FileIndex {
    pub fn new() -> Self {
        Self {
            modified: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.modified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modified.is_empty()
    }

    pub fn contains(&self, rel_path: &str) -> bool {
        self.modified.contains_key(rel_path)
    }

    pub fn get(&self, rel_path: &str) -> Option<SystemTime> {
        self.modified.get(rel_path).copied()
    }

    /// Tracked paths in sorted order.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.modified.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Classify a freshly observed timestamp without recording it.
    pub fn classify(&self, rel_path: &str, modified: SystemTime) -> Observation {
        match self.modified.get(rel_path) {
            None => Observation::FirstSight,
            Some(last) if modified > *last => Observation::Advanced,
            Some(_) => Observation::Unchanged,
        }
    }

    /// Record `modified` for `rel_path` and report how it compared.
    ///
    /// Older timestamps never overwrite newer ones.
    pub fn observe(&mut self, rel_path: &str, modified: SystemTime) -> Observation {
        let observation = self.classify(rel_path, modified);
        if observation != Observation::Unchanged {
            self.modified.insert(rel_path.to_string(), modified);
        }
        observation
    }
}
