//! Read-only access to book resources by path.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use std::path::PathBuf;

/// Resolves resource paths (relative to the book root) to bytes.
pub trait ResourceStore {
    /// Full contents of `path`, or `None` when it does not exist.
    fn read(&self, path: &str) -> Option<Vec<u8>>;

    /// Whether `path` exists.
    fn exists(&self, path: &str) -> bool {
        self.read(path).is_some()
    }
}

/// In-memory store, keyed by exact path.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a resource.
    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(path.into(), bytes.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_entry(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }
}

impl ResourceStore for MemoryStore {
    fn read(&self, path: &str) -> Option<Vec<u8>> {
        self.entries.get(path).cloned()
    }

    fn exists(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }
}

/// Store backed by an unpacked book directory.
#[derive(Clone, Debug)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Serve resources below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let mut full = self.root.clone();
        for segment in path.split('/') {
            match segment {
                "" | "." => {}
                ".." => return None,
                segment => full.push(segment),
            }
        }
        Some(full)
    }
}

impl ResourceStore for DirectoryStore {
    fn read(&self, path: &str) -> Option<Vec<u8>> {
        let full = self.resolve(path)?;
        match std::fs::read(&full) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                log::debug!("Resource '{}' not readable: {}", full.display(), err);
                None
            }
        }
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(|full| full.is_file())
    }
}
