//! Directory listing providers.
//!
//! A [`DirectoryLister`] answers one question: which names does this
//! directory contain right now? Listings are flat (no recursion) and do not
//! distinguish files from subdirectories.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Set of entry names in one directory.
pub type EntrySet = BTreeSet<String>;

/// Errors that can occur while listing a directory that exists.
#[derive(Error, Debug)]
pub enum ListingError {
    /// Opening the directory failed (permission denied, not a directory).
    #[error("Failed to read directory {path}: {source}")]
    ReadDir {
        /// Directory being listed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Reading one entry of an open directory failed.
    #[error("Failed to read entry in {path}: {source}")]
    ReadEntry {
        /// Directory being listed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The directory exists but was marked unreadable.
    #[error("Directory {0} is not readable")]
    Unreadable(PathBuf),
}

/// Source of directory listings.
pub trait DirectoryLister {
    /// List the entry names directly inside `path`.
    ///
    /// Returns `Ok(None)` when the path does not exist.
    fn list(&self, path: &Path) -> Result<Option<EntrySet>, ListingError>;
}

/// Lists directories on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLister;

impl FsLister {
    /// Create a filesystem lister.
    pub fn new() -> Self {
        Self
    }
}

impl DirectoryLister for FsLister {
    fn list(&self, path: &Path) -> Result<Option<EntrySet>, ListingError> {
        // Existence is checked on every call; a directory may come and go.
        if !path.exists() {
            return Ok(None);
        }

        let read_dir = fs::read_dir(path).map_err(|e| ListingError::ReadDir {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut names = EntrySet::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| ListingError::ReadEntry {
                path: path.to_path_buf(),
                source: e,
            })?;
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }

        Ok(Some(names))
    }
}

#[derive(Debug, Default)]
struct MemoryTree {
    dirs: HashMap<PathBuf, EntrySet>,
    unreadable: BTreeSet<PathBuf>,
}

/// In-memory lister for tests and embedding.
///
/// Clones share the same tree, so a test can hand one clone to a
/// [`ScanEngine`](crate::monitor::ScanEngine) and keep mutating the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryLister {
    tree: Arc<Mutex<MemoryTree>>,
}

impl MemoryLister {
    /// Create an empty tree with no directories.
    pub fn new() -> Self {
        Self::default()
    }

    fn tree(&self) -> MutexGuard<'_, MemoryTree> {
        // Every mutation is a single map operation; a poisoned lock still holds whole data.
        self.tree.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Create `path` as an empty directory if it does not already exist.
    pub fn create_dir(&self, path: impl Into<PathBuf>) {
        self.tree().dirs.entry(path.into()).or_default();
    }

    /// Add an entry to `path`, creating the directory if needed.
    pub fn add_entry(&self, path: impl Into<PathBuf>, name: impl Into<String>) {
        self.tree()
            .dirs
            .entry(path.into())
            .or_default()
            .insert(name.into());
    }

    /// Remove a single entry. Returns whether it was present.
    pub fn remove_entry(&self, path: &Path, name: &str) -> bool {
        self.tree()
            .dirs
            .get_mut(path)
            .map(|names| names.remove(name))
            .unwrap_or(false)
    }

    /// Delete the directory and everything in it.
    pub fn remove_dir(&self, path: &Path) {
        self.tree().dirs.remove(path);
    }

    /// Make listings of `path` fail until [`MemoryLister::allow`] is called.
    pub fn deny(&self, path: impl Into<PathBuf>) {
        self.tree().unreadable.insert(path.into());
    }

    /// Undo [`MemoryLister::deny`].
    pub fn allow(&self, path: &Path) {
        self.tree().unreadable.remove(path);
    }
}

impl DirectoryLister for MemoryLister {
    fn list(&self, path: &Path) -> Result<Option<EntrySet>, ListingError> {
        let tree = self.tree();
        if !tree.dirs.contains_key(path) {
            return Ok(None);
        }
        if tree.unreadable.contains(path) {
            return Err(ListingError::Unreadable(path.to_path_buf()));
        }
        Ok(tree.dirs.get(path).cloned())
    }
}

impl<L: DirectoryLister + ?Sized> DirectoryLister for &L {
    fn list(&self, path: &Path) -> Result<Option<EntrySet>, ListingError> {
        (**self).list(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_fs_lister_lists_files_and_subdirs() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.txt"), "a").unwrap();
        fs::create_dir(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("nested").join("deep.txt"), "d").unwrap();

        let names = FsLister::new().list(temp.path()).unwrap().unwrap();

        let expected: EntrySet = ["a.txt", "nested"].iter().map(|s| s.to_string()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_fs_lister_missing_directory() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("not-here");

        let result = FsLister::new().list(&missing).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_fs_lister_file_path_is_an_error() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("plain.txt");
        fs::write(&file, "x").unwrap();

        let result = FsLister::new().list(&file);
        assert!(matches!(result, Err(ListingError::ReadDir { .. })));
    }

    #[test]
    fn test_memory_lister_shared_between_clones() {
        let lister = MemoryLister::new();
        let other = lister.clone();
        let dir = PathBuf::from("/watch");

        assert!(other.list(&dir).unwrap().is_none());

        lister.add_entry(&dir, "x");
        let names = other.list(&dir).unwrap().unwrap();
        assert!(names.contains("x"));

        assert!(lister.remove_entry(&dir, "x"));
        assert!(other.list(&dir).unwrap().unwrap().is_empty());

        lister.remove_dir(&dir);
        assert!(other.list(&dir).unwrap().is_none());
    }

    #[test]
    fn test_memory_lister_deny_and_allow() {
        let lister = MemoryLister::new();
        let dir = PathBuf::from("/locked");
        lister.add_entry(&dir, "secret");

        lister.deny(&dir);
        assert!(matches!(
            lister.list(&dir),
            Err(ListingError::Unreadable(_))
        ));

        lister.allow(&dir);
        assert_eq!(lister.list(&dir).unwrap().unwrap().len(), 1);
    }
}
