//! Directory listing used by discovery
//!
//! Discovery never touches the filesystem directly; it asks a
//! [`DirectoryLister`] for the immediate entries of a path. [`FsLister`] reads
//! the real filesystem, [`MemoryLister`] serves a tree built in memory.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One immediate child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub is_dir: bool,
}

impl DirectoryEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_dir: false }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_dir: true }
    }
}

/// Lists the immediate entries of a directory
pub trait DirectoryLister {
    fn list(&self, path: &Path) -> io::Result<Vec<DirectoryEntry>>;
}

/// Lists directories on the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLister;

impl DirectoryLister for FsLister {
    fn list(&self, path: &Path) -> io::Result<Vec<DirectoryEntry>> {
        let mut entries = Vec::new();

        for entry in fs::read_dir(path)? {
            let entry = entry?;
            // Package paths are strings; a name that is not UTF-8 cannot be one
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(_) => continue,
            };
            // Symlinks are never descended into, which also rules out cycles
            let is_dir = entry.file_type()?.is_dir();

            entries.push(DirectoryEntry { name, is_dir });
        }

        Ok(entries)
    }
}

/// In-memory directory tree
///
/// Paths are registered with [`MemoryLister::add_file`] and
/// [`MemoryLister::add_dir`]; parent directories are created implicitly.
/// Listing a path that was never registered fails with `NotFound`.
#[derive(Debug, Default, Clone)]
pub struct MemoryLister {
    dirs: BTreeMap<PathBuf, Vec<DirectoryEntry>>,
}

impl MemoryLister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a directory (and all of its ancestors)
    pub fn add_dir(&mut self, path: impl AsRef<Path>) -> &mut Self {
        let path = path.as_ref();
        if self.dirs.contains_key(path) {
            return self;
        }
        self.dirs.insert(path.to_path_buf(), Vec::new());

        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            if !parent.as_os_str().is_empty() {
                self.add_dir(parent);
                self.push_entry(parent, DirectoryEntry::dir(name.to_string_lossy()));
            }
        }
        self
    }

    /// Register a file, creating its parent directories
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> &mut Self {
        let path = path.as_ref();
        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().to_string(),
            None => return self,
        };

        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                self.add_dir(parent);
                self.push_entry(parent, DirectoryEntry::file(name));
            }
            _ => {}
        }
        self
    }

    fn push_entry(&mut self, dir: &Path, entry: DirectoryEntry) {
        if let Some(entries) = self.dirs.get_mut(dir) {
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        }
    }
}

impl DirectoryLister for MemoryLister {
    fn list(&self, path: &Path) -> io::Result<Vec<DirectoryEntry>> {
        self.dirs.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {}", path.display()),
            )
        })
    }
}
