//! Visited filesystem entries.
//!
//! An [`Entry`] is created by the walker when an object is visited and is
//! read-only from then on. It records the metadata every downstream
//! predicate needs, so filtering never re-stats the filesystem; only
//! content predicates and [`Entry::contents`] open the file itself.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::errors::{FindError, FindResult};

/// The kind of a visited entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One visited filesystem object with its metadata.
#[derive(Debug, Clone)]
pub struct Entry {
    path: PathBuf,
    relative_path: PathBuf,
    relative_pathname: PathBuf,
    file_name: String,
    kind: EntryKind,
    size: u64,
    modified: Option<SystemTime>,
    accessed: Option<SystemTime>,
    changed: Option<SystemTime>,
}

impl Entry {
    /// Build an entry for `path` as discovered under `root`.
    pub(crate) fn new(path: &Path, root: &Path, metadata: &fs::Metadata) -> Self {
        let relative_pathname = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        let relative_path = relative_pathname
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };

        Self {
            path: path.to_path_buf(),
            relative_path,
            relative_pathname,
            file_name,
            kind,
            size: metadata.len(),
            modified: metadata.modified().ok(),
            accessed: metadata.accessed().ok(),
            changed: changed_time(metadata),
        }
    }

    /// Build a standalone entry for an existing path, outside any traversal.
    ///
    /// Used for values fed to `Finder::append`. The entry has no root, so
    /// its relative pathname equals the given path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> FindResult<Self> {
        let path = path.as_ref();
        let metadata = fs::symlink_metadata(path).map_err(|source| FindError::Io {
            source,
            path: path.to_path_buf(),
        })?;
        Ok(Self::new(path, Path::new(""), &metadata))
    }

    /// Absolute path of the entry.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory part of the path relative to the root it was found under.
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Path relative to the root, including the file name.
    pub fn relative_pathname(&self) -> &Path {
        &self.relative_pathname
    }

    /// Bare file name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Last modification time, where the filesystem reports one.
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    /// Last access time, where the filesystem reports one.
    pub fn accessed(&self) -> Option<SystemTime> {
        self.accessed
    }

    /// Inode change time. Fails on platforms that do not report it; callers
    /// must not substitute the modification time.
    pub fn changed(&self) -> FindResult<SystemTime> {
        self.changed.ok_or_else(|| FindError::ChangedTimeUnsupported {
            path: self.path.clone(),
        })
    }

    /// Read the entry's contents.
    ///
    /// Fails with a not-readable error for directories and for files the
    /// process cannot open.
    pub fn contents(&self) -> FindResult<String> {
        if self.is_dir() {
            return Err(FindError::NotReadable {
                path: self.path.clone(),
            });
        }
        fs::read_to_string(&self.path).map_err(|_| FindError::NotReadable {
            path: self.path.clone(),
        })
    }
}

#[cfg(unix)]
fn changed_time(metadata: &fs::Metadata) -> Option<SystemTime> {
    use std::os::unix::fs::MetadataExt;
    use std::time::Duration;

    let secs = u64::try_from(metadata.ctime()).ok()?;
    SystemTime::UNIX_EPOCH.checked_add(Duration::new(secs, metadata.ctime_nsec() as u32))
}

#[cfg(not(unix))]
fn changed_time(_metadata: &fs::Metadata) -> Option<SystemTime> {
    None
}
