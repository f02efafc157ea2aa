//! Depth-first filesystem traversal.
//!
//! The walker enumerates entries under the configured roots in order, one
//! root at a time. Pruning decisions (excluded directories, VCS patterns,
//! dot directories) are taken before a directory is opened, so excluded
//! subtrees cost no I/O and never surface permission errors. Filtering of
//! individual entries happens downstream and never prevents descent.

use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::errors::{FindError, FindResult};
use super::entry::Entry;
use super::options::WalkOptions;

/// Lazily walks the configured roots, yielding one entry per visited
/// filesystem object.
///
/// A traversal error (permission denied without the recovery flag, or a
/// symlink cycle) is yielded once and fuses the iterator; entries already
/// yielded remain valid.
pub(crate) struct Walker<'a> {
    options: &'a WalkOptions,
    roots: std::slice::Iter<'a, PathBuf>,
    current: Option<(&'a Path, walkdir::IntoIter)>,
    halted: bool,
}

impl<'a> Walker<'a> {
    pub fn new(roots: &'a [PathBuf], options: &'a WalkOptions) -> Self {
        Self {
            options,
            roots: roots.iter(),
            current: None,
            halted: false,
        }
    }

    fn start_root(&self, root: &Path) -> walkdir::IntoIter {
        debug!("walking root {}", root.display());
        let mut walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(self.options.follow_links)
            .sort_by_file_name();
        if self.options.depth.max != usize::MAX {
            walker = walker.max_depth(self.options.depth.max + 1);
        }
        walker.into_iter()
    }

    /// Map a traversal error to the configured policy. `None` means the
    /// error was absorbed and traversal continues.
    fn handle_error(&mut self, err: walkdir::Error) -> Option<FindError> {
        match FindError::from(err) {
            FindError::AccessDenied { path } if self.options.ignore_unreadable_dirs => {
                debug!("skipping unreadable directory {}", path.display());
                None
            }
            other => {
                self.halted = true;
                Some(other)
            }
        }
    }
}

/// Whether a directory should be pruned before it is opened.
fn should_prune(options: &WalkOptions, root: &Path, path: &Path, name: &str) -> bool {
    if !options.excludes.is_empty() {
        let relative = path.strip_prefix(root).unwrap_or(path);
        if options
            .excludes
            .iter()
            .any(|x| name == x || relative == Path::new(x))
        {
            return true;
        }
    }
    if options.ignore_vcs && options.vcs_matchers.iter().any(|m| m.matches_name(name)) {
        return true;
    }
    options.ignore_dot_files && name.starts_with('.')
}

impl Iterator for Walker<'_> {
    type Item = FindResult<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        // An empty depth range can never emit anything.
        if self.halted || self.options.depth.is_empty() {
            return None;
        }
        loop {
            if self.current.is_none() {
                let root = self.roots.next()?;
                self.current = Some((root.as_path(), self.start_root(root)));
            }
            let options = self.options;
            let (root, iter) = self.current.as_mut().expect("current root just set");
            let root: &Path = *root;

            let dirent = match iter.next() {
                None => {
                    self.current = None;
                    continue;
                }
                Some(Err(err)) => match self.handle_error(err) {
                    None => continue,
                    Some(err) => return Some(Err(err)),
                },
                Some(Ok(dirent)) => dirent,
            };

            let name = dirent.file_name().to_string_lossy().into_owned();
            if dirent.file_type().is_dir() {
                if should_prune(options, root, dirent.path(), &name) {
                    debug!("pruning {}", dirent.path().display());
                    iter.skip_current_dir();
                    continue;
                }
            } else if options.ignore_dot_files && name.starts_with('.') {
                continue;
            }

            // walkdir depth 1 is a root's direct child, i.e. finder depth 0.
            if !options.depth.contains(dirent.depth() - 1) {
                continue;
            }

            match dirent.metadata() {
                Ok(metadata) => return Some(Ok(Entry::new(dirent.path(), root, &metadata))),
                Err(err) => match self.handle_error(err) {
                    None => continue,
                    Some(err) => return Some(Err(err)),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::{tempdir, TempDir};

    fn create_test_structure() -> std::io::Result<TempDir> {
        let temp_dir = tempdir()?;
        File::create(temp_dir.path().join("file1.txt"))?.write_all(b"test")?;
        fs::create_dir(temp_dir.path().join("dir1"))?;
        File::create(temp_dir.path().join("dir1").join("file2.txt"))?.write_all(b"test")?;
        Ok(temp_dir)
    }

    fn collect(roots: &[PathBuf], options: &WalkOptions) -> FindResult<Vec<Entry>> {
        Walker::new(roots, options).collect()
    }

    #[test]
    fn test_walker_yields_each_entry_once() {
        let temp_dir = create_test_structure().unwrap();
        let roots = vec![temp_dir.path().to_path_buf()];
        let entries = collect(&roots, &WalkOptions::default()).unwrap();

        // 2 files + 1 directory; the root itself is never yielded.
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_walker_depth_bounds() {
        let temp_dir = create_test_structure().unwrap();
        let roots = vec![temp_dir.path().to_path_buf()];

        let mut options = WalkOptions::default();
        options.depth.narrow("== 0").unwrap();
        let entries = collect(&roots, &options).unwrap();
        assert_eq!(entries.len(), 2); // file1.txt and dir1

        let mut options = WalkOptions::default();
        options.depth.narrow(">= 1").unwrap();
        let entries = collect(&roots, &options).unwrap();
        assert_eq!(entries.len(), 1); // dir1/file2.txt
    }

    #[test]
    fn test_walker_empty_depth_range() {
        let temp_dir = create_test_structure().unwrap();
        let roots = vec![temp_dir.path().to_path_buf()];

        let mut options = WalkOptions::default();
        options.depth.narrow("> 3").unwrap();
        options.depth.narrow("< 2").unwrap();
        let entries = collect(&roots, &options).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_walker_prunes_excluded_directory() {
        let temp_dir = create_test_structure().unwrap();
        let roots = vec![temp_dir.path().to_path_buf()];

        let mut options = WalkOptions::default();
        options.excludes.push("dir1".to_string());
        let entries = collect(&roots, &options).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name(), "file1.txt");
    }

    #[test]
    fn test_walker_prunes_vcs_directories() {
        let temp_dir = create_test_structure().unwrap();
        fs::create_dir(temp_dir.path().join(".git")).unwrap();
        File::create(temp_dir.path().join(".git").join("HEAD")).unwrap();
        let roots = vec![temp_dir.path().to_path_buf()];

        let entries = collect(&roots, &WalkOptions::default()).unwrap();
        assert!(entries.iter().all(|e| e.file_name() != ".git"));
        assert!(entries.iter().all(|e| e.file_name() != "HEAD"));

        let mut options = WalkOptions::default();
        options.ignore_vcs = false;
        options.ignore_dot_files = false;
        let entries = collect(&roots, &options).unwrap();
        assert!(entries.iter().any(|e| e.file_name() == ".git"));
    }

    #[test]
    fn test_walker_skips_dot_files() {
        let temp_dir = tempdir().unwrap();
        File::create(temp_dir.path().join(".htaccess")).unwrap();
        File::create(temp_dir.path().join("visible.txt")).unwrap();
        let roots = vec![temp_dir.path().to_path_buf()];

        let entries = collect(&roots, &WalkOptions::default()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name(), "visible.txt");

        let mut options = WalkOptions::default();
        options.ignore_dot_files = false;
        let entries = collect(&roots, &options).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_walker_visits_roots_in_order() {
        let temp_a = tempdir().unwrap();
        let temp_b = tempdir().unwrap();
        File::create(temp_a.path().join("mario.txt")).unwrap();
        File::create(temp_b.path().join("luigi.txt")).unwrap();

        let roots = vec![temp_a.path().to_path_buf(), temp_b.path().to_path_buf()];
        let entries = collect(&roots, &WalkOptions::default()).unwrap();

        let names: Vec<_> = entries.iter().map(Entry::file_name).collect();
        assert_eq!(names, ["mario.txt", "luigi.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_walker_unreadable_directory_policies() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempdir().unwrap();
        File::create(temp_dir.path().join("readable.txt")).unwrap();
        let restricted = temp_dir.path().join("restricted");
        fs::create_dir(&restricted).unwrap();
        File::create(restricted.join("secret.txt")).unwrap();
        fs::set_permissions(&restricted, fs::Permissions::from_mode(0o000)).unwrap();

        // Running as root ignores permission bits; nothing to assert then.
        if fs::read_dir(&restricted).is_ok() {
            fs::set_permissions(&restricted, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let roots = vec![temp_dir.path().to_path_buf()];

        let result = collect(&roots, &WalkOptions::default());
        assert!(matches!(result, Err(FindError::AccessDenied { .. })));

        let mut options = WalkOptions::default();
        options.ignore_unreadable_dirs = true;
        let entries = collect(&roots, &options).unwrap();
        // The unreadable directory itself is yielded, its subtree is not,
        // and readable siblings survive.
        let names: Vec<_> = entries.iter().map(Entry::file_name).collect();
        assert!(names.contains(&"readable.txt"));
        assert!(names.contains(&"restricted"));
        assert!(!names.contains(&"secret.txt"));

        fs::set_permissions(&restricted, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_walker_symlinks_are_leaves_unless_followed() {
        let temp_dir = tempdir().unwrap();
        let target = temp_dir.path().join("target");
        fs::create_dir(&target).unwrap();
        File::create(target.join("inside.txt")).unwrap();
        std::os::unix::fs::symlink(&target, temp_dir.path().join("link")).unwrap();

        let roots = vec![temp_dir.path().to_path_buf()];
        let entries = collect(&roots, &WalkOptions::default()).unwrap();
        let names: Vec<_> = entries.iter().map(Entry::file_name).collect();
        assert!(names.contains(&"link"));
        // The symlinked directory is not descended into.
        assert_eq!(names.iter().filter(|n| **n == "inside.txt").count(), 1);

        let mut options = WalkOptions::default();
        options.follow_links = true;
        let entries = collect(&roots, &options).unwrap();
        let names: Vec<_> = entries.iter().map(Entry::file_name).collect();
        assert_eq!(names.iter().filter(|n| **n == "inside.txt").count(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_walker_detects_symlink_cycles() {
        let temp_dir = tempdir().unwrap();
        let inner = temp_dir.path().join("inner");
        fs::create_dir(&inner).unwrap();
        std::os::unix::fs::symlink(temp_dir.path(), inner.join("loop")).unwrap();

        let mut options = WalkOptions::default();
        options.follow_links = true;
        let roots = vec![temp_dir.path().to_path_buf()];
        let result = collect(&roots, &options);
        assert!(matches!(result, Err(FindError::SymlinkCycle { .. })));
    }
}
