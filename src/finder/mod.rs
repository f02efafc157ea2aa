//! The finder facade.
//!
//! [`Finder`] is a builder that accumulates roots, predicates and ordering,
//! then exposes one lazily-pulled sequence of matching entries. Pipeline
//! stages pull from their upstream only when the consumer asks for the next
//! element, so dropping the iterator early stops the traversal.
//!
//! ```no_run
//! use finder_rs::Finder;
//!
//! let finder = Finder::new()
//!     .in_dir("src")?
//!     .files()
//!     .name("*.rs")?
//!     .size("> 1k")?;
//!
//! for entry in &finder {
//!     println!("{}", entry?.path().display());
//! }
//! # Ok::<(), finder_rs::FindError>(())
//! ```

pub mod entry;
pub mod pattern;
pub mod range;
pub mod sort;
pub mod vcs;

pub(crate) mod filter;
pub(crate) mod options;
pub(crate) mod walker;

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::debug;

use crate::errors::{FindError, FindResult};
use self::entry::Entry;
use self::filter::{FilterPredicate, PredicateChain, TypeFilter};
use self::options::WalkOptions;
use self::pattern::Matcher;
use self::range::{DateConstraint, SizeConstraint};
use self::sort::SortStrategy;
use self::walker::Walker;

/// A declarative filesystem query: roots, predicates and ordering composed
/// into one lazily-evaluated sequence of [`Entry`] values.
///
/// Configuration methods chain by value; the fallible ones (roots, patterns,
/// range expressions) validate eagerly so a bad configuration never reaches
/// the walker. Iterating borrows the finder immutably, so a live pipeline
/// cannot be reconfigured.
#[derive(Default)]
pub struct Finder {
    roots: Vec<PathBuf>,
    type_filter: TypeFilter,
    options: WalkOptions,
    names: Vec<Matcher>,
    not_names: Vec<Matcher>,
    paths: Vec<Matcher>,
    not_paths: Vec<Matcher>,
    contains_patterns: Vec<Matcher>,
    not_contains_patterns: Vec<Matcher>,
    sizes: Vec<SizeConstraint>,
    dates: Vec<DateConstraint>,
    sort: Option<SortStrategy>,
    filters: Vec<FilterPredicate>,
    appended: Vec<Entry>,
}

impl std::fmt::Debug for Finder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Finder").finish_non_exhaustive()
    }
}

impl Finder {
    /// Create an unconfigured finder. VCS patterns registered before this
    /// call are captured; later registrations do not affect this instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root directory to search. May be called multiple times; roots
    /// are visited, and their results concatenated, in the order added.
    ///
    /// Fails immediately if the path does not exist or is not a readable
    /// directory.
    pub fn in_dir<P: AsRef<Path>>(mut self, path: P) -> FindResult<Self> {
        let given = path.as_ref();
        let invalid = || FindError::InvalidRoot {
            path: given.to_path_buf(),
        };

        let root = given.canonicalize().map_err(|_| invalid())?;
        if !root.is_dir() {
            return Err(invalid());
        }
        // Readability probe, so the failure is raised here and not
        // mid-iteration.
        fs::read_dir(&root).map_err(|_| invalid())?;

        self.roots.push(root);
        Ok(self)
    }

    /// Restrict results to files.
    pub fn files(mut self) -> Self {
        self.type_filter = TypeFilter::FilesOnly;
        self
    }

    /// Restrict results to directories.
    pub fn directories(mut self) -> Self {
        self.type_filter = TypeFilter::DirectoriesOnly;
        self
    }

    /// Restrict the depth below the roots, e.g. `"< 3"` or `">= 1"`.
    /// Depth 0 is a root's direct children. Repeated calls intersect.
    pub fn depth(mut self, expr: &str) -> FindResult<Self> {
        self.options.depth.narrow(expr)?;
        Ok(self)
    }

    /// Restrict by modification time, e.g. `"> 2016-01-01"` or
    /// `"since 10 hours ago"`. Repeated calls must all hold.
    pub fn date(mut self, expr: &str) -> FindResult<Self> {
        self.dates.push(DateConstraint::parse(expr)?);
        Ok(self)
    }

    /// Keep entries whose name matches the pattern (literal, glob or
    /// `/regex/`). Repeated calls keep entries matching any of them.
    pub fn name(mut self, pattern: &str) -> FindResult<Self> {
        self.names.push(Matcher::new(pattern)?);
        Ok(self)
    }

    /// Drop entries whose name matches the pattern. Each repeated call
    /// excludes independently: one match on any reject-pattern hides the
    /// entry.
    pub fn not_name(mut self, pattern: &str) -> FindResult<Self> {
        self.not_names.push(Matcher::new(pattern)?);
        Ok(self)
    }

    /// Keep entries whose root-relative path matches the pattern; literals
    /// match as substrings. Repeated calls OR together.
    pub fn path(mut self, pattern: &str) -> FindResult<Self> {
        self.paths.push(Matcher::new(pattern)?);
        Ok(self)
    }

    /// Drop entries whose root-relative path matches the pattern.
    pub fn not_path(mut self, pattern: &str) -> FindResult<Self> {
        self.not_paths.push(Matcher::new(pattern)?);
        Ok(self)
    }

    /// Keep files whose contents match the pattern. Directories never
    /// match; unreadable files count as not matching.
    pub fn contains(mut self, pattern: &str) -> FindResult<Self> {
        self.contains_patterns.push(Matcher::new(pattern)?);
        Ok(self)
    }

    /// Drop files whose contents match the pattern.
    pub fn not_contains(mut self, pattern: &str) -> FindResult<Self> {
        self.not_contains_patterns.push(Matcher::new(pattern)?);
        Ok(self)
    }

    /// Restrict by size, e.g. `"> 1M"`. Units `k`/`m`/`g` are decimal,
    /// `ki`/`mi`/`gi` binary. Repeated calls must all hold.
    pub fn size(mut self, expr: &str) -> FindResult<Self> {
        self.sizes.push(SizeConstraint::parse(expr)?);
        Ok(self)
    }

    /// Prune a directory (by name or root-relative path) and its whole
    /// subtree before it is opened.
    pub fn exclude(mut self, dir_name: &str) -> Self {
        self.options.excludes.push(dir_name.to_string());
        self
    }

    /// Prune directories matching the VCS pattern registry. On by default.
    pub fn ignore_vcs(mut self, ignore: bool) -> Self {
        self.options.ignore_vcs = ignore;
        self
    }

    /// Prune dot directories and skip dot files. On by default.
    pub fn ignore_dot_files(mut self, ignore: bool) -> Self {
        self.options.ignore_dot_files = ignore;
        self
    }

    /// Skip permission-denied directories instead of halting the
    /// iteration. Off by default.
    pub fn ignore_unreadable_dirs(mut self, ignore: bool) -> Self {
        self.options.ignore_unreadable_dirs = ignore;
        self
    }

    /// Descend through symlinked directories. Cycles raise a distinct
    /// error. Without this, symlinks are yielded as leaf entries.
    pub fn follow_links(mut self) -> Self {
        self.options.follow_links = true;
        self
    }

    /// Order results with a custom comparator. Like every sort, this
    /// drains the pipeline before the first element is emitted. Only one
    /// sort can be active; the last one configured wins.
    pub fn sort<F>(mut self, compare: F) -> Self
    where
        F: Fn(&Entry, &Entry) -> Ordering + 'static,
    {
        self.sort = Some(SortStrategy::Custom(Box::new(compare)));
        self
    }

    /// Order results by root-relative pathname.
    pub fn sort_by_name(mut self) -> Self {
        self.sort = Some(SortStrategy::ByName);
        self
    }

    /// Order results with directories first, then files, each group by
    /// name.
    pub fn sort_by_type(mut self) -> Self {
        self.sort = Some(SortStrategy::ByType);
        self
    }

    /// Order results by last access time.
    pub fn sort_by_accessed_time(mut self) -> Self {
        self.sort = Some(SortStrategy::ByAccessedTime);
        self
    }

    /// Order results by last modification time.
    pub fn sort_by_modified_time(mut self) -> Self {
        self.sort = Some(SortStrategy::ByModifiedTime);
        self
    }

    /// Order results by inode change time. Fails during iteration on
    /// platforms that cannot report it.
    pub fn sort_by_changed_time(mut self) -> Self {
        self.sort = Some(SortStrategy::ByChangedTime);
        self
    }

    /// Apply an arbitrary predicate, evaluated after every built-in
    /// category. Repeated predicates must all accept an entry.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Entry) -> bool + 'static,
    {
        self.filters.push(Box::new(predicate));
        self
    }

    /// Concatenate externally supplied entries after all discovered
    /// results, preserving their order. Appended entries bypass filters
    /// and sorting.
    pub fn append<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = Entry>,
    {
        self.appended.extend(entries);
        self
    }

    /// Lazily iterate over the matching entries.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            finder: self,
            state: State::Start,
        }
    }

    /// Drain the pipeline and report how many entries it yields.
    pub fn count(&self) -> FindResult<usize> {
        self.iter().try_fold(0, |n, result| result.map(|_| n + 1))
    }

    fn chain(&self, reference: SystemTime) -> PredicateChain<'_> {
        PredicateChain {
            type_filter: self.type_filter,
            names: &self.names,
            not_names: &self.not_names,
            paths: &self.paths,
            not_paths: &self.not_paths,
            contains: &self.contains_patterns,
            not_contains: &self.not_contains_patterns,
            sizes: &self.sizes,
            dates: &self.dates,
            custom: &self.filters,
            reference,
        }
    }
}

impl<'a> IntoIterator for &'a Finder {
    type Item = FindResult<Entry>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Pull-based iterator over a finder's results.
///
/// Without a sort the pipeline streams: each `next` advances the walker
/// just far enough to find one accepted entry. With a sort configured, the
/// first `next` drains and orders the whole result set. A traversal error
/// is yielded once and fuses the iterator.
pub struct Iter<'a> {
    finder: &'a Finder,
    state: State<'a>,
}

enum State<'a> {
    Start,
    Stream {
        walker: Walker<'a>,
        chain: PredicateChain<'a>,
    },
    Sorted(std::vec::IntoIter<Entry>),
    Append(std::slice::Iter<'a, Entry>),
    Done,
}

impl<'a> Iterator for Iter<'a> {
    type Item = FindResult<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match &mut self.state {
                State::Start => {
                    // Reference instant for relative date expressions,
                    // captured once for the whole traversal.
                    let reference = SystemTime::now();
                    let chain = self.finder.chain(reference);
                    let walker = Walker::new(&self.finder.roots, &self.finder.options);

                    match &self.finder.sort {
                        None => self.state = State::Stream { walker, chain },
                        Some(strategy) => {
                            debug!("sort configured, draining pipeline");
                            let mut buffer = Vec::new();
                            for result in walker {
                                match result {
                                    Ok(entry) => {
                                        if chain.accepts(&entry) {
                                            buffer.push(entry);
                                        }
                                    }
                                    Err(err) => {
                                        self.state = State::Done;
                                        return Some(Err(err));
                                    }
                                }
                            }
                            if let Err(err) = strategy.apply(&mut buffer) {
                                self.state = State::Done;
                                return Some(Err(err));
                            }
                            self.state = State::Sorted(buffer.into_iter());
                        }
                    }
                }
                State::Stream { walker, chain } => match walker.next() {
                    Some(Ok(entry)) => {
                        if chain.accepts(&entry) {
                            return Some(Ok(entry));
                        }
                    }
                    Some(Err(err)) => {
                        self.state = State::Done;
                        return Some(Err(err));
                    }
                    None => self.state = State::Append(self.finder.appended.iter()),
                },
                State::Sorted(entries) => match entries.next() {
                    Some(entry) => return Some(Ok(entry)),
                    None => self.state = State::Append(self.finder.appended.iter()),
                },
                State::Append(entries) => match entries.next() {
                    Some(entry) => return Some(Ok(entry.clone())),
                    None => {
                        self.state = State::Done;
                        return None;
                    }
                },
                State::Done => return None,
            }
        }
    }
}
