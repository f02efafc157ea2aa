//! Predicate evaluation for visited entries.
//!
//! The chain checks one entry against every configured predicate category
//! in a fixed order, cheapest first: type, name, path, size, date, content,
//! then user-supplied predicates. Only the content and custom stages may
//! touch the filesystem. Directory pruning (`exclude`, VCS patterns, dot
//! directories) is not filtering and happens in the walker before descent.

use std::time::SystemTime;

use super::entry::Entry;
use super::pattern::Matcher;
use super::range::{DateConstraint, SizeConstraint};

/// Restriction on the kind of entries yielded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    Any,
    FilesOnly,
    DirectoriesOnly,
}

/// A user-supplied predicate, evaluated last.
pub type FilterPredicate = Box<dyn Fn(&Entry) -> bool>;

/// All configured predicates, evaluated against one entry at a time.
///
/// Accept-lists (`names`, `paths`, `contains`) pass when any of their
/// patterns matches; reject-lists (`not_*`) exclude when any of theirs
/// does. Size and date constraints all have to hold.
pub(crate) struct PredicateChain<'a> {
    pub type_filter: TypeFilter,
    pub names: &'a [Matcher],
    pub not_names: &'a [Matcher],
    pub paths: &'a [Matcher],
    pub not_paths: &'a [Matcher],
    pub contains: &'a [Matcher],
    pub not_contains: &'a [Matcher],
    pub sizes: &'a [SizeConstraint],
    pub dates: &'a [DateConstraint],
    pub custom: &'a [FilterPredicate],
    /// Reference instant for relative date expressions, captured once per
    /// traversal.
    pub reference: SystemTime,
}

impl PredicateChain<'_> {
    /// Check an entry against every configured predicate category.
    pub fn accepts(&self, entry: &Entry) -> bool {
        match self.type_filter {
            TypeFilter::Any => {}
            TypeFilter::FilesOnly if !entry.is_file() => return false,
            TypeFilter::DirectoriesOnly if !entry.is_dir() => return false,
            _ => {}
        }

        let name = entry.file_name();
        if !self.names.is_empty() && !self.names.iter().any(|m| m.matches_name(name)) {
            return false;
        }
        if self.not_names.iter().any(|m| m.matches_name(name)) {
            return false;
        }

        let relative = entry.relative_pathname().to_string_lossy();
        if !self.paths.is_empty() && !self.paths.iter().any(|m| m.matches_within(&relative)) {
            return false;
        }
        if self.not_paths.iter().any(|m| m.matches_within(&relative)) {
            return false;
        }

        if !self.sizes.iter().all(|c| c.matches(entry.size())) {
            return false;
        }

        if !self.dates.is_empty() {
            match entry.modified() {
                Some(modified) => {
                    if !self
                        .dates
                        .iter()
                        .all(|c| c.matches(modified, self.reference))
                    {
                        return false;
                    }
                }
                None => return false,
            }
        }

        if !self.matches_content(entry) {
            return false;
        }

        self.custom.iter().all(|predicate| predicate(entry))
    }

    /// Content predicates apply only to files; a failed read counts as
    /// "does not match" rather than an error.
    fn matches_content(&self, entry: &Entry) -> bool {
        if self.contains.is_empty() && self.not_contains.is_empty() {
            return true;
        }
        if !entry.is_file() {
            return false;
        }

        let contents = entry.contents().ok();
        if !self.contains.is_empty() {
            let Some(text) = contents.as_deref() else {
                return false;
            };
            if !self.contains.iter().any(|m| m.matches_within(text)) {
                return false;
            }
        }
        let text = contents.as_deref().unwrap_or("");
        !self.not_contains.iter().any(|m| m.matches_within(text))
    }
}
