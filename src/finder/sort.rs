//! Result ordering.
//!
//! A total order may depend on the whole result set, so configuring any
//! sort disables streaming: the walker and filter stages are drained into a
//! buffer before the first sorted element is emitted. Only one strategy can
//! be active; the last one configured wins.

use std::cmp::Ordering;

use crate::errors::FindResult;
use super::entry::Entry;

/// How a drained result set is ordered before being emitted.
pub enum SortStrategy {
    /// Lexicographic on the root-relative pathname.
    ByName,
    /// All directories before all files, each group by name.
    ByType,
    ByAccessedTime,
    ByModifiedTime,
    /// By inode change time. Fails with a capability error where the
    /// platform cannot report one; never falls back to modified time.
    ByChangedTime,
    /// User-supplied comparator over two entries.
    Custom(Box<dyn Fn(&Entry, &Entry) -> Ordering>),
}

impl std::fmt::Debug for SortStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SortStrategy::ByName => "ByName",
            SortStrategy::ByType => "ByType",
            SortStrategy::ByAccessedTime => "ByAccessedTime",
            SortStrategy::ByModifiedTime => "ByModifiedTime",
            SortStrategy::ByChangedTime => "ByChangedTime",
            SortStrategy::Custom(_) => "Custom",
        };
        f.write_str(name)
    }
}

impl SortStrategy {
    /// Order a fully drained buffer in place.
    pub(crate) fn apply(&self, entries: &mut [Entry]) -> FindResult<()> {
        match self {
            SortStrategy::ByName => entries.sort_by(|a, b| by_name(a, b)),
            SortStrategy::ByType => entries.sort_by(|a, b| {
                b.is_dir()
                    .cmp(&a.is_dir())
                    .then_with(|| by_name(a, b))
            }),
            SortStrategy::ByAccessedTime => entries.sort_by_key(Entry::accessed),
            SortStrategy::ByModifiedTime => entries.sort_by_key(Entry::modified),
            SortStrategy::ByChangedTime => {
                // Surface the capability error before reordering anything.
                for entry in entries.iter() {
                    entry.changed()?;
                }
                entries.sort_by_key(|e| e.changed().ok());
            }
            SortStrategy::Custom(compare) => entries.sort_by(|a, b| compare(a, b)),
        }
        Ok(())
    }
}

fn by_name(a: &Entry, b: &Entry) -> Ordering {
    a.relative_pathname().cmp(b.relative_pathname())
}
