//! Traversal options.
//!
//! Everything the walker needs to know before opening a directory lives
//! here: depth bounds, symlink policy, unreadable-directory policy and the
//! pruning rules (excluded names, VCS patterns, dot files).

use log::warn;

use super::pattern::Matcher;
use super::range::DepthRange;
use super::vcs;

/// Options governing one traversal.
#[derive(Debug, Clone)]
pub(crate) struct WalkOptions {
    /// Inclusive depth bounds; depth 0 means direct children of a root.
    pub depth: DepthRange,
    /// Descend through symlinked directories.
    pub follow_links: bool,
    /// Prune directories matching the VCS pattern registry.
    pub ignore_vcs: bool,
    /// Prune dot directories and skip dot files.
    pub ignore_dot_files: bool,
    /// Skip permission-denied directories instead of halting.
    pub ignore_unreadable_dirs: bool,
    /// Directory names (or root-relative paths) pruned before descent.
    pub excludes: Vec<String>,
    /// Snapshot of the VCS registry taken when the finder was created.
    pub vcs_matchers: Vec<Matcher>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        let vcs_matchers = vcs::vcs_patterns()
            .iter()
            .filter_map(|p| match Matcher::new(p) {
                Ok(matcher) => Some(matcher),
                Err(err) => {
                    warn!("dropping unusable VCS pattern {p:?}: {err}");
                    None
                }
            })
            .collect();
        Self {
            depth: DepthRange::default(),
            follow_links: false,
            ignore_vcs: true,
            ignore_dot_files: true,
            ignore_unreadable_dirs: false,
            excludes: Vec::new(),
            vcs_matchers,
        }
    }
}
