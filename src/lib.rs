//! A declarative, composable file-system query engine.
//!
//! This library answers questions of the form "give me an ordered sequence
//! of entries under these roots that satisfy these predicates":
//! - name, path and content matching with literals, globs or `/regex/`
//!   patterns
//! - size, modification-date and depth range expressions (`"> 1M"`,
//!   `"since 10 hours ago"`, `"< 3"`)
//! - VCS and dot-file pruning, symlink traversal with cycle detection,
//!   opt-in recovery from unreadable directories
//! - optional total ordering by name, type, timestamps or a custom
//!   comparator
//!
//! Evaluation is lazy and pull-based: nothing is visited until the result
//! iterator is advanced, and dropping it stops the traversal.
//!
//! # Example
//!
//! ```no_run
//! use finder_rs::Finder;
//!
//! let finder = Finder::new()
//!     .in_dir(".")?
//!     .files()
//!     .name("*.toml")?
//!     .not_path("target")?
//!     .sort_by_name();
//!
//! for entry in &finder {
//!     let entry = entry?;
//!     println!("{}", entry.relative_pathname().display());
//! }
//! # Ok::<(), finder_rs::FindError>(())
//! ```

pub mod cli;
pub mod errors;
pub mod finder;

// Re-export main types for convenience
pub use errors::{FindError, FindResult};
pub use finder::entry::{Entry, EntryKind};
pub use finder::sort::SortStrategy;
pub use finder::vcs::{add_vcs_pattern, set_vcs_patterns, vcs_patterns};
pub use finder::Finder;
