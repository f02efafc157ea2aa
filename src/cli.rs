//! Command-line interface for the finder.
//!
//! Thin glue translating arguments into a configured [`Finder`]; all the
//! actual querying lives in the library.

use clap::{Parser, ValueEnum};

use crate::errors::FindResult;
use crate::finder::Finder;

/// Query the filesystem with composable predicates.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root directories to search (default: current directory)
    #[arg(default_value = ".")]
    pub roots: Vec<String>,

    /// Only yield files (f) or directories (d)
    #[arg(short = 't', long = "type", value_name = "f|d")]
    pub entry_type: Option<EntryTypeArg>,

    /// Depth expression, e.g. "< 3" (repeatable, all must hold)
    #[arg(long, value_name = "EXPR")]
    pub depth: Vec<String>,

    /// Name pattern: literal, glob or /regex/ (repeatable, any may match)
    #[arg(short = 'n', long)]
    pub name: Vec<String>,

    /// Reject-name pattern (repeatable, each excludes)
    #[arg(long)]
    pub not_name: Vec<String>,

    /// Relative-path pattern (repeatable, any may match)
    #[arg(long)]
    pub path: Vec<String>,

    /// Reject-path pattern (repeatable, each excludes)
    #[arg(long)]
    pub not_path: Vec<String>,

    /// Content pattern, files only (repeatable, any may match)
    #[arg(long)]
    pub contains: Vec<String>,

    /// Reject-content pattern (repeatable, each excludes)
    #[arg(long)]
    pub not_contains: Vec<String>,

    /// Size expression, e.g. "> 1M" (repeatable, all must hold)
    #[arg(short = 's', long, value_name = "EXPR")]
    pub size: Vec<String>,

    /// Date expression, e.g. "since 10 hours ago" (repeatable, all must hold)
    #[arg(short = 'd', long, value_name = "EXPR")]
    pub date: Vec<String>,

    /// Prune a directory name and its subtree (repeatable)
    #[arg(short = 'x', long)]
    pub exclude: Vec<String>,

    /// Descend through symlinked directories
    #[arg(short = 'L', long)]
    pub follow_links: bool,

    /// Include dot files and dot directories
    #[arg(long)]
    pub hidden: bool,

    /// Do not prune version-control directories
    #[arg(long)]
    pub no_ignore_vcs: bool,

    /// Skip unreadable directories instead of failing
    #[arg(long)]
    pub ignore_unreadable: bool,

    /// Sort the results (disables streaming)
    #[arg(long, value_name = "KEY")]
    pub sort: Option<SortArg>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum EntryTypeArg {
    #[value(name = "f")]
    File,
    #[value(name = "d")]
    Directory,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SortArg {
    Name,
    Type,
    Atime,
    Mtime,
    Ctime,
}

impl Cli {
    /// Build a configured finder from the parsed arguments.
    pub fn build_finder(&self) -> FindResult<Finder> {
        let mut finder = Finder::new()
            .ignore_dot_files(!self.hidden)
            .ignore_vcs(!self.no_ignore_vcs)
            .ignore_unreadable_dirs(self.ignore_unreadable);

        for root in &self.roots {
            finder = finder.in_dir(root)?;
        }

        finder = match self.entry_type {
            Some(EntryTypeArg::File) => finder.files(),
            Some(EntryTypeArg::Directory) => finder.directories(),
            None => finder,
        };

        for expr in &self.depth {
            finder = finder.depth(expr)?;
        }
        for pattern in &self.name {
            finder = finder.name(pattern)?;
        }
        for pattern in &self.not_name {
            finder = finder.not_name(pattern)?;
        }
        for pattern in &self.path {
            finder = finder.path(pattern)?;
        }
        for pattern in &self.not_path {
            finder = finder.not_path(pattern)?;
        }
        for pattern in &self.contains {
            finder = finder.contains(pattern)?;
        }
        for pattern in &self.not_contains {
            finder = finder.not_contains(pattern)?;
        }
        for expr in &self.size {
            finder = finder.size(expr)?;
        }
        for expr in &self.date {
            finder = finder.date(expr)?;
        }
        for name in &self.exclude {
            finder = finder.exclude(name);
        }

        if self.follow_links {
            finder = finder.follow_links();
        }

        finder = match self.sort {
            Some(SortArg::Name) => finder.sort_by_name(),
            Some(SortArg::Type) => finder.sort_by_type(),
            Some(SortArg::Atime) => finder.sort_by_accessed_time(),
            Some(SortArg::Mtime) => finder.sort_by_modified_time(),
            Some(SortArg::Ctime) => finder.sort_by_changed_time(),
            None => finder,
        };

        Ok(finder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["finder-rs"]);
        assert_eq!(cli.roots, ["."]);
        assert!(cli.build_finder().is_ok());
    }

    #[test]
    fn test_cli_invalid_root() {
        let cli = Cli::parse_from(["finder-rs", "/no/such/root"]);
        assert!(cli.build_finder().is_err());
    }

    #[test]
    fn test_cli_invalid_pattern() {
        let cli = Cli::parse_from(["finder-rs", "--name", "[unclosed"]);
        assert!(cli.build_finder().is_err());
    }

    #[test]
    fn test_cli_invalid_size_expression() {
        let cli = Cli::parse_from(["finder-rs", "--size", "> 1X"]);
        assert!(cli.build_finder().is_err());
    }
}
