//! Process-wide registry of version-control directory patterns.
//!
//! Every finder created with VCS-ignoring enabled consults this registry
//! and prunes matching directories without opening them. Registration is
//! append-only and visible to finders created afterwards in the same
//! process; [`set_vcs_patterns`] exists so test code can snapshot and
//! restore the registry between runs.

use std::sync::RwLock;

use lazy_static::lazy_static;

/// Directory names excluded when VCS-ignoring is enabled.
const DEFAULT_PATTERNS: &[&str] = &[
    ".git",
    ".svn",
    "_svn",
    "CVS",
    "_darcs",
    ".arch-params",
    ".monotone",
    ".bzr",
    ".hg",
];

lazy_static! {
    static ref PATTERNS: RwLock<Vec<String>> =
        RwLock::new(DEFAULT_PATTERNS.iter().map(|s| s.to_string()).collect());
}

/// Register one more directory-name pattern. Duplicates are ignored.
pub fn add_vcs_pattern(pattern: &str) {
    let mut patterns = PATTERNS.write().expect("VCS registry poisoned");
    if !patterns.iter().any(|p| p == pattern) {
        patterns.push(pattern.to_string());
    }
}

/// Snapshot of the currently registered patterns.
pub fn vcs_patterns() -> Vec<String> {
    PATTERNS.read().expect("VCS registry poisoned").clone()
}

/// Replace the registry wholesale. Intended for test code restoring a
/// snapshot taken with [`vcs_patterns`].
pub fn set_vcs_patterns(patterns: Vec<String>) {
    *PATTERNS.write().expect("VCS registry poisoned") = patterns;
}

/// Serializes tests that mutate the shared registry.
#[cfg(test)]
pub(crate) static TEST_REGISTRY_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
