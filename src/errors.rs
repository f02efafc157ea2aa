//! Error types for the finder engine.
//!
//! Errors fall into two tiers: configuration-time errors (bad root path,
//! malformed pattern or range expression) are raised by the builder before
//! any traversal begins; traversal-time errors (permission-denied
//! directories, symlink cycles) surface from the result iterator and halt
//! further enumeration without retracting entries already yielded.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for operations that can produce [`FindError`].
pub type FindResult<T> = Result<T, FindError>;

/// Errors raised by the finder, each carrying the offending path or
/// expression for diagnosability.
#[derive(Debug, Error)]
pub enum FindError {
    /// A configured root does not exist or is not a readable directory.
    #[error("the \"{}\" directory does not exist or is not readable", path.display())]
    InvalidRoot { path: PathBuf },

    /// A name/path/content pattern failed to compile.
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A size, date or depth range expression could not be parsed.
    #[error("invalid range expression '{expr}': {message}")]
    InvalidRange { expr: String, message: String },

    /// A directory could not be opened during traversal.
    #[error("access denied: {}", path.display())]
    AccessDenied { path: PathBuf },

    /// Following symlinks led back into an already-visited directory.
    #[error("symlink cycle detected at {}", path.display())]
    SymlinkCycle { path: PathBuf },

    /// Content was requested from an entry that cannot provide it.
    #[error("cannot read contents of {}", path.display())]
    NotReadable { path: PathBuf },

    /// The platform does not report inode change time for this entry.
    #[error("changed time is not available for {}", path.display())]
    ChangedTimeUnsupported { path: PathBuf },

    /// Any other I/O failure during traversal.
    #[error("filesystem error {}: {source}", path.display())]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
}

impl From<walkdir::Error> for FindError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
        if let Some(ancestor) = err.loop_ancestor() {
            return FindError::SymlinkCycle {
                path: ancestor.to_path_buf(),
            };
        }
        match err.io_error().map(std::io::Error::kind) {
            Some(std::io::ErrorKind::PermissionDenied) => FindError::AccessDenied { path },
            _ => FindError::Io {
                source: err.into(),
                path,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_invalid_root_display() {
        let err = FindError::InvalidRoot {
            path: PathBuf::from("/unknown"),
        };
        assert_eq!(
            err.to_string(),
            "the \"/unknown\" directory does not exist or is not readable"
        );
    }

    #[test]
    fn test_access_denied_display() {
        let err = FindError::AccessDenied {
            path: PathBuf::from("/restricted"),
        };
        assert_eq!(err.to_string(), "access denied: /restricted");
    }

    #[test]
    fn test_io_error_display() {
        let err = FindError::Io {
            source: io::Error::new(io::ErrorKind::NotFound, "file not found"),
            path: PathBuf::from("/test/path"),
        };
        assert_eq!(
            err.to_string(),
            "filesystem error /test/path: file not found"
        );
    }

    #[test]
    fn test_invalid_range_display() {
        let err = FindError::InvalidRange {
            expr: "> 1X".to_string(),
            message: "unknown size unit 'X'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid range expression '> 1X': unknown size unit 'X'"
        );
    }
}
