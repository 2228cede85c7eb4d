//! Error type shared across the crate.
//!
//! Every failure carries enough context to be reported the way the CLI
//! promises: the offending path, the role the file was playing at the time
//! (`log`, `profile-simple`, `original-file`, ...) and an errno that becomes
//! the (negated) process exit code.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

// Fallback errnos for failures that do not come out of a syscall.
const EIO: i32 = 5;
const ENOMEM: i32 = 12;

/// File roles used in error reports.
pub mod role {
    pub const LOG: &str = "log";
    pub const WORKDIR: &str = "workdir";
    pub const WORKMEM: &str = "workmem";
    pub const ORIGINAL: &str = "original-file";
    pub const PROFILE: &str = "profile-simple";
}

#[derive(Debug, Error)]
pub enum Error {
    /// An underlying file operation failed.
    #[error("{} ({role}): {source}", .path.display())]
    Io {
        path: PathBuf,
        role: &'static str,
        #[source]
        source: io::Error,
    },

    /// The recovery log disagrees with itself or with the replaying stage.
    #[error("{} (log): recovery log corrupt", .path.display())]
    LogCorrupt { path: PathBuf },

    /// A profile file is malformed (truncated record, bad flag byte).
    #[error("{} (profile-simple): profile corrupt", .path.display())]
    ProfileCorrupt { path: PathBuf },

    /// A single word does not fit into an empty working memory region.
    #[error("working memory too small for a single word; rerun with a larger --memory-size")]
    InsufficientMemory,
}

impl Error {
    /// Wrap an `io::Error` with the path and role it occurred under.
    pub fn io(path: impl Into<PathBuf>, role: &'static str, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            role,
            source,
        }
    }

    /// Shorthand for failures reported via a raw errno (no `io::Error` at hand).
    pub fn errno(path: impl Into<PathBuf>, role: &'static str, eno: i32) -> Self {
        Error::io(path, role, io::Error::from_raw_os_error(eno))
    }

    /// The errno this error maps to; the process exits with its negation.
    pub fn exit_errno(&self) -> i32 {
        match self {
            Error::Io { source, .. } => source.raw_os_error().unwrap_or(EIO),
            Error::LogCorrupt { .. } | Error::ProfileCorrupt { .. } => EIO,
            Error::InsufficientMemory => ENOMEM,
        }
    }

    /// True when the underlying cause is a read that ran off the end of the
    /// file. Log and profile readers upgrade this to their corruption kinds.
    pub fn is_premature_eof(&self) -> bool {
        matches!(
            self,
            Error::Io { source, .. } if source.kind() == io::ErrorKind::UnexpectedEof
        )
    }

    /// The path involved, when there is one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::Io { path, .. }
            | Error::LogCorrupt { path }
            | Error::ProfileCorrupt { path } => Some(path),
            Error::InsufficientMemory => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_errno_prefers_raw_os_error() {
        let err = Error::errno("/x", role::LOG, 2);
        assert_eq!(err.exit_errno(), 2);

        let custom = Error::io(
            "/x",
            role::LOG,
            io::Error::new(io::ErrorKind::UnexpectedEof, "eof"),
        );
        assert_eq!(custom.exit_errno(), EIO);
        assert!(custom.is_premature_eof());
    }

    #[test]
    fn corruption_kinds_map_to_eio() {
        let err = Error::LogCorrupt {
            path: PathBuf::from("/w/log"),
        };
        assert_eq!(err.exit_errno(), EIO);
        assert_eq!(err.path().unwrap(), Path::new("/w/log"));
    }
}
