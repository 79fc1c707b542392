//! Error types for caplock operations.
//!
//! Every failure that can end a run is one variant of [`CaplockError`]. The
//! variant decides the process exit status through [`CaplockError::exit_code`]:
//!
//! - `Config`: the invocation itself is wrong (flags, patterns, config file,
//!   missing `go.mod`). Exit status 2.
//! - `Environment`, `Load`, `Analyzer`, `Io`: something outside the
//!   invocation failed. Exit status 1.
//!
//! # Example
//!
//! ```rust
//! use caplock::errors::{CaplockError, ExitStatus};
//!
//! let err = CaplockError::config("disable_builtin requires capability_map");
//! assert_eq!(err.exit_code(), ExitStatus::INVOCATION_ERROR);
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Process exit status reported by the `caplock` binary.
///
/// The non-zero codes are distinct bits; a single run sets at most one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitStatus(u8);

impl ExitStatus {
    /// The run finished and nothing changed.
    pub const SUCCESS: ExitStatus = ExitStatus(0);
    /// Resolution, load, analyzer or filesystem failure.
    pub const INTERNAL_ERROR: ExitStatus = ExitStatus(1);
    /// Bad flags or configuration.
    pub const INVOCATION_ERROR: ExitStatus = ExitStatus(2);
    /// The comparison against the baseline reported differences.
    pub const CAPABILITY_CHANGE: ExitStatus = ExitStatus(4);

    /// Get the raw status code.
    #[must_use]
    pub const fn code(&self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status.0)
    }
}

/// Main error type for caplock operations
#[derive(Debug, Error)]
pub enum CaplockError {
    /// Invalid flags, patterns or configuration file
    #[error("{0}")]
    Config(String),

    /// The Go toolchain or another program is unusable
    #[error("{0}")]
    Environment(String),

    /// The package graph could not be loaded
    #[error("load: {0}")]
    Load(String),

    /// The capslock analyzer exited unsuccessfully
    #[error("capslock: {status}: {stderr}")]
    Analyzer { status: String, stderr: String },

    /// Baseline or config file access failed
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CaplockError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an environment error.
    pub fn environment(message: impl Into<String>) -> Self {
        Self::Environment(message.into())
    }

    /// Create a package load error.
    pub fn load(message: impl Into<String>) -> Self {
        Self::Load(message.into())
    }

    /// Create an analyzer error from the exit status text and captured stderr.
    pub fn analyzer(status: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::Analyzer {
            status: status.into(),
            stderr: stderr.into(),
        }
    }

    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if this error is something the user can fix by changing the
    /// invocation.
    #[must_use]
    pub fn is_user_fixable(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Get the exit status for this error.
    #[must_use]
    pub fn exit_code(&self) -> ExitStatus {
        if self.is_user_fixable() {
            ExitStatus::INVOCATION_ERROR
        } else {
            ExitStatus::INTERNAL_ERROR
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, CaplockError>;
