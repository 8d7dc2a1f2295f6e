//! Structured error handling, failure classification and exit codes.
//!
//! Every per-item failure the pipeline absorbs (an unreachable root, an
//! unreadable entry, a file that vanished before hashing, a failed delete)
//! is surfaced to callers as an [`Issue`]: the offending path plus a
//! [`FailureKind`]. Batch operations never abort on a single item.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Exit codes for the doppelganger binary.
///
/// - 0: Success (completed normally, duplicates found)
/// - 1: General error (unexpected failure or invalid configuration)
/// - 2: No duplicates found (completed normally, no duplicates)
/// - 3: Partial success (completed, but some items were skipped)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: Scan completed and duplicates were found.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// No duplicates: Scan completed but no duplicates were found.
    NoDuplicates = 2,
    /// Partial success: Scan completed but some entries could not be processed.
    PartialSuccess = 3,
    /// Interrupted: Scan was interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DG000",
            Self::GeneralError => "DG001",
            Self::NoDuplicates => "DG002",
            Self::PartialSuccess => "DG003",
            Self::Interrupted => "DG130",
        }
    }
}

/// Structured error information for `--json-errors` output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DG001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}

/// Classification of a per-item failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A scan root is missing or is not a directory. The root is skipped.
    FilesystemUnreachable,
    /// An entry could not be listed or stat'ed during the walk. The entry is skipped.
    EntryUnreadable,
    /// A candidate could not be read while hashing. It is excluded from grouping.
    HashReadFailure,
    /// A delete request failed for one path. The remaining paths are still processed.
    RemovalFailure,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FilesystemUnreachable => "filesystem unreachable",
            Self::EntryUnreadable => "entry unreadable",
            Self::HashReadFailure => "hash read failure",
            Self::RemovalFailure => "removal failure",
        };
        f.write_str(name)
    }
}

/// A single absorbed failure: which path, what kind, and the underlying message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Path the failure relates to
    pub path: PathBuf,
    /// Failure classification
    pub kind: FailureKind,
    /// Human-readable detail from the underlying error
    pub message: String,
}

impl Issue {
    /// Create a new issue.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }

    /// Path the failure relates to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}
