//! File removal for confirmed duplicate copies.
//!
//! # Overview
//!
//! Deletion is attempted independently per path: a failure on one path
//! (already gone, permission denied) is recorded and the batch moves on.
//! Callers get one outcome per requested path, in request order.
//!
//! Files are removed permanently by default; [`DeleteConfig::trash`] moves
//! them to the platform trash instead.
//!
//! # Example
//!
//! ```no_run
//! use doppelganger::actions::delete::{delete_batch, DeleteConfig};
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("/data/b/y.jpg")];
//! let result = delete_batch(&paths, &DeleteConfig::trash());
//! println!("{}", result.summary());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::duplicates::DuplicateStats;
use crate::error::{FailureKind, Issue};
use crate::output::format_size;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The path is not a member of the current scan.
    #[error("not part of the current scan: {0}")]
    NotTracked(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::NotTracked(p)
            | Self::TrashFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }

    /// Failure classification (always a removal failure).
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        FailureKind::RemovalFailure
    }

    /// Convert into a reportable issue.
    #[must_use]
    pub fn to_issue(&self) -> Issue {
        Issue::new(self.path(), self.kind(), self.to_string())
    }
}

/// Result of a successful deletion operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether the file went to the trash rather than being removed outright.
    pub trashed: bool,
}

/// Results of a batch deletion, one entry per requested path.
#[derive(Debug, Default)]
pub struct BatchDeleteResult {
    /// Per-path outcomes in request order.
    pub outcomes: Vec<Result<DeleteResult, DeleteError>>,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    /// Record one outcome.
    pub fn push(&mut self, outcome: Result<DeleteResult, DeleteError>) {
        if let Ok(deleted) = &outcome {
            self.bytes_freed += deleted.size;
        }
        self.outcomes.push(outcome);
    }

    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(Result::is_ok)
    }

    /// Paths that were actually removed.
    #[must_use]
    pub fn removed_paths(&self) -> Vec<PathBuf> {
        self.outcomes
            .iter()
            .filter_map(|o| o.as_ref().ok().map(|d| d.path.clone()))
            .collect()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let freed = format_size(self.bytes_freed);
        if self.all_succeeded() {
            format!("Deleted {} file(s), freed {}", self.success_count(), freed)
        } else {
            format!(
                "Deleted {} file(s), {} failed, freed {}",
                self.success_count(),
                self.failure_count(),
                freed
            )
        }
    }
}

/// Configuration for deletion operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteConfig {
    /// Move to the platform trash instead of unlinking.
    pub trash: bool,
}

impl DeleteConfig {
    /// Create config for trash deletion.
    #[must_use]
    pub fn trash() -> Self {
        Self { trash: true }
    }

    /// Create config for permanent deletion.
    #[must_use]
    pub fn permanent() -> Self {
        Self { trash: false }
    }
}

/// Delete a single file.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `TrashFailed` if the trash operation fails
pub fn delete_file(path: &Path, config: &DeleteConfig) -> Result<DeleteResult, DeleteError> {
    let size = fs::symlink_metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();

    if config.trash {
        trash::delete(path).map_err(|e| {
            log::error!("Trash operation failed for {}: {}", path.display(), e);
            DeleteError::TrashFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
        log::info!("Moved to trash: {} ({} bytes)", path.display(), size);
    } else {
        fs::remove_file(path).map_err(|e| {
            log::error!("Delete failed for {}: {}", path.display(), e);
            DeleteError::from_io(path, e)
        })?;
        log::info!("Deleted: {} ({} bytes)", path.display(), size);
    }

    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        trashed: config.trash,
    })
}

/// Delete multiple files, continuing past individual failures.
pub fn delete_batch(paths: &[PathBuf], config: &DeleteConfig) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();

    for path in paths {
        let outcome = delete_file(path, config);
        if let Err(e) = &outcome {
            log::warn!("Failed to delete {}: {}", path.display(), e);
        }
        result.push(outcome);
    }

    log::info!("{}", result.summary());
    result
}

/// What happened to one requested path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalOutcome {
    /// The requested path
    pub path: PathBuf,
    /// Bytes freed, or why the path could not be removed
    pub result: Result<u64, Issue>,
}

impl RemovalOutcome {
    /// Whether the path was removed.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcome of a removal request against a finished scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RemovalReport {
    /// One entry per requested path, in request order
    pub outcomes: Vec<RemovalOutcome>,
    /// Groups that dropped below two members and were dissolved
    pub dissolved_groups: usize,
    /// Statistics recomputed after the removal
    pub stats: DuplicateStats,
}

impl RemovalReport {
    /// Number of paths removed.
    #[must_use]
    pub fn removed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_removed()).count()
    }

    /// Issues for paths that could not be removed.
    #[must_use]
    pub fn issues(&self) -> Vec<Issue> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().cloned())
            .collect()
    }
}

impl From<Result<DeleteResult, DeleteError>> for RemovalOutcome {
    fn from(outcome: Result<DeleteResult, DeleteError>) -> Self {
        match outcome {
            Ok(deleted) => Self {
                path: deleted.path,
                result: Ok(deleted.size),
            },
            Err(e) => Self {
                path: e.path().to_path_buf(),
                result: Err(e.to_issue()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_temp_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).expect("Failed to write temp file");
        path
    }

    #[test]
    fn test_delete_error_path_and_kind() {
        let path = PathBuf::from("/test/path");

        let err = DeleteError::NotFound(path.clone());
        assert_eq!(err.path(), path.as_path());
        assert_eq!(err.kind(), FailureKind::RemovalFailure);
        assert!(err.to_string().contains("not found"));

        let issue = DeleteError::PermissionDenied(path.clone()).to_issue();
        assert_eq!(issue.path, path);
        assert_eq!(issue.kind, FailureKind::RemovalFailure);
    }

    #[test]
    fn test_delete_config() {
        assert!(!DeleteConfig::default().trash);
        assert!(DeleteConfig::trash().trash);
        assert!(!DeleteConfig::permanent().trash);
    }

    #[test]
    fn test_delete_file_permanent() {
        let dir = TempDir::new().unwrap();
        let path = create_temp_file(&dir, "victim.txt", b"12345");

        let result = delete_file(&path, &DeleteConfig::permanent()).unwrap();

        assert_eq!(result.size, 5);
        assert!(!result.trashed);
        assert!(!path.exists());
    }

    #[test]
    fn test_delete_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("never-existed.txt");

        let err = delete_file(&path, &DeleteConfig::permanent()).unwrap_err();
        assert!(matches!(err, DeleteError::NotFound(p) if p == path));
    }

    #[test]
    fn test_delete_batch_continues_on_error() {
        let dir = TempDir::new().unwrap();
        let a = create_temp_file(&dir, "a.txt", b"aaa");
        let missing = dir.path().join("missing.txt");
        let b = create_temp_file(&dir, "b.txt", b"bbbb");

        let result = delete_batch(&[a.clone(), missing.clone(), b.clone()], &DeleteConfig::default());

        assert_eq!(result.outcomes.len(), 3);
        assert_eq!(result.success_count(), 2);
        assert_eq!(result.failure_count(), 1);
        assert!(!result.all_succeeded());
        assert_eq!(result.bytes_freed, 7);
        assert_eq!(result.removed_paths(), vec![a.clone(), b.clone()]);
        assert!(result.outcomes[1].is_err());
        assert!(result.summary().contains("1 failed"));
        assert!(!a.exists());
        assert!(!b.exists());
    }

    #[test]
    fn test_batch_summary_all_succeeded() {
        let mut result = BatchDeleteResult::default();
        result.push(Ok(DeleteResult {
            path: PathBuf::from("/a"),
            size: 10_000_000,
            trashed: false,
        }));

        assert!(result.all_succeeded());
        let summary = result.summary();
        assert!(summary.starts_with("Deleted 1 file(s), freed 10"));
        assert!(summary.ends_with("MB"));
    }

    #[test]
    fn test_removal_outcome_from_result() {
        let ok: RemovalOutcome = Ok(DeleteResult {
            path: PathBuf::from("/a"),
            size: 3,
            trashed: false,
        })
        .into();
        assert!(ok.is_removed());
        assert_eq!(ok.result, Ok(3));

        let failed: RemovalOutcome = Err(DeleteError::NotFound(PathBuf::from("/b"))).into();
        assert!(!failed.is_removed());
        assert_eq!(failed.path, PathBuf::from("/b"));

        let report = RemovalReport {
            outcomes: vec![ok, failed],
            ..Default::default()
        };
        assert_eq!(report.removed_count(), 1);
        assert_eq!(report.issues().len(), 1);
    }
}
