//! JSON output formatter for scan results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "groups": [
//!     { "hash": "3f2a…", "size": 10000000, "paths": ["/data/a/x.jpg", "/data/b/y.jpg"] }
//!   ],
//!   "stats": { "duplicate_groups": 1, "redundant_files": 1, "redundant_bytes": 10000000 },
//!   "summary": { "roots": ["/data/a"], "total_files": 3, "scan_duration_ms": 40, ... },
//!   "issues": [ { "path": "/data/c", "kind": "filesystem_unreachable", "message": "..." } ],
//!   "removals": [ { "path": "/data/b/y.jpg", "removed": true, "bytes_freed": 10000000 } ],
//!   "exit_code": 0,
//!   "exit_code_name": "DG000"
//! }
//! ```
//!
//! `removals` is present only when a removal was requested.

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use crate::actions::delete::RemovalReport;
use crate::duplicates::{DuplicateGroup, DuplicateStats, ScanReport};
use crate::error::{ExitCode, Issue};

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Canonical roots that were walked
    pub roots: Vec<PathBuf>,
    /// Files that passed the filter
    pub total_files: usize,
    /// Combined size of those files in bytes
    pub total_size: u64,
    /// Files ruled out because their size was unique
    pub eliminated_by_size: usize,
    /// Files dispatched for hashing
    pub candidates: usize,
    /// Files fingerprinted
    pub hashed: usize,
    /// Files that could not be read
    pub failed: usize,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
}

/// One removal outcome in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRemoval {
    /// Requested path
    pub path: PathBuf,
    /// Whether the file was removed
    pub removed: bool,
    /// Bytes freed (0 when not removed)
    pub bytes_freed: u64,
    /// Failure detail when not removed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    /// Active duplicate groups (after removal, if any)
    pub groups: &'a [DuplicateGroup],
    /// Aggregate statistics
    pub stats: DuplicateStats,
    /// Scan summary
    pub summary: JsonSummary,
    /// Skipped roots, entries, files and failed removals
    pub issues: &'a [Issue],
    /// Per-path removal outcomes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removals: Option<Vec<JsonRemoval>>,
    /// Process exit code
    pub exit_code: i32,
    /// Machine-readable exit code name
    pub exit_code_name: &'static str,
}

impl<'a> JsonOutput<'a> {
    /// Build the document from a report.
    #[must_use]
    pub fn new(report: &'a ScanReport, exit_code: ExitCode) -> Self {
        let summary = &report.summary;
        Self {
            groups: &report.groups,
            stats: report.stats,
            summary: JsonSummary {
                roots: summary.roots.clone(),
                total_files: summary.total_files,
                total_size: summary.total_size,
                eliminated_by_size: summary.eliminated_by_size,
                candidates: summary.candidates,
                hashed: summary.hashed,
                failed: summary.failed,
                scan_duration_ms: u64::try_from(summary.scan_duration.as_millis())
                    .unwrap_or(u64::MAX),
            },
            issues: &report.issues,
            removals: None,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix(),
        }
    }

    /// Attach removal outcomes.
    #[must_use]
    pub fn with_removal(mut self, removal: Option<&RemovalReport>) -> Self {
        self.removals = removal.map(|r| {
            r.outcomes
                .iter()
                .map(|o| JsonRemoval {
                    path: o.path.clone(),
                    removed: o.is_removed(),
                    bytes_freed: *o.result.as_ref().unwrap_or(&0),
                    error: o.result.as_ref().err().map(|issue| issue.message.clone()),
                })
                .collect()
        });
        self
    }

    /// Serialize to a compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to a pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error writing JSON: {0}")]
    Io(#[from] std::io::Error),
}
