//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based candidate selection
//! - Per-scan aggregation of fingerprints into duplicate groups
//! - Scan orchestration, supersession and removal

pub mod finder;
pub mod groups;
pub mod session;

pub use finder::{hash_all, DuplicateFinder, FinderConfig, FinderError, ScanEvent, ScanHandle};
pub use groups::{
    bucket_by_size, collect_candidates, group_by_size, CandidateSet, DuplicateGroup, GroupingStats,
};
pub use session::{
    DuplicateStats, FingerprintResult, HashOutcome, HashProgress, ScanReport, ScanSession,
    ScanSummary,
};
