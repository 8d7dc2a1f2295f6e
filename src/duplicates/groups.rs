//! Size grouping and duplicate group types.
//!
//! # Overview
//!
//! Size grouping is the cheap pre-filter in front of hashing. Files are
//! bucketed by exact byte size; any file whose size is globally unique
//! cannot have a content twin and is dropped before a single byte is read.
//! Only buckets with two or more members become hashing candidates.
//!
//! # Example
//!
//! ```
//! use doppelganger::scanner::FileEntry;
//! use doppelganger::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/file1.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file2.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file3.txt"), 2048),
//! ];
//!
//! let (groups, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.candidate_files, 2);
//! assert_eq!(groups.len(), 1);
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::scanner::{hash_to_hex, FileEntry, Hash, ScanError, Walker};

/// Statistics from the size grouping pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes
    pub unique_sizes: usize,
    /// Number of files that share a size with at least one other file
    pub candidate_files: usize,
    /// Number of files eliminated because their size is unique
    pub eliminated_unique: usize,
    /// Number of size buckets with 2+ files
    pub candidate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Bucket files by exact size. Every bucket is kept, singletons included.
#[must_use]
pub fn bucket_by_size(files: impl IntoIterator<Item = FileEntry>) -> BTreeMap<u64, Vec<FileEntry>> {
    let mut buckets: BTreeMap<u64, Vec<FileEntry>> = BTreeMap::new();
    for file in files {
        buckets.entry(file.size).or_default().push(file);
    }
    buckets
}

/// Group files by size and keep only buckets with two or more members.
///
/// Single pass over the input; no file I/O is performed.
///
/// # Returns
///
/// A tuple of:
/// - `BTreeMap<u64, Vec<FileEntry>>` - Files grouped by size (only groups with 2+ files)
/// - `GroupingStats` - Statistics about the grouping operation
///
/// # Example
///
/// ```
/// use doppelganger::scanner::FileEntry;
/// use doppelganger::duplicates::group_by_size;
/// use std::path::PathBuf;
///
/// let files = vec![
///     FileEntry::new(PathBuf::from("/a.txt"), 100),
///     FileEntry::new(PathBuf::from("/b.txt"), 100),
///     FileEntry::new(PathBuf::from("/c.txt"), 200),
/// ];
///
/// let (groups, stats) = group_by_size(files);
///
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[&100].len(), 2);
/// assert_eq!(stats.eliminated_unique, 1);
/// ```
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileEntry>,
) -> (BTreeMap<u64, Vec<FileEntry>>, GroupingStats) {
    let mut stats = GroupingStats::default();

    let buckets = bucket_by_size(files.into_iter().inspect(|file| {
        stats.total_files += 1;
        stats.total_size += file.size;
    }));
    stats.unique_sizes = buckets.len();

    let groups: BTreeMap<u64, Vec<FileEntry>> = buckets
        .into_iter()
        .filter(|(size, files)| {
            if files.len() == 1 {
                stats.eliminated_unique += 1;
                log::trace!("Eliminated unique size {}: {}", size, files[0].path.display());
                false
            } else {
                stats.candidate_files += files.len();
                stats.candidate_groups += 1;
                log::debug!("Size group {} bytes: {} candidates", size, files.len());
                true
            }
        })
        .collect();

    log::info!(
        "Size grouping complete: {} files -> {} candidates ({:.1}% eliminated)",
        stats.total_files,
        stats.candidate_files,
        stats.elimination_rate()
    );

    (groups, stats)
}

/// Output of the walk + size grouping stage.
#[derive(Debug, Default)]
pub struct CandidateSet {
    /// Files sharing a size with at least one other file
    pub candidates: Vec<FileEntry>,
    /// Grouping statistics
    pub grouping: GroupingStats,
    /// Roots and entries that were skipped during the walk
    pub errors: Vec<ScanError>,
}

/// Walk all roots and reduce the result to hashing candidates.
///
/// Walk errors are collected rather than propagated.
#[must_use]
pub fn collect_candidates(walker: &Walker) -> CandidateSet {
    let mut errors = Vec::new();
    let files = walker.walk().filter_map(|result| match result {
        Ok(file) => Some(file),
        Err(e) => {
            errors.push(e);
            None
        }
    });

    let (groups, grouping) = group_by_size(files);
    let candidates = groups.into_values().flatten().collect();

    CandidateSet {
        candidates,
        grouping,
        errors,
    }
}

/// A set of two or more files verified to share one content fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// SHA-256 of the shared content
    #[serde(serialize_with = "serialize_hash")]
    pub hash: Hash,
    /// Size of one member in bytes (all members are identical)
    pub size: u64,
    /// Member paths, sorted
    pub paths: Vec<PathBuf>,
}

fn serialize_hash<S: serde::Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hash_to_hex(hash))
}

impl DuplicateGroup {
    /// Create a new duplicate group. Paths are sorted for stable output.
    #[must_use]
    pub fn new(hash: Hash, size: u64, mut paths: Vec<PathBuf>) -> Self {
        paths.sort();
        Self { hash, size, paths }
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of redundant copies (all members minus one).
    #[must_use]
    pub fn redundant_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Bytes reclaimable by keeping a single copy.
    #[must_use]
    pub fn redundant_bytes(&self) -> u64 {
        self.size * self.redundant_count() as u64
    }

    /// Total size of all members.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.paths.len() as u64
    }

    /// Fingerprint as lower-case hex.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }

    /// Whether `path` is a member.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }
}
