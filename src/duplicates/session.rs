//! Per-scan aggregation state.
//!
//! A [`ScanSession`] is created fresh for every scan. It owns the candidate
//! list, the fingerprint → paths mapping and the hashing progress counters.
//! Hash workers never touch it directly: their [`HashOutcome`]s travel over a
//! channel and the single aggregating thread applies them one at a time with
//! [`ScanSession::record`], so each update is one append-and-count and no
//! reader ever observes a half-updated group.
//!
//! Groups and statistics are derived on demand from current membership,
//! never maintained incrementally.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use super::groups::DuplicateGroup;
use crate::error::Issue;
use crate::scanner::{FileEntry, Hash, HashError, ScanError};

/// An immutable (fingerprint, path) pair produced by one hash task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintResult {
    hash: Hash,
    path: PathBuf,
}

impl FingerprintResult {
    /// Create a new result.
    #[must_use]
    pub fn new(hash: Hash, path: PathBuf) -> Self {
        Self { hash, path }
    }

    /// Content fingerprint.
    #[must_use]
    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    /// Path that was hashed.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Result of one hash task.
#[derive(Debug)]
pub enum HashOutcome {
    /// The file was read and fingerprinted.
    Hashed(FingerprintResult),
    /// The file could not be opened or read.
    Failed(HashError),
    /// The task belonged to a superseded or interrupted scan and did no work.
    Cancelled(PathBuf),
}

impl HashOutcome {
    /// Path this outcome is about.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Hashed(result) => result.path(),
            Self::Failed(e) => e.path(),
            Self::Cancelled(path) => path,
        }
    }
}

/// Hashing progress: results received versus tasks dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HashProgress {
    /// Results received so far (successes and failures)
    pub completed: usize,
    /// Candidates dispatched
    pub total: usize,
}

impl HashProgress {
    /// Whether every dispatched task has reported.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}

/// Aggregate duplicate statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateStats {
    /// Number of active groups
    pub duplicate_groups: usize,
    /// Sum over groups of (members - 1)
    pub redundant_files: usize,
    /// Sum over groups of (members - 1) * member size
    pub redundant_bytes: u64,
}

impl DuplicateStats {
    /// Compute statistics from a set of groups.
    #[must_use]
    pub fn from_groups(groups: &[DuplicateGroup]) -> Self {
        groups.iter().fold(Self::default(), |mut stats, group| {
            stats.duplicate_groups += 1;
            stats.redundant_files += group.redundant_count();
            stats.redundant_bytes += group.redundant_bytes();
            stats
        })
    }
}

/// Summary of a completed scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanSummary {
    /// Canonical roots that were walked
    pub roots: Vec<PathBuf>,
    /// Files that passed the filter
    pub total_files: usize,
    /// Combined size of those files
    pub total_size: u64,
    /// Files dropped because their size was unique
    pub eliminated_by_size: usize,
    /// Files dispatched for hashing
    pub candidates: usize,
    /// Files successfully fingerprinted
    pub hashed: usize,
    /// Files that failed to hash
    pub failed: usize,
    /// Wall-clock duration of the scan
    pub scan_duration: Duration,
}

/// Everything a presentation layer needs after a scan or removal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// Active duplicate groups, largest reclaimable space first
    pub groups: Vec<DuplicateGroup>,
    /// Aggregate statistics over `groups`
    pub stats: DuplicateStats,
    /// Scan summary
    pub summary: ScanSummary,
    /// Absorbed per-item failures
    pub issues: Vec<Issue>,
}

impl ScanReport {
    /// Whether at least one active group exists.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }
}

/// State of one scan invocation.
#[derive(Debug, Clone, Default)]
pub struct ScanSession {
    generation: u64,
    /// Active candidate path → size from the walk
    candidates: BTreeMap<PathBuf, u64>,
    /// Fingerprint → member paths
    fingerprints: HashMap<Hash, Vec<PathBuf>>,
    /// Path → its fingerprint
    owners: HashMap<PathBuf, Hash>,
    completed: usize,
    total: usize,
    issues: Vec<Issue>,
    summary: ScanSummary,
}

impl ScanSession {
    /// Create an empty session for the given scan generation.
    #[must_use]
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            ..Default::default()
        }
    }

    /// Generation of the scan this session belongs to.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Record walk failures as issues.
    pub fn record_walk_errors(&mut self, errors: impl IntoIterator<Item = ScanError>) {
        self.issues.extend(errors.into_iter().map(|e| e.to_issue()));
    }

    /// Install the candidate list and reset hashing counters.
    pub fn begin_hashing(&mut self, candidates: &[FileEntry]) {
        self.candidates = candidates
            .iter()
            .map(|file| (file.path.clone(), file.size))
            .collect();
        self.fingerprints.clear();
        self.owners.clear();
        self.completed = 0;
        self.total = self.candidates.len();
        self.summary.candidates = self.total;
        self.summary.hashed = 0;
        self.summary.failed = 0;
    }

    /// Apply one hash outcome.
    ///
    /// Returns `false` when the outcome is about a path this session is not
    /// tracking; such outcomes are ignored and not counted.
    pub fn record(&mut self, outcome: HashOutcome) -> bool {
        if !self.candidates.contains_key(outcome.path()) || self.owners.contains_key(outcome.path())
        {
            log::debug!("Ignoring outcome for untracked path {}", outcome.path().display());
            return false;
        }

        match outcome {
            HashOutcome::Hashed(result) => {
                let FingerprintResult { hash, path } = result;
                self.fingerprints.entry(hash).or_default().push(path.clone());
                self.owners.insert(path, hash);
                self.summary.hashed += 1;
            }
            HashOutcome::Failed(error) => {
                log::warn!("Excluding {}: {}", error.path().display(), error);
                self.candidates.remove(error.path());
                self.issues.push(error.to_issue());
                self.summary.failed += 1;
            }
            HashOutcome::Cancelled(path) => {
                self.candidates.remove(&path);
            }
        }

        self.completed += 1;
        true
    }

    /// Current hashing progress.
    #[must_use]
    pub fn progress(&self) -> HashProgress {
        HashProgress {
            completed: self.completed,
            total: self.total,
        }
    }

    /// Whether every dispatched hash task has reported.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.progress().is_complete()
    }

    /// Whether `path` is an active candidate.
    #[must_use]
    pub fn is_tracked(&self, path: &Path) -> bool {
        self.candidates.contains_key(path)
    }

    /// Whether `path` belongs to an active duplicate group.
    #[must_use]
    pub fn is_duplicate(&self, path: &Path) -> bool {
        self.owners
            .get(path)
            .and_then(|hash| self.fingerprints.get(hash))
            .is_some_and(|paths| paths.len() >= 2)
    }

    /// Active candidates with their sizes.
    pub fn candidates(&self) -> impl Iterator<Item = (&Path, u64)> {
        self.candidates.iter().map(|(p, s)| (p.as_path(), *s))
    }

    /// Number of active candidates.
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Active duplicate groups (2+ members), largest reclaimable space first.
    #[must_use]
    pub fn groups(&self) -> Vec<DuplicateGroup> {
        let mut groups: Vec<DuplicateGroup> = self
            .fingerprints
            .iter()
            .filter(|(_, paths)| paths.len() >= 2)
            .map(|(hash, paths)| {
                let size = paths
                    .iter()
                    .find_map(|p| self.candidates.get(p).copied())
                    .unwrap_or(0);
                DuplicateGroup::new(*hash, size, paths.clone())
            })
            .collect();

        groups.sort_by(|a, b| {
            b.redundant_bytes()
                .cmp(&a.redundant_bytes())
                .then_with(|| a.hash.cmp(&b.hash))
        });
        groups
    }

    /// Aggregate statistics, recomputed from current membership.
    #[must_use]
    pub fn stats(&self) -> DuplicateStats {
        DuplicateStats::from_groups(&self.groups())
    }

    /// Group containing `path`, if it is an active duplicate.
    #[must_use]
    pub fn group_of(&self, path: &Path) -> Option<DuplicateGroup> {
        let hash = self.owners.get(path)?;
        let paths = self.fingerprints.get(hash)?;
        if paths.len() < 2 {
            return None;
        }
        let size = self.candidates.get(path).copied().unwrap_or(0);
        Some(DuplicateGroup::new(*hash, size, paths.clone()))
    }

    /// Active group members located directly inside `dir`.
    ///
    /// Lets a presentation layer select every copy living in one folder.
    #[must_use]
    pub fn members_in_directory(&self, dir: &Path) -> Vec<PathBuf> {
        let mut members: Vec<PathBuf> = self
            .fingerprints
            .values()
            .filter(|paths| paths.len() >= 2)
            .flatten()
            .filter(|p| p.parent() == Some(dir))
            .cloned()
            .collect();
        members.sort();
        members
    }

    /// Retract successfully removed paths.
    ///
    /// Every group that drops below two members is dissolved and its sole
    /// survivor leaves the candidate set. Returns the number of groups
    /// dissolved.
    pub fn apply_removals(&mut self, removed: &[PathBuf]) -> usize {
        let mut touched: HashMap<Hash, usize> = HashMap::new();

        for path in removed {
            self.candidates.remove(path);
            let Some(hash) = self.owners.remove(path) else {
                continue;
            };
            if let Some(paths) = self.fingerprints.get_mut(&hash) {
                touched.entry(hash).or_insert(paths.len());
                paths.retain(|p| p != path);
            }
        }

        let mut dissolved = 0;
        for (hash, before) in touched {
            let remaining = self.fingerprints.get(&hash).map_or(0, Vec::len);
            if remaining >= 2 {
                continue;
            }

            if let Some(survivors) = self.fingerprints.remove(&hash) {
                for survivor in survivors {
                    log::debug!("Group dissolved, dropping {}", survivor.display());
                    self.candidates.remove(&survivor);
                    self.owners.remove(&survivor);
                }
            }
            if before >= 2 {
                dissolved += 1;
            }
        }

        dissolved
    }

    /// Add an issue.
    pub fn push_issue(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Absorbed per-item failures.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Scan summary.
    #[must_use]
    pub fn summary(&self) -> &ScanSummary {
        &self.summary
    }

    pub(crate) fn summary_mut(&mut self) -> &mut ScanSummary {
        &mut self.summary
    }

    /// Snapshot of groups, stats, summary and issues.
    #[must_use]
    pub fn report(&self) -> ScanReport {
        let groups = self.groups();
        let stats = DuplicateStats::from_groups(&groups);
        ScanReport {
            groups,
            stats,
            summary: self.summary.clone(),
            issues: self.issues.clone(),
        }
    }

    /// Paths of every group member, deduplicated.
    #[must_use]
    pub fn duplicate_paths(&self) -> HashSet<PathBuf> {
        self.fingerprints
            .values()
            .filter(|paths| paths.len() >= 2)
            .flatten()
            .cloned()
            .collect()
    }
}
