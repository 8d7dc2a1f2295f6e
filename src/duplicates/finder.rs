//! Scan orchestration: configure, start, observe, adopt, remove.
//!
//! # Overview
//!
//! [`DuplicateFinder`] drives one scan at a time through the pipeline:
//!
//! 1. **Walk + size grouping** run sequentially on a dedicated scan thread
//!    as a single [`WalkTask`]; the full candidate set exists before any
//!    hashing starts.
//! 2. **Hashing** dispatches one [`HashTask`] per candidate onto the
//!    [`WorkerPool`]. Outcomes arrive on a channel in completion order and
//!    are folded into a fresh [`ScanSession`].
//! 3. **Barrier**: the terminal event is only sent once the number of
//!    outcomes received equals the number of tasks dispatched.
//!
//! Every call to [`DuplicateFinder::start_scan`] bumps a generation counter.
//! Tasks from an older generation still run to completion, but their outcomes
//! are dropped and the old [`ScanHandle`] resolves to
//! [`FinderError::Superseded`].
//!
//! # Example
//!
//! ```no_run
//! use doppelganger::duplicates::{DuplicateFinder, FinderConfig};
//! use doppelganger::scanner::ExtensionFilter;
//! use std::path::PathBuf;
//!
//! let mut finder = DuplicateFinder::new(FinderConfig::default()).unwrap();
//! finder.configure(
//!     vec![PathBuf::from("/data/a"), PathBuf::from("/data/b")],
//!     ExtensionFilter::new([".jpg"]),
//! );
//!
//! let report = finder.scan().unwrap();
//! for group in &report.groups {
//!     println!("{} copies of {}", group.len(), group.hash_hex());
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use super::session::{HashOutcome, ScanReport, ScanSession};
use crate::actions::delete::{DeleteConfig, DeleteError, RemovalOutcome, RemovalReport};
use crate::pool::{HashTask, RemoveTask, ScanTicket, Task, WalkTask, WorkerPool};
use crate::scanner::{ExtensionFilter, FileEntry, Hasher, Walker, WalkerConfig};

/// Errors that stop a scan or a removal request as a whole.
///
/// Per-file problems never show up here; they are reported as
/// [`Issue`](crate::error::Issue)s inside the scan report.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// No scan roots were configured.
    #[error("No scan roots configured")]
    NoRoots,

    /// A newer scan was started before this one finished.
    #[error("Scan superseded by a newer scan")]
    Superseded,

    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// A removal was requested before any scan completed.
    #[error("No completed scan to act on")]
    NoSession,

    /// The worker pool could not be created.
    #[error("Failed to create worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The scan thread panicked.
    #[error("Scan thread panicked")]
    WorkerPanicked,

    /// The scan thread could not be spawned.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration for the duplicate finder.
#[derive(Debug, Clone, Default)]
pub struct FinderConfig {
    /// Directories to scan (order-preserving, duplicates removed)
    pub roots: Vec<PathBuf>,
    /// Extension allow-list; empty accepts everything
    pub extensions: ExtensionFilter,
    /// Hash worker threads; 0 means one per available core
    pub io_threads: usize,
    /// Skip zero-length files
    pub skip_empty: bool,
    /// Shutdown flag for graceful termination
    pub shutdown_flag: Option<Arc<AtomicBool>>,
}

impl FinderConfig {
    /// Set the scan roots.
    #[must_use]
    pub fn with_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.roots = dedupe_roots(roots);
        self
    }

    /// Set the extension allow-list.
    #[must_use]
    pub fn with_extensions(mut self, extensions: ExtensionFilter) -> Self {
        self.extensions = extensions;
        self
    }

    /// Set the number of hash worker threads.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads;
        self
    }

    /// Skip zero-length files.
    #[must_use]
    pub fn with_skip_empty(mut self, skip: bool) -> Self {
        self.skip_empty = skip;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn effective_threads(&self) -> usize {
        if self.io_threads == 0 {
            WorkerPool::default_threads()
        } else {
            self.io_threads
        }
    }

    fn walker(&self) -> Walker {
        let walker = Walker::new(
            self.roots.clone(),
            WalkerConfig::new(self.extensions.clone(), self.skip_empty),
        );
        match &self.shutdown_flag {
            Some(flag) => walker.with_shutdown_flag(Arc::clone(flag)),
            None => walker,
        }
    }
}

fn dedupe_roots(roots: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    roots
        .into_iter()
        .filter(|root| seen.insert(root.clone()))
        .collect()
}

/// Notifications emitted while a scan runs.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// Walk and size grouping finished.
    Walked {
        /// Files that passed the filter
        files: usize,
        /// Files sharing a size with another file
        candidates: usize,
    },
    /// One more hash outcome was recorded.
    Progress {
        /// Outcomes received so far
        completed: usize,
        /// Hash tasks dispatched
        total: usize,
    },
    /// All candidates were hashed.
    Finished(ScanReport),
    /// The walk found no candidates; nothing was hashed.
    Empty(ScanReport),
}

impl ScanEvent {
    /// Whether this is the last event of a scan.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished(_) | Self::Empty(_))
    }
}

/// Handle to a running scan.
#[derive(Debug)]
pub struct ScanHandle {
    generation: u64,
    events: Receiver<ScanEvent>,
    worker: JoinHandle<Result<ScanSession, FinderError>>,
}

impl ScanHandle {
    /// Generation of this scan.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Blocking iterator over scan events; ends when the scan thread exits.
    pub fn events(&self) -> impl Iterator<Item = ScanEvent> + '_ {
        self.events.iter()
    }

    /// Wait for the scan to finish and return its session.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Superseded`] if a newer scan started,
    /// [`FinderError::Interrupted`] on shutdown, or
    /// [`FinderError::WorkerPanicked`] if the scan thread panicked.
    pub fn wait(self) -> Result<ScanSession, FinderError> {
        self.worker.join().map_err(|_| FinderError::WorkerPanicked)?
    }
}

/// Duplicate finder that owns the worker pool and the current scan session.
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
    generation: Arc<AtomicU64>,
    pool: Arc<WorkerPool>,
    hasher: Arc<Hasher>,
    session: Option<ScanSession>,
}

impl DuplicateFinder {
    /// Create a finder and start its worker pool.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::ThreadPool`] if the pool cannot be built.
    pub fn new(config: FinderConfig) -> Result<Self, FinderError> {
        let pool = WorkerPool::new(config.effective_threads())?;
        let hasher = match &config.shutdown_flag {
            Some(flag) => Hasher::new().with_shutdown_flag(Arc::clone(flag)),
            None => Hasher::new(),
        };

        Ok(Self {
            config,
            generation: Arc::new(AtomicU64::new(0)),
            pool: Arc::new(pool),
            hasher: Arc::new(hasher),
            session: None,
        })
    }

    /// Create a finder with default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::ThreadPool`] if the pool cannot be built.
    pub fn with_defaults() -> Result<Self, FinderError> {
        Self::new(FinderConfig::default())
    }

    /// Set scan roots and the extension allow-list for the next scan.
    pub fn configure(&mut self, roots: Vec<PathBuf>, extensions: ExtensionFilter) {
        self.config.roots = dedupe_roots(roots);
        self.config.extensions = extensions;
        log::debug!(
            "Configured {} root(s), {} extension(s)",
            self.config.roots.len(),
            self.config.extensions.len()
        );
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Number of hash worker threads.
    #[must_use]
    pub fn io_threads(&self) -> usize {
        self.pool.threads()
    }

    /// Start a scan in the background.
    ///
    /// Discards the current session and supersedes any scan still running.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::NoRoots`] before doing any work if no roots are
    /// configured, or [`FinderError::Io`] if the scan thread cannot start.
    pub fn start_scan(&mut self) -> Result<ScanHandle, FinderError> {
        if self.config.roots.is_empty() {
            return Err(FinderError::NoRoots);
        }

        self.session = None;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut ticket = ScanTicket::new(generation, Arc::clone(&self.generation));
        if let Some(flag) = &self.config.shutdown_flag {
            ticket = ticket.with_shutdown_flag(Arc::clone(flag));
        }

        let walker = self.config.walker();
        let pool = Arc::clone(&self.pool);
        let hasher = Arc::clone(&self.hasher);
        let (events_tx, events_rx) = mpsc::channel();

        log::info!(
            "Starting scan #{} over {} root(s)",
            generation,
            self.config.roots.len()
        );

        let worker = thread::Builder::new()
            .name(format!("doppelganger-scan-{generation}"))
            .spawn(move || run_scan(walker, &pool, &hasher, &ticket, &events_tx))?;

        Ok(ScanHandle {
            generation,
            events: events_rx,
            worker,
        })
    }

    /// Make a finished session current.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Superseded`] if a newer scan has been started
    /// since `session` was produced.
    pub fn adopt(&mut self, session: ScanSession) -> Result<&ScanSession, FinderError> {
        if session.generation() != self.generation.load(Ordering::SeqCst) {
            log::debug!("Refusing stale session #{}", session.generation());
            return Err(FinderError::Superseded);
        }
        Ok(self.session.insert(session))
    }

    /// Run a scan to completion, forwarding every event to `on_event`.
    ///
    /// # Errors
    ///
    /// See [`DuplicateFinder::start_scan`] and [`ScanHandle::wait`].
    pub fn scan_with<F: FnMut(&ScanEvent)>(
        &mut self,
        mut on_event: F,
    ) -> Result<ScanReport, FinderError> {
        let handle = self.start_scan()?;
        for event in handle.events() {
            on_event(&event);
        }
        let session = handle.wait()?;
        Ok(self.adopt(session)?.report())
    }

    /// Run a scan to completion.
    ///
    /// # Errors
    ///
    /// See [`DuplicateFinder::start_scan`] and [`ScanHandle::wait`].
    pub fn scan(&mut self) -> Result<ScanReport, FinderError> {
        self.scan_with(|_| {})
    }

    /// Current session, if a scan has been adopted.
    #[must_use]
    pub fn session(&self) -> Option<&ScanSession> {
        self.session.as_ref()
    }

    /// Delete confirmed paths and update the current session.
    ///
    /// Each path is handled independently and gets one outcome, in request
    /// order. Repeats of the same file are deleted once and share the first
    /// outcome. Paths that are not members of an active duplicate group are
    /// refused with a removal failure and never touched on disk.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::NoSession`] if no scan has been adopted.
    pub fn request_removal(
        &mut self,
        paths: &[PathBuf],
        config: &DeleteConfig,
    ) -> Result<RemovalReport, FinderError> {
        let session = self.session.as_mut().ok_or(FinderError::NoSession)?;

        let requested: Vec<(PathBuf, bool)> = paths
            .iter()
            .map(|path| {
                if session.is_duplicate(path) {
                    return (path.clone(), true);
                }
                match std::fs::canonicalize(path) {
                    Ok(canonical) if session.is_duplicate(&canonical) => (canonical, true),
                    _ => (path.clone(), false),
                }
            })
            .collect();

        let mut seen = HashSet::new();
        let distinct: Vec<&(PathBuf, bool)> = requested
            .iter()
            .filter(|(path, _)| seen.insert(path.clone()))
            .collect();
        let tracked: Vec<PathBuf> = distinct
            .iter()
            .filter(|(_, tracked)| *tracked)
            .map(|(path, _)| path.clone())
            .collect();

        log::info!(
            "Removing {} path(s), {} refused as untracked",
            tracked.len(),
            distinct.len() - tracked.len()
        );

        let batch = self.pool.run(RemoveTask::new(tracked, *config));
        let dissolved_groups = session.apply_removals(&batch.removed_paths());

        let mut deleted = batch.outcomes.into_iter();
        let mut by_path = HashMap::with_capacity(distinct.len());
        for (path, tracked) in distinct {
            let outcome = if *tracked {
                deleted.next().map_or_else(
                    || RemovalOutcome::from(Err(DeleteError::NotTracked(path.clone()))),
                    RemovalOutcome::from,
                )
            } else {
                RemovalOutcome::from(Err(DeleteError::NotTracked(path.clone())))
            };
            if let Err(issue) = &outcome.result {
                session.push_issue(issue.clone());
            }
            by_path.insert(path.clone(), outcome);
        }

        let outcomes = requested
            .iter()
            .filter_map(|(path, _)| by_path.get(path).cloned())
            .collect();

        Ok(RemovalReport {
            outcomes,
            dissolved_groups,
            stats: session.stats(),
        })
    }
}

/// Dispatch one hash task per candidate and return the outcome stream.
///
/// Exactly one outcome is produced per candidate. Candidates are not
/// dispatched once `ticket` is stale; they are reported as cancelled instead.
pub fn hash_all(
    pool: &WorkerPool,
    hasher: &Arc<Hasher>,
    candidates: Vec<FileEntry>,
    ticket: &ScanTicket,
) -> Receiver<HashOutcome> {
    let (tx, rx) = mpsc::channel();

    for file in candidates {
        if ticket.is_stale() {
            let _ = tx.send(HashOutcome::Cancelled(file.path));
            continue;
        }
        pool.submit(
            HashTask::new(file, Arc::clone(hasher), ticket.clone()),
            tx.clone(),
        );
    }

    rx
}

fn check_ticket(ticket: &ScanTicket) -> Result<(), FinderError> {
    if ticket.is_superseded() {
        Err(FinderError::Superseded)
    } else if ticket.is_shutdown() {
        Err(FinderError::Interrupted)
    } else {
        Ok(())
    }
}

/// Body of the scan thread.
fn run_scan(
    walker: Walker,
    pool: &WorkerPool,
    hasher: &Arc<Hasher>,
    ticket: &ScanTicket,
    events: &Sender<ScanEvent>,
) -> Result<ScanSession, FinderError> {
    let start = Instant::now();
    let mut session = ScanSession::new(ticket.generation());

    session.summary_mut().roots = walker
        .resolve_roots()
        .into_iter()
        .filter_map(Result::ok)
        .collect();

    let candidates = WalkTask::new(walker).run();
    check_ticket(ticket)?;

    session.record_walk_errors(candidates.errors);
    {
        let summary = session.summary_mut();
        summary.total_files = candidates.grouping.total_files;
        summary.total_size = candidates.grouping.total_size;
        summary.eliminated_by_size = candidates.grouping.eliminated_unique;
    }
    let _ = events.send(ScanEvent::Walked {
        files: candidates.grouping.total_files,
        candidates: candidates.candidates.len(),
    });

    if candidates.candidates.is_empty() {
        log::info!("No candidates found, nothing to hash");
        session.summary_mut().scan_duration = start.elapsed();
        let _ = events.send(ScanEvent::Empty(session.report()));
        return Ok(session);
    }

    session.begin_hashing(&candidates.candidates);
    log::info!("Hashing {} candidate(s)", candidates.candidates.len());

    let outcomes = hash_all(pool, hasher, candidates.candidates, ticket);
    for outcome in outcomes.iter() {
        if ticket.is_superseded() {
            log::debug!("Scan #{} superseded, dropping results", ticket.generation());
            return Err(FinderError::Superseded);
        }

        session.record(outcome);
        let progress = session.progress();
        let _ = events.send(ScanEvent::Progress {
            completed: progress.completed,
            total: progress.total,
        });

        if session.is_complete() {
            break;
        }
    }

    check_ticket(ticket)?;
    if !session.is_complete() {
        // Every sender is gone but some tasks never reported.
        return Err(FinderError::WorkerPanicked);
    }

    session.summary_mut().scan_duration = start.elapsed();
    let report = session.report();
    log::info!(
        "Scan #{} complete: {} group(s), {} redundant file(s)",
        ticket.generation(),
        report.stats.duplicate_groups,
        report.stats.redundant_files
    );
    let _ = events.send(ScanEvent::Finished(report));

    Ok(session)
}
