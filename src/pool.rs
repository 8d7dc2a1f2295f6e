//! Typed pipeline tasks and the worker pool that runs them.
//!
//! Each pipeline stage is a [`Task`] carrying its concrete input and
//! producing a concrete output: [`WalkTask`] (roots → candidates),
//! [`HashTask`] (one file → one [`HashOutcome`]) and [`RemoveTask`]
//! (paths → per-path outcomes). [`WorkerPool`] wraps a fixed-size rayon
//! pool; [`WorkerPool::submit`] sends each output over a channel so the
//! orchestrator can count results as they arrive.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

use crate::actions::delete::{delete_batch, BatchDeleteResult, DeleteConfig};
use crate::duplicates::groups::{collect_candidates, CandidateSet};
use crate::duplicates::session::{FingerprintResult, HashOutcome};
use crate::scanner::{FileEntry, Hasher, Walker};

/// A unit of work with a concrete output type.
pub trait Task: Send + 'static {
    /// What the task produces.
    type Output: Send + 'static;

    /// Execute the task.
    fn run(self) -> Self::Output;
}

/// Identifies the scan a task belongs to.
///
/// A ticket goes stale once a newer scan starts (the shared generation
/// counter moves past it) or shutdown is requested.
#[derive(Debug, Clone)]
pub struct ScanTicket {
    generation: u64,
    current: Arc<AtomicU64>,
    shutdown: Option<Arc<AtomicBool>>,
}

impl ScanTicket {
    /// Ticket for `generation`, checked against `current`.
    #[must_use]
    pub fn new(generation: u64, current: Arc<AtomicU64>) -> Self {
        Self {
            generation,
            current,
            shutdown: None,
        }
    }

    /// A ticket that never goes stale unless shutdown is requested.
    #[must_use]
    pub fn detached() -> Self {
        Self::new(0, Arc::new(AtomicU64::new(0)))
    }

    /// Also treat the ticket as stale once `flag` is set.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    /// Generation this ticket was issued for.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a newer scan has started.
    #[must_use]
    pub fn is_superseded(&self) -> bool {
        self.current.load(Ordering::SeqCst) != self.generation
    }

    /// Whether shutdown was requested.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Whether work for this ticket should be skipped.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.is_superseded() || self.is_shutdown()
    }
}

/// Walk the roots and reduce to same-size candidates.
#[derive(Debug)]
pub struct WalkTask {
    walker: Walker,
}

impl WalkTask {
    #[must_use]
    pub fn new(walker: Walker) -> Self {
        Self { walker }
    }
}

impl Task for WalkTask {
    type Output = CandidateSet;

    fn run(self) -> CandidateSet {
        collect_candidates(&self.walker)
    }
}

/// Fingerprint one candidate file.
#[derive(Debug)]
pub struct HashTask {
    file: FileEntry,
    hasher: Arc<Hasher>,
    ticket: ScanTicket,
}

impl HashTask {
    #[must_use]
    pub fn new(file: FileEntry, hasher: Arc<Hasher>, ticket: ScanTicket) -> Self {
        Self {
            file,
            hasher,
            ticket,
        }
    }
}

impl Task for HashTask {
    type Output = HashOutcome;

    fn run(self) -> HashOutcome {
        if self.ticket.is_stale() {
            return HashOutcome::Cancelled(self.file.path);
        }

        log::trace!("Hashing {}", self.file.path.display());
        match self.hasher.full_hash(&self.file.path) {
            Ok(hash) => HashOutcome::Hashed(FingerprintResult::new(hash, self.file.path)),
            Err(e) => {
                log::warn!("Failed to hash {}: {}", self.file.path.display(), e);
                HashOutcome::Failed(e)
            }
        }
    }
}

/// Delete a batch of confirmed paths.
#[derive(Debug)]
pub struct RemoveTask {
    paths: Vec<PathBuf>,
    config: DeleteConfig,
}

impl RemoveTask {
    #[must_use]
    pub fn new(paths: Vec<PathBuf>, config: DeleteConfig) -> Self {
        Self { paths, config }
    }
}

impl Task for RemoveTask {
    type Output = BatchDeleteResult;

    fn run(self) -> BatchDeleteResult {
        delete_batch(&self.paths, &self.config)
    }
}

/// Fixed-size pool of I/O worker threads.
#[derive(Debug)]
pub struct WorkerPool {
    pool: ThreadPool,
}

impl WorkerPool {
    /// Build a pool with `threads` workers (at least one).
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to spawn the threads.
    pub fn new(threads: usize) -> Result<Self, ThreadPoolBuildError> {
        let threads = threads.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("doppelganger-io-{i}"))
            .build()?;
        log::debug!("Worker pool started with {} threads", threads);
        Ok(Self { pool })
    }

    /// Thread count matching the available parallelism.
    #[must_use]
    pub fn default_threads() -> usize {
        std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
    }

    /// Number of worker threads.
    #[must_use]
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Queue `task`; its output is sent on `results` when it finishes.
    ///
    /// A closed receiver is not an error: the output is dropped.
    pub fn submit<T: Task>(&self, task: T, results: Sender<T::Output>) {
        self.pool.spawn(move || {
            let _ = results.send(task.run());
        });
    }

    /// Run `task` on the pool and wait for its output.
    pub fn run<T: Task>(&self, task: T) -> T::Output {
        self.pool.install(move || task.run())
    }
}
