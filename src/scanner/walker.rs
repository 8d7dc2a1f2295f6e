//! Multi-root directory walker using jwalk for parallel traversal.
//!
//! # Overview
//!
//! [`Walker`] enumerates regular files under one or more scan roots and
//! yields them lazily as [`FileEntry`] values. Roots are canonicalized and
//! deduplicated up front; files reachable from several overlapping roots are
//! yielded once.
//!
//! # Policy
//!
//! - Symbolic links are never followed: file symlinks are skipped and
//!   symlinked directories are not descended into, so link cycles cannot
//!   cause infinite walks.
//! - A root that is missing or not a directory is skipped and reported as a
//!   [`ScanError`] item.
//! - Entries that cannot be listed or stat'ed are skipped and reported as
//!   [`ScanError`] items; iteration continues.
//! - The [`ExtensionFilter`](super::ExtensionFilter) is applied before the
//!   stat call.
//!
//! # Example
//!
//! ```no_run
//! use doppelganger::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let walker = Walker::new(vec![PathBuf::from(".")], WalkerConfig::default());
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use jwalk::WalkDir;

use super::{FileEntry, ScanError, WalkerConfig};

/// Directory walker over a set of scan roots.
#[derive(Debug, Clone)]
pub struct Walker {
    /// Roots as supplied (duplicates removed, order preserved)
    roots: Vec<PathBuf>,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given roots.
    ///
    /// Repeated roots are dropped; the first occurrence keeps its position.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, config: WalkerConfig) -> Self {
        let mut seen = HashSet::new();
        let roots = roots
            .into_iter()
            .filter(|root| seen.insert(root.clone()))
            .collect();
        Self {
            roots,
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set, the walk stops yielding entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Roots this walker was built with.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Walker configuration.
    #[must_use]
    pub fn config(&self) -> &WalkerConfig {
        &self.config
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Validate and canonicalize every root.
    ///
    /// Returns one result per distinct canonical root; roots that resolve to
    /// the same directory collapse into the first one.
    #[must_use]
    pub fn resolve_roots(&self) -> Vec<Result<PathBuf, ScanError>> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(self.roots.len());

        for root in &self.roots {
            match resolve_root(root) {
                Ok(canonical) => {
                    if seen.insert(canonical.clone()) {
                        resolved.push(Ok(canonical));
                    } else {
                        log::debug!(
                            "Root {} resolves to an already listed root",
                            root.display()
                        );
                    }
                }
                Err(e) => {
                    log::warn!("Skipping root: {}", e);
                    resolved.push(Err(e));
                }
            }
        }

        resolved
    }

    /// Walk all roots, yielding file entries.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. Each canonical file path is yielded at most once.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let mut emitted: HashSet<PathBuf> = HashSet::new();

        self.resolve_roots()
            .into_iter()
            .flat_map(move |root| -> Box<dyn Iterator<Item = _> + '_> {
                match root {
                    Ok(root) => Box::new(self.walk_root(root)),
                    Err(e) => Box::new(std::iter::once(Err(e))),
                }
            })
            .take_while(move |_| {
                let stop = self.is_shutdown_requested();
                if stop {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                }
                !stop
            })
            .filter(move |result| match result {
                Ok(file) => {
                    let fresh = emitted.insert(file.path.clone());
                    if !fresh {
                        log::trace!("Already seen via another root: {}", file.path.display());
                    }
                    fresh
                }
                Err(_) => true,
            })
    }

    /// Walk a single canonical root.
    fn walk_root(&self, root: PathBuf) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        log::debug!("Walking root {}", root.display());

        let walk_dir = WalkDir::new(&root)
            .follow_links(false)
            .skip_hidden(false)
            .sort(true);

        walk_dir
            .into_iter()
            .filter_map(move |entry_result| match entry_result {
                Ok(mut entry) => {
                    let path = entry.path();
                    let file_type = entry.file_type();

                    // jwalk reports a directory it could not list on the
                    // directory's own entry, not as an Err item.
                    if file_type.is_dir() {
                        return entry
                            .read_children_error
                            .take()
                            .map(|e| Err(classify_walk_error(path, &e)));
                    }

                    if entry.depth == 0 {
                        return None;
                    }

                    if file_type.is_symlink() {
                        log::trace!("Skipping symlink: {}", path.display());
                        return None;
                    }

                    if !self.config.extensions.accepts(&path) {
                        log::trace!("Skipping file due to extension filter: {}", path.display());
                        return None;
                    }

                    self.stat_file(path)
                }
                Err(e) => {
                    let path = e.path().map_or_else(|| root.clone(), Path::to_path_buf);
                    Some(Err(classify_walk_error(path, &e)))
                }
            })
    }

    /// Stat a candidate and build its entry.
    fn stat_file(&self, path: PathBuf) -> Option<Result<FileEntry, ScanError>> {
        let metadata = match std::fs::symlink_metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("Cannot stat {}: {}", path.display(), e);
                return Some(Err(ScanError::from_io(&path, e)));
            }
        };

        // Sockets, FIFOs, device nodes
        if !metadata.is_file() {
            return None;
        }

        let size = metadata.len();
        if size == 0 && self.config.skip_empty {
            log::debug!("Skipping empty file: {}", path.display());
            return None;
        }

        Some(Ok(FileEntry::new(path, size)))
    }
}

/// Check that a root exists and is a directory, then canonicalize it.
fn resolve_root(root: &Path) -> Result<PathBuf, ScanError> {
    let metadata = std::fs::metadata(root).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ScanError::NotFound(root.to_path_buf()),
        _ => ScanError::from_io(root, e),
    })?;

    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    std::fs::canonicalize(root).map_err(|e| ScanError::from_io(root, e))
}

/// Convert a jwalk error (typically a directory that could not be listed).
fn classify_walk_error(path: PathBuf, error: &jwalk::Error) -> ScanError {
    log::warn!("Walker error for {}: {}", path.display(), error);
    match error.io_error().map(std::io::Error::kind) {
        Some(std::io::ErrorKind::PermissionDenied) => ScanError::PermissionDenied(path),
        Some(std::io::ErrorKind::NotFound) => ScanError::Vanished(path),
        kind => ScanError::Io {
            path,
            source: std::io::Error::new(
                kind.unwrap_or(std::io::ErrorKind::Other),
                error.to_string(),
            ),
        },
    }
}
