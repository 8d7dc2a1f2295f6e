//! Scanner module for file discovery and content fingerprinting.
//!
//! This module provides functionality for:
//! - Extension allow-list filtering
//! - Multi-root directory walking using jwalk
//! - Streaming SHA-256 content hashing
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`filter`]: Normalized extension allow-list
//! - [`walker`]: Directory traversal and candidate discovery
//! - [`hasher`]: SHA-256 file hashing (4 KiB chunks)
//!
//! # Example
//!
//! ```no_run
//! use doppelganger::scanner::{ExtensionFilter, Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let config = WalkerConfig {
//!     extensions: ExtensionFilter::new([".jpg", "png"]),
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(vec![PathBuf::from("/data/a"), PathBuf::from("/data/b")], config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod filter;
pub mod hasher;
pub mod walker;

use std::path::{Path, PathBuf};

use crate::error::{FailureKind, Issue};

// Re-export main types
pub use filter::{accepts, ExtensionFilter};
pub use hasher::{hash_to_hex, hex_to_hash, Hash, Hasher, CHUNK_SIZE};
pub use walker::Walker;

/// A regular file discovered under a scan root.
///
/// The path is absolute and canonical (roots are canonicalized and
/// symbolic links are never traversed), so it identifies the file uniquely
/// across overlapping roots.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileEntry {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Extension allow-list. Empty accepts every file.
    pub extensions: ExtensionFilter,

    /// Skip zero-length files.
    /// All empty files share a fingerprint, so by default they are reported
    /// as duplicates of each other like any other content.
    pub skip_empty: bool,
}

impl WalkerConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(extensions: ExtensionFilter, skip_empty: bool) -> Self {
        Self {
            extensions,
            skip_empty,
        }
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// A scan root does not exist.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// A scan root is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Permission was denied when listing or stating an entry.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An entry disappeared between listing and stat.
    #[error("Entry vanished during scan: {0}")]
    Vanished(PathBuf),

    /// An I/O error occurred while accessing an entry.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error raised while stating a walked entry.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            ErrorKind::NotFound => Self::Vanished(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Path the error relates to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::NotADirectory(p)
            | Self::PermissionDenied(p)
            | Self::Vanished(p)
            | Self::Io { path: p, .. } => p,
        }
    }

    /// Failure classification: bad roots are unreachable, everything else is
    /// an unreadable entry.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotFound(_) | Self::NotADirectory(_) => FailureKind::FilesystemUnreachable,
            Self::PermissionDenied(_) | Self::Vanished(_) | Self::Io { .. } => {
                FailureKind::EntryUnreadable
            }
        }
    }

    /// Convert into a reportable issue.
    #[must_use]
    pub fn to_issue(&self) -> Issue {
        Issue::new(self.path(), self.kind(), self.to_string())
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file was not found (deleted after enumeration).
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Hashing stopped because shutdown was requested.
    #[error("Hashing interrupted: {0}")]
    Interrupted(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised while opening or reading a file.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Path of the file that failed.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Interrupted(p)
            | Self::Io { path: p, .. } => p,
        }
    }

    /// Convert into a reportable issue.
    #[must_use]
    pub fn to_issue(&self) -> Issue {
        Issue::new(self.path(), FailureKind::HashReadFailure, self.to_string())
    }
}
