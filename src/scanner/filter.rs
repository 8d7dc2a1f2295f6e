//! Extension allow-list used to decide whether a file qualifies for scanning.
//!
//! Extensions are normalized once, when the filter is built: lower-cased,
//! surrounding whitespace trimmed, and a leading dot prepended when missing.
//! Matching then compares the path's own normalized extension for exact
//! membership. An empty filter accepts every file.
//!
//! # Example
//!
//! ```
//! use doppelganger::scanner::ExtensionFilter;
//! use std::path::Path;
//!
//! let filter = ExtensionFilter::new(["JPG", ".png"]);
//! assert!(filter.accepts(Path::new("/photos/IMG_0001.jpg")));
//! assert!(filter.accepts(Path::new("/photos/scan.PNG")));
//! assert!(!filter.accepts(Path::new("/photos/notes.txt")));
//! assert!(!filter.accepts(Path::new("/photos/README")));
//!
//! assert!(ExtensionFilter::default().accepts(Path::new("/anything")));
//! ```

use std::collections::BTreeSet;
use std::path::Path;

/// A set of normalized (lower-case, leading-dot) file extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: BTreeSet<String>,
}

impl ExtensionFilter {
    /// Build a filter from raw extension strings.
    ///
    /// Entries that normalize to nothing (empty strings, a lone `.`) are dropped.
    #[must_use]
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .filter_map(|ext| Self::normalize(ext.as_ref()))
            .collect();
        Self { extensions }
    }

    /// Normalize one extension: `" JPG "` and `".jpg"` both become `".jpg"`.
    #[must_use]
    pub fn normalize(raw: &str) -> Option<String> {
        let trimmed = raw.trim().trim_start_matches('.');
        if trimmed.is_empty() {
            return None;
        }
        Some(format!(".{}", trimmed.to_lowercase()))
    }

    /// Add a single extension, returning `false` if it was already present
    /// or normalizes to nothing.
    pub fn insert(&mut self, raw: &str) -> bool {
        match Self::normalize(raw) {
            Some(ext) => self.extensions.insert(ext),
            None => false,
        }
    }

    /// Remove an extension, returning whether it was present.
    pub fn remove(&mut self, raw: &str) -> bool {
        Self::normalize(raw).is_some_and(|ext| self.extensions.remove(&ext))
    }

    /// Whether the filter is empty (accepts everything).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Number of extensions in the filter.
    #[must_use]
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Whether the (raw) extension is part of the filter.
    #[must_use]
    pub fn contains(&self, raw: &str) -> bool {
        Self::normalize(raw).is_some_and(|ext| self.extensions.contains(&ext))
    }

    /// Iterate the normalized extensions in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    /// Decide whether `path` qualifies for scanning.
    #[must_use]
    pub fn accepts(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path_extension(path).is_some_and(|ext| self.extensions.contains(&ext))
    }
}

impl<S: AsRef<str>> FromIterator<S> for ExtensionFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Free-function form of [`ExtensionFilter::accepts`].
#[must_use]
pub fn accepts(path: &Path, filter: &ExtensionFilter) -> bool {
    filter.accepts(path)
}

/// The path's extension, lower-cased with a leading dot.
///
/// Dotfiles such as `.bashrc` and names ending in a bare `.` have no extension.
fn path_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_string_lossy();
    if ext.is_empty() {
        None
    } else {
        Some(format!(".{}", ext.to_lowercase()))
    }
}
