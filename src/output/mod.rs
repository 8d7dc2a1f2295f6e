//! Report formatters.
//!
//! - [`text`]: human-readable report, optionally colored
//! - [`json`]: machine-readable document for scripting
//!
//! Sizes are shown in decimal (SI) units: 1 MB = 1,000,000 bytes.

pub mod json;
pub mod text;

use bytesize::ByteSize;

pub use json::{JsonOutput, JsonOutputError};
pub use text::TextOutput;

/// Format a byte count with decimal units, e.g. `10.0 MB`.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    ByteSize(bytes).display().si().to_string()
}
