//! Human-readable report.
//!
//! ```text
//! Group 1: 2 copies, 10.0 MB each (sha256 3f2a9c…)
//!   /data/a/x.jpg
//!   /data/b/y.jpg
//!
//! 1 duplicate group, 1 redundant file, 10.0 MB reclaimable
//! 3 files scanned (23.0 MB), 1 ruled out by size, 2 hashed in 0.04s
//! ```

use std::io::{self, Write};

use yansi::{Paint, Style};

use super::format_size;
use crate::actions::delete::RemovalReport;
use crate::duplicates::ScanReport;

const HEADER: Style = Style::new().bold();
const HASH: Style = Style::new().dim();
const WARN: Style = Style::new().yellow();
const OK: Style = Style::new().green();

/// Text renderer for a scan report and an optional removal report.
#[derive(Debug)]
pub struct TextOutput<'a> {
    report: &'a ScanReport,
    removal: Option<&'a RemovalReport>,
    color: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a renderer.
    #[must_use]
    pub fn new(report: &'a ScanReport) -> Self {
        Self {
            report,
            removal: None,
            color: false,
        }
    }

    /// Also render the outcome of a removal request.
    #[must_use]
    pub fn with_removal(mut self, removal: Option<&'a RemovalReport>) -> Self {
        self.removal = removal;
        self
    }

    /// Enable ANSI colors.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn paint(&self, text: impl std::fmt::Display, style: Style) -> String {
        if self.color {
            text.paint(style).to_string()
        } else {
            text.to_string()
        }
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let report = self.report;

        if report.groups.is_empty() {
            writeln!(writer, "No duplicates found.")?;
        }

        for (index, group) in report.groups.iter().enumerate() {
            let hash = group.hash_hex();
            let header = format!(
                "Group {}: {} copies, {} each",
                index + 1,
                group.len(),
                format_size(group.size)
            );
            writeln!(
                writer,
                "{} {}",
                self.paint(header, HEADER),
                self.paint(format!("(sha256 {}…)", &hash[..12]), HASH)
            )?;
            for path in &group.paths {
                writeln!(writer, "  {}", path.display())?;
            }
            writeln!(writer)?;
        }

        let stats = &report.stats;
        writeln!(
            writer,
            "{} duplicate group{}, {} redundant file{}, {} reclaimable",
            stats.duplicate_groups,
            plural(stats.duplicate_groups),
            stats.redundant_files,
            plural(stats.redundant_files),
            self.paint(format_size(stats.redundant_bytes), OK)
        )?;

        let summary = &report.summary;
        writeln!(
            writer,
            "{} file{} scanned ({}), {} ruled out by size, {} hashed in {:.2}s",
            summary.total_files,
            plural(summary.total_files),
            format_size(summary.total_size),
            summary.eliminated_by_size,
            summary.hashed,
            summary.scan_duration.as_secs_f64()
        )?;

        if let Some(removal) = self.removal {
            writeln!(writer)?;
            for outcome in &removal.outcomes {
                match &outcome.result {
                    Ok(bytes) => writeln!(
                        writer,
                        "{} {} ({})",
                        self.paint("removed", OK),
                        outcome.path.display(),
                        format_size(*bytes)
                    )?,
                    Err(issue) => writeln!(
                        writer,
                        "{} {}: {}",
                        self.paint("kept", WARN),
                        outcome.path.display(),
                        issue.message
                    )?,
                }
            }
            writeln!(
                writer,
                "{} removed, {} group{} dissolved, {} still reclaimable",
                removal.removed_count(),
                removal.dissolved_groups,
                plural(removal.dissolved_groups),
                format_size(removal.stats.redundant_bytes)
            )?;
        }

        if !report.issues.is_empty() {
            writeln!(writer)?;
            writeln!(
                writer,
                "{}",
                self.paint(
                    format!("{} item(s) skipped:", report.issues.len()),
                    WARN
                )
            )?;
            for issue in &report.issues {
                writeln!(writer, "  {issue}")?;
            }
        }

        Ok(())
    }

    /// Render to a string.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
