//! Terminal progress display for a running scan.
//!
//! [`Progress`] consumes [`ScanEvent`]s: a spinner runs while the trees are
//! walked, then a bar tracks hash outcomes against dispatched tasks. Output
//! goes to stderr so it never mixes with the report on stdout.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::duplicates::ScanEvent;

/// Progress reporter using indicatif.
pub struct Progress {
    walking: Option<ProgressBar>,
    hashing: Option<ProgressBar>,
    enabled: bool,
}

impl Progress {
    /// Create a reporter. A disabled reporter ignores every event.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            walking: None,
            hashing: None,
            enabled,
        }
    }

    /// Whether anything will be drawn.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Show the walking spinner.
    pub fn start(&mut self) {
        if !self.enabled {
            return;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(walking_style());
        pb.set_message("Walking directories");
        pb.enable_steady_tick(Duration::from_millis(100));
        self.walking = Some(pb);
    }

    /// Update the display for one event.
    pub fn on_event(&mut self, event: &ScanEvent) {
        if !self.enabled {
            return;
        }

        match event {
            ScanEvent::Walked { files, candidates } => {
                if let Some(pb) = self.walking.take() {
                    pb.finish_and_clear();
                }
                log::info!("{} file(s) found, {} share a size", files, candidates);
                if *candidates > 0 {
                    let pb = ProgressBar::new(*candidates as u64);
                    pb.set_style(hashing_style());
                    pb.set_message("Hashing");
                    self.hashing = Some(pb);
                }
            }
            ScanEvent::Progress { completed, total } => {
                if let Some(pb) = &self.hashing {
                    pb.set_length(*total as u64);
                    pb.set_position(*completed as u64);
                }
            }
            ScanEvent::Finished(_) | ScanEvent::Empty(_) => self.finish(),
        }
    }

    /// Clear any bar still on screen.
    pub fn finish(&mut self) {
        if let Some(pb) = self.walking.take() {
            pb.finish_and_clear();
        }
        if let Some(pb) = self.hashing.take() {
            pb.finish_and_clear();
        }
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        self.finish();
    }
}

fn walking_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
}

fn hashing_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "[{elapsed_precise}] [{bar:40.green/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("█>-")
}
