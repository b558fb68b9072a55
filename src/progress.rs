//! Progress reporting utilities using indicatif.
//!
//! The walk phase shows a spinner with a running file count; each digest
//! pass shows a determinate bar. All drawing goes to stderr so machine
//! output on stdout stays clean.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress callback for duplicate finding phases.
///
/// Implement this trait to receive progress updates during the detection
/// pipeline.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts. `total` is 0 when the item count is not
    /// known up front (the walk).
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    fn on_progress(&self, current: usize, path: &str);

    /// Called when an item finished, with its size in bytes.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// Terminal progress reporter.
pub struct Progress {
    multi: MultiProgress,
    active: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter. With `quiet` set, nothing is drawn.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            active: Mutex::new(None),
            quiet,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {wide_msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }
        let bar = if total == 0 {
            let bar = self.multi.add(ProgressBar::new_spinner());
            bar.set_style(Self::spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            let bar = self.multi.add(ProgressBar::new(total as u64));
            bar.set_style(Self::bar_style());
            bar
        };
        bar.set_message(phase.to_string());
        *self.active.lock().unwrap() = Some(bar);
    }

    fn on_progress(&self, current: usize, path: &str) {
        if let Some(bar) = self.active.lock().unwrap().as_ref() {
            bar.set_position(current as u64);
            // Only the file name; full paths churn the line too much
            if let Some(name) = std::path::Path::new(path).file_name() {
                bar.set_message(name.to_string_lossy().into_owned());
            }
        }
    }

    fn on_phase_end(&self, _phase: &str) {
        if let Some(bar) = self.active.lock().unwrap().take() {
            bar.finish_and_clear();
        }
    }
}
