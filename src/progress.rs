//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for a pipeline run
#[derive(Debug)]
pub struct ProgressReporter {
    pub pairs_pb: Option<ProgressBar>,
    pub tasks_pb: Option<ProgressBar>,
    show_progress: bool,
}

impl ProgressReporter {
    /// Create progress reporter for the diff stage
    pub fn new_for_diff(total_pairs: u64) -> Self {
        Self {
            pairs_pb: Some(create_progress_bar(total_pairs, "Comparing snapshot pairs")),
            tasks_pb: None,
            show_progress: true,
        }
    }

    /// Create minimal progress reporter (no progress bars)
    pub fn new_minimal() -> Self {
        Self {
            pairs_pb: None,
            tasks_pb: None,
            show_progress: false,
        }
    }

    pub fn new(total_pairs: u64, show_progress: bool) -> Self {
        if show_progress {
            Self::new_for_diff(total_pairs)
        } else {
            Self::new_minimal()
        }
    }

    /// Start the per-file spinner for one pair
    pub fn start_pair(&mut self, label: &str, tasks: u64) {
        if !self.show_progress {
            return;
        }
        if let Some(pb) = self.tasks_pb.take() {
            pb.finish_and_clear();
        }
        let pb = create_spinner(&format!("{} ({} files)", label, tasks));
        self.tasks_pb = Some(pb);
    }

    /// Mark one pair as done
    pub fn finish_pair(&mut self) {
        if let Some(pb) = self.tasks_pb.take() {
            pb.finish_and_clear();
        }
        if let Some(pb) = &self.pairs_pb {
            pb.inc(1);
        }
    }

    /// Finish all progress bars
    pub fn finish_all(&mut self, message: &str) {
        if let Some(pb) = self.tasks_pb.take() {
            pb.finish_and_clear();
        }
        if let Some(pb) = self.pairs_pb.take() {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(pb) = self.pairs_pb.take() {
            pb.finish_and_clear();
        }
        if let Some(pb) = self.tasks_pb.take() {
            pb.finish_and_clear();
        }
    }
}

/// Create a spinner progress bar
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} {msg}")
            .expect("Invalid progress template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a progress bar with known total
fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>5}/{len:5} {msg}")
            .expect("Invalid progress template")
            .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}

/// Counting progress bar, hidden unless `visible`
pub fn create_count_progress(total: u64, message: &str, visible: bool) -> ProgressBar {
    if visible {
        create_progress_bar(total, message)
    } else {
        ProgressBar::hidden()
    }
}
