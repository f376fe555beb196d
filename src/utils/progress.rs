//! Terminal progress bar for pixel reads

use indicatif::{ProgressBar, ProgressStyle};

use crate::extractor::listener::ReadListener;

/// Progress bar driven by read progress callbacks
pub struct ProgressTracker {
    bar: ProgressBar,
}

impl ProgressTracker {
    /// Creates a bar counting up to `total`
    pub fn new(total: u64, description: &str) -> Self {
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        bar.set_message(description.to_string());

        ProgressTracker { bar }
    }

    /// Creates a bar that tracks a read in percent
    pub fn for_read(description: &str) -> Self {
        Self::new(100, description)
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("Completed");
    }
}

impl ReadListener for ProgressTracker {
    fn progress(&mut self, percent: f32) {
        self.bar.set_position(percent.round().clamp(0.0, 100.0) as u64);
    }

    fn read_aborted(&mut self) {
        self.bar.abandon_with_message("Aborted");
    }
}
