//! Progress reporting for CLI

use crate::application::{CarveProgress, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

/// Progress reporter using indicatif
pub struct ProgressReporter {
    bar: Arc<ProgressBar>,
}

impl ProgressReporter {
    /// One tick per catalog format
    pub fn for_formats(total: u64, message: &str) -> Self {
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} formats")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        bar.set_message(message.to_string());

        Self { bar: Arc::new(bar) }
    }

    /// Finishes with a message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Drops the bar without leaving it on screen
    pub fn abandon(&self) {
        self.bar.finish_and_clear();
    }

    /// Gets a callback for carve progress
    pub fn callback(&self) -> ProgressCallback {
        let bar = Arc::clone(&self.bar);
        Box::new(move |progress: &CarveProgress| {
            bar.set_position(progress.formats_done as u64);
            bar.set_message(format!(
                "{}: {} validated of {} candidates | {} recovered",
                progress.format.extension(),
                progress.validated,
                progress.candidates,
                progress.total_recovered
            ));
        })
    }
}
