//! Progress reporting while waiting for the model

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown until the first token of a reply arrives
pub struct ProgressReporter {
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    /// Start a spinner with the given message.
    pub fn start(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar: Some(bar) }
    }

    /// A reporter that shows nothing (for --quiet).
    pub fn hidden() -> Self {
        Self { bar: None }
    }

    /// Whether the spinner is still on screen.
    pub fn is_active(&self) -> bool {
        self.bar.is_some()
    }

    /// Remove the spinner; called when output starts.
    pub fn clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    /// Replace the spinner with a final status line.
    pub fn finish(&mut self, success: bool, message: &str) {
        if let Some(bar) = self.bar.take() {
            let mark = if success { "v".green() } else { "x".red() };
            bar.finish_with_message(format!("{} {}", mark, message));
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_is_inactive() {
        let mut reporter = ProgressReporter::hidden();
        assert!(!reporter.is_active());
        reporter.finish(true, "done");
        assert!(!reporter.is_active());
    }

    #[test]
    fn test_clear_deactivates() {
        let mut reporter = ProgressReporter::start("Thinking...");
        assert!(reporter.is_active());
        reporter.clear();
        assert!(!reporter.is_active());
    }
}
