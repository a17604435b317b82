//! Pending indicator shown while a row action is in flight.

use super::colors::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

pub struct ActionSpinner {
    spinner: ProgressBar,
}

impl ActionSpinner {
    /// Start spinning with a message such as `Stopping gs1`.
    pub fn new(message: impl Into<String>) -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars(SPINNER_CHARS)
                .template("{spinner:.cyan} {msg} [{elapsed}]")
                .expect("invalid template"),
        );
        spinner.set_message(message.into());
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    pub fn finish_success(&self, message: &str) {
        self.spinner
            .finish_with_message(format!("{GREEN}{}{RESET}", message));
    }

    pub fn finish_error(&self, message: &str) {
        self.spinner
            .finish_with_message(format!("{RED}{}{RESET}", message));
    }
}

impl Drop for ActionSpinner {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
