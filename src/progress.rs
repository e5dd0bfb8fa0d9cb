//! Transient progress spinners for long-running API work

use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// A spinner that clears itself on success and leaves an error line on failure
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn start(message: impl Into<String>) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn finish(self) {
        self.bar.finish_and_clear();
    }

    pub fn fail(self, error: impl Display) {
        self.bar.abandon_with_message(format!("Error: {:#}", error));
    }
}

/// Runs `work` under a spinner showing `message`
///
/// On failure the spinner line is replaced by `Error: <cause>` and the error
/// is returned to the caller.
pub async fn with_spinner<T, E, F>(message: impl Into<String>, work: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    let spinner = Spinner::start(message);
    match work.await {
        Ok(value) => {
            spinner.finish();
            Ok(value)
        }
        Err(err) => {
            spinner.fail(&err);
            Err(err)
        }
    }
}
