use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

fn start(message: &str, disabled: bool) -> Option<ProgressBar> {
    if disabled {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner());
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Runs `work` behind a spinner. The spinner is cleared before any result,
/// error or not, reaches the caller.
pub fn run<T>(message: &str, disabled: bool, work: impl FnOnce() -> Result<T>) -> Result<T> {
    run_with(start(message, disabled), work)
}

fn run_with<T>(spinner: Option<ProgressBar>, work: impl FnOnce() -> Result<T>) -> Result<T> {
    let result = work();
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    result
}
