//! Progress reporting for baseline batches

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use warden_application::BaselineProgressNotifier;

/// Reports batch progress with a progress bar on stderr
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn batch_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl BaselineProgressNotifier for ProgressReporter {
    fn on_batch_start(&self, total: usize) {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(Self::batch_style());
        pb.set_prefix("Capturing help");
        pb.set_message("Starting...");

        if let Ok(mut bar) = self.bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_tool_complete(&self, tool_id: &str, success: bool, detail: &str) {
        let Ok(bar) = self.bar.lock() else {
            return;
        };
        if let Some(pb) = bar.as_ref() {
            let status = if success {
                format!("{} {} {}", "v".green(), tool_id, detail.dimmed())
            } else {
                format!("{} {} {}", "x".red(), tool_id, detail.dimmed())
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize) {
        let Ok(mut bar) = self.bar.lock() else {
            return;
        };
        if let Some(pb) = bar.take() {
            let message = if failed == 0 {
                format!("{} baselines checked", succeeded).green()
            } else {
                format!("{} ok, {} failed", succeeded, failed).red()
            };
            pb.finish_with_message(message.to_string());
        }
    }
}

/// Plain line-per-tool progress for non-interactive stderr
pub struct SimpleProgress;

impl BaselineProgressNotifier for SimpleProgress {
    fn on_batch_start(&self, total: usize) {
        eprintln!("{} {} ({} tools)", "->".cyan(), "Capturing help".bold(), total);
    }

    fn on_tool_complete(&self, tool_id: &str, success: bool, detail: &str) {
        if success {
            eprintln!("  {} {} {}", "v".green(), tool_id, detail);
        } else {
            eprintln!("  {} {} (failed: {})", "x".red(), tool_id, detail);
        }
    }

    fn on_batch_complete(&self, _succeeded: usize, _failed: usize) {
        eprintln!();
    }
}
