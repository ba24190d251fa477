use crate::batch::{BatchEvent, BatchSummary};
use crate::enumerator::SkipReason;
use crate::ShredResult;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::Path;
use std::time::Duration;

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({eta}) {wide_msg}";

/// How a per-file line should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Deleted,
    Skipped,
    Failed,
    Info,
}

/// Terminal renderer for a batch event stream.
///
/// Feed it every event in order; it owns the bar and prints one line per
/// file result above it.
pub struct BatchProgress {
    bar: ProgressBar,
    quiet: bool,
}

impl BatchProgress {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Renderer that draws nothing, for JSON output and tests
    pub fn hidden() -> Self {
        let mut progress = Self::with_target(ProgressDrawTarget::hidden());
        progress.quiet = true;
        progress
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), target);
        if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
        }
        Self { bar, quiet: false }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn length(&self) -> Option<u64> {
        self.bar.length()
    }

    pub fn handle(&mut self, event: &BatchEvent) {
        match event {
            BatchEvent::Started { total, .. } => {
                self.bar.set_length(*total as u64);
                self.bar.set_position(0);
            }
            BatchEvent::Progress { completed, total } => {
                self.bar.set_length(*total as u64);
                self.bar.set_position(*completed as u64);
            }
            BatchEvent::FileResult { path, .. } => {
                self.bar.set_message(short_name(path));
            }
            BatchEvent::Completed { cancelled, .. } => {
                if *cancelled {
                    self.bar.abandon_with_message("cancelled");
                } else {
                    self.bar.finish_with_message("done");
                }
            }
            BatchEvent::TargetSkipped { .. } => {}
        }

        if self.quiet {
            return;
        }
        if let Some((kind, line)) = format_event_line(event) {
            self.bar.println(paint(kind, &line));
        }
    }
}

impl Default for BatchProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Plain text line for an event, or `None` for events that only move the bar
pub fn format_event_line(event: &BatchEvent) -> Option<(LineKind, String)> {
    match event {
        BatchEvent::Started { method, total } => Some((
            LineKind::Info,
            format!("Shredding {} file(s) with {}", total, method.label()),
        )),
        BatchEvent::TargetSkipped { path, reason } => {
            let kind = match reason {
                SkipReason::Unreadable(_) => LineKind::Failed,
                _ => LineKind::Skipped,
            };
            Some((kind, format!("  - {}: {}", path.display(), reason)))
        }
        BatchEvent::FileResult { path, result } => Some(match result {
            ShredResult::Deleted => (LineKind::Deleted, format!("  ✓ {}", path.display())),
            ShredResult::SkippedNotFound => (
                LineKind::Skipped,
                format!("  - {}: already gone", path.display()),
            ),
            ShredResult::Failed(e) => (LineKind::Failed, format!("  ✗ {}", e)),
        }),
        BatchEvent::Progress { .. } => None,
        BatchEvent::Completed {
            deleted,
            skipped,
            failed,
            total,
            cancelled,
        } => {
            let kind = if *failed > 0 {
                LineKind::Failed
            } else {
                LineKind::Info
            };
            let mut line = format!(
                "{} deleted, {} skipped, {} failed of {}",
                deleted, skipped, failed, total
            );
            if *cancelled {
                line.push_str(" (cancelled)");
            }
            Some((kind, line))
        }
    }
}

/// Multi-line report printed once the worker has been joined
pub fn format_summary(summary: &BatchSummary) -> String {
    let elapsed = summary
        .end_time
        .map(|end| (end - summary.start_time).num_seconds().max(0) as u64)
        .unwrap_or(0);

    let mut out = String::new();
    out.push_str(&format!("Session:  {}\n", summary.session_id));
    out.push_str(&format!("Method:   {}\n", summary.method.label()));
    out.push_str(&format!(
        "Files:    {} deleted, {} skipped, {} failed of {}\n",
        summary.deleted, summary.skipped, summary.failed, summary.total
    ));
    if summary.targets_skipped > 0 {
        out.push_str(&format!("Targets:  {} skipped\n", summary.targets_skipped));
    }
    if summary.cancelled {
        out.push_str(&format!(
            "Stopped:  cancelled after {} of {} files\n",
            summary.completed, summary.total
        ));
    }
    out.push_str(&format!(
        "Elapsed:  {}",
        humantime::format_duration(Duration::from_secs(elapsed))
    ));
    out
}

fn paint(kind: LineKind, line: &str) -> String {
    match kind {
        LineKind::Deleted => line.green().to_string(),
        LineKind::Skipped => line.yellow().to_string(),
        LineKind::Failed => line.red().to_string(),
        LineKind::Info => line.bold().to_string(),
    }
}

fn short_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
