//! Terminal rendering for sync results.
//!
//! Extension traits that add colored output to assignsync-core types using
//! owo_colors.

use assignsync_core::{EventOutcome, Outcome, RunSummary, SyncReport};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for EventOutcome {
    fn render(&self) -> String {
        match &self.outcome {
            Outcome::Added => format!("{} Added: {}", "+".green(), self.summary.green()),
            Outcome::WouldAdd => format!("{} Would add: {}", "+".green(), self.summary),
            Outcome::Skipped => format!(
                "{} {}",
                "=".dimmed(),
                format!("Skipped (already exists): {}", self.summary).dimmed()
            ),
            Outcome::Failed(err) => format!(
                "{} Error adding {}: {}",
                "!".red(),
                self.summary.red(),
                err.red()
            ),
        }
    }
}

impl Render for SyncReport {
    fn render(&self) -> String {
        let mut lines: Vec<String> = self
            .outcomes
            .iter()
            .map(|o| format!("   {}", o.render()))
            .collect();

        if self.read_failed {
            lines.push(String::new());
            lines.push(
                "   Existing records could not be read; duplicates may have been created"
                    .yellow()
                    .to_string(),
            );
        }

        lines.push(String::new());
        lines.push(summary_line(self));
        lines.join("\n")
    }
}

impl Render for RunSummary {
    fn render(&self) -> String {
        match &self.report {
            Some(report) => format!(
                "📅 {} upcoming {} in feed ({} events)\n{}",
                self.candidates,
                pluralize("assignment", self.candidates),
                self.fetched,
                report.render()
            ),
            None => "No upcoming assignments found.".dimmed().to_string(),
        }
    }
}

fn summary_line(report: &SyncReport) -> String {
    let mut parts = Vec::new();

    if report.dry_run {
        parts.push(format!("{} to add", report.would_add()));
    } else {
        parts.push(format!("{} added", report.added()));
    }
    parts.push(format!("{} skipped", report.skipped()));
    if report.failed() > 0 {
        parts.push(format!("{} failed", report.failed()).red().to_string());
    }

    format!("Total: {}", parts.join(", "))
}

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
