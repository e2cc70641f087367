//! Colored terminal rendering for rowsync-core types.

use owo_colors::OwoColorize;
use rowsync_core::reconcile::{DiffKind, FieldChange, Outcome, RecordOutcome, RecordPlan};
use rowsync_core::sync::{PlannedRecord, Refresh, SyncSummary};

pub trait Render {
    fn render(&self) -> String;
}

impl Render for DiffKind {
    fn render(&self) -> String {
        let symbol = self.to_string();
        match self {
            DiffKind::Create => symbol.green().to_string(),
            DiffKind::Update => symbol.yellow().to_string(),
            DiffKind::Delete => symbol.red().to_string(),
        }
    }
}

fn row_label(row: usize) -> String {
    format!("(row {})", row).dimmed().to_string()
}

impl Render for RecordOutcome {
    fn render(&self) -> String {
        let title = &self.title;
        let (symbol, title) = match &self.outcome {
            Outcome::Created { .. } => ("+".green().to_string(), title.green().to_string()),
            Outcome::Updated { .. } => ("~".yellow().to_string(), title.yellow().to_string()),
            Outcome::Deleted { .. } => ("-".red().to_string(), title.red().to_string()),
            Outcome::Unchanged { .. } => ("=".dimmed().to_string(), title.dimmed().to_string()),
            Outcome::AlreadyDeleted { .. } | Outcome::Invalid { .. } => {
                ("!".yellow().to_string(), title.to_string())
            }
            Outcome::Failed { .. } => ("!".red().to_string(), title.red().to_string()),
        };

        let detail = match &self.outcome {
            Outcome::Failed { error } => error.red().to_string(),
            other => other.to_string().dimmed().to_string(),
        };

        format!("   {} {} {} {}", symbol, title, row_label(self.row), detail)
    }
}

impl Render for FieldChange {
    fn render(&self) -> String {
        format!(
            "{}: {} → {}",
            self.field.dimmed(),
            self.old.red(),
            self.new.green()
        )
    }
}

impl Render for PlannedRecord {
    fn render(&self) -> String {
        let plan = match &self.plan {
            Ok(plan) => plan,
            Err(e) => {
                return format!(
                    "   {} {} {} {}",
                    "!".red(),
                    self.title.red(),
                    row_label(self.row),
                    e.red()
                );
            }
        };

        let mut lines = Vec::new();
        let head = match plan.kind() {
            Some(kind) => format!("   {} {}", kind.render(), self.title),
            None => match plan {
                RecordPlan::Invalid { .. } => format!("   {} {}", "!".yellow(), self.title),
                _ => format!("   {} {}", "=".dimmed(), self.title.dimmed()),
            },
        };
        lines.push(format!("{} {}", head, row_label(self.row)));

        match plan {
            RecordPlan::Create {
                stale_id: Some(id), ..
            } => lines.push(format!("      {}", format!("{} no longer exists", id).dimmed())),
            RecordPlan::Update {
                changes, guests, ..
            } => {
                lines.extend(changes.iter().map(|c| format!("      {}", c.render())));
                lines.extend(
                    guests
                        .to_add
                        .iter()
                        .map(|email| format!("      {} {}", "+".green(), email.green())),
                );
                lines.extend(
                    guests
                        .to_remove
                        .iter()
                        .map(|email| format!("      {} {}", "-".red(), email.red())),
                );
            }
            RecordPlan::Invalid { reason } => {
                lines.push(format!("      {}", reason.yellow()));
            }
            _ => {}
        }

        lines.join("\n")
    }
}

pub fn render_refresh(refresh: &Refresh) -> String {
    match refresh {
        Refresh::Skipped => "   Nothing to refresh".dimmed().to_string(),
        Refresh::Done(report) => format!(
            "   Refreshed {} {} for {}",
            report.imported,
            pluralize("event", report.imported),
            report.range
        )
        .dimmed()
        .to_string(),
        Refresh::Failed(e) => format!("   Refresh failed: {}", e).red().to_string(),
    }
}

pub fn render_counts(summary: &SyncSummary) -> String {
    let line = format!(
        "Pushed: {} created, {} updated, {} deleted, {} failed",
        summary.created(),
        summary.updated(),
        summary.deleted(),
        summary.failed()
    );
    if summary.failed() > 0 {
        line.red().to_string()
    } else {
        line
    }
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
