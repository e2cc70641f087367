//! What a push did.

use crate::date_range::DateRange;
use crate::reconcile::{Outcome, RecordOutcome};

#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    pub range: DateRange,
    pub imported: usize,
}

/// The re-import that follows the writes of a push.
#[derive(Debug, Clone, PartialEq)]
pub enum Refresh {
    /// No readable records, so there was no window to re-import.
    Skipped,
    Done(RefreshReport),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncSummary {
    pub outcomes: Vec<RecordOutcome>,
    pub refresh: Refresh,
}

impl SyncSummary {
    fn count(&self, matches: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| matches(&o.outcome)).count()
    }

    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Created { .. }))
    }

    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Updated { .. }))
    }

    pub fn deleted(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Deleted { .. }))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Unchanged { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(Outcome::is_skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(Outcome::is_failed)
    }

    pub fn refreshed(&self) -> Option<&RefreshReport> {
        match &self.refresh {
            Refresh::Done(report) => Some(report),
            _ => None,
        }
    }
}
