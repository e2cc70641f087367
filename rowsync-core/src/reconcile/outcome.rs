use std::fmt;

/// Terminal state of one record after a reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Created {
        id: String,
        /// The row's previous id, when the event had vanished and was recreated.
        replaced: Option<String>,
    },
    Updated {
        id: String,
    },
    Deleted {
        id: String,
    },
    Unchanged {
        id: String,
    },
    /// Delete requested for an event the calendar no longer has.
    AlreadyDeleted {
        id: String,
    },
    /// Rejected before reaching the calendar (malformed row, delete without id).
    Invalid {
        reason: String,
    },
    Failed {
        error: String,
    },
}

impl Outcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::AlreadyDeleted { .. } | Outcome::Invalid { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    /// Rows that didn't reach the calendar keep their sheet contents on refresh.
    pub fn keeps_row(&self) -> bool {
        matches!(self, Outcome::Invalid { .. } | Outcome::Failed { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Created {
                id,
                replaced: Some(old),
            } => write!(f, "recreated as {} (was {})", id, old),
            Outcome::Created { id, replaced: None } => write!(f, "created {}", id),
            Outcome::Updated { id } => write!(f, "updated {}", id),
            Outcome::Deleted { id } => write!(f, "deleted {}", id),
            Outcome::Unchanged { id } => write!(f, "unchanged {}", id),
            Outcome::AlreadyDeleted { id } => write!(f, "{} was already deleted", id),
            Outcome::Invalid { reason } => write!(f, "skipped: {}", reason),
            Outcome::Failed { error } => write!(f, "failed: {}", error),
        }
    }
}

/// The outcome of one sheet row.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    /// Sheet row number, header is row 1.
    pub row: usize,
    pub title: String,
    pub outcome: Outcome,
}
