use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::{EventPatch, NewEvent};
use crate::guests::GuestDiff;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffKind::Create => write!(f, "+"),
            DiffKind::Update => write!(f, "~"),
            DiffKind::Delete => write!(f, "-"),
        }
    }
}

/// One changed field of an update, rendered for display.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub field: &'static str,
    pub old: String,
    pub new: String,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:?} → {:?}", self.field, self.old, self.new)
    }
}

/// What the reconciler intends to do with one record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordPlan {
    Create {
        event: NewEvent,
        /// Set when the row's id no longer exists in the calendar.
        stale_id: Option<String>,
    },
    Update {
        id: String,
        patch: EventPatch,
        guests: GuestDiff,
        changes: Vec<FieldChange>,
    },
    Unchanged {
        id: String,
    },
    Delete {
        id: String,
    },
    /// Rejected locally; nothing is sent to the calendar.
    Invalid {
        reason: String,
    },
}

impl RecordPlan {
    pub fn kind(&self) -> Option<DiffKind> {
        match self {
            RecordPlan::Create { .. } => Some(DiffKind::Create),
            RecordPlan::Update { .. } => Some(DiffKind::Update),
            RecordPlan::Delete { .. } => Some(DiffKind::Delete),
            RecordPlan::Unchanged { .. } | RecordPlan::Invalid { .. } => None,
        }
    }

    pub fn writes(&self) -> bool {
        self.kind().is_some()
    }
}
