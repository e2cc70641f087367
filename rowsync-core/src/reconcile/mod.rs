//! Per-record reconciliation against the event repository.
//!
//! Each record becomes exactly one of create, update or delete, decided
//! fresh on every pass:
//! - a row marked for deletion is deleted and nothing else is attempted
//! - a row with an id is diffed against the calendar's copy, field by field
//! - a row without an id is created
//!
//! Planning is read-only (it may call `get`), so `status` can show what a
//! push would do without writing anything.

mod outcome;
mod plan;

pub use outcome::{Outcome, RecordOutcome};
pub use plan::{DiffKind, FieldChange, RecordPlan};

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use crate::constants::DEFAULT_COLOR_ID;
use crate::error::RowSyncResult;
use crate::event::{EventPatch, EventTiming, GuestStatus, NewEvent, RemoteEvent, local_to_utc};
use crate::guests::{GuestDiff, join_emails};
use crate::record::Record;
use crate::repository::EventRepository;

pub struct Reconciler<'a> {
    repo: &'a dyn EventRepository,
    time_zone: Tz,
}

impl<'a> Reconciler<'a> {
    pub fn new(repo: &'a dyn EventRepository, time_zone: Tz) -> Self {
        Reconciler { repo, time_zone }
    }

    /// Decide what to do with `record`.
    pub async fn plan(&self, record: &Record) -> RowSyncResult<RecordPlan> {
        if record.delete {
            return Ok(match &record.id {
                Some(id) => RecordPlan::Delete { id: id.clone() },
                None => RecordPlan::Invalid {
                    reason: "marked for deletion but has no id".into(),
                },
            });
        }

        let Some(id) = &record.id else {
            return Ok(RecordPlan::Create {
                event: self.new_event(record),
                stale_id: None,
            });
        };

        match self.repo.get(id).await {
            Ok(remote) => Ok(self.diff(id, record, &remote)),
            Err(e) if e.is_not_found() => {
                tracing::info!(id = %id, title = %record.title, "event is gone, recreating");
                Ok(RecordPlan::Create {
                    event: self.new_event(record),
                    stale_id: Some(id.clone()),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Carry out `plan` for `record`.
    pub async fn apply(&self, record: &Record, plan: RecordPlan) -> RowSyncResult<Outcome> {
        match plan {
            RecordPlan::Create { event, stale_id } => {
                let created = self.repo.create(&event).await?;
                Ok(Outcome::Created {
                    id: created.id,
                    replaced: stale_id,
                })
            }
            RecordPlan::Update {
                id, patch, guests, ..
            } => match self.update(&id, &patch, &guests).await {
                Ok(()) => Ok(Outcome::Updated { id }),
                Err(e) if e.is_not_found() => {
                    tracing::info!(id = %id, "event vanished during update, recreating");
                    let created = self.repo.create(&self.new_event(record)).await?;
                    Ok(Outcome::Created {
                        id: created.id,
                        replaced: Some(id),
                    })
                }
                Err(e) => Err(e),
            },
            RecordPlan::Unchanged { id } => Ok(Outcome::Unchanged { id }),
            RecordPlan::Delete { id } => match self.repo.delete(&id).await {
                Ok(()) => Ok(Outcome::Deleted { id }),
                Err(e) if e.is_not_found() => Ok(Outcome::AlreadyDeleted { id }),
                Err(e) => Err(e),
            },
            RecordPlan::Invalid { reason } => Ok(Outcome::Invalid { reason }),
        }
    }

    /// Send the field patch, then the guest changes one by one.
    async fn update(&self, id: &str, patch: &EventPatch, guests: &GuestDiff) -> RowSyncResult<()> {
        if !patch.is_empty() {
            self.repo.update(id, patch).await?;
        }
        for email in &guests.to_add {
            self.repo.add_guest(id, email).await?;
        }
        for email in &guests.to_remove {
            self.repo.remove_guest(id, email).await?;
        }
        Ok(())
    }

    /// Plan and apply one record. Errors become a `Failed` outcome.
    pub async fn reconcile(&self, record: &Record) -> Outcome {
        let result = match self.plan(record).await {
            Ok(plan) => {
                tracing::debug!(title = %record.title, kind = ?plan.kind(), "planned record");
                self.apply(record, plan).await
            }
            Err(e) => Err(e),
        };

        result.unwrap_or_else(|e| {
            tracing::warn!(title = %record.title, error = %e, "record failed");
            Outcome::Failed {
                error: e.to_string(),
            }
        })
    }

    /// Creation payload for `record`.
    pub fn new_event(&self, record: &Record) -> NewEvent {
        NewEvent {
            title: record.title.clone(),
            timing: effective_timing(record, self.time_zone),
            description: record.description.clone(),
            location: record.location.clone(),
            color_id: record.color_id.unwrap_or(DEFAULT_COLOR_ID),
            guest_emails: join_emails(&record.guests),
            send_invites: record.send_invites,
        }
    }

    /// Minimal update between `record` and the calendar's copy.
    fn diff(&self, id: &str, record: &Record, remote: &RemoteEvent) -> RecordPlan {
        let mut patch = EventPatch::default();
        let mut changes = Vec::new();
        let mut change = |field: &'static str, old: String, new: String| {
            changes.push(FieldChange { field, old, new });
        };

        if record.title != remote.title.trim() {
            change("title", remote.title.clone(), record.title.clone());
            patch.title = Some(record.title.clone());
        }

        if record.description != remote.description {
            change(
                "description",
                remote.description.clone(),
                record.description.clone(),
            );
            patch.description = Some(record.description.clone());
        }

        if record.location != remote.location.trim() {
            change("location", remote.location.clone(), record.location.clone());
            patch.location = Some(record.location.clone());
        }

        if let Some(color_id) = color_change(record.color_id, remote.color_id) {
            change(
                "color",
                remote.color_id.map(|c| c.to_string()).unwrap_or_default(),
                color_id.to_string(),
            );
            patch.color_id = Some(color_id);
        }

        let desired = effective_timing(record, self.time_zone);
        let current = remote.timing(self.time_zone);
        if !desired.same_span(&current) {
            change("time", current.to_string(), desired.to_string());
            patch.timing = Some(desired);
        }

        if owner_status_changes(record.owner_status, remote.owner_status) {
            change(
                "my_status",
                remote.owner_status.to_string(),
                record.owner_status.to_string(),
            );
            patch.owner_status = Some(record.owner_status);
        }

        let guests = GuestDiff::compute(record.guest_emails(), &remote.guests);

        if patch.is_empty() && guests.is_empty() {
            RecordPlan::Unchanged { id: id.to_string() }
        } else {
            RecordPlan::Update {
                id: id.to_string(),
                patch,
                guests,
                changes,
            }
        }
    }
}

/// The color to send, if it differs from the calendar's.
///
/// A row without a color leaves a colorless event alone.
fn color_change(desired: Option<u8>, current: Option<u8>) -> Option<u8> {
    match (desired, current) {
        (None, None) => None,
        (desired, current) => {
            let desired = desired.unwrap_or(DEFAULT_COLOR_ID);
            (current != Some(desired)).then_some(desired)
        }
    }
}

/// The owner can only set a response, and never on their own event.
fn owner_status_changes(desired: GuestStatus, current: GuestStatus) -> bool {
    desired.is_response() && current != GuestStatus::Owner && desired != current
}

/// How `record` should occupy the calendar.
///
/// All-day rows are truncated to days in `tz`: a row starting and ending
/// on the same day (or ending before it starts) is a single-day event,
/// anything longer a multi-day event with an exclusive end date.
pub fn effective_timing(record: &Record, tz: Tz) -> EventTiming {
    if record.is_all_day {
        let start = record.start.with_timezone(&tz).date_naive();
        let end = record.end.with_timezone(&tz).date_naive();
        if end > start {
            EventTiming::AllDaySpan { start, end }
        } else {
            EventTiming::AllDay { date: start }
        }
    } else {
        EventTiming::Timed {
            start: record.start,
            end: effective_end(record.start, record.end, tz),
        }
    }
}

/// An end at or before the start means "the next day": the end's
/// time-of-day on the day after the start.
pub fn effective_end(start: DateTime<Utc>, end: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    if start < end {
        return end;
    }

    let next_day = start.with_timezone(&tz).date_naive() + Duration::days(1);
    let time_of_day = end.with_timezone(&tz).time();

    Some(local_to_utc(next_day.and_time(time_of_day), tz))
        .filter(|dt| *dt > start)
        .unwrap_or(start + Duration::days(1))
}
