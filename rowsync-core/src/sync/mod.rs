//! Sync orchestration: push a sheet's rows to the calendar, then refresh
//! the sheet from the calendar over the window that was written.
//!
//! Records are reconciled one at a time and every write is awaited before
//! the refresh starts, so the re-import always sees this pass's writes.

mod summary;

pub use summary::{Refresh, RefreshReport, SyncSummary};

use std::collections::HashSet;

use tracing::Instrument;

use crate::config::SyncSettings;
use crate::date_range::DateRange;
use crate::error::{RowSyncError, RowSyncResult};
use crate::import;
use crate::reconcile::{Outcome, RecordOutcome, RecordPlan, Reconciler};
use crate::record::{Column, Row, read_batch};
use crate::repository::EventRepository;
use crate::sheet::RowStore;

/// Sheet rows start at 2; row 1 is the header.
const FIRST_DATA_ROW: usize = 2;

/// Push every row of `store` to `repo`, then re-import the affected window.
///
/// Only reading the sheet can fail the whole pass. Per-record problems
/// are reported in the summary.
pub async fn push(
    settings: &SyncSettings,
    repo: &dyn EventRepository,
    store: &mut dyn RowStore,
) -> RowSyncResult<SyncSummary> {
    let span = tracing::info_span!("sync_pass", calendar = %settings.calendar_id);
    push_rows(settings, repo, store).instrument(span).await
}

async fn push_rows(
    settings: &SyncSettings,
    repo: &dyn EventRepository,
    store: &mut dyn RowStore,
) -> RowSyncResult<SyncSummary> {
    let rows = store.read_rows()?;
    let (records, malformed) = read_batch(&rows, settings.time_zone);
    tracing::info!(
        records = records.len(),
        malformed = malformed.len(),
        "starting push"
    );

    let mut outcomes: Vec<RecordOutcome> = malformed
        .into_iter()
        .map(|e| malformed_outcome(&rows, e))
        .collect();

    let reconciler = Reconciler::new(repo, settings.time_zone);
    for (row, record) in &records {
        let outcome = reconciler.reconcile(record).await;
        outcomes.push(RecordOutcome {
            row: *row,
            title: record.title.clone(),
            outcome,
        });
    }
    outcomes.sort_by_key(|o| o.row);

    let keep: HashSet<usize> = outcomes
        .iter()
        .filter(|o| o.outcome.keeps_row())
        .filter_map(|o| o.row.checked_sub(FIRST_DATA_ROW))
        .collect();

    let refresh = match DateRange::for_records(records.iter().map(|(_, r)| r)) {
        Ok(range) => match import::refresh(settings, repo, store, &range, &keep).await {
            Ok(imported) => Refresh::Done(RefreshReport { range, imported }),
            Err(e) => {
                tracing::warn!(range = %range, error = %e, "refresh failed");
                Refresh::Failed(e.to_string())
            }
        },
        Err(RowSyncError::EmptyBatch) => Refresh::Skipped,
        Err(e) => Refresh::Failed(e.to_string()),
    };

    let summary = SyncSummary { outcomes, refresh };
    tracing::info!(
        created = summary.created(),
        updated = summary.updated(),
        deleted = summary.deleted(),
        failed = summary.failed(),
        "push finished"
    );
    Ok(summary)
}

fn malformed_outcome(rows: &[Row], error: RowSyncError) -> RecordOutcome {
    let row = error.row().unwrap_or_default();
    tracing::warn!(row, error = %error, "skipping malformed row");
    RecordOutcome {
        row,
        title: title_at(rows, row),
        outcome: Outcome::Failed {
            error: error.to_string(),
        },
    }
}

fn title_at(rows: &[Row], row: usize) -> String {
    row.checked_sub(FIRST_DATA_ROW)
        .and_then(|i| rows.get(i))
        .and_then(|cells| cells.get(Column::Title.index()))
        .map(|title| title.trim().to_string())
        .unwrap_or_default()
}

/// A planned record, for previewing a push.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRecord {
    pub row: usize,
    pub title: String,
    /// `Err` when the row can't be read or the calendar lookup failed.
    pub plan: Result<RecordPlan, String>,
}

/// What `push` would do, without writing anything.
pub async fn plan_batch(
    settings: &SyncSettings,
    repo: &dyn EventRepository,
    store: &dyn RowStore,
) -> RowSyncResult<Vec<PlannedRecord>> {
    let rows = store.read_rows()?;
    let (records, malformed) = read_batch(&rows, settings.time_zone);

    let mut planned: Vec<PlannedRecord> = malformed
        .into_iter()
        .map(|e| {
            let row = e.row().unwrap_or_default();
            PlannedRecord {
                row,
                title: title_at(&rows, row),
                plan: Err(e.to_string()),
            }
        })
        .collect();

    let reconciler = Reconciler::new(repo, settings.time_zone);
    for (row, record) in &records {
        planned.push(PlannedRecord {
            row: *row,
            title: record.title.clone(),
            plan: reconciler.plan(record).await.map_err(|e| e.to_string()),
        });
    }
    planned.sort_by_key(|p| p.row);

    Ok(planned)
}
