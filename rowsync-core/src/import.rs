//! Import: calendar events back into sheet rows.

use std::collections::HashSet;

use chrono_tz::Tz;

use crate::config::SyncSettings;
use crate::date_range::DateRange;
use crate::error::RowSyncResult;
use crate::event::RemoteEvent;
use crate::record::parse::parse_timestamp;
use crate::record::{Column, Record, Row};
use crate::repository::EventRepository;
use crate::sheet::RowStore;

/// Keep only the stable part of a composite repository id
/// (`abc123@google.com` → `abc123`).
pub fn strip_id_suffix(id: &str) -> &str {
    id.split_once('@').map_or(id, |(prefix, _)| prefix)
}

/// The record an imported event becomes. Imported records are never
/// marked for deletion and never re-send invitations.
pub fn to_record(event: &RemoteEvent, tz: Tz) -> Record {
    Record {
        id: Some(strip_id_suffix(&event.id).to_string()),
        title: event.title.clone(),
        start: event.start.to_utc(tz),
        end: event.end.to_utc(tz),
        is_all_day: event.is_all_day(),
        description: event.description.clone(),
        color_id: event.color_id,
        guests: event.guests.clone(),
        owner_status: event.owner_status,
        location: event.location.clone(),
        send_invites: false,
        delete: false,
    }
}

/// Sheet rows for `events`, ordered by start.
pub fn to_rows(events: &[RemoteEvent], tz: Tz) -> Vec<Row> {
    let mut records: Vec<Record> = events.iter().map(|e| to_record(e, tz)).collect();
    records.sort_by_key(|r| r.start);
    records.iter().map(|r| r.to_row(tz)).collect()
}

/// Replace the sheet's rows inside `range` with the calendar's events.
///
/// Returns the number of events imported.
pub async fn import(
    settings: &SyncSettings,
    repo: &dyn EventRepository,
    store: &mut dyn RowStore,
    range: &DateRange,
) -> RowSyncResult<usize> {
    refresh(settings, repo, store, range, &HashSet::new()).await
}

/// Like `import`, but the data rows at the indices in `keep` are left as
/// they are and win over an imported event with the same id.
///
/// Rows starting outside `range`, or whose start can't be read, are kept
/// as well. When the calendar has no events in `range` and nothing is
/// kept, the sheet is cleared.
pub async fn refresh(
    settings: &SyncSettings,
    repo: &dyn EventRepository,
    store: &mut dyn RowStore,
    range: &DateRange,
    keep: &HashSet<usize>,
) -> RowSyncResult<usize> {
    let tz = settings.time_zone;
    let events = repo.list_events(range).await?;
    let existing = store.read_rows()?;

    let kept_ids: HashSet<String> = existing
        .iter()
        .enumerate()
        .filter(|(i, _)| keep.contains(i))
        .filter_map(|(_, row)| row_id(row))
        .collect();

    let imported: Vec<Row> = to_rows(&events, tz)
        .into_iter()
        .filter(|row| row_id(row).is_none_or(|id| !kept_ids.contains(&id)))
        .collect();
    let imported_count = imported.len();
    let imported_ids: HashSet<String> = imported.iter().filter_map(row_id).collect();

    let kept = existing.into_iter().enumerate().filter_map(|(i, row)| {
        let keep_row = keep.contains(&i)
            || (!is_blank(&row)
                && !starts_within(&row, range, tz)
                && row_id(&row).is_none_or(|id| !imported_ids.contains(&id)));
        keep_row.then_some(row)
    });

    let mut rows: Vec<Row> = kept.chain(imported).collect();
    rows.sort_by_cached_key(|row| {
        let start = parse_timestamp(cell(row, Column::Start), tz);
        (start.is_none(), start)
    });

    store.write_rows(&rows)?;

    tracing::info!(range = %range, imported = imported_count, rows = rows.len(), "imported events");
    Ok(imported_count)
}

fn cell(row: &Row, column: Column) -> &str {
    row.get(column.index()).map(String::as_str).unwrap_or("")
}

fn row_id(row: &Row) -> Option<String> {
    Some(cell(row, Column::Id).trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

fn is_blank(row: &Row) -> bool {
    cell(row, Column::Title).trim().is_empty()
}

fn starts_within(row: &Row, range: &DateRange, tz: Tz) -> bool {
    parse_timestamp(cell(row, Column::Start), tz).is_some_and(|start| range.contains(start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventTime, Guest, GuestStatus};
    use crate::testing::{MemoryRepository, MemorySheet};
    use chrono::{DateTime, NaiveDate, Utc};

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn event(id: &str, title: &str, start: &str, end: &str) -> RemoteEvent {
        RemoteEvent {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            location: String::new(),
            start: EventTime::DateTime(at(start)),
            end: EventTime::DateTime(at(end)),
            color_id: Some(3),
            guests: vec![],
            owner_status: GuestStatus::Owner,
        }
    }

    fn row(cells: &[&str]) -> Row {
        let mut row: Row = cells.iter().map(|c| c.to_string()).collect();
        row.resize(Column::COUNT, String::new());
        row
    }

    fn settings() -> SyncSettings {
        SyncSettings::new("primary", chrono_tz::UTC)
    }

    fn february() -> DateRange {
        DateRange::new(at("2024-02-01T00:00:00Z"), at("2024-03-01T00:00:00Z"))
    }

    #[test]
    fn ids_lose_their_suffix() {
        assert_eq!(strip_id_suffix("abc123@google.com"), "abc123");
        assert_eq!(strip_id_suffix("abc123"), "abc123");
        assert_eq!(strip_id_suffix("a@b@c"), "a");
    }

    #[test]
    fn imported_records_are_never_marked() {
        let mut e = event("x@google.com", "Standup", "2024-02-01T09:00:00Z", "2024-02-01T09:15:00Z");
        e.guests = vec![Guest::new("a@x.com", GuestStatus::Yes)];

        let record = to_record(&e, chrono_tz::UTC);

        assert_eq!(record.id.as_deref(), Some("x"));
        assert!(!record.delete);
        assert!(!record.send_invites);
        assert_eq!(
            record.to_row(chrono_tz::UTC)[Column::Guests.index()],
            "a@x.com (YES)"
        );
    }

    #[test]
    fn all_day_events_keep_their_exclusive_end() {
        let mut e = event("x", "Trip", "2024-02-01T00:00:00Z", "2024-02-01T00:00:00Z");
        e.start = EventTime::Date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        e.end = EventTime::Date(NaiveDate::from_ymd_opt(2024, 2, 4).unwrap());

        let row = &to_rows(&[e], chrono_tz::UTC)[0];

        assert_eq!(row[Column::Start.index()], "2024-02-01");
        assert_eq!(row[Column::End.index()], "2024-02-04");
        assert_eq!(row[Column::AllDay.index()], "TRUE");
    }

    #[test]
    fn rows_are_ordered_by_start() {
        let events = vec![
            event("b", "Later", "2024-02-03T09:00:00Z", "2024-02-03T10:00:00Z"),
            event("a", "Sooner", "2024-02-01T09:00:00Z", "2024-02-01T10:00:00Z"),
        ];
        let rows = to_rows(&events, chrono_tz::UTC);
        assert_eq!(rows[0][Column::Title.index()], "Sooner");
        assert_eq!(rows[1][Column::Title.index()], "Later");
    }

    #[tokio::test]
    async fn import_replaces_rows_inside_the_window_only() {
        let repo = MemoryRepository::new("UTC");
        repo.insert(event("e1@memory", "Fresh", "2024-02-10T09:00:00Z", "2024-02-10T10:00:00Z"));
        let mut sheet = MemorySheet::new(vec![
            row(&["old", "Stale", "2024-02-05 09:00", "2024-02-05 10:00"]),
            row(&["", "January", "2024-01-05 09:00", "2024-01-05 10:00"]),
            row(&["", "", "", ""]),
        ]);

        let imported = import(&settings(), &repo, &mut sheet, &february())
            .await
            .unwrap();

        assert_eq!(imported, 1);
        let titles: Vec<&str> = sheet
            .rows()
            .iter()
            .map(|r| r[Column::Title.index()].as_str())
            .collect();
        assert_eq!(titles, vec!["January", "Fresh"]);
        assert_eq!(sheet.rows()[1][Column::Id.index()], "e1");
    }

    #[tokio::test]
    async fn empty_window_clears_it() {
        let repo = MemoryRepository::new("UTC");
        let mut sheet = MemorySheet::new(vec![row(&[
            "gone",
            "Cancelled",
            "2024-02-05 09:00",
            "2024-02-05 10:00",
        ])]);

        let imported = import(&settings(), &repo, &mut sheet, &february())
            .await
            .unwrap();

        assert_eq!(imported, 0);
        assert!(sheet.rows().is_empty());
        assert_eq!(sheet.writes(), 1);
    }

    #[tokio::test]
    async fn kept_rows_win_over_imported_copies() {
        let repo = MemoryRepository::new("UTC");
        repo.insert(event("e1@memory", "Server", "2024-02-10T09:00:00Z", "2024-02-10T10:00:00Z"));
        let mut sheet = MemorySheet::new(vec![row(&[
            "e1",
            "Local edit",
            "2024-02-10 09:00",
            "2024-02-10 10:00",
        ])]);

        let keep = HashSet::from([0]);
        let imported = refresh(&settings(), &repo, &mut sheet, &february(), &keep)
            .await
            .unwrap();

        assert_eq!(imported, 0);
        assert_eq!(sheet.rows().len(), 1);
        assert_eq!(sheet.rows()[0][Column::Title.index()], "Local edit");
    }

    #[tokio::test]
    async fn outside_rows_are_replaced_by_their_imported_copy() {
        let repo = MemoryRepository::new("UTC");
        // Starts before the window but overlaps it.
        repo.insert(event("e1@memory", "Long", "2024-01-31T22:00:00Z", "2024-02-01T02:00:00Z"));
        let mut sheet = MemorySheet::new(vec![row(&[
            "e1",
            "Long",
            "2024-01-31 22:00",
            "2024-02-01 02:00",
        ])]);

        import(&settings(), &repo, &mut sheet, &february())
            .await
            .unwrap();

        assert_eq!(sheet.rows().len(), 1);
    }
}
