use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use rowsync_core::event::{EventTime, Guest, GuestStatus, RemoteEvent};
use rowsync_core::import;
use rowsync_core::reconcile::Outcome;
use rowsync_core::record::{Column, Record, Row, read_batch};
use rowsync_core::sync::{Refresh, push};
use rowsync_core::testing::{MemoryRepository, MemorySheet, RepoCall};
use rowsync_core::{DateRange, JsonSheet, RowStore, SyncSettings};

const ZONE: &str = "America/New_York";

fn tz() -> Tz {
    ZONE.parse().unwrap()
}

fn settings() -> SyncSettings {
    SyncSettings::new("primary", tz())
}

fn row(cells: &[&str]) -> Row {
    let mut row: Row = cells.iter().map(|c| c.to_string()).collect();
    row.resize(Column::COUNT, String::new());
    row
}

fn set(row: &mut Row, column: Column, value: &str) {
    row[column.index()] = value.to_string();
}

fn records(rows: &[Row]) -> Vec<Record> {
    let (records, malformed) = read_batch(rows, tz());
    assert!(malformed.is_empty(), "{malformed:?}");
    records.into_iter().map(|(_, r)| r).collect()
}

fn find<'a>(records: &'a [Record], title: &str) -> &'a Record {
    records
        .iter()
        .find(|r| r.title == title)
        .unwrap_or_else(|| panic!("no record titled {title}"))
}

fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

/// A sheet with one of each kind of row.
fn mixed_sheet() -> Vec<Row> {
    let mut review = row(&["", "Design review", "2024-01-05 10:00", "2024-01-05 11:30"]);
    set(&mut review, Column::Description, "Bring the mockups");
    set(&mut review, Column::Location, "Room 4");
    set(&mut review, Column::Color, "5");
    set(&mut review, Column::Guests, "a@x.com, b@x.com");
    set(&mut review, Column::SendInvites, "TRUE");

    let mut holiday = row(&["", "Holiday", "2024-01-08", "2024-01-08"]);
    set(&mut holiday, Column::AllDay, "TRUE");

    let mut offsite = row(&["", "Offsite", "2024-01-03", "2024-01-06"]);
    set(&mut offsite, Column::AllDay, "yes");

    let late = row(&["", "Late shift", "2024-01-10 20:00", "2024-01-10 19:00"]);

    vec![review, holiday, offsite, late]
}

#[tokio::test]
async fn second_push_of_an_unchanged_sheet_writes_nothing() {
    let repo = MemoryRepository::new(ZONE);
    let mut sheet = MemorySheet::new(mixed_sheet());

    let first = push(&settings(), &repo, &mut sheet).await.unwrap();
    assert_eq!(first.created(), 4);
    assert_eq!(first.failed(), 0);

    repo.clear_calls();
    let second = push(&settings(), &repo, &mut sheet).await.unwrap();

    assert_eq!(second.unchanged(), 4);
    assert!(repo.writes().is_empty(), "{:?}", repo.writes());
}

#[tokio::test]
async fn pushing_a_freshly_pulled_sheet_writes_nothing() {
    let repo = MemoryRepository::new(ZONE);
    repo.insert(RemoteEvent {
        id: "e1@memory".to_string(),
        title: "Standup ".to_string(),
        description: "Daily".to_string(),
        location: "Room 1".to_string(),
        start: EventTime::DateTime(at("2024-01-05T14:00:30Z")),
        end: EventTime::DateTime(at("2024-01-05T14:15:00Z")),
        color_id: Some(3),
        guests: vec![Guest::new("a@x.com", GuestStatus::Yes)],
        owner_status: GuestStatus::Owner,
    });
    let mut sheet = MemorySheet::new(vec![]);
    let range = DateRange::new(at("2024-01-01T05:00:00Z"), at("2024-02-01T05:00:00Z"));

    let imported = import::import(&settings(), &repo, &mut sheet, &range)
        .await
        .unwrap();
    assert_eq!(imported, 1);
    assert_eq!(sheet.rows()[0][Column::Start.index()], "2024-01-05 09:00:30");

    repo.clear_calls();
    let summary = push(&settings(), &repo, &mut sheet).await.unwrap();

    assert_eq!(summary.unchanged(), 1);
    assert!(repo.writes().is_empty(), "{:?}", repo.writes());
    assert_eq!(
        repo.event("e1").unwrap().start,
        EventTime::DateTime(at("2024-01-05T14:00:30Z"))
    );
}

#[tokio::test]
async fn pushed_rows_come_back_as_written() {
    let repo = MemoryRepository::new(ZONE);
    let intent = records(&mixed_sheet());
    let mut sheet = MemorySheet::new(mixed_sheet());

    push(&settings(), &repo, &mut sheet).await.unwrap();
    let imported = records(sheet.rows());

    assert_eq!(imported.len(), intent.len());
    for written in &intent {
        let back = find(&imported, &written.title);
        let id = back.id.as_deref().unwrap();
        assert!(!id.contains('@'), "id suffix kept: {id}");
        assert_eq!(back.description, written.description);
        assert_eq!(back.location, written.location);
        assert_eq!(back.is_all_day, written.is_all_day);
        assert_eq!(back.start, written.start);
        assert_eq!(back.color_id, Some(written.color_id.unwrap_or(8)));
        assert!(!back.delete);
        let emails: Vec<&str> = back.guest_emails().collect();
        let written_emails: Vec<&str> = written.guest_emails().collect();
        assert_eq!(emails, written_emails);
    }

    // Ends come back normalized.
    assert_eq!(find(&imported, "Design review").end, find(&intent, "Design review").end);
    assert_eq!(find(&imported, "Offsite").end, find(&intent, "Offsite").end);
    assert_eq!(
        find(&imported, "Late shift").end,
        at("2024-01-12T00:00:00Z") // 2024-01-11 19:00 in New York
    );
    assert_eq!(
        sheet.rows().iter().find(|r| r[Column::Title.index()] == "Holiday").unwrap()
            [Column::End.index()],
        "2024-01-09"
    );
}

#[tokio::test]
async fn imported_rows_are_ordered_by_start() {
    let repo = MemoryRepository::new(ZONE);
    let mut sheet = MemorySheet::new(mixed_sheet());

    push(&settings(), &repo, &mut sheet).await.unwrap();

    let titles: Vec<&str> = sheet
        .rows()
        .iter()
        .map(|r| r[Column::Title.index()].as_str())
        .collect();
    assert_eq!(titles, vec!["Offsite", "Design review", "Holiday", "Late shift"]);
}

#[tokio::test]
async fn delete_flag_only_deletes() {
    let repo = MemoryRepository::new(ZONE);
    let mut sheet = MemorySheet::new(vec![row(&[
        "",
        "Standup",
        "2024-01-05 09:00",
        "2024-01-05 09:15",
    ])]);
    push(&settings(), &repo, &mut sheet).await.unwrap();
    let id = sheet.rows()[0][Column::Id.index()].clone();

    let mut marked = sheet.rows()[0].clone();
    set(&mut marked, Column::Title, "Renamed");
    set(&mut marked, Column::Color, "2");
    set(&mut marked, Column::Guests, "z@x.com");
    set(&mut marked, Column::Delete, "TRUE");
    let mut sheet = MemorySheet::new(vec![marked]);
    repo.clear_calls();

    let summary = push(&settings(), &repo, &mut sheet).await.unwrap();

    assert_eq!(summary.deleted(), 1);
    assert_eq!(repo.writes(), vec![RepoCall::Delete(id)]);
    assert!(repo.events().is_empty());
    assert!(sheet.rows().is_empty());
}

#[tokio::test]
async fn row_pointing_at_a_deleted_event_is_recreated() {
    let repo = MemoryRepository::new(ZONE);
    let mut sheet = MemorySheet::new(vec![row(&[
        "deleted-long-ago",
        "Retro",
        "2024-01-05 15:00",
        "2024-01-05 16:00",
    ])]);

    let summary = push(&settings(), &repo, &mut sheet).await.unwrap();

    assert!(matches!(
        &summary.outcomes[0].outcome,
        Outcome::Created { replaced: Some(old), .. } if old == "deleted-long-ago"
    ));
    let creates: Vec<RepoCall> = repo
        .writes()
        .into_iter()
        .filter(|c| matches!(c, RepoCall::Create(_)))
        .collect();
    assert_eq!(creates, vec![RepoCall::Create("Retro".to_string())]);

    let new_id = &sheet.rows()[0][Column::Id.index()];
    assert_ne!(new_id, "deleted-long-ago");
    assert!(repo.event(new_id).is_some());
}

#[tokio::test]
async fn end_before_start_creates_next_day_event() {
    let repo = MemoryRepository::new("UTC");
    let mut sheet = MemorySheet::new(vec![row(&[
        "",
        "Night",
        "2024-02-01T20:00",
        "2024-02-01T19:00",
    ])]);

    push(&SyncSettings::new("primary", chrono_tz::UTC), &repo, &mut sheet)
        .await
        .unwrap();

    assert_eq!(sheet.rows()[0][Column::End.index()], "2024-02-02 19:00");
}

#[tokio::test]
async fn push_round_trips_through_a_json_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let mut sheet = JsonSheet::new(dir.path().join("calendar.json"));
    sheet.write_rows(&mixed_sheet()).unwrap();
    let repo = MemoryRepository::new(ZONE);

    let summary = push(&settings(), &repo, &mut sheet).await.unwrap();

    assert!(matches!(summary.refresh, Refresh::Done(ref r) if r.imported == 4));
    let rows = sheet.read_rows().unwrap();
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| !r[Column::Id.index()].is_empty()));
}
