//! Sheet records: one synchronizable event per row.

mod column;
pub mod parse;

pub use column::Column;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::error::{RowSyncError, RowSyncResult};
use crate::event::{Guest, GuestStatus};
use crate::guests::{parse_guest_list, render_guest_list};
use parse::{format_bool, format_timestamp, parse_bool, parse_color, parse_timestamp};

/// Raw cells of one sheet row, in `Column` order.
pub type Row = Vec<String>;

/// One row of synchronizable data.
///
/// Records are materialized fresh from the sheet on every pass and never
/// kept between passes.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Repository id; `None` means the event hasn't been created yet.
    pub id: Option<String>,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub is_all_day: bool,
    pub description: String,
    /// 1-11, `None` when unset.
    pub color_id: Option<u8>,
    pub guests: Vec<Guest>,
    pub owner_status: GuestStatus,
    pub location: String,
    pub send_invites: bool,
    pub delete: bool,
}

impl Record {
    /// Parse a sheet row. `row` is the sheet row number, used for errors.
    ///
    /// Returns `Ok(None)` for blank rows (no title).
    pub fn from_row(cells: &[String], row: usize, tz: Tz) -> RowSyncResult<Option<Record>> {
        let cell = |column: Column| cells.get(column.index()).map(String::as_str).unwrap_or("");
        let malformed = |reason: String| RowSyncError::MalformedRecord { row, reason };

        let title = cell(Column::Title).trim();
        if title.is_empty() {
            return Ok(None);
        }

        let start = parse_timestamp(cell(Column::Start), tz)
            .ok_or_else(|| malformed(format!("unreadable start '{}'", cell(Column::Start))))?;
        let end = parse_timestamp(cell(Column::End), tz)
            .ok_or_else(|| malformed(format!("unreadable end '{}'", cell(Column::End))))?;
        let guests = parse_guest_list(cell(Column::Guests)).map_err(malformed)?;

        let id = Some(cell(Column::Id).trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        Ok(Some(Record {
            id,
            title: title.to_string(),
            start,
            end,
            is_all_day: parse_bool(cell(Column::AllDay)),
            description: cell(Column::Description).to_string(),
            color_id: parse_color(cell(Column::Color)),
            guests,
            owner_status: GuestStatus::parse(cell(Column::OwnerStatus)),
            location: cell(Column::Location).trim().to_string(),
            send_invites: parse_bool(cell(Column::SendInvites)),
            delete: parse_bool(cell(Column::Delete)),
        }))
    }

    /// Render the record as a sheet row, in `Column` order.
    pub fn to_row(&self, tz: Tz) -> Row {
        let mut cells = vec![String::new(); Column::COUNT];
        let mut set = |column: Column, value: String| cells[column.index()] = value;

        set(Column::Id, self.id.clone().unwrap_or_default());
        set(Column::Title, self.title.clone());
        set(Column::Start, format_timestamp(self.start, tz, self.is_all_day));
        set(Column::End, format_timestamp(self.end, tz, self.is_all_day));
        set(Column::AllDay, format_bool(self.is_all_day));
        set(Column::Description, self.description.clone());
        set(
            Column::Color,
            self.color_id.map(|c| c.to_string()).unwrap_or_default(),
        );
        set(Column::Guests, render_guest_list(&self.guests));
        set(Column::OwnerStatus, self.owner_status.to_string());
        set(Column::Location, self.location.clone());
        set(Column::SendInvites, format_bool(self.send_invites));
        set(Column::Delete, format_bool(self.delete));

        cells
    }

    pub fn guest_emails(&self) -> impl Iterator<Item = &str> {
        self.guests.iter().map(|g| g.email.as_str())
    }
}

/// Parse every row of a sheet's data section.
///
/// Blank rows are dropped. Malformed rows are returned separately so the
/// batch can carry on without them. Row numbers count the header as row 1.
pub fn read_batch(rows: &[Row], tz: Tz) -> (Vec<(usize, Record)>, Vec<RowSyncError>) {
    let mut records = Vec::new();
    let mut malformed = Vec::new();

    for (i, cells) in rows.iter().enumerate() {
        let row = i + 2;
        match Record::from_row(cells, row, tz) {
            Ok(Some(record)) => records.push((row, record)),
            Ok(None) => {}
            Err(e) => malformed.push(e),
        }
    }

    (records, malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn parses_a_full_row() {
        let cells = row(&[
            "evt1",
            "Planning",
            "2024-01-05 10:00",
            "2024-01-05 11:00",
            "FALSE",
            "Quarterly",
            "5",
            "a@x.com (YES), b@x.com",
            "maybe",
            "Room 1",
            "TRUE",
            "",
        ]);

        let record = Record::from_row(&cells, 2, chrono_tz::UTC)
            .unwrap()
            .unwrap();

        assert_eq!(record.id.as_deref(), Some("evt1"));
        assert_eq!(record.title, "Planning");
        assert_eq!(record.start.to_rfc3339(), "2024-01-05T10:00:00+00:00");
        assert!(!record.is_all_day);
        assert_eq!(record.color_id, Some(5));
        assert_eq!(record.guests.len(), 2);
        assert_eq!(record.owner_status, GuestStatus::Maybe);
        assert!(record.send_invites);
        assert!(!record.delete);
    }

    #[test]
    fn short_rows_are_padded() {
        let cells = row(&["", "Lunch", "2024-01-05 12:00", "2024-01-05 13:00"]);
        let record = Record::from_row(&cells, 2, chrono_tz::UTC)
            .unwrap()
            .unwrap();

        assert_eq!(record.id, None);
        assert_eq!(record.color_id, None);
        assert!(record.guests.is_empty());
        assert_eq!(record.owner_status, GuestStatus::Unknown);
    }

    #[test]
    fn untitled_rows_are_blank() {
        let cells = row(&["evt1", "  ", "2024-01-05", "2024-01-06"]);
        assert!(Record::from_row(&cells, 2, chrono_tz::UTC).unwrap().is_none());
        assert!(Record::from_row(&[], 2, chrono_tz::UTC).unwrap().is_none());
    }

    #[test]
    fn unreadable_start_is_malformed() {
        let cells = row(&["", "Lunch", "soon", "2024-01-05 13:00"]);
        let err = Record::from_row(&cells, 7, chrono_tz::UTC).unwrap_err();
        assert!(matches!(err, RowSyncError::MalformedRecord { row: 7, .. }));
    }

    #[test]
    fn row_round_trip() {
        let tz: Tz = "America/Chicago".parse().unwrap();
        let cells = row(&[
            "evt1",
            "Standup",
            "2024-02-01 09:00",
            "2024-02-01 09:15",
            "FALSE",
            "",
            "8",
            "a@x.com (YES)",
            "OWNER",
            "",
            "FALSE",
            "FALSE",
        ]);
        let record = Record::from_row(&cells, 2, tz).unwrap().unwrap();
        assert_eq!(record.to_row(tz), cells);
    }

    #[test]
    fn read_batch_separates_blank_and_malformed_rows() {
        let rows = vec![
            row(&["", "A", "2024-01-05", "2024-01-06"]),
            row(&["", "", "", ""]),
            row(&["", "B", "bad", "2024-01-06"]),
            row(&["", "C", "2024-01-07", "2024-01-08"]),
        ];

        let (records, malformed) = read_batch(&rows, chrono_tz::UTC);

        let rows_seen: Vec<usize> = records.iter().map(|(row, _)| *row).collect();
        assert_eq!(rows_seen, vec![2, 5]);
        assert_eq!(malformed.len(), 1);
        assert!(matches!(malformed[0], RowSyncError::MalformedRecord { row: 4, .. }));
    }
}
