//! Permissive cell parsing.
//!
//! Sheet input is noisy, so everything except timestamps falls back to an
//! "unset" value instead of failing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::constants::COLOR_ID_RANGE;
use crate::event::{local_midnight, local_to_utc};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

const TRUE_VALUES: &[&str] = &["true", "yes", "y", "1", "x"];

/// Parse a timestamp cell. Naive values are wall-clock time in `tz`.
pub fn parse_timestamp(cell: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(cell) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(naive) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(cell, fmt).ok())
    {
        return Some(local_to_utc(naive, tz));
    }

    NaiveDate::parse_from_str(cell, DATE_FORMAT)
        .ok()
        .map(|date| local_midnight(date, tz))
}

/// Format a timestamp for a cell, in `tz`. All-day values drop the time,
/// and seconds are only written when there are some.
pub fn format_timestamp(dt: DateTime<Utc>, tz: Tz, all_day: bool) -> String {
    let local = dt.with_timezone(&tz);
    if all_day {
        local.format(DATE_FORMAT).to_string()
    } else if local.second() == 0 {
        local.format("%Y-%m-%d %H:%M").to_string()
    } else {
        local.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

pub fn parse_bool(cell: &str) -> bool {
    let cell = cell.trim();
    TRUE_VALUES.iter().any(|v| v.eq_ignore_ascii_case(cell))
}

pub fn format_bool(value: bool) -> String {
    if value { "TRUE" } else { "FALSE" }.to_string()
}

/// Parse a color cell. `0`, blanks and anything outside 1-11 are unset.
///
/// Numeric cells exported from a spreadsheet may carry a fraction (`8.0`).
pub fn parse_color(cell: &str) -> Option<u8> {
    let value: f64 = cell.trim().parse().ok()?;
    if value.fract() != 0.0 {
        return None;
    }
    let id = u8::try_from(value as i64).ok()?;
    COLOR_ID_RANGE.contains(&id).then_some(id)
}
