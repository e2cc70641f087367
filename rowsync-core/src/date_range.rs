//! Half-open date windows for importing events.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::constants::DEFAULT_IMPORT_DAYS;
use crate::error::{RowSyncError, RowSyncResult};
use crate::event::local_midnight;
use crate::record::Record;

/// A `[from, to)` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        DateRange { from, to }
    }

    /// The window a re-import must cover after writing `records`:
    /// `[min start, max start + 1 day)`.
    ///
    /// Only start times count. The extra day keeps late-day and multi-day
    /// events from being clipped.
    pub fn for_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> RowSyncResult<Self> {
        let (from, to) = records
            .into_iter()
            .map(|r| r.start)
            .fold(None, |bounds, start| match bounds {
                None => Some((start, start)),
                Some((min, max)) => Some((min.min(start), max.max(start))),
            })
            .ok_or(RowSyncError::EmptyBatch)?;

        Ok(DateRange {
            from,
            to: to + Duration::days(1),
        })
    }

    /// Parse CLI-style bounds into a window in `tz`.
    /// - `from`: YYYY-MM-DD, defaults to DEFAULT_IMPORT_DAYS before `today`
    /// - `to`: YYYY-MM-DD (inclusive day), defaults to DEFAULT_IMPORT_DAYS after `today`
    pub fn from_args(
        from: Option<&str>,
        to: Option<&str>,
        today: NaiveDate,
        tz: Tz,
    ) -> Result<Self, String> {
        let from_date = match from {
            Some(s) => parse_date(s)?,
            None => today - Duration::days(DEFAULT_IMPORT_DAYS),
        };

        let to_date = match to {
            Some(s) => parse_date(s)?,
            None => today + Duration::days(DEFAULT_IMPORT_DAYS),
        };

        if to_date < from_date {
            return Err(format!("End date {} is before start date {}", to_date, from_date));
        }

        Ok(DateRange {
            from: local_midnight(from_date, tz),
            to: local_midnight(to_date + Duration::days(1), tz),
        })
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.from <= t && t < self.to
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.from.format("%Y-%m-%d %H:%M"),
            self.to.format("%Y-%m-%d %H:%M")
        )
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
}
