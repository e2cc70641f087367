//! Calendar-side event types.
//!
//! These represent events as the event repository stores them. The reconciler
//! never constructs a `RemoteEvent` itself: it receives them from an
//! `EventRepository` and describes mutations with `NewEvent` / `EventPatch`.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// An event as reported by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEvent {
    /// Repository id. May be composite (e.g. `abc123@google.com`).
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub start: EventTime,
    /// Exclusive end. For all-day events this is the day after the last day.
    pub end: EventTime,
    /// 1-11, `None` when the event uses the calendar's color.
    #[serde(default)]
    pub color_id: Option<u8>,
    #[serde(default)]
    pub guests: Vec<Guest>,
    /// The calendar owner's own status on this event.
    #[serde(default)]
    pub owner_status: GuestStatus,
}

impl RemoteEvent {
    pub fn is_all_day(&self) -> bool {
        matches!(self.start, EventTime::Date(_))
    }

    /// The event's timing in the same shape the reconciler produces.
    pub fn timing(&self, tz: Tz) -> EventTiming {
        match (&self.start, &self.end) {
            (EventTime::Date(start), EventTime::Date(end)) => EventTiming::AllDaySpan {
                start: *start,
                end: *end,
            },
            (start, end) => EventTiming::Timed {
                start: start.to_utc(tz),
                end: end.to_utc(tz),
            },
        }
    }
}

impl fmt::Display for RemoteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventTime {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

impl EventTime {
    /// Instant of this time; dates resolve to local midnight in `tz`.
    pub fn to_utc(&self, tz: Tz) -> DateTime<Utc> {
        match self {
            EventTime::DateTime(dt) => *dt,
            EventTime::Date(d) => local_midnight(*d, tz),
        }
    }
}

/// Midnight at the start of `date` in `tz`, as UTC.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    local_to_utc(date.and_time(NaiveTime::MIN), tz)
}

/// Wall-clock time `naive` in `tz`, as UTC.
///
/// A time skipped by a DST jump moves forward an hour at a time until it
/// exists, so `02:30` on a spring-forward night becomes `03:30`.
pub fn local_to_utc(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    (0..24)
        .map(|hours| naive + Duration::hours(hours))
        .find_map(|shifted| tz.from_local_datetime(&shifted).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// How an event occupies the calendar.
///
/// The two all-day variants map onto the repository's two all-day calls:
/// `AllDay` creates a single-day event, `AllDaySpan` a multi-day event whose
/// `end` date is exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventTiming {
    Timed {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    AllDay {
        date: NaiveDate,
    },
    AllDaySpan {
        start: NaiveDate,
        end: NaiveDate,
    },
}

impl EventTiming {
    pub fn is_all_day(&self) -> bool {
        !matches!(self, EventTiming::Timed { .. })
    }

    /// All-day timings as `[start, end)` dates.
    fn day_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            EventTiming::Timed { .. } => None,
            EventTiming::AllDay { date } => Some((*date, *date + Duration::days(1))),
            EventTiming::AllDaySpan { start, end } => Some((*start, *end)),
        }
    }

    /// Whether two timings occupy the same span, regardless of which
    /// all-day call produced them.
    pub fn same_span(&self, other: &EventTiming) -> bool {
        match (self, other) {
            (
                EventTiming::Timed { start, end },
                EventTiming::Timed {
                    start: other_start,
                    end: other_end,
                },
            ) => start == other_start && end == other_end,
            _ => match (self.day_span(), other.day_span()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl fmt::Display for EventTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTiming::Timed { start, end } => write!(
                f,
                "{} - {}",
                start.format("%Y-%m-%d %H:%M"),
                end.format("%Y-%m-%d %H:%M")
            ),
            EventTiming::AllDay { date } => write!(f, "{} (all day)", date),
            EventTiming::AllDaySpan { start, end } => {
                write!(f, "{} - {} (all day, end exclusive)", start, end)
            }
        }
    }
}

/// Response status of a guest, or of the calendar owner on an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuestStatus {
    Owner,
    Invited,
    Yes,
    No,
    Maybe,
    #[default]
    Unknown,
}

const GUEST_STATUS_TABLE: &[(&str, GuestStatus)] = &[
    ("OWNER", GuestStatus::Owner),
    ("INVITED", GuestStatus::Invited),
    ("YES", GuestStatus::Yes),
    ("NO", GuestStatus::No),
    ("MAYBE", GuestStatus::Maybe),
    ("UNKNOWN", GuestStatus::Unknown),
];

impl GuestStatus {
    /// Unrecognized strings map to `Unknown`.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        GUEST_STATUS_TABLE
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, status)| *status)
            .unwrap_or(GuestStatus::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        GUEST_STATUS_TABLE
            .iter()
            .find(|(_, status)| status == self)
            .map(|(name, _)| *name)
            .unwrap_or("UNKNOWN")
    }

    /// Statuses a participant can set on themselves.
    pub fn is_response(&self) -> bool {
        matches!(
            self,
            GuestStatus::Invited | GuestStatus::Yes | GuestStatus::No | GuestStatus::Maybe
        )
    }
}

impl fmt::Display for GuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A guest on an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub email: String,
    #[serde(default)]
    pub status: GuestStatus,
}

impl Guest {
    pub fn new(email: impl Into<String>, status: GuestStatus) -> Self {
        Guest {
            email: email.into(),
            status,
        }
    }
}

/// Payload for creating an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub timing: EventTiming,
    pub description: String,
    pub location: String,
    pub color_id: u8,
    /// Comma-joined guest emails.
    pub guest_emails: String,
    pub send_invites: bool,
}

/// The fields of an update. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_id: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<EventTiming>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_status: Option<GuestStatus>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.color_id.is_none()
            && self.timing.is_none()
            && self.owner_status.is_none()
    }
}
