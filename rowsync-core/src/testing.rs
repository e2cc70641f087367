//! In-memory collaborators for tests.
//!
//! `MemoryRepository` behaves like a small calendar server: it assigns
//! composite ids (`<uuid>@memory`), accepts ids with or without that
//! suffix, fills in a default color and records every call it receives.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Duration;

use crate::constants::{COLOR_ID_RANGE, DEFAULT_COLOR_ID};
use crate::date_range::DateRange;
use crate::error::{RowSyncError, RowSyncResult};
use crate::event::{
    EventPatch, EventTime, EventTiming, Guest, GuestStatus, NewEvent, RemoteEvent,
};
use crate::import::strip_id_suffix;
use crate::record::Row;
use crate::repository::EventRepository;
use crate::sheet::RowStore;

/// A call received by `MemoryRepository`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoCall {
    TimeZone,
    Get(String),
    /// Carries the new event's title.
    Create(String),
    Update(String),
    Delete(String),
    ListEvents,
    AddGuest(String, String),
    RemoveGuest(String, String),
}

impl RepoCall {
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            RepoCall::TimeZone | RepoCall::Get(_) | RepoCall::ListEvents
        )
    }
}

#[derive(Debug, Default)]
struct CalendarState {
    events: Vec<RemoteEvent>,
    calls: Vec<RepoCall>,
    failing_titles: HashSet<String>,
    vanishing: HashSet<String>,
}

impl CalendarState {
    fn position(&self, id: &str) -> RowSyncResult<usize> {
        self.events
            .iter()
            .position(|e| e.id == id || strip_id_suffix(&e.id) == id)
            .ok_or_else(|| RowSyncError::NotFound(id.to_string()))
    }

    /// Position of `id` for a write. An event marked to vanish is removed
    /// first, so the write sees NotFound.
    fn position_for_write(&mut self, id: &str) -> RowSyncResult<usize> {
        if self.vanishing.remove(id) {
            let index = self.position(id)?;
            self.events.remove(index);
        }
        self.position(id)
    }

    fn check_failing(&self, title: &str) -> RowSyncResult<()> {
        if self.failing_titles.contains(title) {
            return Err(RowSyncError::Provider(format!(
                "rejected event '{}'",
                title
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MemoryRepository {
    time_zone: String,
    state: Arc<Mutex<CalendarState>>,
}

impl MemoryRepository {
    pub fn new(time_zone: &str) -> Self {
        MemoryRepository {
            time_zone: time_zone.to_string(),
            state: Arc::new(Mutex::new(CalendarState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, CalendarState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an event directly, bypassing the call log.
    pub fn insert(&self, event: RemoteEvent) {
        self.state().events.push(event);
    }

    pub fn events(&self) -> Vec<RemoteEvent> {
        self.state().events.clone()
    }

    pub fn event(&self, id: &str) -> Option<RemoteEvent> {
        let state = self.state();
        let index = state.position(id).ok()?;
        Some(state.events[index].clone())
    }

    /// Change the owner's status without logging a call.
    pub fn set_owner_status(&self, id: &str, status: GuestStatus) {
        let mut state = self.state();
        if let Ok(index) = state.position(id) {
            state.events[index].owner_status = status;
        }
    }

    pub fn calls(&self) -> Vec<RepoCall> {
        self.state().calls.clone()
    }

    pub fn writes(&self) -> Vec<RepoCall> {
        self.calls().into_iter().filter(RepoCall::is_write).collect()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Make event `id` disappear when the next update or guest change for
    /// it arrives, as if someone deleted it after it was read.
    pub fn vanish_on_write(&self, id: &str) {
        self.state().vanishing.insert(id.to_string());
    }

    /// Make creates and updates of events titled `title` fail.
    pub fn fail_on(&self, title: &str) {
        self.state().failing_titles.insert(title.to_string());
    }
}

fn to_event_times(timing: &EventTiming) -> (EventTime, EventTime) {
    match timing {
        EventTiming::Timed { start, end } => (EventTime::DateTime(*start), EventTime::DateTime(*end)),
        EventTiming::AllDay { date } => (
            EventTime::Date(*date),
            EventTime::Date(*date + Duration::days(1)),
        ),
        EventTiming::AllDaySpan { start, end } => (EventTime::Date(*start), EventTime::Date(*end)),
    }
}

fn normalize_color(color_id: u8) -> u8 {
    if COLOR_ID_RANGE.contains(&color_id) {
        color_id
    } else {
        DEFAULT_COLOR_ID
    }
}

#[async_trait]
impl EventRepository for MemoryRepository {
    async fn time_zone(&self) -> RowSyncResult<String> {
        self.state().calls.push(RepoCall::TimeZone);
        Ok(self.time_zone.clone())
    }

    async fn get(&self, id: &str) -> RowSyncResult<RemoteEvent> {
        let mut state = self.state();
        state.calls.push(RepoCall::Get(id.to_string()));
        let index = state.position(id)?;
        Ok(state.events[index].clone())
    }

    async fn create(&self, event: &NewEvent) -> RowSyncResult<RemoteEvent> {
        let mut state = self.state();
        state.calls.push(RepoCall::Create(event.title.clone()));
        state.check_failing(&event.title)?;

        let (start, end) = to_event_times(&event.timing);
        let guests = event
            .guest_emails
            .split(',')
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(|email| Guest::new(email, GuestStatus::Invited))
            .collect();

        let created = RemoteEvent {
            id: format!("{}@memory", uuid::Uuid::new_v4().simple()),
            title: event.title.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
            start,
            end,
            color_id: Some(normalize_color(event.color_id)),
            guests,
            owner_status: GuestStatus::Owner,
        };
        state.events.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, patch: &EventPatch) -> RowSyncResult<RemoteEvent> {
        let mut state = self.state();
        state.calls.push(RepoCall::Update(id.to_string()));
        let index = state.position_for_write(id)?;
        let title = patch
            .title
            .clone()
            .unwrap_or_else(|| state.events[index].title.clone());
        state.check_failing(&title)?;

        let event = &mut state.events[index];
        event.title = title;
        if let Some(description) = &patch.description {
            event.description = description.clone();
        }
        if let Some(location) = &patch.location {
            event.location = location.clone();
        }
        if let Some(color_id) = patch.color_id {
            event.color_id = Some(normalize_color(color_id));
        }
        if let Some(timing) = &patch.timing {
            let (start, end) = to_event_times(timing);
            event.start = start;
            event.end = end;
        }
        if let Some(status) = patch.owner_status {
            event.owner_status = status;
        }
        Ok(event.clone())
    }

    async fn delete(&self, id: &str) -> RowSyncResult<()> {
        let mut state = self.state();
        state.calls.push(RepoCall::Delete(id.to_string()));
        let index = state.position(id)?;
        state.events.remove(index);
        Ok(())
    }

    async fn list_events(&self, range: &DateRange) -> RowSyncResult<Vec<RemoteEvent>> {
        let mut state = self.state();
        state.calls.push(RepoCall::ListEvents);
        let tz = self.time_zone.parse().unwrap_or(chrono_tz::UTC);

        Ok(state
            .events
            .iter()
            .filter(|e| e.start.to_utc(tz) < range.to && e.end.to_utc(tz) > range.from)
            .cloned()
            .collect())
    }

    async fn add_guest(&self, id: &str, email: &str) -> RowSyncResult<()> {
        let mut state = self.state();
        state
            .calls
            .push(RepoCall::AddGuest(id.to_string(), email.to_string()));
        let index = state.position_for_write(id)?;
        let guests = &mut state.events[index].guests;
        if !guests.iter().any(|g| g.email.eq_ignore_ascii_case(email)) {
            guests.push(Guest::new(email, GuestStatus::Invited));
        }
        Ok(())
    }

    async fn remove_guest(&self, id: &str, email: &str) -> RowSyncResult<()> {
        let mut state = self.state();
        state
            .calls
            .push(RepoCall::RemoveGuest(id.to_string(), email.to_string()));
        let index = state.position_for_write(id)?;
        state.events[index]
            .guests
            .retain(|g| !g.email.eq_ignore_ascii_case(email));
        Ok(())
    }
}

/// An in-memory sheet.
#[derive(Debug, Clone, Default)]
pub struct MemorySheet {
    rows: Vec<Row>,
    writes: usize,
}

impl MemorySheet {
    pub fn new(rows: Vec<Row>) -> Self {
        MemorySheet { rows, writes: 0 }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of `write_rows` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl RowStore for MemorySheet {
    fn read_rows(&self) -> RowSyncResult<Vec<Row>> {
        Ok(self.rows.clone())
    }

    fn write_rows(&mut self, rows: &[Row]) -> RowSyncResult<()> {
        self.rows = rows.to_vec();
        self.writes += 1;
        Ok(())
    }
}
