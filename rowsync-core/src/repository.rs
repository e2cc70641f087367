//! The event repository: the remote calendar that holds authoritative events.

use async_trait::async_trait;

use crate::date_range::DateRange;
use crate::error::RowSyncResult;
use crate::event::{EventPatch, NewEvent, RemoteEvent};

/// Operations the reconciler and importer need from a calendar.
///
/// A repository is bound to one calendar. Lookups of an id the calendar
/// doesn't know fail with `RowSyncError::NotFound`.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// IANA name of the calendar's time zone.
    async fn time_zone(&self) -> RowSyncResult<String>;

    async fn get(&self, id: &str) -> RowSyncResult<RemoteEvent>;

    async fn create(&self, event: &NewEvent) -> RowSyncResult<RemoteEvent>;

    /// Apply only the fields set in `patch`.
    async fn update(&self, id: &str, patch: &EventPatch) -> RowSyncResult<RemoteEvent>;

    async fn delete(&self, id: &str) -> RowSyncResult<()>;

    /// Events overlapping `range`.
    async fn list_events(&self, range: &DateRange) -> RowSyncResult<Vec<RemoteEvent>>;

    async fn add_guest(&self, id: &str, email: &str) -> RowSyncResult<()>;

    async fn remove_guest(&self, id: &str, email: &str) -> RowSyncResult<()>;
}
