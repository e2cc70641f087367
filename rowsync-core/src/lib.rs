//! Core library for rowsync.
//!
//! Reconciles rows of an event sheet with a remote calendar:
//! - `sync::push` writes row edits to the calendar, then refreshes the sheet
//! - `import::import` pulls a window of calendar events into the sheet
//! - `reconcile` holds the per-record create/update/delete decisions

pub mod config;
pub mod constants;
pub mod date_range;
pub mod error;
pub mod event;
pub mod guests;
pub mod import;
pub mod reconcile;
pub mod record;
pub mod remote;
pub mod repository;
pub mod sheet;
pub mod sync;
pub mod testing;

pub use crate::config::{SyncConfig, SyncSettings};
pub use date_range::DateRange;
pub use error::{RowSyncError, RowSyncResult};
pub use repository::EventRepository;
pub use sheet::{JsonSheet, RowStore};
