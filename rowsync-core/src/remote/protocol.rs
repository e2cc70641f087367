//! Defines the JSON protocol used for communication between rowsync
//! and provider binaries over stdin/stdout.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::event::{EventPatch, NewEvent, RemoteEvent};

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    TimeZone,
    GetEvent,
    ListEvents,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
    AddGuest,
    RemoveGuest,
}

/// Request sent from rowsync to provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from provider to rowsync.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    /// The referenced event doesn't exist (or no longer does).
    NotFound { error: String },
    Error { error: String },
}

/// Parameters every command carries: the calendar plus any
/// provider-specific settings (e.g. `google_account`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub calendar_id: String,
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
}

/// Ask for the calendar's time zone.
#[derive(Debug, Serialize, Deserialize)]
pub struct TimeZone {
    #[serde(flatten)]
    pub target: Target,
}

impl ProviderCommand for TimeZone {
    type Response = String;
    fn command() -> Command {
        Command::TimeZone
    }
}

/// Fetch one event by id.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetEvent {
    #[serde(flatten)]
    pub target: Target,
    pub event_id: String,
}

impl ProviderCommand for GetEvent {
    type Response = RemoteEvent;
    fn command() -> Command {
        Command::GetEvent
    }
}

/// List events within a time range.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListEvents {
    #[serde(flatten)]
    pub target: Target,
    pub from: String,
    pub to: String,
}

impl ProviderCommand for ListEvents {
    type Response = Vec<RemoteEvent>;
    fn command() -> Command {
        Command::ListEvents
    }
}

/// Create a new event.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEvent {
    #[serde(flatten)]
    pub target: Target,
    pub event: NewEvent,
}

impl ProviderCommand for CreateEvent {
    type Response = RemoteEvent;
    fn command() -> Command {
        Command::CreateEvent
    }
}

/// Update the given fields of an existing event.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateEvent {
    #[serde(flatten)]
    pub target: Target,
    pub event_id: String,
    pub changes: EventPatch,
}

impl ProviderCommand for UpdateEvent {
    type Response = RemoteEvent;
    fn command() -> Command {
        Command::UpdateEvent
    }
}

/// Delete an event by ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteEvent {
    #[serde(flatten)]
    pub target: Target,
    pub event_id: String,
}

impl ProviderCommand for DeleteEvent {
    type Response = ();
    fn command() -> Command {
        Command::DeleteEvent
    }
}

/// Invite one guest to an event.
#[derive(Debug, Serialize, Deserialize)]
pub struct AddGuest {
    #[serde(flatten)]
    pub target: Target,
    pub event_id: String,
    pub email: String,
}

impl ProviderCommand for AddGuest {
    type Response = ();
    fn command() -> Command {
        Command::AddGuest
    }
}

/// Remove one guest from an event.
#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveGuest {
    #[serde(flatten)]
    pub target: Target,
    pub event_id: String,
    pub email: String,
}

impl ProviderCommand for RemoveGuest {
    type Response = ();
    fn command() -> Command {
        Command::RemoveGuest
    }
}
