pub mod protocol;
pub mod provider;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::date_range::DateRange;
use crate::error::RowSyncResult;
use crate::event::{EventPatch, NewEvent, RemoteEvent};
use crate::remote::protocol::{
    AddGuest, CreateEvent, DeleteEvent, GetEvent, ListEvents, RemoveGuest, Target, TimeZone,
    UpdateEvent,
};
use crate::remote::provider::Provider;
use crate::repository::EventRepository;

/// Provider-specific parameters from the `[remote]` config table.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RemoteConfig(pub HashMap<String, toml::Value>);

impl From<&RemoteConfig> for serde_json::Map<String, serde_json::Value> {
    fn from(config: &RemoteConfig) -> Self {
        config
            .0
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}

/// A calendar reached through a provider binary.
#[derive(Debug, Clone)]
pub struct Remote {
    pub provider: Provider,
    pub calendar_id: String,
    pub config: RemoteConfig,
    pub timeout: Duration,
}

impl Remote {
    pub fn new(provider: Provider, calendar_id: impl Into<String>, config: RemoteConfig) -> Self {
        Remote {
            provider,
            calendar_id: calendar_id.into(),
            config,
            timeout: provider::DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn target(&self) -> Target {
        Target {
            calendar_id: self.calendar_id.clone(),
            remote_config: serde_json::Map::from(&self.config),
        }
    }
}

#[async_trait]
impl EventRepository for Remote {
    async fn time_zone(&self) -> RowSyncResult<String> {
        self.provider
            .call(TimeZone { target: self.target() }, self.timeout)
            .await
    }

    async fn get(&self, id: &str) -> RowSyncResult<RemoteEvent> {
        self.provider
            .call(
                GetEvent {
                    target: self.target(),
                    event_id: id.to_string(),
                },
                self.timeout,
            )
            .await
    }

    async fn create(&self, event: &NewEvent) -> RowSyncResult<RemoteEvent> {
        self.provider
            .call(
                CreateEvent {
                    target: self.target(),
                    event: event.clone(),
                },
                self.timeout,
            )
            .await
    }

    async fn update(&self, id: &str, patch: &EventPatch) -> RowSyncResult<RemoteEvent> {
        self.provider
            .call(
                UpdateEvent {
                    target: self.target(),
                    event_id: id.to_string(),
                    changes: patch.clone(),
                },
                self.timeout,
            )
            .await
    }

    async fn delete(&self, id: &str) -> RowSyncResult<()> {
        self.provider
            .call(
                DeleteEvent {
                    target: self.target(),
                    event_id: id.to_string(),
                },
                self.timeout,
            )
            .await
    }

    async fn list_events(&self, range: &DateRange) -> RowSyncResult<Vec<RemoteEvent>> {
        self.provider
            .call(
                ListEvents {
                    target: self.target(),
                    from: range.from.to_rfc3339(),
                    to: range.to.to_rfc3339(),
                },
                self.timeout,
            )
            .await
    }

    async fn add_guest(&self, id: &str, email: &str) -> RowSyncResult<()> {
        self.provider
            .call(
                AddGuest {
                    target: self.target(),
                    event_id: id.to_string(),
                    email: email.to_string(),
                },
                self.timeout,
            )
            .await
    }

    async fn remove_guest(&self, id: &str, email: &str) -> RowSyncResult<()> {
        self.provider
            .call(
                RemoveGuest {
                    target: self.target(),
                    event_id: id.to_string(),
                    email: email.to_string(),
                },
                self.timeout,
            )
            .await
    }
}
