//! rowsync configuration at ~/.config/rowsync/config.toml

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use ::config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{RowSyncError, RowSyncResult};
use crate::remote::provider::Provider;
use crate::remote::{Remote, RemoteConfig};
use crate::repository::EventRepository;

static DEFAULT_PROVIDER: &str = "google";
static DEFAULT_SHEET_PATH: &str = "~/calendar-sheet.json";
static DEFAULT_PROVIDER_TIMEOUT: &str = "10s";

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_sheet_path() -> PathBuf {
    PathBuf::from(DEFAULT_SHEET_PATH)
}

fn default_provider_timeout() -> String {
    DEFAULT_PROVIDER_TIMEOUT.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    pub calendar_id: Option<String>,

    #[serde(default = "default_provider")]
    pub provider: String,

    /// IANA zone used to read and write sheet timestamps. Falls back to the
    /// calendar's own zone.
    pub time_zone: Option<String>,

    #[serde(default = "default_sheet_path")]
    pub sheet: PathBuf,

    #[serde(default = "default_provider_timeout")]
    pub provider_timeout: String,

    #[serde(default)]
    pub remote: RemoteConfig,
}

impl SyncConfig {
    pub fn config_path() -> RowSyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| RowSyncError::Config("Could not determine config directory".into()))?
            .join("rowsync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file (creating a commented default on first run),
    /// with `ROWSYNC_*` environment variables layered on top.
    pub fn load() -> RowSyncResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> RowSyncResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("ROWSYNC"))
            .build()
            .map_err(|e| RowSyncError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| RowSyncError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> RowSyncResult<()> {
        let contents = format!(
            "\
# rowsync configuration

# Calendar to sync with (required):
# calendar_id = \"primary\"

# Provider binary to use (rowsync-provider-<name>):
# provider = \"{}\"

# Time zone for sheet timestamps, defaults to the calendar's:
# time_zone = \"Europe/Paris\"

# Where the sheet lives:
# sheet = \"{}\"

# How long to wait for each provider call:
# provider_timeout = \"{}\"

# Extra parameters passed to the provider:
# [remote]
# google_account = \"me@example.com\"
",
            DEFAULT_PROVIDER, DEFAULT_SHEET_PATH, DEFAULT_PROVIDER_TIMEOUT
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RowSyncError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| RowSyncError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// The configured calendar id. Nothing may touch the calendar without one.
    pub fn calendar_id(&self) -> RowSyncResult<&str> {
        self.calendar_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                RowSyncError::Config(
                    "No calendar_id configured. Set it in the config file or ROWSYNC_CALENDAR_ID"
                        .into(),
                )
            })
    }

    pub fn sheet_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.sheet.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    pub fn provider_timeout(&self) -> RowSyncResult<Duration> {
        humantime::parse_duration(&self.provider_timeout).map_err(|e| {
            RowSyncError::Config(format!(
                "Invalid provider_timeout '{}': {}",
                self.provider_timeout, e
            ))
        })
    }

    pub fn remote(&self) -> RowSyncResult<Remote> {
        let remote = Remote::new(
            Provider::from_name(&self.provider),
            self.calendar_id()?,
            self.remote.clone(),
        );
        Ok(remote.with_timeout(self.provider_timeout()?))
    }

    /// Resolve the settings for one invocation, asking `repo` for the
    /// calendar's zone when none is configured.
    pub async fn settings(&self, repo: &dyn EventRepository) -> RowSyncResult<SyncSettings> {
        let calendar_id = self.calendar_id()?.to_string();

        let zone_name = match &self.time_zone {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => repo.time_zone().await?,
        };

        Ok(SyncSettings {
            calendar_id,
            time_zone: parse_time_zone(&zone_name)?,
        })
    }
}

/// Settings resolved once per invocation and passed down explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncSettings {
    pub calendar_id: String,
    pub time_zone: Tz,
}

impl SyncSettings {
    pub fn new(calendar_id: impl Into<String>, time_zone: Tz) -> Self {
        SyncSettings {
            calendar_id: calendar_id.into(),
            time_zone,
        }
    }
}

fn parse_time_zone(name: &str) -> RowSyncResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| RowSyncError::Config(format!("Unknown time zone '{}'", name)))
}
