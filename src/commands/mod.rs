pub mod config;
pub mod pull;
pub mod push;
pub mod status;

use std::path::PathBuf;

use anyhow::Result;
use rowsync_core::remote::Remote;
use rowsync_core::{JsonSheet, SyncConfig, SyncSettings};

use crate::utils::tui::create_spinner;

/// Everything a command needs to talk to the calendar and the sheet.
pub struct Session {
    pub remote: Remote,
    pub settings: SyncSettings,
    pub sheet: JsonSheet,
}

impl Session {
    /// Load the config and resolve this invocation's settings.
    ///
    /// Fails before contacting the calendar when no calendar is configured.
    pub async fn open(sheet: Option<PathBuf>) -> Result<Self> {
        let config = SyncConfig::load()?;
        let remote = config.remote()?;

        let spinner = create_spinner(format!("📅 {}", remote.calendar_id));
        let settings = config.settings(&remote).await;
        spinner.finish_and_clear();
        let settings = settings?;
        tracing::debug!(
            calendar = %settings.calendar_id,
            time_zone = %settings.time_zone,
            "resolved settings"
        );

        Ok(Session {
            remote,
            settings,
            sheet: JsonSheet::new(sheet.unwrap_or_else(|| config.sheet_path())),
        })
    }

    pub fn header(&self) -> String {
        format!(
            "📅 {} ({})",
            self.settings.calendar_id, self.settings.time_zone
        )
    }
}
