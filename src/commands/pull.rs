use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;
use rowsync_core::DateRange;
use rowsync_core::import;

use super::Session;
use crate::render::pluralize;
use crate::utils::tui::create_spinner;

pub async fn run(sheet: Option<PathBuf>, from: Option<&str>, to: Option<&str>) -> Result<()> {
    let mut session = Session::open(sheet).await?;

    let tz = session.settings.time_zone;
    let today = Utc::now().with_timezone(&tz).date_naive();
    let range = DateRange::from_args(from, to, today, tz).map_err(|e| anyhow::anyhow!(e))?;

    let spinner = create_spinner(session.header());
    let result = import::import(&session.settings, &session.remote, &mut session.sheet, &range).await;
    spinner.finish_and_clear();

    println!("{}", session.header());
    let imported = result?;

    println!(
        "   {}",
        format!(
            "Imported {} {} for {} into {}",
            imported,
            pluralize("event", imported),
            range,
            session.sheet.path().display()
        )
        .green()
    );

    Ok(())
}
