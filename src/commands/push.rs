use std::path::PathBuf;

use anyhow::Result;
use rowsync_core::sync;

use super::Session;
use crate::render::{self, Render};
use crate::utils::tui::create_spinner;

pub async fn run(sheet: Option<PathBuf>) -> Result<()> {
    let mut session = Session::open(sheet).await?;

    let spinner = create_spinner(session.header());
    let result = sync::push(&session.settings, &session.remote, &mut session.sheet).await;
    spinner.finish_and_clear();

    println!("{}", session.header());
    let summary = result?;

    for outcome in &summary.outcomes {
        println!("{}", outcome.render());
    }
    println!("{}", render::render_refresh(&summary.refresh));

    println!("\n{}", render::render_counts(&summary));

    Ok(())
}
