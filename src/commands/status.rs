use std::path::PathBuf;

use anyhow::Result;
use owo_colors::OwoColorize;
use rowsync_core::sync;

use super::Session;
use crate::render::Render;
use crate::utils::tui::create_spinner;

pub async fn run(sheet: Option<PathBuf>) -> Result<()> {
    let session = Session::open(sheet).await?;

    let spinner = create_spinner(session.header());
    let result = sync::plan_batch(&session.settings, &session.remote, &session.sheet).await;
    spinner.finish_and_clear();

    println!("{}", session.header());
    let planned = result?;

    if planned.iter().all(|p| matches!(&p.plan, Ok(plan) if !plan.writes())) {
        println!("   {}", "No changes to push".dimmed());
    }

    for record in &planned {
        println!("{}", record.render());
    }

    Ok(())
}
