use anyhow::Result;
use owo_colors::OwoColorize;
use rowsync_core::SyncConfig;
use rowsync_core::remote::provider::Provider;

pub fn run() -> Result<()> {
    let config_path = SyncConfig::config_path()?;
    let config = SyncConfig::load()?;
    let provider = Provider::from_name(&config.provider);
    let not_set = "(not set)".dimmed().to_string();

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!("  Sheet:      {}", config.sheet_path().display());

    println!("\n{}", "Calendar".bold());
    println!(
        "  Calendar:   {}",
        config.calendar_id().map(str::to_string).unwrap_or(not_set.clone())
    );
    println!(
        "  Time zone:  {}",
        config
            .time_zone
            .clone()
            .unwrap_or_else(|| "(from calendar)".dimmed().to_string())
    );

    println!("\n{}", "Provider".bold());
    println!("  Name:       {}", provider.name());
    let installed = if provider.is_installed() {
        "installed".green().to_string()
    } else {
        "not found in PATH".red().to_string()
    };
    println!("  Binary:     {} ({})", provider.binary_name(), installed);
    println!("  Timeout:    {}", config.provider_timeout);
    if config.remote.0.is_empty() {
        println!("  Params:     {}", not_set);
    }
    let mut params: Vec<_> = config.remote.0.iter().collect();
    params.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in params {
        println!("  {}: {}", key.dimmed(), value);
    }

    Ok(())
}
