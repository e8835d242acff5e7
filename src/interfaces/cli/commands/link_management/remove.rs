//! Remove and sweep commands

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::AppServices;

pub async fn remove_link(services: &AppServices, code: String) -> Result<(), CliError> {
    services.links.delete(&code).await?;
    println!("{} Deleted link: {}", "✓".bold().green(), code.cyan());
    Ok(())
}

pub async fn clear_expired(services: &AppServices) -> Result<(), CliError> {
    let cleared = services.links.clear_expired().await?;
    if cleared == 0 {
        println!("{} No expired links", "ℹ".bold().blue());
    } else {
        println!(
            "{} Cleared {} expired links",
            "✓".bold().green(),
            cleared.to_string().green()
        );
    }
    Ok(())
}
