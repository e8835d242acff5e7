//! Update link command

use colored::Colorize;

use crate::cli::UpdateArgs;
use crate::interfaces::cli::CliError;
use crate::services::{AppServices, FieldUpdate, UpdateLinkRequest};

fn tri_state<T>(value: Option<T>, clear: bool) -> FieldUpdate<T> {
    if clear {
        FieldUpdate::Clear
    } else {
        FieldUpdate::from_option(value)
    }
}

pub async fn update_link(services: &AppServices, args: UpdateArgs) -> Result<(), CliError> {
    let request = UpdateLinkRequest {
        expire: tri_state(args.expire, args.no_expire),
        max_visits: tri_state(args.max_visits, args.unlimited),
        access_code: tri_state(args.access_code, args.no_access_code),
    };

    let record = services.links.update(&args.code, request).await?;

    println!(
        "{} Link updated: {} -> {}",
        "✓".bold().green(),
        args.code.cyan(),
        record.target.blue().underline()
    );
    match record.expire_at {
        Some(expire_at) => println!(
            "{} Expiration: {}",
            "ℹ".bold().blue(),
            expire_at
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string()
                .yellow()
        ),
        None => println!("{} Expiration: never", "ℹ".bold().blue()),
    }
    match record.max_visits {
        Some(max) => println!(
            "{} Visits: {}/{}",
            "ℹ".bold().blue(),
            record.visits,
            max.to_string().yellow()
        ),
        None => println!("{} Visits: {} (unlimited)", "ℹ".bold().blue(), record.visits),
    }
    Ok(())
}
