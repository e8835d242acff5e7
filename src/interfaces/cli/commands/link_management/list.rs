//! List / show / browse commands

use chrono::Utc;
use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::AppServices;
use crate::storage::{LinkKind, LinkRecord};
use crate::utils::{format_file_size, path};

fn summary(code: &str, record: &LinkRecord) -> String {
    let mut info_parts = vec![format!(
        "{} [{}] -> {}",
        code.cyan(),
        record.kind().as_ref(),
        record.target.blue().underline()
    )];

    if let Some(expire_at) = record.expire_at {
        info_parts.push(
            format!("(expires: {})", expire_at.format("%Y-%m-%d %H:%M:%S UTC"))
                .dimmed()
                .yellow()
                .to_string(),
        );
    }

    if record.access_code().is_some() {
        info_parts.push("🔒".to_string());
    }

    let visits = match record.max_visits {
        Some(max) => format!("(visits: {}/{})", record.visits, max),
        None => format!("(visits: {})", record.visits),
    };
    info_parts.push(visits.dimmed().cyan().to_string());

    if record.is_dead_at(Utc::now()) {
        info_parts.push("dead".red().to_string());
    }

    info_parts.join(" ")
}

pub async fn list_links(services: &AppServices) -> Result<(), CliError> {
    let links = services.links.list_all().await?;

    if links.is_empty() {
        println!("{} No links found", "ℹ".bold().blue());
    } else {
        println!("{}", "Link list:".bold().green());
        println!();
        for (code, record) in &links {
            println!("  {}", summary(code, record));
        }
        println!();
        println!(
            "{} Total {} links",
            "ℹ".bold().blue(),
            links.len().to_string().green()
        );
    }
    Ok(())
}

pub async fn show_link(services: &AppServices, code: String) -> Result<(), CliError> {
    let record = services
        .links
        .get(&code)
        .await?
        .ok_or_else(|| CliError::CommandError(format!("Link does not exist: {}", code)))?;

    println!("{}", summary(&code, &record));
    println!("  source: {}", record.source_type().to_string().magenta());
    let config = &record.source_config;
    if let (Some(owner), Some(repo)) = (&config.owner, &config.repo) {
        println!("  repository: {}/{}", owner, repo);
    }
    if let Some(git_ref) = config.git_ref() {
        println!("  ref: {}", git_ref);
    }
    if let Some(tag) = config.tag() {
        println!("  tag: {}", tag);
    }
    if let Some(count) = config.count {
        println!("  count: {}", count);
    }
    if config.flatten_release_folder {
        println!("  flatten release folder: yes");
    }
    println!(
        "  created: {}",
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    Ok(())
}

/// List a folder link without going through the resolver, so nothing is counted
pub async fn browse_link(
    services: &AppServices,
    code: String,
    sub_path: Option<String>,
) -> Result<(), CliError> {
    let record = services
        .links
        .get(&code)
        .await?
        .ok_or_else(|| CliError::CommandError(format!("Link does not exist: {}", code)))?;
    if record.kind() != LinkKind::Folder {
        return Err(CliError::CommandError(format!("{} is not a folder link", code)));
    }

    let adapter = services.registry.resolve(record.source_type())?;
    let dir = path::join(&record.target, sub_path.as_deref().unwrap_or_default());
    let items = adapter.list_files(&dir, &record.source_config).await?;

    println!("{} {}", code.cyan(), dir.bold());
    if items.is_empty() {
        println!("  {}", "(empty)".dimmed());
    }
    for item in &items {
        if item.is_directory {
            println!("  {}/", item.name.blue().bold());
        } else {
            println!(
                "  {} {}",
                item.name,
                format!("({})", format_file_size(item.size)).dimmed()
            );
        }
    }
    Ok(())
}
