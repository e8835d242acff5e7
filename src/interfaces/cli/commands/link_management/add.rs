//! Add link command

use colored::Colorize;

use crate::cli::AddArgs;
use crate::interfaces::cli::CliError;
use crate::services::{AppServices, CreateLinkRequest};
use crate::storage::{LinkKind, SourceConfig, SourceType};

fn build_request(args: AddArgs) -> Result<CreateLinkRequest, CliError> {
    let kind = match (args.folder, args.file) {
        (true, _) => Some(LinkKind::Folder),
        (_, true) => Some(LinkKind::File),
        _ => None,
    };
    let source_type = args
        .source
        .as_deref()
        .map(SourceType::parse_tag)
        .transpose()?;
    let source = args.source_args;

    Ok(CreateLinkRequest {
        target: args.target,
        kind,
        source_type,
        source_config: SourceConfig {
            owner: source.owner,
            repo: source.repo,
            git_ref: source.git_ref,
            tag: source.tag,
            count: source.count,
            flatten_release_folder: source.flatten,
        },
        expire: args.expire,
        max_visits: args.max_visits,
        access_code: args.access_code,
    })
}

pub async fn add_link(services: &AppServices, args: AddArgs) -> Result<(), CliError> {
    let request = build_request(args)?;
    let result = services.links.create(request).await?;
    let record = &result.record;

    if result.reused {
        println!(
            "{} {} already links {}, left unchanged",
            "ℹ".bold().blue(),
            result.code.cyan(),
            record.target.blue().underline()
        );
        return Ok(());
    }

    println!(
        "{} Added {} link: {} -> {} ({})",
        "✓".bold().green(),
        record.kind().as_ref(),
        result.code.cyan(),
        record.target.blue().underline(),
        record.source_type().to_string().magenta()
    );
    if let Some(expire_at) = record.expire_at {
        println!(
            "{} Expires: {}",
            "ℹ".bold().blue(),
            expire_at
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string()
                .yellow()
        );
    }
    if let Some(max) = record.max_visits {
        println!("{} Visit limit: {}", "ℹ".bold().blue(), max.to_string().yellow());
    }
    if record.access_code().is_some() {
        println!("{} Access code required", "🔒".bold());
    }

    Ok(())
}
