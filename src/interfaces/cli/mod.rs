//! CLI interface module
//!
//! This module provides command-line interface functionality for filelinker.

pub mod commands;

use std::fmt;

use crate::cli::{Commands, ConfigCommands};
use crate::config::StaticConfig;
use crate::services::AppServices;
use commands::{
    add_link, browse_link, clear_expired, config_generate, list_links, remove_link, show_link,
    update_link,
};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<crate::errors::FilelinkerError> for CliError {
    fn from(err: crate::errors::FilelinkerError) -> Self {
        use crate::errors::FilelinkerError;
        match err {
            FilelinkerError::Validation(_)
            | FilelinkerError::DateParse(_)
            | FilelinkerError::UnsupportedSourceType(_) => CliError::ParseError(err.to_string()),
            FilelinkerError::StoreOperation(_)
            | FilelinkerError::Serialization(_)
            | FilelinkerError::FileOperation(_) => CliError::StorageError(err.to_string()),
            _ => CliError::CommandError(err.to_string()),
        }
    }
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(cmd: Commands, config: &StaticConfig) -> Result<(), CliError> {
    // Generate doesn't need the store
    if let Commands::Config {
        action: ConfigCommands::Generate { output_path, force },
    } = cmd
    {
        return config_generate(output_path, force).await;
    }

    let services = AppServices::build(config)
        .await
        .map_err(|e| CliError::StorageError(e.to_string()))?;

    match cmd {
        Commands::Add(args) => add_link(&services, args).await,

        Commands::Update(args) => update_link(&services, args).await,

        Commands::Remove { code } => remove_link(&services, code).await,

        Commands::List => list_links(&services).await,

        Commands::Show { code } => show_link(&services, code).await,

        Commands::ClearExpired => clear_expired(&services).await,

        Commands::Browse { code, path } => browse_link(&services, code, path).await,

        Commands::Serve => Err(CliError::CommandError(
            "serve is handled by the server mode".to_string(),
        )),

        Commands::Config { .. } => Err(CliError::CommandError(
            "unknown config action".to_string(),
        )),
    }
}
