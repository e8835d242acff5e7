//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for filelinker using clap's derive macros.

use clap::{Args, Parser, Subcommand};

/// filelinker - short codes for remote files and folders
#[derive(Parser)]
#[command(name = "filelinker")]
#[command(version)]
#[command(about = "Short codes for remote files and folders", long_about = None)]
pub struct Cli {
    /// Path to config.toml
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Add a link
    ///
    /// An absolute URL becomes a file link, anything else a folder link,
    /// unless --file or --folder says otherwise.
    Add(AddArgs),

    /// Update expiry, visit limit or access code of a link
    Update(UpdateArgs),

    /// Remove a link
    Remove {
        /// Short code to remove
        code: String,
    },

    /// List all links
    List,

    /// Show one link
    Show {
        code: String,
    },

    /// Delete expired and used-up links
    ClearExpired,

    /// List a folder link's contents without counting a visit
    Browse {
        code: String,

        /// Path below the link root
        path: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Args, Debug, Default, PartialEq)]
pub struct AddArgs {
    /// Target URL (files) or upstream path (folders)
    pub target: String,

    /// Force a folder link
    #[arg(long, conflicts_with = "file")]
    pub folder: bool,

    /// Force a file link
    #[arg(long)]
    pub file: bool,

    /// Source type: alist, repo_contents, release_assets, none
    #[arg(long)]
    pub source: Option<String>,

    #[command(flatten)]
    pub source_args: SourceArgs,

    /// Expiration time (RFC3339 or relative like "1d", "2h")
    #[arg(long)]
    pub expire: Option<String>,

    /// Maximum number of visits
    #[arg(long)]
    pub max_visits: Option<u32>,

    /// Access code required to open the link
    #[arg(long)]
    pub access_code: Option<String>,
}

#[derive(Args, Debug, Default, PartialEq)]
pub struct UpdateArgs {
    /// Short code to update
    pub code: String,

    /// New expiration time
    #[arg(long, conflicts_with = "no_expire")]
    pub expire: Option<String>,

    /// Remove the expiration time
    #[arg(long)]
    pub no_expire: bool,

    /// New visit limit
    #[arg(long, conflicts_with = "unlimited")]
    pub max_visits: Option<u32>,

    /// Remove the visit limit
    #[arg(long)]
    pub unlimited: bool,

    /// New access code
    #[arg(long, conflicts_with = "no_access_code")]
    pub access_code: Option<String>,

    /// Remove the access code
    #[arg(long)]
    pub no_access_code: bool,
}

/// Repository parameters for repo_contents / release_assets links
#[derive(Args, Debug, Default, PartialEq)]
pub struct SourceArgs {
    /// Repository owner
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name
    #[arg(long)]
    pub repo: Option<String>,

    /// Branch, tag or commit (repo_contents)
    #[arg(long = "ref")]
    pub git_ref: Option<String>,

    /// Release tag, or "latest" (release_assets)
    #[arg(long)]
    pub tag: Option<String>,

    /// Number of recent releases to list (release_assets)
    #[arg(long)]
    pub count: Option<u32>,

    /// List assets directly when only one release is in scope
    #[arg(long)]
    pub flatten: bool,
}

/// Configuration management commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },
}
