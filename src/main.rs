use clap::Parser;
use colored::Colorize;
use tracing::debug;

use filelinker::cli::Cli;
use filelinker::config::{get_config, init_config};
use filelinker::runtime::modes::{Mode, detect_mode};
use filelinker::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config(cli.config.as_deref());
    let config = get_config();

    // guard 需要一直持有，直到进程退出
    let _log_guard = init_logging(&config.logging)?;

    let mode = detect_mode(cli.command.as_ref());
    debug!("Running in {:?} mode", mode);

    match mode {
        #[cfg(feature = "server")]
        Mode::Server => filelinker::runtime::modes::run_server(&config).await,
        #[cfg(feature = "cli")]
        Mode::Cli => {
            let Some(command) = cli.command else {
                return Ok(());
            };
            if let Err(e) = filelinker::runtime::modes::run_cli(command, &config).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
            Ok(())
        }
        Mode::Unknown => {
            eprintln!(
                "{} this build does not include the requested mode",
                "Error:".red().bold()
            );
            std::process::exit(1);
        }
    }
}
