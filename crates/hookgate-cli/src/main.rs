//! hookgate CLI
//!
//! Runs the configured quality checks against changed files and manages the
//! git hook that triggers them.

mod cli;
mod commands;
mod error;
mod report;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("{}: failed to set tracing subscriber: {}", "warning".yellow().bold(), e);
        }
        tracing::debug!("Verbose mode enabled");
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", "hint:".cyan().bold(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Some(Commands::Run(args)) => commands::run_checks(&cwd, args).await,
        Some(Commands::Install { hook, force }) => {
            commands::run_install(&cwd, hook, force)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Uninstall { hook }) => {
            commands::run_uninstall(&cwd, hook)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Status { hook }) => {
            commands::run_status(&cwd, hook)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::List) => {
            commands::run_list(&cwd)?;
            Ok(ExitCode::SUCCESS)
        }
        None => {
            // No command provided - show help hint
            println!("{} pre-commit quality gates", "hookgate".green().bold());
            println!();
            println!("Run {} for available commands.", "hookgate --help".cyan());
            Ok(ExitCode::SUCCESS)
        }
    }
}
