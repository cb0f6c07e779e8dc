//! CLI argument parsing using clap derive

use clap::{Args, Parser, Subcommand};
use hookgate_git::HookType;

/// hookgate - run formatting, linting and dependency checks before commits
#[derive(Parser, Debug)]
#[command(name = "hookgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run checks against changed files
    ///
    /// Examples:
    ///   hookgate run                     # Staged files
    ///   hookgate run --all               # Every tracked file
    ///   hookgate run --check go-lint     # One check
    ///   hookgate run main.go pkg/foo.go  # Explicit files
    Run(RunArgs),

    /// Install the git hook
    Install {
        /// Hook to install
        #[arg(long, default_value = "pre-commit", value_parser = parse_hook)]
        hook: HookType,

        /// Overwrite an existing hook not managed by hookgate
        #[arg(short, long)]
        force: bool,
    },

    /// Remove the git hook if hookgate installed it
    Uninstall {
        /// Hook to remove
        #[arg(long, default_value = "pre-commit", value_parser = parse_hook)]
        hook: HookType,
    },

    /// Show which hooks are installed
    Status {
        /// Only show this hook
        #[arg(long, value_parser = parse_hook)]
        hook: Option<HookType>,
    },

    /// List available checks
    List,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct RunArgs {
    /// Files to check, relative to the current directory
    pub files: Vec<String>,

    /// Check every tracked file
    #[arg(long, conflicts_with_all = ["modified", "files"])]
    pub all: bool,

    /// Check files modified in the working tree instead of staged files
    #[arg(long, conflicts_with = "files")]
    pub modified: bool,

    /// Run only this check (repeatable)
    #[arg(long = "check", value_name = "NAME")]
    pub checks: Vec<String>,

    /// Skip this check (repeatable)
    #[arg(long, value_name = "NAME")]
    pub skip: Vec<String>,

    /// Stop after the first failing check
    #[arg(long)]
    pub fail_fast: bool,

    /// Run non-mutating checks concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Per-check timeout in seconds, overriding every other setting
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Hook that triggered the run; pre-push checks every tracked file
    #[arg(long, value_parser = parse_hook)]
    pub hook: Option<HookType>,
}

fn parse_hook(s: &str) -> Result<HookType, String> {
    HookType::parse(s).ok_or_else(|| {
        format!(
            "unknown hook '{}'. Valid hooks: {}",
            s,
            HookType::all_names().join(", ")
        )
    })
}
