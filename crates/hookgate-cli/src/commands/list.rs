//! List available checks

use std::path::Path;

use colored::Colorize;
use hookgate_core::Config;

use crate::error::Result;

/// Print every registered check with its category and file patterns.
///
/// Inside a repository the `[[custom]]` checks and `enabled` flags of its
/// `.hookgate.toml` are included.
pub fn run_list(path: &Path) -> Result<()> {
    let config = match git_root(path) {
        Some(root) => load_config(&root)?,
        None => Config::default(),
    };
    let registry = hookgate_checks::registry_for(&config)?;

    println!("{}", "Available Checks".bold());
    println!();
    for check in registry.iter() {
        let metadata = check.metadata();
        let patterns: Vec<String> = metadata.patterns.iter().map(ToString::to_string).collect();
        let name = if config.is_enabled(check.name()) {
            check.name().green()
        } else {
            check.name().dimmed()
        };
        println!(
            "  {:<14} {:<20} {} ({})",
            name,
            metadata.category.to_string(),
            metadata.description,
            patterns.join(", ").dimmed()
        );
    }
    println!();
    println!(
        "{} {} checks. Use {} to run one.",
        "Total:".dimmed(),
        registry.len(),
        "hookgate run --check <name>".cyan()
    );
    Ok(())
}

fn load_config(root: &Path) -> Result<Config> {
    let mut config = Config::load(root)?;
    config.apply_env(std::env::vars())?;
    Ok(config)
}

/// Closest ancestor of `path` containing `.git`
fn git_root(path: &Path) -> Option<std::path::PathBuf> {
    path.ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}
