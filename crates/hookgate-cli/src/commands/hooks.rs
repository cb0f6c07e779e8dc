//! Hook install, uninstall and status commands

use std::path::Path;

use colored::Colorize;
use hookgate_git::{HookInstaller, HookState, HookType, InstallOutcome};

use crate::error::Result;

/// Install `hook` in the repository containing `path`
pub fn run_install(path: &Path, hook: HookType, force: bool) -> Result<()> {
    let installer = HookInstaller::for_repository(path)?;
    let outcome = installer.install(hook, force)?;
    let hook_path = installer.hook_path(hook);

    match outcome {
        InstallOutcome::Installed => println!(
            "{} Installed {} hook at {}",
            "\u{2713}".green().bold(),
            hook.to_string().cyan(),
            hook_path.display()
        ),
        InstallOutcome::AlreadyInstalled => println!(
            "{} {} hook already installed at {}",
            "note:".yellow().bold(),
            hook.to_string().cyan(),
            hook_path.display()
        ),
        InstallOutcome::Updated => println!(
            "{} Rewrote {} hook at {}",
            "\u{2713}".green().bold(),
            hook.to_string().cyan(),
            hook_path.display()
        ),
        InstallOutcome::Replaced => println!(
            "{} Replaced existing {} hook at {}",
            "warning:".yellow().bold(),
            hook.to_string().cyan(),
            hook_path.display()
        ),
    }
    Ok(())
}

/// Remove `hook` if hookgate owns it
pub fn run_uninstall(path: &Path, hook: HookType) -> Result<()> {
    let installer = HookInstaller::for_repository(path)?;
    let hook_path = installer.hook_path(hook);

    if installer.uninstall(hook)? {
        println!(
            "{} Removed {} hook",
            "\u{2713}".green().bold(),
            hook.to_string().cyan()
        );
    } else if installer.state(hook)? == HookState::Foreign {
        println!(
            "{} {} is not managed by hookgate; left in place",
            "note:".yellow().bold(),
            hook_path.display()
        );
    } else {
        println!(
            "{} No {} hook installed",
            "note:".yellow().bold(),
            hook.to_string().cyan()
        );
    }
    Ok(())
}

/// Print the state of one or every hook slot
pub fn run_status(path: &Path, hook: Option<HookType>) -> Result<()> {
    let installer = HookInstaller::for_repository(path)?;
    let hooks = match hook {
        Some(hook) => vec![hook],
        None => HookType::all_names()
            .iter()
            .filter_map(|name| HookType::parse(name))
            .collect(),
    };

    println!("{} {}", "Hooks directory:".bold(), installer.hooks_dir().display());
    for hook in hooks {
        let state = match installer.state(hook)? {
            HookState::Ours => "installed".green(),
            HookState::Foreign => "foreign".yellow(),
            HookState::Absent => "absent".dimmed(),
        };
        println!("  {:<12} {}", hook.to_string(), state);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookgate_test_utils::TestRepo;

    #[test]
    fn test_install_then_uninstall() {
        let repo = TestRepo::new();

        run_install(repo.root(), HookType::PreCommit, false).unwrap();
        let installer = HookInstaller::for_repository(repo.root()).unwrap();
        assert!(installer.is_installed(HookType::PreCommit));

        run_uninstall(repo.root(), HookType::PreCommit).unwrap();
        assert!(!installer.is_installed(HookType::PreCommit));
    }

    #[test]
    fn test_install_refuses_foreign_hook() {
        let repo = TestRepo::new();
        let installer = HookInstaller::for_repository(repo.root()).unwrap();
        std::fs::create_dir_all(installer.hooks_dir()).unwrap();
        std::fs::write(installer.hook_path(HookType::PreCommit), "#!/bin/sh\nexit 0\n").unwrap();

        let err = run_install(repo.root(), HookType::PreCommit, false).unwrap_err();

        assert!(err.hint().unwrap().contains("--force"));
    }
}
