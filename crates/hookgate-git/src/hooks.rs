//! Git hook installation
//!
//! hookgate owns a hook file only if it contains [`HOOK_MARKER`]. Files
//! without the marker belong to someone else: they are never reported as
//! installed, never removed, and only replaced when the caller forces it.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Ownership marker embedded in every hook script hookgate writes.
pub const HOOK_MARKER: &str = "# hookgate-managed-hook";

/// Git hooks hookgate can manage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookType {
    /// Runs checks against staged files
    PreCommit,
    /// Runs checks against all tracked files
    PrePush,
}

impl fmt::Display for HookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreCommit => write!(f, "pre-commit"),
            Self::PrePush => write!(f, "pre-push"),
        }
    }
}

impl HookType {
    /// Parse a hook type from its git file name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pre-commit" => Some(Self::PreCommit),
            "pre-push" => Some(Self::PrePush),
            _ => None,
        }
    }

    /// List all valid hook names
    pub fn all_names() -> &'static [&'static str] {
        &["pre-commit", "pre-push"]
    }
}

/// Who owns the file in a hook slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookState {
    Absent,
    /// Present and carrying [`HOOK_MARKER`]
    Ours,
    /// Present without the marker
    Foreign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The slot was empty and the script was written
    Installed,
    /// Our script was already there; nothing was written
    AlreadyInstalled,
    /// Our script was rewritten because `force` was set
    Updated,
    /// A foreign hook was overwritten because `force` was set
    Replaced,
}

const SCRIPT_TEMPLATE: &str = r#"#!/bin/sh
# hookgate-managed-hook
# Installed by `hookgate install`; remove with `hookgate uninstall`.
# Lookup order: PATH, $HOOKGATE_BIN, Go bin dir, cargo bin dir, ~/.local/bin,
# /usr/local/bin, /opt/homebrew/bin.

if command -v hookgate >/dev/null 2>&1; then
    exec hookgate run --hook {hook}
fi

for candidate in \
    "${HOOKGATE_BIN:-}" \
    "${GOPATH:-$HOME/go}/bin/hookgate" \
    "$HOME/.cargo/bin/hookgate" \
    "$HOME/.local/bin/hookgate" \
    /usr/local/bin/hookgate \
    /opt/homebrew/bin/hookgate
do
    if [ -n "$candidate" ] && [ -x "$candidate" ]; then
        exec "$candidate" run --hook {hook}
    fi
done

echo "hookgate: binary not found on PATH or in fallback locations." >&2
echo "hookgate: install it, set HOOKGATE_BIN, or skip once with 'git commit --no-verify'." >&2
exit 1
"#;

/// The fixed script body for a hook slot.
pub fn hook_script(hook: HookType) -> String {
    SCRIPT_TEMPLATE.replace("{hook}", &hook.to_string())
}

/// Installs and removes hookgate's hook scripts in one hooks directory.
#[derive(Debug, Clone)]
pub struct HookInstaller {
    hooks_dir: PathBuf,
}

impl HookInstaller {
    pub fn new(hooks_dir: impl Into<PathBuf>) -> Self {
        Self {
            hooks_dir: hooks_dir.into(),
        }
    }

    /// Locate the hooks directory of the repository containing `root`.
    ///
    /// Honours `core.hooksPath` (relative values resolve against the work
    /// tree); otherwise uses `hooks/` under the common git dir, so linked
    /// worktrees share one set of hooks.
    pub fn for_repository(root: &Path) -> Result<Self> {
        let repo = git2::Repository::discover(root)?;
        let configured = repo
            .config()
            .and_then(|config| config.get_path("core.hooksPath"));

        let hooks_dir = match configured {
            Ok(path) if path.is_absolute() => path,
            Ok(path) => repo.workdir().unwrap_or(root).join(path),
            Err(_) => repo.commondir().join("hooks"),
        };

        tracing::debug!(hooks_dir = %hooks_dir.display(), "Resolved hooks directory");
        Ok(Self::new(hooks_dir))
    }

    pub fn hooks_dir(&self) -> &Path {
        &self.hooks_dir
    }

    pub fn hook_path(&self, hook: HookType) -> PathBuf {
        self.hooks_dir.join(hook.to_string())
    }

    pub fn state(&self, hook: HookType) -> Result<HookState> {
        let path = self.hook_path(hook);
        match fs::read(&path) {
            Ok(bytes) if String::from_utf8_lossy(&bytes).contains(HOOK_MARKER) => Ok(HookState::Ours),
            Ok(_) => Ok(HookState::Foreign),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HookState::Absent),
            Err(e) => Err(Error::io(path, e)),
        }
    }

    pub fn is_installed(&self, hook: HookType) -> bool {
        matches!(self.state(hook), Ok(HookState::Ours))
    }

    /// Write the hook script.
    ///
    /// A foreign hook is left byte-for-byte untouched unless `force` is set.
    pub fn install(&self, hook: HookType, force: bool) -> Result<InstallOutcome> {
        let path = self.hook_path(hook);
        let outcome = match self.state(hook)? {
            HookState::Ours if !force => return Ok(InstallOutcome::AlreadyInstalled),
            HookState::Ours => InstallOutcome::Updated,
            HookState::Foreign if !force => return Err(Error::HookExists { path }),
            HookState::Foreign => {
                tracing::warn!(path = %path.display(), "Replacing foreign hook");
                InstallOutcome::Replaced
            }
            HookState::Absent => InstallOutcome::Installed,
        };

        fs::create_dir_all(&self.hooks_dir).map_err(|e| Error::io(&self.hooks_dir, e))?;
        write_executable(&path, hook_script(hook).as_bytes())?;

        tracing::info!(hook = %hook, path = %path.display(), ?outcome, "Hook installed");
        Ok(outcome)
    }

    /// Remove the hook if hookgate owns it. Returns whether a file was removed.
    pub fn uninstall(&self, hook: HookType) -> Result<bool> {
        let path = self.hook_path(hook);
        match self.state(hook)? {
            HookState::Ours => {
                fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
                tracing::info!(hook = %hook, path = %path.display(), "Hook removed");
                Ok(true)
            }
            HookState::Foreign => {
                tracing::debug!(path = %path.display(), "Leaving foreign hook in place");
                Ok(false)
            }
            HookState::Absent => Ok(false),
        }
    }
}

/// Write-to-temp-then-rename with the executable bit set before the rename.
fn write_executable(path: &Path, content: &[u8]) -> Result<()> {
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, content).map_err(|e| Error::io(&temp_path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o755))
            .map_err(|e| Error::io(&temp_path, e))?;
    }

    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_type_roundtrip() {
        for name in HookType::all_names() {
            let hook = HookType::parse(name).unwrap();
            assert_eq!(hook.to_string(), *name);
        }
        assert_eq!(HookType::parse("post-merge"), None);
    }

    #[test]
    fn test_script_shape() {
        let script = hook_script(HookType::PreCommit);
        assert!(script.starts_with("#!/bin/sh\n"));
        assert!(script.contains(HOOK_MARKER));
        assert!(script.contains("exec hookgate run --hook pre-commit"));
        assert!(!script.contains("{hook}"));

        let path_lookup = script.find("command -v hookgate").unwrap();
        let fallback = script.find("/usr/local/bin/hookgate").unwrap();
        assert!(path_lookup < fallback, "PATH must be searched before fallbacks");
    }

    #[test]
    fn test_pre_push_script_names_its_hook() {
        let script = hook_script(HookType::PrePush);
        assert!(script.contains("run --hook pre-push"));
        assert!(!script.contains("pre-commit"));
    }
}
