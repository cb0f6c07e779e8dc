//! Repository accessor backed by the `git` CLI
//!
//! The root is resolved once in [`Repository::discover`] and never changes
//! afterwards. File listings are returned as root-relative paths in the
//! order git printed them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use hookgate_exec::{CommandOutput, CommandRunner, Deadline, Invocation};

use crate::{Error, Result};

/// Time budget for a single git query.
pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(15);

/// Result of checking paths for uncommitted working-tree changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffStatus {
    Clean,
    Changed { diff: String },
}

#[derive(Clone)]
pub struct Repository {
    root: PathBuf,
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("root", &self.root)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Repository {
    /// Resolve the working-tree top level containing `cwd`.
    pub async fn discover(runner: Arc<dyn CommandRunner>, cwd: &Path) -> Result<Self> {
        let invocation = Invocation::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(cwd);
        let output = runner
            .run(&invocation, &Deadline::uncancellable(DEFAULT_GIT_TIMEOUT))
            .await?;

        let root = output.stdout.trim();
        if !output.success() || root.is_empty() {
            return Err(Error::RootNotFound {
                path: cwd.to_path_buf(),
                message: output.stderr.trim().to_string(),
            });
        }

        tracing::debug!(root = %root, "Resolved repository root");
        Ok(Self {
            root: PathBuf::from(root),
            runner,
            timeout: DEFAULT_GIT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join a root-relative path against the root. Absolute paths pass through.
    pub fn absolute(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Files added, copied, modified or renamed in the index.
    pub async fn staged_files(&self) -> Result<Vec<String>> {
        self.lines(&["diff", "--cached", "--name-only", "--diff-filter=ACMR"])
            .await
    }

    /// Files changed in the working tree relative to the index.
    pub async fn modified_files(&self) -> Result<Vec<String>> {
        self.lines(&["diff", "--name-only", "--diff-filter=ACMR"]).await
    }

    pub async fn all_files(&self) -> Result<Vec<String>> {
        self.lines(&["ls-files"]).await
    }

    /// Whether git tracks `path`. Any failure counts as "not tracked".
    pub async fn is_tracked(&self, path: &str) -> bool {
        match self.git(&["ls-files", "--error-unmatch", "--", path]).await {
            Ok(output) => output.success(),
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "Tracked-file query failed");
                false
            }
        }
    }

    /// Working-tree bytes of a tracked file.
    pub async fn file_content(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.absolute(path);
        if !self.is_tracked(path).await {
            return Err(Error::FileNotFound { path: full_path });
        }
        tokio::fs::read(&full_path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::FileNotFound {
                path: full_path.clone(),
            },
            _ => Error::io(&full_path, e),
        })
    }

    /// Check `paths` for working-tree changes with `git diff --exit-code`.
    ///
    /// Exit status 1 means differences; any other non-zero status is a
    /// genuine git failure.
    pub async fn diff_status(&self, paths: &[String], deadline: &Deadline) -> Result<DiffStatus> {
        let mut args = vec!["diff", "--exit-code", "--"];
        args.extend(paths.iter().map(String::as_str));
        let invocation = self.invocation(&args);
        let output = self.runner.run(&invocation, deadline).await?;

        match output.status {
            Some(0) => Ok(DiffStatus::Clean),
            Some(1) => Ok(DiffStatus::Changed {
                diff: output.stdout,
            }),
            _ => Err(Error::GitFailed {
                command: invocation.to_string(),
                stderr: output.stderr.trim().to_string(),
            }),
        }
    }

    fn invocation(&self, args: &[&str]) -> Invocation {
        Invocation::new("git")
            .args(args.iter().copied())
            .current_dir(&self.root)
    }

    async fn git(&self, args: &[&str]) -> Result<CommandOutput> {
        let deadline = Deadline::uncancellable(self.timeout);
        Ok(self.runner.run(&self.invocation(args), &deadline).await?)
    }

    async fn lines(&self, args: &[&str]) -> Result<Vec<String>> {
        let output = self.git(args).await?;
        if !output.success() {
            return Err(Error::GitFailed {
                command: self.invocation(args).to_string(),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(parse_lines(&output.stdout))
    }
}

/// Split line-oriented git output into trimmed, non-empty entries, in order.
///
/// Paths git printed C-quoted (non-ASCII or control characters under the
/// default `core.quotePath`) are decoded back to the real file name.
pub fn parse_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(unquote_path)
        .collect()
}

fn unquote_path(entry: &str) -> String {
    let Some(inner) = entry
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return entry.to_string();
    };

    let raw = inner.as_bytes();
    let mut bytes = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] != b'\\' || i + 1 == raw.len() {
            bytes.push(raw[i]);
            i += 1;
            continue;
        }
        let escaped = raw[i + 1];
        i += 2;
        let byte = match escaped {
            b'a' => 0x07,
            b'b' => 0x08,
            b't' => b'\t',
            b'n' => b'\n',
            b'v' => 0x0b,
            b'f' => 0x0c,
            b'r' => b'\r',
            b'0'..=b'3' if is_octal(raw, i) && is_octal(raw, i + 1) => {
                let value = (escaped - b'0') * 64 + (raw[i] - b'0') * 8 + (raw[i + 1] - b'0');
                i += 2;
                value
            }
            other => other,
        };
        bytes.push(byte);
    }

    match String::from_utf8(bytes) {
        Ok(path) => path,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

fn is_octal(raw: &[u8], at: usize) -> bool {
    raw.get(at).is_some_and(|b| (b'0'..=b'7').contains(b))
}
