//! Error types for hookgate-git

use std::path::PathBuf;

/// Result type for hookgate-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in hookgate-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not inside a git working tree ({path}): {message}")]
    RootNotFound { path: PathBuf, message: String },

    #[error("`{command}` failed: {stderr}")]
    GitFailed { command: String, stderr: String },

    #[error("File is not tracked or does not exist: {path}")]
    FileNotFound { path: PathBuf },

    #[error("A hook not managed by hookgate already exists at {path}. Use --force to replace it.")]
    HookExists { path: PathBuf },

    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),

    #[error(transparent)]
    Exec(#[from] hookgate_exec::Error),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
