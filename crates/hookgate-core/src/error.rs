//! Error types for hookgate-core
//!
//! [`CheckError`] is the closed taxonomy every check failure is reported
//! through. [`Error`] covers everything else this crate can fail at
//! (configuration, registry setup, git access outside a check).

use std::fmt;
use std::path::PathBuf;

/// Result type for hookgate-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Discriminant of a [`CheckError`], for matching without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ChecksFailed,
    NoChecksToRun,
    RepositoryRootNotFound,
    ToolNotFound,
    MakeTargetNotFound,
    ToolExecution,
    NotTidy,
}

/// Why a tool that did run is considered failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionCause {
    /// The check's deadline expired
    Timeout,
    /// The run was cancelled
    Cancelled,
    PermissionDenied,
    /// The tool reported a syntax error in the input
    Syntax,
    /// Any other non-zero exit
    Failed,
}

impl fmt::Display for ExecutionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timed out"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::Syntax => write!(f, "syntax error"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A check failure, always paired with a remediation hint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    /// One or more checks failed; names are in report order
    #[error("{} check(s) failed: {}", .checks.len(), .checks.join(", "))]
    ChecksFailed { checks: Vec<String> },

    #[error("No checks selected to run")]
    NoChecksToRun,

    #[error("Not inside a git working tree: {message}")]
    RepositoryRootNotFound { message: String },

    #[error("{tool} not found. {hint}")]
    ToolNotFound {
        tool: String,
        output: String,
        hint: String,
    },

    #[error("{tool} target '{target}' not found. {hint}")]
    MakeTargetNotFound {
        tool: String,
        target: String,
        output: String,
        hint: String,
    },

    #[error("{tool} {cause}. {hint}")]
    ToolExecution {
        tool: String,
        cause: ExecutionCause,
        output: String,
        hint: String,
    },

    #[error("{tool} left changes in {}. {hint}", .paths.join(", "))]
    NotTidy {
        tool: String,
        paths: Vec<String>,
        diff: String,
        hint: String,
    },
}

impl CheckError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ChecksFailed { .. } => ErrorKind::ChecksFailed,
            Self::NoChecksToRun => ErrorKind::NoChecksToRun,
            Self::RepositoryRootNotFound { .. } => ErrorKind::RepositoryRootNotFound,
            Self::ToolNotFound { .. } => ErrorKind::ToolNotFound,
            Self::MakeTargetNotFound { .. } => ErrorKind::MakeTargetNotFound,
            Self::ToolExecution { .. } => ErrorKind::ToolExecution,
            Self::NotTidy { .. } => ErrorKind::NotTidy,
        }
    }

    pub fn hint(&self) -> &str {
        match self {
            Self::ChecksFailed { .. } => "Fix the failures above and commit again.",
            Self::NoChecksToRun => {
                "Every check is disabled or filtered out. Review --check/--skip, HOOKGATE_SKIP and .hookgate.toml."
            }
            Self::RepositoryRootNotFound { .. } => "Run hookgate from inside a git working tree.",
            Self::ToolNotFound { hint, .. }
            | Self::MakeTargetNotFound { hint, .. }
            | Self::ToolExecution { hint, .. }
            | Self::NotTidy { hint, .. } => hint,
        }
    }

    pub fn tool(&self) -> Option<&str> {
        match self {
            Self::ToolNotFound { tool, .. }
            | Self::MakeTargetNotFound { tool, .. }
            | Self::ToolExecution { tool, .. }
            | Self::NotTidy { tool, .. } => Some(tool),
            _ => None,
        }
    }

    /// Captured tool output (the diff, for [`CheckError::NotTidy`]).
    pub fn output(&self) -> &str {
        match self {
            Self::ToolNotFound { output, .. }
            | Self::MakeTargetNotFound { output, .. }
            | Self::ToolExecution { output, .. } => output,
            Self::NotTidy { diff, .. } => diff,
            _ => "",
        }
    }

    pub fn cause(&self) -> Option<ExecutionCause> {
        match self {
            Self::ToolExecution { cause, .. } => Some(*cause),
            _ => None,
        }
    }
}

/// Errors that can occur outside a single check's execution
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Check(#[from] CheckError),

    #[error("Failed to load config at {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("A check named '{name}' is already registered")]
    DuplicateCheck { name: String },

    #[error("Unknown check '{name}'. Available: {}", .available.join(", "))]
    UnknownCheck {
        name: String,
        available: Vec<String>,
    },

    #[error(transparent)]
    Git(#[from] hookgate_git::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
