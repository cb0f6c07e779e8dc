//! Error types for hookgate-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from hookgate-core
    #[error(transparent)]
    Core(#[from] hookgate_core::Error),

    /// Error from hookgate-git
    #[error(transparent)]
    Git(#[from] hookgate_git::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Remediation hint to print under the error, if there is one.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Core(hookgate_core::Error::Check(e)) => Some(e.hint()),
            Self::Core(hookgate_core::Error::Config { .. }) => {
                Some("Fix .hookgate.toml or the HOOKGATE_* environment variables.")
            }
            Self::Git(hookgate_git::Error::RootNotFound { .. }) => {
                Some("Run hookgate from inside a git working tree.")
            }
            Self::Git(hookgate_git::Error::HookExists { .. }) => {
                Some("Move the existing hook aside, or rerun with --force to replace it.")
            }
            _ => None,
        }
    }
}

impl From<hookgate_core::CheckError> for CliError {
    fn from(e: hookgate_core::CheckError) -> Self {
        Self::Core(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_error_user() {
        let error = CliError::user("test error");
        assert_eq!(format!("{}", error), "test error");
        assert!(error.hint().is_none());
    }

    #[test]
    fn test_check_error_carries_hint() {
        let error = CliError::from(hookgate_core::CheckError::NoChecksToRun);
        assert_eq!(error.to_string(), "No checks selected to run");
        assert!(error.hint().unwrap().contains("HOOKGATE_SKIP"));
    }
}
