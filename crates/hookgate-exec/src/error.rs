//! Error types for hookgate-exec

use std::time::Duration;

/// Result type for hookgate-exec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running a subprocess
///
/// A process that runs and exits non-zero is not an error at this layer;
/// callers inspect [`crate::CommandOutput::status`] for that.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not finish within {after:?}")]
    TimedOut {
        program: String,
        after: Duration,
        /// Output captured before the process was killed
        output: String,
    },

    #[error("{program} was cancelled")]
    Cancelled { program: String, output: String },
}

impl Error {
    /// True when the program could not be found on this system.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }

    /// The program this error is about.
    pub fn program(&self) -> &str {
        match self {
            Self::Spawn { program, .. }
            | Self::TimedOut { program, .. }
            | Self::Cancelled { program, .. } => program,
        }
    }

    /// Whatever output was captured before the failure.
    pub fn output(&self) -> &str {
        match self {
            Self::Spawn { .. } => "",
            Self::TimedOut { output, .. } | Self::Cancelled { output, .. } => output,
        }
    }
}
