//! Command descriptions and captured results

use std::fmt;
use std::path::{Path, PathBuf};

/// A program to run, with its arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a process that ran to completion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was terminated by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn new(status: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Stdout followed by stderr, as one blob.
    pub fn combined(&self) -> String {
        join_streams(&self.stdout, &self.stderr)
    }
}

pub(crate) fn join_streams(stdout: &str, stderr: &str) -> String {
    match (stdout.is_empty(), stderr.is_empty()) {
        (true, _) => stderr.to_string(),
        (_, true) => stdout.to_string(),
        _ if stdout.ends_with('\n') => format!("{}{}", stdout, stderr),
        _ => format!("{}\n{}", stdout, stderr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_display() {
        let inv = Invocation::new("gofmt").arg("-l").args(["-w", "main.go"]);
        assert_eq!(inv.to_string(), "gofmt -l -w main.go");
    }

    #[test]
    fn test_success_requires_zero_exit() {
        assert!(CommandOutput::new(0, "", "").success());
        assert!(!CommandOutput::new(2, "", "").success());
        let signalled = CommandOutput {
            status: None,
            ..Default::default()
        };
        assert!(!signalled.success());
    }

    #[test]
    fn test_combined_joins_streams() {
        assert_eq!(CommandOutput::new(1, "out\n", "err").combined(), "out\nerr");
        assert_eq!(CommandOutput::new(1, "out", "err").combined(), "out\nerr");
        assert_eq!(CommandOutput::new(1, "", "err").combined(), "err");
        assert_eq!(CommandOutput::new(1, "out", "").combined(), "out");
    }
}
