//! Turning tool results into [`CheckError`]s
//!
//! Output-based classification is a substring search over an ordered table
//! of known messages. It depends on the exact wording of upstream tools and
//! is a best-effort heuristic, not a guarantee.
//!
//! Priority: deadline and cancellation first (decided from the process
//! result, never from text), then [`SIGNATURES`] top to bottom, then a
//! generic failure.

use std::time::Duration;

use hookgate_exec::{CommandOutput, Invocation};

use crate::error::{CheckError, ExecutionCause};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureKind {
    MissingTarget,
    MissingTool,
    PermissionDenied,
    Syntax,
}

/// A known failure message and what it means
#[derive(Debug)]
pub struct Signature {
    pub kind: SignatureKind,
    /// Lowercase needles; any one matching selects this signature
    pub needles: &'static [&'static str],
    pub hint: &'static str,
}

/// Known failure messages, most specific first.
pub const SIGNATURES: &[Signature] = &[
    Signature {
        kind: SignatureKind::MissingTarget,
        needles: &["no rule to make target", "don't know how to make"],
        hint: "Add the target to the Makefile or disable this check in .hookgate.toml.",
    },
    Signature {
        kind: SignatureKind::MissingTool,
        needles: &[
            "command not found",
            "executable file not found",
            "not found in $path",
        ],
        hint: "Install the missing tool and make sure it is on PATH.",
    },
    Signature {
        kind: SignatureKind::PermissionDenied,
        needles: &["permission denied", "operation not permitted"],
        hint: "Check the permissions of the tool binary and of the files it writes.",
    },
    Signature {
        kind: SignatureKind::Syntax,
        needles: &["syntax error", "expected declaration", "illegal character"],
        hint: "Fix the syntax errors reported above first, then run the check again.",
    },
];

/// What was attempted, for building errors and hints.
#[derive(Debug, Clone, Copy)]
pub struct Attempt<'a> {
    /// The check's underlying tool, e.g. `gofmt`
    pub tool: &'a str,
    pub invocation: &'a Invocation,
    /// Set when the invocation runs a build target
    pub target: Option<&'a str>,
    pub install_hint: &'a str,
}

/// First signature whose needle occurs in `output` (case-insensitive).
///
/// `MissingTarget` is only considered when a build target was invoked.
/// `MissingTool` also matches `<tool>: no such file or directory`, the way
/// make reports a recipe whose program is absent.
pub fn match_signature(output: &str, build_target: bool, tool: &str) -> Option<&'static Signature> {
    let haystack = output.to_lowercase();
    SIGNATURES
        .iter()
        .filter(|sig| build_target || sig.kind != SignatureKind::MissingTarget)
        .find(|sig| {
            sig.needles.iter().any(|needle| haystack.contains(needle))
                || (sig.kind == SignatureKind::MissingTool && names_missing_program(&haystack, tool))
        })
}

/// `make: gofmt: no such file or directory` names a program; `open
/// gone.go: no such file or directory` names a missing file argument.
fn names_missing_program(haystack: &str, tool: &str) -> bool {
    if tool.is_empty() {
        return false;
    }
    let needle = format!("{}: no such file or directory", tool.to_lowercase());
    haystack.match_indices(&needle).any(|(at, _)| {
        haystack[..at]
            .chars()
            .next_back()
            .is_none_or(|c| c == ':' || c.is_whitespace())
    })
}

pub fn timed_out(invocation: &Invocation, after: Duration, output: String) -> CheckError {
    CheckError::ToolExecution {
        tool: invocation.program.clone(),
        cause: ExecutionCause::Timeout,
        output,
        hint: format!(
            "`{}` did not finish within {}s. Raise the limit with HOOKGATE_TIMEOUT=<secs>, \
             --timeout, or timeout_secs in .hookgate.toml.",
            invocation,
            after.as_secs_f32()
        ),
    }
}

pub fn cancelled(tool: &str, output: String) -> CheckError {
    CheckError::ToolExecution {
        tool: tool.to_string(),
        cause: ExecutionCause::Cancelled,
        output,
        hint: "The run was cancelled before this check finished.".to_string(),
    }
}

/// Classify the result of running `attempt.invocation`.
///
/// Returns the output unchanged when the process exited zero.
pub fn classify(
    attempt: &Attempt<'_>,
    result: hookgate_exec::Result<CommandOutput>,
) -> Result<CommandOutput, CheckError> {
    let output = match result {
        Ok(output) if output.success() => return Ok(output),
        Ok(output) => output.combined(),
        Err(hookgate_exec::Error::TimedOut { after, output, .. }) => {
            return Err(timed_out(attempt.invocation, after, output));
        }
        Err(hookgate_exec::Error::Cancelled { output, .. }) => {
            return Err(cancelled(&attempt.invocation.program, output));
        }
        Err(e) if e.is_not_found() => {
            let program = e.program().to_string();
            let hint = if program == attempt.tool && !attempt.install_hint.is_empty() {
                attempt.install_hint.to_string()
            } else {
                format!("Install {} and make sure it is on PATH.", program)
            };
            return Err(CheckError::ToolNotFound {
                tool: program,
                output: e.to_string(),
                hint,
            });
        }
        Err(e) => {
            let cause = match &e {
                hookgate_exec::Error::Spawn { source, .. }
                    if source.kind() == std::io::ErrorKind::PermissionDenied =>
                {
                    ExecutionCause::PermissionDenied
                }
                _ => ExecutionCause::Failed,
            };
            return Err(CheckError::ToolExecution {
                tool: e.program().to_string(),
                cause,
                output: e.to_string(),
                hint: format!("Could not start `{}`.", attempt.invocation),
            });
        }
    };

    Err(classify_output(attempt, output))
}

fn classify_output(attempt: &Attempt<'_>, output: String) -> CheckError {
    let signature = match_signature(&output, attempt.target.is_some(), attempt.tool);
    let program = attempt.invocation.program.clone();

    match signature.map(|sig| (sig.kind, sig.hint)) {
        Some((SignatureKind::MissingTarget, hint)) => CheckError::MakeTargetNotFound {
            tool: program,
            target: attempt.target.unwrap_or_default().to_string(),
            output,
            hint: hint.to_string(),
        },
        Some((SignatureKind::MissingTool, hint)) => CheckError::ToolNotFound {
            tool: attempt.tool.to_string(),
            output,
            hint: if attempt.install_hint.is_empty() {
                hint.to_string()
            } else {
                attempt.install_hint.to_string()
            },
        },
        Some((SignatureKind::PermissionDenied, hint)) => CheckError::ToolExecution {
            tool: program,
            cause: ExecutionCause::PermissionDenied,
            output,
            hint: hint.to_string(),
        },
        Some((SignatureKind::Syntax, hint)) => CheckError::ToolExecution {
            tool: program,
            cause: ExecutionCause::Syntax,
            output,
            hint: hint.to_string(),
        },
        None => CheckError::ToolExecution {
            hint: format!("Run `{}` manually to see the full error.", attempt.invocation),
            tool: program,
            cause: ExecutionCause::Failed,
            output,
        },
    }
}

#[cfg(test)]
mod tests {
    //! The message fixtures below are copies of real tool output. If a tool
    //! rewords its errors these tests keep passing while real-world
    //! classification degrades to the generic failure.

    use super::*;
    use crate::error::ErrorKind;
    use rstest::rstest;

    fn make_fmt() -> Invocation {
        Invocation::new("make").arg("fmt")
    }

    fn attempt<'a>(invocation: &'a Invocation, target: Option<&'a str>) -> Attempt<'a> {
        Attempt {
            tool: "gofmt",
            invocation,
            target,
            install_hint: "Install Go from https://go.dev/dl/",
        }
    }

    fn failed(stdout: &str, stderr: &str) -> hookgate_exec::Result<CommandOutput> {
        Ok(CommandOutput::new(2, stdout, stderr))
    }

    #[test]
    fn test_success_passes_output_through() {
        let inv = make_fmt();
        let output = classify(&attempt(&inv, Some("fmt")), Ok(CommandOutput::new(0, "ok", ""))).unwrap();
        assert_eq!(output.stdout, "ok");
    }

    #[rstest]
    #[case("make: *** No rule to make target 'fmt'.  Stop.", ErrorKind::MakeTargetNotFound, None)]
    #[case("make: don't know how to make fmt. Stop", ErrorKind::MakeTargetNotFound, None)]
    #[case("/bin/sh: 1: gofmt: command not found", ErrorKind::ToolNotFound, None)]
    #[case("exec: \"golangci-lint\": executable file not found in $PATH", ErrorKind::ToolNotFound, None)]
    #[case("make: gofmt: No such file or directory\nmake: *** [Makefile:2: fmt] Error 127", ErrorKind::ToolNotFound, None)]
    #[case("open /repo/gone.go: no such file or directory", ErrorKind::ToolExecution, Some(ExecutionCause::Failed))]
    #[case("stat pkg/gofmt.go: no such file or directory", ErrorKind::ToolExecution, Some(ExecutionCause::Failed))]
    #[case("open main.go: Permission denied", ErrorKind::ToolExecution, Some(ExecutionCause::PermissionDenied))]
    #[case("main.go:3:1: syntax error: non-declaration statement", ErrorKind::ToolExecution, Some(ExecutionCause::Syntax))]
    #[case("main.go:1:1: expected declaration, found x", ErrorKind::ToolExecution, Some(ExecutionCause::Syntax))]
    #[case("main.go:12: unused variable x", ErrorKind::ToolExecution, Some(ExecutionCause::Failed))]
    fn test_output_classification(
        #[case] stderr: &str,
        #[case] kind: ErrorKind,
        #[case] cause: Option<ExecutionCause>,
    ) {
        let inv = make_fmt();
        let err = classify(&attempt(&inv, Some("fmt")), failed("", stderr)).unwrap_err();
        assert_eq!(err.kind(), kind, "{stderr}");
        assert_eq!(err.cause(), cause, "{stderr}");
        assert_eq!(err.output(), stderr);
        assert!(!err.hint().is_empty());
    }

    #[test]
    fn test_missing_file_argument_is_not_missing_tool() {
        let inv = Invocation::new("go").args(["mod", "tidy"]);
        let attempt = Attempt {
            tool: "go",
            invocation: &inv,
            target: None,
            install_hint: "Install Go from https://go.dev/dl/",
        };
        let stderr = "go: open /repo/internal/foo.go: no such file or directory";

        let err = classify(&attempt, failed("", stderr)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ToolExecution);
        assert_eq!(err.cause(), Some(ExecutionCause::Failed));
        assert_eq!(err.hint(), "Run `go mod tidy` manually to see the full error.");
    }

    #[test]
    fn test_missing_target_outranks_missing_tool() {
        let inv = make_fmt();
        let output = "make: *** No rule to make target 'fmt'.\nsh: gofmt: command not found";
        let err = classify(&attempt(&inv, Some("fmt")), failed(output, "")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MakeTargetNotFound);
    }

    #[test]
    fn test_missing_tool_outranks_permission_and_syntax() {
        let inv = make_fmt();
        let output = "permission denied\nsyntax error\ngofmt: command not found";
        let err = classify(&attempt(&inv, Some("fmt")), failed(output, "")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ToolNotFound);
        assert_eq!(err.hint(), "Install Go from https://go.dev/dl/");
    }

    #[test]
    fn test_permission_outranks_syntax() {
        let inv = make_fmt();
        let err = classify(
            &attempt(&inv, Some("fmt")),
            failed("syntax error near x", "permission denied"),
        )
        .unwrap_err();
        assert_eq!(err.cause(), Some(ExecutionCause::PermissionDenied));
    }

    #[test]
    fn test_timeout_outranks_every_signature() {
        let inv = make_fmt();
        let result = Err(hookgate_exec::Error::TimedOut {
            program: "make".to_string(),
            after: Duration::from_secs(30),
            output: "open x.go: permission denied\nNo rule to make target".to_string(),
        });
        let err = classify(&attempt(&inv, Some("fmt")), result).unwrap_err();
        assert_eq!(err.cause(), Some(ExecutionCause::Timeout));
        assert!(err.hint().contains("HOOKGATE_TIMEOUT"));
        assert!(err.output().contains("permission denied"));
    }

    #[test]
    fn test_cancelled_is_failure() {
        let inv = make_fmt();
        let result = Err(hookgate_exec::Error::Cancelled {
            program: "make".to_string(),
            output: String::new(),
        });
        let err = classify(&attempt(&inv, Some("fmt")), result).unwrap_err();
        assert_eq!(err.cause(), Some(ExecutionCause::Cancelled));
    }

    #[test]
    fn test_spawn_not_found_uses_install_hint() {
        let inv = Invocation::new("gofmt").arg("-l");
        let result = Err(hookgate_exec::Error::Spawn {
            program: "gofmt".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        let err = classify(&attempt(&inv, None), result).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ToolNotFound);
        assert_eq!(err.tool(), Some("gofmt"));
        assert_eq!(err.hint(), "Install Go from https://go.dev/dl/");
    }

    #[test]
    fn test_missing_target_ignored_for_direct_invocation() {
        let inv = Invocation::new("gofmt").arg("-l");
        let err = classify(&attempt(&inv, None), failed("No rule to make target", "")).unwrap_err();
        assert_eq!(err.cause(), Some(ExecutionCause::Failed));
    }

    #[test]
    fn test_generic_hint_names_command() {
        let inv = Invocation::new("golangci-lint").args(["run", "/repo/main.go"]);
        let err = classify(&attempt(&inv, None), failed("main.go:3: ineffassign", "")).unwrap_err();
        assert!(err.hint().contains("golangci-lint run /repo/main.go"));
    }
}
