//! The build-target-first execution protocol shared by tool-backed checks

use std::path::Path;

use hookgate_exec::{Deadline, Invocation};
use hookgate_git::DiffStatus;

use crate::classify::{self, Attempt};
use crate::context::CheckContext;
use crate::error::{CheckError, ExecutionCause};

/// Which paths to diff after a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verify {
    /// The filtered files the check was given
    Files,
    /// A fixed set of root-relative paths
    Paths(Vec<String>),
}

/// How a tool-backed check can be run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    /// Binary for the direct strategy
    pub tool: String,
    /// Build target tried first
    pub target: String,
    /// Arguments for the direct strategy, before any file arguments
    pub args: Vec<String>,
    /// Append the absolute filtered files to the direct invocation
    pub pass_files: bool,
    pub verify: Option<Verify>,
    pub install_hint: String,
}

impl ToolSpec {
    pub fn new(tool: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            target: target.into(),
            args: Vec::new(),
            pass_files: true,
            verify: None,
            install_hint: String::new(),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn pass_files(mut self, pass_files: bool) -> Self {
        self.pass_files = pass_files;
        self
    }

    pub fn verify(mut self, verify: Verify) -> Self {
        self.verify = Some(verify);
        self
    }

    pub fn install_hint(mut self, hint: impl Into<String>) -> Self {
        self.install_hint = hint.into();
        self
    }
}

/// The strategy a successful [`execute`] took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    BuildTarget,
    Direct,
}

/// Run `spec` against `files` (root-relative) within `deadline`.
///
/// Steps run strictly in order: resolve the root, pick a strategy, run it,
/// classify the result, and verify idempotence when `spec.verify` is set.
pub async fn execute(
    ctx: &CheckContext,
    deadline: &Deadline,
    spec: &ToolSpec,
    files: &[String],
) -> Result<Strategy, CheckError> {
    let repository = tokio::select! {
        biased;
        _ = deadline.cancelled() => {
            return Err(classify::cancelled(&spec.tool, String::new()));
        }
        _ = deadline.expired() => {
            let discover = Invocation::new("git").args(["rev-parse", "--show-toplevel"]);
            return Err(classify::timed_out(&discover, deadline.timeout(), String::new()));
        }
        repository = ctx.repository() => repository?,
    };
    let root = repository.root();

    let has_target = tokio::select! {
        biased;
        _ = deadline.cancelled() => {
            return Err(classify::cancelled(&spec.tool, String::new()));
        }
        _ = deadline.expired() => {
            let probe = Invocation::new(ctx.build_tool()).args(["-n", spec.target.as_str()]);
            return Err(classify::timed_out(&probe, deadline.timeout(), String::new()));
        }
        present = ctx.has_target(&spec.target) => present,
    };

    let (strategy, invocation) = if has_target {
        (Strategy::BuildTarget, build_target_invocation(ctx, spec, root))
    } else {
        (Strategy::Direct, direct_invocation(spec, root, files))
    };
    tracing::debug!(?strategy, command = %invocation, "Selected execution strategy");

    let attempt = Attempt {
        tool: &spec.tool,
        invocation: &invocation,
        target: (strategy == Strategy::BuildTarget).then_some(spec.target.as_str()),
        install_hint: &spec.install_hint,
    };
    let result = ctx.runner().run(&invocation, deadline).await;
    if let Err(e) = classify::classify(&attempt, result) {
        tracing::warn!(command = %invocation, kind = ?e.kind(), "Tool failed");
        return Err(e);
    }

    if let Some(verify) = &spec.verify {
        let paths = match verify {
            Verify::Files => files.to_vec(),
            Verify::Paths(paths) => paths.clone(),
        };
        verify_clean(ctx, deadline, spec, paths).await?;
    }

    Ok(strategy)
}

fn build_target_invocation(ctx: &CheckContext, spec: &ToolSpec, root: &Path) -> Invocation {
    Invocation::new(ctx.build_tool())
        .arg(&spec.target)
        .current_dir(root)
}

fn direct_invocation(spec: &ToolSpec, root: &Path, files: &[String]) -> Invocation {
    let mut invocation = Invocation::new(&spec.tool)
        .args(spec.args.iter())
        .current_dir(root);
    if spec.pass_files {
        invocation = invocation.args(files.iter().map(|f| root.join(f).display().to_string()));
    }
    invocation
}

async fn verify_clean(
    ctx: &CheckContext,
    deadline: &Deadline,
    spec: &ToolSpec,
    paths: Vec<String>,
) -> Result<(), CheckError> {
    let repository = ctx.repository().await?;
    match repository.diff_status(&paths, deadline).await {
        Ok(DiffStatus::Clean) => Ok(()),
        Ok(DiffStatus::Changed { diff }) => {
            tracing::warn!(tool = %spec.tool, paths = ?paths, "Tool left uncommitted changes");
            Err(CheckError::NotTidy {
                tool: spec.tool.clone(),
                hint: format!(
                    "{} rewrote {}. Review the diff, stage the result and commit again.",
                    spec.tool,
                    paths.join(", ")
                ),
                paths,
                diff,
            })
        }
        Err(hookgate_git::Error::Exec(e)) => {
            let invocation = Invocation::new("git").args(["diff", "--exit-code"]);
            let attempt = Attempt {
                tool: "git",
                invocation: &invocation,
                target: None,
                install_hint: "Install git and make sure it is on PATH.",
            };
            classify::classify(&attempt, Err(e)).map(|_| ())
        }
        Err(e) => Err(CheckError::ToolExecution {
            tool: "git".to_string(),
            cause: ExecutionCause::Failed,
            output: e.to_string(),
            hint: "Could not verify the working tree. Run `git diff` manually.".to_string(),
        }),
    }
}
