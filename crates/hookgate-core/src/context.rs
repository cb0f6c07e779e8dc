//! Shared execution context for one orchestrator run
//!
//! Every check needs the repository root and asks whether some build target
//! exists. Both answers are memoized here so that N checks cost one
//! `git rev-parse` and one `make -n <target>` per distinct target.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hookgate_exec::{CommandRunner, Deadline, Invocation};
use hookgate_git::Repository;
use tokio::sync::OnceCell;

use crate::error::CheckError;

pub const DEFAULT_BUILD_TOOL: &str = "make";

/// Time budget for a single `make -n <target>` probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of asking the build tool whether a target exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetProbe {
    Present,
    /// The dry run failed; the target is treated as undefined
    Absent,
    /// The build tool itself could not be started
    ProbeUnavailable,
}

pub struct CheckContext {
    runner: Arc<dyn CommandRunner>,
    workdir: PathBuf,
    build_tool: String,
    repository: OnceCell<Repository>,
    targets: Mutex<HashMap<String, Arc<OnceCell<TargetProbe>>>>,
}

impl fmt::Debug for CheckContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckContext")
            .field("workdir", &self.workdir)
            .field("build_tool", &self.build_tool)
            .field("repository", &self.repository.get())
            .finish_non_exhaustive()
    }
}

impl CheckContext {
    /// Create a context resolving the repository from `workdir`.
    pub fn new(runner: Arc<dyn CommandRunner>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            workdir: workdir.into(),
            build_tool: DEFAULT_BUILD_TOOL.to_string(),
            repository: OnceCell::new(),
            targets: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_build_tool(mut self, build_tool: impl Into<String>) -> Self {
        self.build_tool = build_tool.into();
        self
    }

    /// Seed the context with an already discovered repository.
    pub fn with_repository(mut self, repository: Repository) -> Self {
        self.repository = OnceCell::from(repository);
        self
    }

    pub fn runner(&self) -> &Arc<dyn CommandRunner> {
        &self.runner
    }

    pub fn build_tool(&self) -> &str {
        &self.build_tool
    }

    /// The repository accessor, discovered on first use.
    ///
    /// Concurrent first callers share a single discovery. A failed discovery
    /// is not cached.
    pub async fn repository(&self) -> Result<&Repository, CheckError> {
        self.repository
            .get_or_try_init(|| async {
                Repository::discover(Arc::clone(&self.runner), &self.workdir)
                    .await
                    .map_err(|e| CheckError::RepositoryRootNotFound {
                        message: e.to_string(),
                    })
            })
            .await
    }

    pub async fn resolve_root(&self) -> Result<&Path, CheckError> {
        Ok(self.repository().await?.root())
    }

    /// Whether the build tool defines `target`. Never fails.
    pub async fn has_target(&self, target: &str) -> bool {
        self.probe_target(target).await == TargetProbe::Present
    }

    /// Memoized dry-run probe for `target`.
    pub async fn probe_target(&self, target: &str) -> TargetProbe {
        let cell = {
            let mut targets = self.targets.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(targets.entry(target.to_string()).or_default())
        };

        if let Some(probe) = cell.get() {
            tracing::debug!(target_name = %target, ?probe, "Build target probe cache hit");
            return *probe;
        }
        *cell.get_or_init(|| self.run_probe(target)).await
    }

    async fn run_probe(&self, target: &str) -> TargetProbe {
        let root = match self.resolve_root().await {
            Ok(root) => root,
            Err(e) => {
                tracing::debug!(target_name = %target, error = %e, "No repository root; treating target as absent");
                return TargetProbe::Absent;
            }
        };

        let invocation = Invocation::new(&self.build_tool)
            .args(["-n", target])
            .current_dir(root);
        let probe = match self
            .runner
            .run(&invocation, &Deadline::uncancellable(PROBE_TIMEOUT))
            .await
        {
            Ok(output) if output.success() => TargetProbe::Present,
            Ok(_) => TargetProbe::Absent,
            Err(e) if e.is_not_found() => {
                tracing::warn!(
                    build_tool = %self.build_tool,
                    target_name = %target,
                    "Build tool not available; falling back to direct tool invocation"
                );
                TargetProbe::ProbeUnavailable
            }
            Err(e) => {
                tracing::debug!(target_name = %target, error = %e, "Build target probe failed");
                TargetProbe::Absent
            }
        };

        tracing::debug!(target_name = %target, ?probe, "Probed build target");
        probe
    }
}
