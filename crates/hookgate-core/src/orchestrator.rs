//! Selecting, scheduling and aggregating checks for one run

use std::sync::Arc;
use std::time::{Duration, Instant};

use hookgate_exec::{CancelToken, Deadline};
use tokio::task::JoinSet;

use crate::check::{Category, Check};
use crate::classify;
use crate::config::Config;
use crate::context::CheckContext;
use crate::error::{CheckError, Error, ExecutionCause, Result};
use crate::registry::Registry;

/// Per-invocation choices layered over the config
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Run only these checks. Wins over `enabled = false` and config skips.
    pub only: Vec<String>,
    pub skip: Vec<String>,
    /// Combined with `[run].fail_fast` by OR
    pub fail_fast: bool,
    /// Combined with `[run].parallel` by OR
    pub parallel: bool,
    /// Highest-precedence timeout for every check
    pub timeout_override: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The check requires files and none matched its patterns
    NoMatchingFiles,
    /// An earlier check failed and fail-fast is on
    FailFast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Passed,
    Skipped(SkipReason),
    Failed(CheckError),
}

#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub name: String,
    pub category: Category,
    pub status: CheckStatus,
    /// The filtered files the check ran against
    pub files: Vec<String>,
    pub duration: Duration,
}

impl CheckOutcome {
    fn new(check: &dyn Check, status: CheckStatus) -> Self {
        Self {
            name: check.name().to_string(),
            category: check.metadata().category,
            status,
            files: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn error(&self) -> Option<&CheckError> {
        match &self.status {
            CheckStatus::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error().is_some()
    }
}

/// Results of one run, in selection order
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcomes: Vec<CheckOutcome>,
    pub duration: Duration,
}

impl RunReport {
    pub fn passed(&self) -> bool {
        !self.outcomes.iter().any(CheckOutcome::is_failure)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&CheckOutcome, &CheckError)> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.error().map(|e| (outcome, e)))
    }

    pub fn failed_names(&self) -> Vec<String> {
        self.failures().map(|(outcome, _)| outcome.name.clone()).collect()
    }

    /// `Err(ChecksFailed)` naming every failed check, in report order.
    pub fn into_result(self) -> std::result::Result<Self, CheckError> {
        if self.passed() {
            Ok(self)
        } else {
            Err(CheckError::ChecksFailed {
                checks: self.failed_names(),
            })
        }
    }
}

/// Everything one spawned check needs, owned
struct Job {
    index: usize,
    check: Arc<dyn Check>,
    timeout: Duration,
}

pub struct Orchestrator {
    registry: Registry,
    config: Config,
}

impl Orchestrator {
    pub fn new(registry: Registry, config: Config) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Checks to run for `options`, in registration order.
    pub fn select(&self, options: &RunOptions) -> Result<Vec<Arc<dyn Check>>> {
        for name in options.only.iter().chain(&options.skip) {
            if !self.registry.contains(name) {
                return Err(Error::UnknownCheck {
                    name: name.clone(),
                    available: self.registry.names(),
                });
            }
        }

        let selected: Vec<_> = self
            .registry
            .iter()
            .filter(|check| {
                let name = check.name();
                let chosen = if options.only.is_empty() {
                    self.config.is_enabled(name)
                } else {
                    options.only.iter().any(|only| only == name)
                };
                chosen && !options.skip.iter().any(|skip| skip == name)
            })
            .cloned()
            .collect();

        if selected.is_empty() {
            return Err(CheckError::NoChecksToRun.into());
        }
        Ok(selected)
    }

    /// Run the selected checks against `files` (root-relative).
    pub async fn run(
        &self,
        ctx: Arc<CheckContext>,
        files: &[String],
        options: &RunOptions,
        cancel: &CancelToken,
    ) -> Result<RunReport> {
        let selected = self.select(options)?;
        let fail_fast = options.fail_fast || self.config.run.fail_fast;
        let parallel = options.parallel || self.config.run.parallel;
        let files: Arc<[String]> = files.into();
        let started = Instant::now();

        tracing::info!(
            checks = selected.len(),
            files = files.len(),
            parallel,
            fail_fast,
            "Starting run"
        );

        let jobs: Vec<Job> = selected
            .into_iter()
            .enumerate()
            .map(|(index, check)| {
                let timeout = self.config.timeout_for(
                    check.name(),
                    options.timeout_override,
                    check.metadata().default_timeout,
                );
                Job {
                    index,
                    check,
                    timeout,
                }
            })
            .collect();

        let mut outcomes: Vec<Option<CheckOutcome>> = vec![None; jobs.len()];
        let (sequential, concurrent): (Vec<Job>, Vec<Job>) = if parallel {
            jobs.into_iter()
                .partition(|job| job.check.metadata().category.mutates_worktree())
        } else {
            (jobs, Vec::new())
        };

        let mut failed = false;
        for job in &sequential {
            let outcome = if failed && fail_fast {
                CheckOutcome::new(job.check.as_ref(), CheckStatus::Skipped(SkipReason::FailFast))
            } else {
                run_check(&ctx, job.check.as_ref(), &files, job.timeout, cancel).await
            };
            failed |= outcome.is_failure();
            outcomes[job.index] = Some(outcome);
        }

        if !concurrent.is_empty() {
            if failed && fail_fast {
                for job in &concurrent {
                    outcomes[job.index] = Some(CheckOutcome::new(
                        job.check.as_ref(),
                        CheckStatus::Skipped(SkipReason::FailFast),
                    ));
                }
            } else {
                self.run_concurrent(&ctx, &files, &concurrent, fail_fast, cancel, &mut outcomes)
                    .await;
            }
        }

        let report = RunReport {
            outcomes: outcomes.into_iter().flatten().collect(),
            duration: started.elapsed(),
        };
        tracing::info!(
            passed = report.passed(),
            failed = report.failed_names().len(),
            duration_ms = report.duration.as_millis() as u64,
            "Run finished"
        );
        Ok(report)
    }

    async fn run_concurrent(
        &self,
        ctx: &Arc<CheckContext>,
        files: &Arc<[String]>,
        jobs: &[Job],
        fail_fast: bool,
        cancel: &CancelToken,
        outcomes: &mut [Option<CheckOutcome>],
    ) {
        let mut set = JoinSet::new();
        for job in jobs {
            let ctx = Arc::clone(ctx);
            let files = Arc::clone(files);
            let check = Arc::clone(&job.check);
            let cancel = cancel.clone();
            let (index, timeout) = (job.index, job.timeout);
            set.spawn(async move {
                let outcome = run_check(&ctx, check.as_ref(), &files, timeout, &cancel).await;
                (index, outcome)
            });
        }

        let mut aborted = false;
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    if fail_fast && outcome.is_failure() && !aborted {
                        tracing::debug!(check = %outcome.name, "Fail-fast: aborting remaining checks");
                        set.abort_all();
                        aborted = true;
                    }
                    outcomes[index] = Some(outcome);
                }
                Err(e) if e.is_cancelled() => {}
                Err(e) => tracing::warn!(error = %e, "Check task panicked"),
            }
        }

        for job in jobs {
            if outcomes[job.index].is_none() {
                let status = if aborted {
                    CheckStatus::Skipped(SkipReason::FailFast)
                } else {
                    CheckStatus::Failed(CheckError::ToolExecution {
                        tool: job.check.name().to_string(),
                        cause: ExecutionCause::Failed,
                        output: String::new(),
                        hint: "The check panicked. Run it again with --verbose.".to_string(),
                    })
                };
                outcomes[job.index] = Some(CheckOutcome::new(job.check.as_ref(), status));
            }
        }
    }
}

async fn run_check(
    ctx: &CheckContext,
    check: &dyn Check,
    files: &[String],
    timeout: Duration,
    cancel: &CancelToken,
) -> CheckOutcome {
    let name = check.name();
    if cancel.is_cancelled() {
        return CheckOutcome::new(
            check,
            CheckStatus::Failed(classify::cancelled(name, String::new())),
        );
    }

    let filtered = check.filter(files);
    if filtered.is_empty() && check.metadata().requires_files {
        tracing::debug!(check = %name, "No matching files; skipping");
        return CheckOutcome::new(check, CheckStatus::Skipped(SkipReason::NoMatchingFiles));
    }

    tracing::info!(check = %name, files = filtered.len(), timeout_secs = timeout.as_secs(), "Running check");
    let deadline = Deadline::after(timeout, cancel.clone());
    let started = Instant::now();
    let result = check.run(ctx, &deadline, &filtered).await;
    let duration = started.elapsed();

    let status = match result {
        Ok(()) if deadline.is_cancelled() => {
            CheckStatus::Failed(classify::cancelled(name, String::new()))
        }
        Ok(()) => CheckStatus::Passed,
        Err(e) => CheckStatus::Failed(e),
    };
    match &status {
        CheckStatus::Failed(e) => {
            tracing::warn!(check = %name, kind = ?e.kind(), error = %e, "Check failed")
        }
        _ => tracing::info!(check = %name, duration_ms = duration.as_millis() as u64, "Check passed"),
    }

    CheckOutcome {
        name: name.to_string(),
        category: check.metadata().category,
        status,
        files: filtered,
        duration,
    }
}
