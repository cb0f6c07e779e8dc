//! The `run` command: collect files, run checks, print the report

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use hookgate_core::{CheckContext, Config, Orchestrator, RunOptions};
use hookgate_exec::{CancelSource, CommandRunner, SystemRunner};
use hookgate_git::{HookType, Repository};

use crate::cli::RunArgs;
use crate::error::Result;
use crate::report;

/// Where the file list comes from
#[derive(Debug, Clone, PartialEq, Eq)]
enum FileSource {
    Staged,
    Modified,
    All,
    Explicit(Vec<String>),
}

impl FileSource {
    fn from_args(args: &RunArgs) -> Self {
        if !args.files.is_empty() {
            Self::Explicit(args.files.clone())
        } else if args.all || args.hook == Some(HookType::PrePush) {
            Self::All
        } else if args.modified {
            Self::Modified
        } else {
            Self::Staged
        }
    }
}

pub async fn run_checks(cwd: &Path, args: RunArgs) -> Result<ExitCode> {
    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner::new());
    let repository = Repository::discover(Arc::clone(&runner), cwd).await?;
    let root = repository.root().to_path_buf();

    let mut config = Config::load(&root)?;
    config.apply_env(std::env::vars())?;

    let files = match FileSource::from_args(&args) {
        FileSource::Staged => repository.staged_files().await?,
        FileSource::Modified => repository.modified_files().await?,
        FileSource::All => repository.all_files().await?,
        FileSource::Explicit(files) => relative_to_root(cwd, &root, &files),
    };
    tracing::debug!(count = files.len(), "Collected files");

    let registry = hookgate_checks::registry_for(&config)?;
    let ctx = Arc::new(
        CheckContext::new(runner, &root)
            .with_build_tool(config.build_tool())
            .with_repository(repository),
    );
    let options = RunOptions {
        only: args.checks,
        skip: args.skip,
        fail_fast: args.fail_fast,
        parallel: args.parallel,
        timeout_override: args.timeout.map(Duration::from_secs),
    };
    let orchestrator = Orchestrator::new(registry, config);

    let cancel = Arc::new(CancelSource::new());
    let token = cancel.token();
    let interrupt = tokio::spawn({
        let cancel = Arc::clone(&cancel);
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted; cancelling running checks");
                cancel.cancel();
            }
        }
    });

    let result = orchestrator.run(ctx, &files, &options, &token).await;
    interrupt.abort();
    let report = result?;

    print!("{}", report::render(&report));
    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Turn paths given relative to `cwd` into root-relative paths.
fn relative_to_root(cwd: &Path, root: &Path, files: &[String]) -> Vec<String> {
    let cwd = canonical(cwd);
    let root = canonical(root);
    files
        .iter()
        .map(|file| {
            let absolute = cwd.join(file);
            let absolute = absolute
                .parent()
                .map(|parent| canonical(parent).join(absolute.file_name().unwrap_or_default()))
                .unwrap_or(absolute);
            match absolute.strip_prefix(&root) {
                Ok(relative) => relative.to_string_lossy().into_owned(),
                Err(_) => file.clone(),
            }
        })
        .collect()
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
