//! Execution protocol against real git repositories and real processes
#![cfg(unix)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use hookgate_core::{CheckContext, ErrorKind, ExecutionCause, Strategy, ToolSpec, Verify, execute};
use hookgate_exec::{Deadline, SystemRunner};
use hookgate_test_utils::TestRepo;

/// Rewrites every file argument to the canonical `x := 1` form.
fn formatter() -> ToolSpec {
    ToolSpec::new("sh", "fmt")
        .args(["-c", r#"for f; do printf 'x := 1\n' > "$f"; done"#, "formatter"])
        .verify(Verify::Files)
}

fn context(repo: &TestRepo) -> CheckContext {
    CheckContext::new(Arc::new(SystemRunner::new()), repo.root())
        .with_build_tool("hookgate-test-missing-build-tool")
}

fn files(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_formatted_file_passes() {
    let repo = TestRepo::new();
    repo.commit_file("main.go", "x := 1\n");
    let ctx = context(&repo);

    let strategy = execute(
        &ctx,
        &Deadline::uncancellable(Duration::from_secs(10)),
        &formatter(),
        &files(&["main.go"]),
    )
    .await
    .unwrap();

    assert_eq!(strategy, Strategy::Direct);
}

#[tokio::test]
async fn test_rewritten_file_is_not_tidy() {
    let repo = TestRepo::new();
    repo.commit_file("main.go", "x:=1\n");
    let ctx = context(&repo);

    let err = execute(
        &ctx,
        &Deadline::uncancellable(Duration::from_secs(10)),
        &formatter(),
        &files(&["main.go"]),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotTidy);
    assert!(err.output().contains("+x := 1"), "{}", err.output());
}

#[tokio::test]
async fn test_missing_tool_is_tool_not_found() {
    let repo = TestRepo::new();
    let spec = ToolSpec::new("hookgate-test-missing-linter", "lint")
        .install_hint("go install example.com/linter@latest");
    let ctx = context(&repo);

    let err = execute(
        &ctx,
        &Deadline::uncancellable(Duration::from_secs(10)),
        &spec,
        &files(&["main.go"]),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ToolNotFound);
    assert_eq!(err.hint(), "go install example.com/linter@latest");
}

#[tokio::test]
async fn test_hanging_tool_is_killed_at_deadline() {
    let repo = TestRepo::new();
    let spec = ToolSpec::new("sh", "lint")
        .args(["-c", "echo started; sleep 30"])
        .pass_files(false);
    let ctx = context(&repo);
    // Resolve the root outside the measured window.
    ctx.resolve_root().await.unwrap();

    let started = Instant::now();
    let err = execute(
        &ctx,
        &Deadline::uncancellable(Duration::from_millis(300)),
        &spec,
        &files(&["main.go"]),
    )
    .await
    .unwrap_err();

    assert_eq!(err.cause(), Some(ExecutionCause::Timeout));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(err.hint().contains("HOOKGATE_TIMEOUT"));
}
