use std::time::Duration;

use hookgate_core::{Category, CheckMetadata, Dependency, FilePattern, ToolSpec, Verify};

use crate::tool::ToolCheck;

pub const TIDY_INSTALL_HINT: &str = "Install the Go toolchain from https://go.dev/dl/";

/// `go-mod-tidy`: run `go mod tidy` and fail if `go.mod` or `go.sum` changed.
///
/// Any matching file is enough to trigger it. The command always operates on
/// the module manifests, never on the individual files.
pub fn mod_tidy() -> ToolCheck {
    let metadata = CheckMetadata::new(
        "go-mod-tidy",
        "Keep go.mod and go.sum tidy",
        Category::DependencyHygiene,
    )
    .pattern(FilePattern::suffix(".go"))
    .pattern(FilePattern::basename("go.mod"))
    .pattern(FilePattern::basename("go.sum"))
    .depends_on(Dependency::BuildTarget("tidy".to_string()))
    .depends_on(Dependency::Tool("go".to_string()))
    .estimated(Duration::from_secs(3))
    .timeout(Duration::from_secs(60));
    let spec = ToolSpec::new("go", "tidy")
        .args(["mod", "tidy"])
        .pass_files(false)
        .verify(Verify::Paths(vec!["go.mod".to_string(), "go.sum".to_string()]))
        .install_hint(TIDY_INSTALL_HINT);
    ToolCheck::new(metadata, spec)
}
