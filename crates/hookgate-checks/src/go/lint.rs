use std::time::Duration;

use hookgate_core::{Category, CheckMetadata, Dependency, FilePattern, ToolSpec};

use crate::tool::ToolCheck;

pub const LINT_INSTALL_HINT: &str =
    "Install golangci-lint: https://golangci-lint.run/welcome/install/";

/// `go-lint`: run `golangci-lint` on staged Go files.
pub fn lint() -> ToolCheck {
    let metadata = CheckMetadata::new("go-lint", "Lint Go sources with golangci-lint", Category::Linting)
        .pattern(FilePattern::suffix(".go"))
        .depends_on(Dependency::BuildTarget("lint".to_string()))
        .depends_on(Dependency::Tool("golangci-lint".to_string()))
        .estimated(Duration::from_secs(10))
        .timeout(Duration::from_secs(120));
    let spec = ToolSpec::new("golangci-lint", "lint")
        .args(["run"])
        .install_hint(LINT_INSTALL_HINT);
    ToolCheck::new(metadata, spec)
}
