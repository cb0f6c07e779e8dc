use std::time::Duration;

use hookgate_core::{Category, CheckMetadata, Dependency, FilePattern, ToolSpec, Verify};

use crate::tool::ToolCheck;

pub const FMT_INSTALL_HINT: &str =
    "gofmt ships with the Go toolchain. Install Go from https://go.dev/dl/ and make sure `go env GOROOT`/bin is on PATH.";

/// `go-fmt`: rewrite staged Go files with `gofmt` and fail if that changed them.
pub fn fmt() -> ToolCheck {
    let metadata = CheckMetadata::new("go-fmt", "Format Go sources with gofmt", Category::Formatting)
        .pattern(FilePattern::suffix(".go"))
        .depends_on(Dependency::BuildTarget("fmt".to_string()))
        .depends_on(Dependency::Tool("gofmt".to_string()))
        .estimated(Duration::from_secs(1));
    let spec = ToolSpec::new("gofmt", "fmt")
        .args(["-l", "-w"])
        .verify(Verify::Files)
        .install_hint(FMT_INSTALL_HINT);
    ToolCheck::new(metadata, spec)
}
