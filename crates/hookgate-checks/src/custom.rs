//! Checks declared in `[[custom]]` sections of `.hookgate.toml`

use std::time::Duration;

use hookgate_core::{CheckMetadata, CustomCheck, DEFAULT_CHECK_TIMEOUT, Dependency, FilePattern, ToolSpec};

use crate::tool::ToolCheck;

/// Build a [`ToolCheck`] from a `[[custom]]` entry.
///
/// An entry without suffixes or basenames matches no files, so it never runs
/// unless `pass_files = false`, in which case it runs on every invocation.
pub fn custom_check(custom: &CustomCheck) -> ToolCheck {
    let (program, args) = match custom.command.split_first() {
        Some((program, args)) => (program.clone(), args.to_vec()),
        None => (custom.target.clone(), Vec::new()),
    };

    let description = if custom.description.is_empty() {
        format!("Custom check running `{}`", custom.command.join(" "))
    } else {
        custom.description.clone()
    };

    let mut metadata = CheckMetadata::new(&custom.name, description, custom.category)
        .depends_on(Dependency::BuildTarget(custom.target.clone()))
        .depends_on(Dependency::Tool(program.clone()))
        .timeout(
            custom
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_CHECK_TIMEOUT),
        )
        .requires_files(custom.pass_files);
    for suffix in &custom.suffixes {
        metadata = metadata.pattern(FilePattern::suffix(suffix));
    }
    for basename in &custom.basenames {
        metadata = metadata.pattern(FilePattern::basename(basename));
    }

    let mut spec = ToolSpec::new(&program, &custom.target)
        .args(args)
        .pass_files(custom.pass_files)
        .install_hint(format!("Install {program} and make sure it is on PATH."));
    if let Some(verify) = custom.verify() {
        spec = spec.verify(verify);
    }

    ToolCheck::new(metadata, spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookgate_core::{Category, Check, Config, Verify};
    use pretty_assertions::assert_eq;

    fn parse(content: &str) -> CustomCheck {
        Config::parse(content).unwrap().custom.remove(0)
    }

    #[test]
    fn test_custom_check_from_config() {
        let custom = parse(
            r#"
[[custom]]
name = "buf-format"
category = "formatting"
suffixes = [".proto"]
basenames = ["buf.yaml"]
target = "buf-fmt"
command = ["buf", "format", "-w"]
verify_files = true
timeout_secs = 15
"#,
        );

        let check = custom_check(&custom);

        assert_eq!(check.name(), "buf-format");
        assert_eq!(check.metadata().category, Category::Formatting);
        assert_eq!(check.metadata().default_timeout, Duration::from_secs(15));
        assert_eq!(check.spec().tool, "buf");
        assert_eq!(check.spec().args, vec!["format", "-w"]);
        assert_eq!(check.spec().target, "buf-fmt");
        assert_eq!(check.spec().verify, Some(Verify::Files));

        let files: Vec<String> = ["a.proto", "main.go", "buf.yaml"].iter().map(|s| s.to_string()).collect();
        assert_eq!(check.filter(&files), vec!["a.proto", "buf.yaml"]);
    }

    #[test]
    fn test_project_wide_custom_check_runs_without_files() {
        let custom = parse(
            r#"
[[custom]]
name = "vet"
target = "vet"
command = ["go", "vet", "./..."]
pass_files = false
"#,
        );

        let check = custom_check(&custom);

        assert!(!check.metadata().requires_files);
        assert!(!check.spec().pass_files);
        assert!(check.description().contains("go vet ./..."));
    }
}
