//! The [`Check`] trait and static check metadata

use std::fmt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use hookgate_exec::Deadline;
use serde::{Deserialize, Serialize};

use crate::context::CheckContext;
use crate::error::CheckError;

/// Timeout used when neither the check nor the configuration sets one.
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(30);

/// What kind of quality gate a check is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Formatting,
    Linting,
    DependencyHygiene,
}

impl Category {
    /// Whether checks of this category rewrite files in the working tree.
    ///
    /// The orchestrator never runs two such checks at the same time.
    pub fn mutates_worktree(&self) -> bool {
        matches!(self, Self::Formatting | Self::DependencyHygiene)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Formatting => write!(f, "formatting"),
            Self::Linting => write!(f, "linting"),
            Self::DependencyHygiene => write!(f, "dependency-hygiene"),
        }
    }
}

/// How a check recognises the files it cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilePattern {
    /// Path ends with this string, e.g. `.go`
    Suffix(String),
    /// Final path component equals this string, e.g. `go.mod`
    Basename(String),
}

impl FilePattern {
    pub fn suffix(s: impl Into<String>) -> Self {
        Self::Suffix(s.into())
    }

    pub fn basename(s: impl Into<String>) -> Self {
        Self::Basename(s.into())
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Suffix(suffix) => path.ends_with(suffix.as_str()),
            Self::Basename(name) => Path::new(path)
                .file_name()
                .is_some_and(|file_name| file_name == name.as_str()),
        }
    }
}

impl fmt::Display for FilePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Suffix(suffix) => write!(f, "*{}", suffix),
            Self::Basename(name) => write!(f, "{}", name),
        }
    }
}

/// External things a check relies on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependency {
    Tool(String),
    BuildTarget(String),
}

/// Static description of a check. Built once, then only read.
#[derive(Debug, Clone)]
pub struct CheckMetadata {
    pub name: String,
    pub description: String,
    pub patterns: Vec<FilePattern>,
    pub estimated_duration: Duration,
    pub dependencies: Vec<Dependency>,
    pub default_timeout: Duration,
    pub category: Category,
    /// Skip the check entirely when no input file matches
    pub requires_files: bool,
}

impl CheckMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            patterns: Vec::new(),
            estimated_duration: Duration::from_secs(1),
            dependencies: Vec::new(),
            default_timeout: DEFAULT_CHECK_TIMEOUT,
            category,
            requires_files: true,
        }
    }

    pub fn pattern(mut self, pattern: FilePattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    pub fn depends_on(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn estimated(mut self, duration: Duration) -> Self {
        self.estimated_duration = duration;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn requires_files(mut self, requires: bool) -> Self {
        self.requires_files = requires;
        self
    }
}

/// The files from `files` matching any of `patterns`, in their original order.
pub fn filter_by_patterns(patterns: &[FilePattern], files: &[String]) -> Vec<String> {
    files
        .iter()
        .filter(|file| patterns.iter().any(|pattern| pattern.matches(file)))
        .cloned()
        .collect()
}

/// A single quality gate.
///
/// `filter` must be cheap and side-effect free; all subprocess work happens
/// in `run`, which must honour `deadline`.
#[async_trait]
pub trait Check: Send + Sync {
    fn metadata(&self) -> &CheckMetadata;

    fn name(&self) -> &str {
        &self.metadata().name
    }

    fn description(&self) -> &str {
        &self.metadata().description
    }

    fn filter(&self, files: &[String]) -> Vec<String> {
        filter_by_patterns(&self.metadata().patterns, files)
    }

    async fn run(
        &self,
        ctx: &CheckContext,
        deadline: &Deadline,
        files: &[String],
    ) -> Result<(), CheckError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_go_suffix_filter_keeps_order() {
        let files = strings(&["main.go", "test.go", "doc.md", "Makefile", "pkg/foo.go"]);
        let filtered = filter_by_patterns(&[FilePattern::suffix(".go")], &files);
        assert_eq!(filtered, strings(&["main.go", "test.go", "pkg/foo.go"]));
    }

    #[test]
    fn test_filter_is_ordered_subset() {
        let files = strings(&["z/go.mod", "b.go", "README.md", "go.sum", "a.go", "go.mod.bak"]);
        let patterns = [
            FilePattern::suffix(".go"),
            FilePattern::basename("go.mod"),
            FilePattern::basename("go.sum"),
        ];
        let filtered = filter_by_patterns(&patterns, &files);

        assert_eq!(filtered, strings(&["z/go.mod", "b.go", "go.sum", "a.go"]));
        let mut cursor = files.iter();
        for item in &filtered {
            assert!(cursor.any(|f| f == item), "{item} out of order or not in input");
        }
    }

    #[rstest]
    #[case(FilePattern::basename("go.mod"), "go.mod", true)]
    #[case(FilePattern::basename("go.mod"), "tools/go.mod", true)]
    #[case(FilePattern::basename("go.mod"), "notgo.mod", false)]
    #[case(FilePattern::suffix(".go"), "cmd/main.go", true)]
    #[case(FilePattern::suffix(".go"), "main.go.orig", false)]
    #[case(FilePattern::suffix(".go"), "Makefile", false)]
    fn test_pattern_matching(#[case] pattern: FilePattern, #[case] path: &str, #[case] expected: bool) {
        assert_eq!(pattern.matches(path), expected);
    }

    #[test]
    fn test_empty_input_filters_to_empty() {
        assert!(filter_by_patterns(&[FilePattern::suffix(".go")], &[]).is_empty());
    }

    #[test]
    fn test_mutating_categories() {
        assert!(Category::Formatting.mutates_worktree());
        assert!(Category::DependencyHygiene.mutates_worktree());
        assert!(!Category::Linting.mutates_worktree());
    }

    #[test]
    fn test_metadata_builder_defaults() {
        let meta = CheckMetadata::new("go-lint", "Lint Go code", Category::Linting)
            .pattern(FilePattern::suffix(".go"))
            .depends_on(Dependency::Tool("golangci-lint".to_string()));
        assert_eq!(meta.default_timeout, DEFAULT_CHECK_TIMEOUT);
        assert!(meta.requires_files);
        assert_eq!(meta.patterns.len(), 1);
        assert_eq!(meta.dependencies, vec![Dependency::Tool("golangci-lint".to_string())]);
    }
}
