//! [`TestRepo`] builder for scenarios that need a real working tree.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::git;

/// A temporary git repository with one initial commit.
///
/// # Example
///
/// ```rust,no_run
/// use hookgate_test_utils::TestRepo;
///
/// let repo = TestRepo::new();
/// repo.write("main.go", "package main\n");
/// repo.stage(&["main.go"]);
/// ```
pub struct TestRepo {
    temp_dir: TempDir,
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRepo {
    /// Create a repository with history (see [`git::real_git_repo_with_commit`]).
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        git::real_git_repo_with_commit(temp_dir.path());
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `content` to `path` (relative to root), creating parent dirs.
    pub fn write(&self, path: &str, content: &str) {
        let full_path = self.root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("TestRepo::write: {}: {e}", full_path.display()));
    }

    pub fn stage(&self, paths: &[&str]) {
        let mut args = vec!["add", "--"];
        args.extend_from_slice(paths);
        git::run_git(self.root(), &args);
    }

    pub fn commit(&self, message: &str) {
        git::run_git(self.root(), &["commit", "-m", message]);
    }

    /// Write, stage and commit a file in one step.
    pub fn commit_file(&self, path: &str, content: &str) {
        self.write(path, content);
        self.stage(&[path]);
        self.commit(&format!("Add {path}"));
    }
}
