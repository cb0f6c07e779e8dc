//! `.hookgate.toml` parsing and the environment overlay
//!
//! The file is optional and lives at the repository root. Environment
//! variables are layered on top with [`Config::apply_env`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::check::Category;
use crate::error::{Error, Result};
use crate::execute::Verify;

pub const CONFIG_FILE: &str = ".hookgate.toml";

pub const ENV_TIMEOUT: &str = "HOOKGATE_TIMEOUT";
pub const ENV_SKIP: &str = "HOOKGATE_SKIP";
pub const ENV_FAIL_FAST: &str = "HOOKGATE_FAIL_FAST";
pub const ENV_BUILD_TOOL: &str = "HOOKGATE_BUILD_TOOL";

fn default_true() -> bool {
    true
}

/// `[run]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSection {
    pub fail_fast: bool,
    pub parallel: bool,
    /// Default timeout for checks without their own value
    pub timeout_secs: Option<u64>,
    /// Build tool used for target probes and target runs
    pub build_tool: Option<String>,
    /// Check names never run
    pub skip: Vec<String>,
}

/// `[checks.<name>]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckSection {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for CheckSection {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: None,
        }
    }
}

/// `[[custom]]` entry: a project-defined check run through the same
/// build-target-first protocol as the built-in ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomCheck {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Path suffixes selecting files, e.g. `".proto"`
    #[serde(default)]
    pub suffixes: Vec<String>,
    /// Exact file names selecting files, e.g. `"buf.yaml"`
    #[serde(default)]
    pub basenames: Vec<String>,
    /// Build target tried first
    pub target: String,
    /// Direct fallback: program followed by its arguments
    pub command: Vec<String>,
    #[serde(default = "default_category")]
    pub category: Category,
    #[serde(default = "default_true")]
    pub pass_files: bool,
    /// Diff the filtered files after a successful run
    #[serde(default)]
    pub verify_files: bool,
    /// Diff these root-relative paths after a successful run
    #[serde(default)]
    pub verify_paths: Vec<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_category() -> Category {
    Category::Linting
}

impl CustomCheck {
    /// The idempotence verification this entry asks for, if any.
    pub fn verify(&self) -> Option<Verify> {
        if !self.verify_paths.is_empty() {
            Some(Verify::Paths(self.verify_paths.clone()))
        } else if self.verify_files {
            Some(Verify::Files)
        } else {
            None
        }
    }
}

/// Parsed `.hookgate.toml` plus any environment overlay
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub run: RunSection,
    pub checks: BTreeMap<String, CheckSection>,
    pub custom: Vec<CustomCheck>,

    /// Global timeout from `HOOKGATE_TIMEOUT`, above every file setting
    #[serde(skip)]
    pub timeout_override_secs: Option<u64>,
}

impl Config {
    /// Parse a config from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use hookgate_core::Config;
    ///
    /// let config = Config::parse(r#"
    /// [run]
    /// fail_fast = true
    ///
    /// [checks.go-lint]
    /// timeout_secs = 120
    /// "#).unwrap();
    ///
    /// assert!(config.run.fail_fast);
    /// assert!(config.is_enabled("go-lint"));
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        Self::parse_at(content, Path::new(CONFIG_FILE))
    }

    /// Load `<root>/.hookgate.toml`. A missing file yields the defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                tracing::debug!(path = %path.display(), "Loaded config");
                Self::parse_at(&content, &path)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(Error::Config {
                path,
                message: e.to_string(),
            }),
        }
    }

    fn parse_at(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    /// Overlay `HOOKGATE_*` variables from `vars`.
    ///
    /// Takes the variables explicitly so callers decide where they come
    /// from (`std::env::vars()` in the binary, a fixed list in tests).
    pub fn apply_env<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let value = value.as_ref().trim();
            match key.as_ref() {
                ENV_TIMEOUT if !value.is_empty() => {
                    let secs = value.parse::<u64>().map_err(|_| Error::Config {
                        path: PathBuf::from(ENV_TIMEOUT),
                        message: format!("expected a number of seconds, got '{value}'"),
                    })?;
                    self.timeout_override_secs = Some(secs);
                }
                ENV_SKIP => {
                    self.run.skip.extend(
                        value
                            .split(',')
                            .map(str::trim)
                            .filter(|name| !name.is_empty())
                            .map(String::from),
                    );
                }
                ENV_FAIL_FAST => {
                    self.run.fail_fast = matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
                }
                ENV_BUILD_TOOL if !value.is_empty() => {
                    self.run.build_tool = Some(value.to_string());
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Whether `name` is enabled and not skipped.
    pub fn is_enabled(&self, name: &str) -> bool {
        let enabled = self.checks.get(name).is_none_or(|section| section.enabled);
        enabled && !self.run.skip.iter().any(|skipped| skipped == name)
    }

    /// Effective timeout for `name`.
    ///
    /// Precedence: `cli`, `HOOKGATE_TIMEOUT`, `[checks.<name>]`,
    /// `[[custom]]`, `[run]`, then `default`.
    pub fn timeout_for(&self, name: &str, cli: Option<Duration>, default: Duration) -> Duration {
        if let Some(timeout) = cli {
            return timeout;
        }
        self.timeout_override_secs
            .or_else(|| self.checks.get(name).and_then(|section| section.timeout_secs))
            .or_else(|| {
                self.custom
                    .iter()
                    .find(|custom| custom.name == name)
                    .and_then(|custom| custom.timeout_secs)
            })
            .or(self.run.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(default)
    }

    pub fn build_tool(&self) -> &str {
        self.run
            .build_tool
            .as_deref()
            .unwrap_or(crate::context::DEFAULT_BUILD_TOOL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const DEFAULT: Duration = Duration::from_secs(30);

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.is_enabled("go-fmt"));
        assert_eq!(config.build_tool(), "make");
        assert_eq!(config.timeout_for("go-fmt", None, DEFAULT), DEFAULT);
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
[run]
fail_fast = true
parallel = true
timeout_secs = 45
build_tool = "gmake"
skip = ["go-mod-tidy"]

[checks.go-lint]
enabled = false

[checks.go-fmt]
timeout_secs = 10

[[custom]]
name = "proto-lint"
suffixes = [".proto"]
target = "proto-lint"
command = ["buf", "lint"]
pass_files = false
"#,
        )
        .unwrap();

        assert!(config.run.fail_fast);
        assert!(config.run.parallel);
        assert_eq!(config.build_tool(), "gmake");
        assert!(!config.is_enabled("go-lint"));
        assert!(!config.is_enabled("go-mod-tidy"));
        assert!(config.is_enabled("go-fmt"));
        assert_eq!(config.timeout_for("go-fmt", None, DEFAULT), Duration::from_secs(10));
        assert_eq!(config.timeout_for("go-lint", None, DEFAULT), Duration::from_secs(45));

        let custom = &config.custom[0];
        assert_eq!(custom.category, Category::Linting);
        assert_eq!(custom.command, vec!["buf", "lint"]);
        assert_eq!(custom.verify(), None);
    }

    #[test]
    fn test_custom_verify() {
        let config = Config::parse(
            r#"
[[custom]]
name = "buf-format"
category = "formatting"
target = "buf-fmt"
command = ["buf", "format", "-w"]
verify_files = true

[[custom]]
name = "npm-dedupe"
category = "dependency-hygiene"
target = "dedupe"
command = ["npm", "dedupe"]
verify_paths = ["package-lock.json"]
"#,
        )
        .unwrap();

        assert_eq!(config.custom[0].verify(), Some(Verify::Files));
        assert_eq!(
            config.custom[1].verify(),
            Some(Verify::Paths(vec!["package-lock.json".to_string()]))
        );
    }

    #[rstest]
    #[case("[run]\nfail_fast = \"sometimes\"")]
    #[case("[run]\nunknown = 1")]
    #[case("[[custom]]\nname = \"x\"")]
    #[case("not toml at all [")]
    fn test_invalid_config_is_config_error(#[case] content: &str) {
        let err = Config::parse(content).unwrap_err();
        assert!(matches!(err, Error::Config { .. }), "{err}");
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[run\n").unwrap();

        match Config::load(dir.path()).unwrap_err() {
            Error::Config { path, .. } => assert_eq!(path, dir.path().join(CONFIG_FILE)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_env_overlay() {
        let mut config = Config::parse("[run]\nskip = [\"go-lint\"]").unwrap();
        config
            .apply_env([
                ("HOOKGATE_TIMEOUT", "90"),
                ("HOOKGATE_SKIP", "go-fmt, ,go-mod-tidy"),
                ("HOOKGATE_FAIL_FAST", "true"),
                ("HOOKGATE_BUILD_TOOL", "just"),
                ("PATH", "/usr/bin"),
            ])
            .unwrap();

        assert_eq!(config.run.skip, vec!["go-lint", "go-fmt", "go-mod-tidy"]);
        assert!(config.run.fail_fast);
        assert_eq!(config.build_tool(), "just");
        assert_eq!(config.timeout_for("go-fmt", None, DEFAULT), Duration::from_secs(90));
    }

    #[test]
    fn test_env_timeout_must_be_numeric() {
        let mut config = Config::default();
        let err = config.apply_env([("HOOKGATE_TIMEOUT", "soon")]).unwrap_err();
        assert!(err.to_string().contains("HOOKGATE_TIMEOUT"));
    }

    #[test]
    fn test_timeout_precedence() {
        let mut config = Config::parse(
            r#"
[run]
timeout_secs = 40

[checks.go-lint]
timeout_secs = 120
"#,
        )
        .unwrap();
        let cli = Some(Duration::from_secs(5));

        assert_eq!(config.timeout_for("go-lint", None, DEFAULT), Duration::from_secs(120));
        assert_eq!(config.timeout_for("go-fmt", None, DEFAULT), Duration::from_secs(40));

        config.apply_env([("HOOKGATE_TIMEOUT", "60")]).unwrap();
        assert_eq!(config.timeout_for("go-lint", None, DEFAULT), Duration::from_secs(60));
        assert_eq!(config.timeout_for("go-lint", cli, DEFAULT), Duration::from_secs(5));
    }
}
