//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod baseline;
mod capture;
mod discovery;
mod output;

pub use baseline::FileBaselineConfig;
pub use capture::FileCaptureConfig;
pub use discovery::FileDiscoveryConfig;
pub use output::FileOutputConfig;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use warden_application::{BatchParams, CaptureParams, MAX_WORKERS_LIMIT};
use warden_domain::{ConfigIssue, ConfigIssueCode, ToolTree};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Base for relative `tool_dir` and `index_path`
    pub project_root: PathBuf,
    /// Definitions and baselines
    pub tool_dir: PathBuf,
    /// Tool index JSON file
    pub index_path: PathBuf,
    pub discovery: FileDiscoveryConfig,
    pub capture: FileCaptureConfig,
    pub baseline: FileBaselineConfig,
    pub output: FileOutputConfig,
    /// Tools (and sub-commands) under management
    pub whitelist: ToolTree,
    /// Tools that must never be managed
    pub blacklist: ToolTree,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            tool_dir: PathBuf::from(".toolwarden/tools"),
            index_path: PathBuf::from(".toolwarden/tool_index.json"),
            discovery: FileDiscoveryConfig::default(),
            capture: FileCaptureConfig::default(),
            baseline: FileBaselineConfig::default(),
            output: FileOutputConfig::default(),
            whitelist: ToolTree::new(),
            blacklist: ToolTree::new(),
        }
    }
}

impl FileConfig {
    pub fn tool_dir_path(&self) -> PathBuf {
        self.project_root.join(&self.tool_dir)
    }

    pub fn index_file_path(&self) -> PathBuf {
        self.project_root.join(&self.index_path)
    }

    pub fn capture_params(&self) -> CaptureParams {
        self.capture.to_params()
    }

    pub fn batch_params(&self) -> BatchParams {
        self.baseline.to_params()
    }

    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.capture.rows == 0 || self.capture.cols == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTerminalSize,
                format!(
                    "capture.rows and capture.cols must be non-zero (got {}x{})",
                    self.capture.rows, self.capture.cols
                ),
            ));
        }

        if self.capture.timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "capture.timeout_secs cannot be 0",
            ));
        }

        let workers = self.baseline.max_workers;
        if !(1..=MAX_WORKERS_LIMIT).contains(&workers) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::WorkersOutOfRange,
                format!(
                    "baseline.max_workers = {} is outside 1..={}, using {}",
                    workers,
                    MAX_WORKERS_LIMIT,
                    self.batch_params().max_workers()
                ),
            ));
        }

        for path in self.whitelist.overlap(&self.blacklist) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ListedTwice,
                format!(
                    "'{}' is whitelisted and blacklisted; the blacklist wins",
                    path.join(" ")
                ),
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_domain::Severity;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
project_root = "/work"
tool_dir = "tools"

[discovery]
paths = ["/usr/local/bin"]

[capture]
rows = 40
cols = 120
timeout_secs = 5

[baseline]
max_workers = 8

[whitelist]
ruff = true
git = ["commit", "log"]

[blacklist]
rm = true
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.tool_dir_path(), PathBuf::from("/work/tools"));
        assert_eq!(
            config.index_file_path(),
            PathBuf::from("/work/.toolwarden/tool_index.json")
        );
        assert_eq!(config.discovery.paths, vec![PathBuf::from("/usr/local/bin")]);
        assert_eq!(config.capture_params().rows, 40);
        assert_eq!(config.capture_params().timeout.as_secs(), 5);
        assert_eq!(config.batch_params().max_workers(), 8);
        assert!(config.whitelist.contains(&["git", "commit"]));
        assert!(!config.whitelist.contains(&["git", "push"]));
        assert!(config.blacklist.covers(&["rm"]));
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(
            config.tool_dir_path(),
            PathBuf::from("./.toolwarden/tools")
        );
        assert_eq!(config.capture.rows, 50);
        assert_eq!(config.capture.cols, 200);
        assert!(config.whitelist.is_empty());
        assert!(config.output.color);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(FileConfig::default().validate().is_empty());
    }

    #[test]
    fn test_validate_reports_every_issue() {
        let toml_str = r#"
[capture]
rows = 0
timeout_secs = 0

[baseline]
max_workers = 64

[whitelist]
git = true

[blacklist]
git = ["push"]
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        let codes: Vec<ConfigIssueCode> = issues.iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![
                ConfigIssueCode::ZeroTerminalSize,
                ConfigIssueCode::ZeroTimeout,
                ConfigIssueCode::WorkersOutOfRange,
            ]
        );
        assert!(ConfigIssue::has_errors(&issues));
        assert_eq!(issues[2].severity, Severity::Warning);
    }

    #[test]
    fn test_validate_listed_twice() {
        let toml_str = r#"
[whitelist]
git = ["push", "log"]

[blacklist]
git = ["push"]
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::ListedTwice);
        assert!(issues[0].message.contains("git push"));
    }
}
