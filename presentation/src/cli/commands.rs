//! CLI command definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use warden_domain::{DecodeErrorPolicy, TextEncoding};

/// CLI arguments for toolwarden
#[derive(Parser, Debug)]
#[command(name = "toolwarden")]
#[command(author, version, about = "Developer tool orchestration and baseline verification")]
#[command(long_about = r#"
toolwarden keeps the command-line tools a project depends on under control.

It discovers executables in the environment, reconciles them against a
whitelist and blacklist, captures each managed tool's --help output in a
pseudo-terminal to detect interface drift, and dispatches generic actions
(lint, format, test) to the best tool for each file.

Configuration files are loaded from (in priority order):
1. TOOLWARDEN_* environment variables
2. --config <path>        Explicit config file
3. ./toolwarden.toml      Project-level config
4. ~/.config/toolwarden/config.toml   Global config

Example:
  toolwarden reconcile
  toolwarden baseline --jobs 8
  toolwarden capture "git log --help" -o git_log.txt
  toolwarden format --check 'src/**/*.py'
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a command in a pseudo-terminal and print what it wrote
    Capture(CaptureArgs),

    /// Classify every known tool against the whitelist and blacklist
    Reconcile {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate or verify help-text baselines for managed tools
    Baseline(BaselineArgs),

    /// List tool definitions and whether they match their baselines
    Tools {
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Dispatch a capability over files
    Dispatch(DispatchArgs),
}

#[derive(Args, Debug)]
pub struct CaptureArgs {
    /// Command line to run, split with shell quoting rules
    #[arg(value_name = "COMMAND")]
    pub command: String,

    /// Write the decoded output here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Terminal rows (default: capture.rows)
    #[arg(long)]
    pub rows: Option<u16>,

    /// Terminal columns (default: capture.cols)
    #[arg(long)]
    pub cols: Option<u16>,

    /// Text encoding of the captured bytes (utf-8, latin-1)
    #[arg(long, default_value = "utf-8")]
    pub encoding: TextEncoding,

    /// What to do with undecodable bytes (strict, ignore, replace)
    #[arg(long, value_name = "POLICY", default_value = "replace")]
    pub errors: DecodeErrorPolicy,

    /// Seconds before the command is killed (default: capture.timeout_secs)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Args, Debug)]
pub struct BaselineArgs {
    /// Only these tool ids (e.g. `ruff`, `git_commit`); default: every managed tool
    #[arg(value_name = "TOOL")]
    pub tools: Vec<String>,

    /// Concurrent captures (default: baseline.max_workers)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Args, Debug)]
pub struct DispatchArgs {
    /// Capability to dispatch (e.g. Formatter, Linter, Tester)
    pub capability: String,

    /// Target files or glob patterns
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<String>,

    /// Activate a canonical option: `--set check` or `--set config=c.toml`
    #[arg(long = "set", value_name = "KEY[=VALUE]")]
    pub set: Vec<String>,

    /// Print the commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Fail when a file has no matching tool
    #[arg(long)]
    pub strict: bool,
}
