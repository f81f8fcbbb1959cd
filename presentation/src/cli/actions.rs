//! Action registry
//!
//! Generic actions (`lint`, `format`, `test`) are described once as data and
//! turned into clap subcommands with the builder API. Each action maps to a
//! capability; its options are canonical names that tool definitions
//! translate into native flags.

use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;
use warden_domain::ActivatedOptions;

const FILES: &str = "files";
const DRY_RUN: &str = "dry-run";
const STRICT: &str = "strict";

/// One canonical option accepted by an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionOption {
    /// Canonical name, as used in tool definitions
    pub name: &'static str,
    /// Long flag on the command line, also the clap argument id
    pub flag: &'static str,
    pub takes_value: bool,
    pub help: &'static str,
}

impl ActionOption {
    pub const fn flag(name: &'static str, flag: &'static str, help: &'static str) -> Self {
        Self {
            name,
            flag,
            takes_value: false,
            help,
        }
    }

    pub const fn value(name: &'static str, flag: &'static str, help: &'static str) -> Self {
        Self {
            name,
            flag,
            takes_value: true,
            help,
        }
    }

    fn to_arg(self) -> Arg {
        let arg = Arg::new(self.flag).long(self.flag).help(self.help);
        if self.takes_value {
            arg.value_name("VALUE").action(ArgAction::Set)
        } else {
            arg.action(ArgAction::SetTrue)
        }
    }
}

/// A generic action bound to a capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSpec {
    pub name: &'static str,
    pub capability: &'static str,
    pub about: &'static str,
    pub options: Vec<ActionOption>,
}

impl ActionSpec {
    /// Build the clap subcommand for this action.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(self.name).about(self.about);
        for option in &self.options {
            cmd = cmd.arg(option.to_arg());
        }
        cmd.arg(
            Arg::new(DRY_RUN)
                .long(DRY_RUN)
                .action(ArgAction::SetTrue)
                .help("Print the commands without running them"),
        )
        .arg(
            Arg::new(STRICT)
                .long(STRICT)
                .action(ArgAction::SetTrue)
                .help("Fail when a file has no matching tool"),
        )
        .arg(
            Arg::new(FILES)
                .value_name("FILES")
                .num_args(1..)
                .required(true)
                .help("Target files or glob patterns"),
        )
    }

    /// Collect activated canonical options from parsed arguments.
    pub fn activated(&self, matches: &ArgMatches) -> ActivatedOptions {
        let mut activated = ActivatedOptions::new();
        for option in &self.options {
            if option.takes_value {
                if let Some(value) = matches.get_one::<String>(option.flag) {
                    activated.insert(option.name.to_string(), Value::String(value.clone()));
                }
            } else if matches.get_flag(option.flag) {
                activated.insert(option.name.to_string(), Value::Bool(true));
            }
        }
        activated
    }
}

/// A parsed action invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ActionInvocation {
    pub action: &'static str,
    pub capability: &'static str,
    /// File arguments as given; glob patterns are not yet expanded
    pub patterns: Vec<String>,
    pub options: ActivatedOptions,
    pub dry_run: bool,
    pub strict: bool,
}

/// Fixed set of generic actions
#[derive(Debug, Clone)]
pub struct ActionRegistry {
    actions: Vec<ActionSpec>,
}

impl ActionRegistry {
    pub fn new(actions: Vec<ActionSpec>) -> Self {
        Self { actions }
    }

    /// `lint`, `format` and `test`
    pub fn builtin() -> Self {
        Self::new(vec![
            ActionSpec {
                name: "lint",
                capability: "Linter",
                about: "Lint files with the linter defined for each file type",
                options: vec![
                    ActionOption::flag("fix", "fix", "Apply automatic fixes"),
                    ActionOption::value("config", "config-file", "Tool configuration file"),
                    ActionOption::flag("verbose", "verbose-tool", "Ask the tool to be verbose"),
                ],
            },
            ActionSpec {
                name: "format",
                capability: "Formatter",
                about: "Format files with the formatter defined for each file type",
                options: vec![
                    ActionOption::flag("check", "check", "Report instead of rewriting"),
                    ActionOption::value("config", "config-file", "Tool configuration file"),
                    ActionOption::value("line_length", "line-length", "Maximum line length"),
                ],
            },
            ActionSpec {
                name: "test",
                capability: "Tester",
                about: "Run tests with the test runner defined for each file type",
                options: vec![
                    ActionOption::value("filter", "filter", "Only run matching tests"),
                    ActionOption::flag("fail_fast", "fail-fast", "Stop at the first failure"),
                    ActionOption::flag("verbose", "verbose-tool", "Ask the tool to be verbose"),
                ],
            },
        ])
    }

    pub fn get(&self, name: &str) -> Option<&ActionSpec> {
        self.actions.iter().find(|a| a.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionSpec> {
        self.actions.iter()
    }

    /// Add every action as a subcommand of `cmd`.
    pub fn augment(&self, cmd: Command) -> Command {
        self.actions
            .iter()
            .fold(cmd, |cmd, action| cmd.subcommand(action.command()))
    }

    /// Extract the invoked action, if the subcommand names one.
    pub fn parse(&self, matches: &ArgMatches) -> Option<ActionInvocation> {
        let (name, sub) = matches.subcommand()?;
        let spec = self.get(name)?;

        Some(ActionInvocation {
            action: spec.name,
            capability: spec.capability,
            patterns: sub
                .get_many::<String>(FILES)
                .map(|files| files.cloned().collect())
                .unwrap_or_default(),
            options: spec.activated(sub),
            dry_run: sub.get_flag(DRY_RUN),
            strict: sub.get_flag(STRICT),
        })
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Parse a `--set KEY[=VALUE]` assignment.
///
/// A bare key activates a flag; `true`/`false` become booleans; anything else
/// stays a string.
pub fn parse_assignment(assignment: &str) -> Option<(String, Value)> {
    let (key, value) = match assignment.split_once('=') {
        Some((key, value)) => (key.trim(), value),
        None => (assignment.trim(), "true"),
    };
    if key.is_empty() {
        return None;
    }

    let value = match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        other => Value::String(other.to_string()),
    };
    Some((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::Cli;
    use clap::{CommandFactory, FromArgMatches};
    use serde_json::json;

    fn root() -> Command {
        ActionRegistry::builtin().augment(Cli::command())
    }

    #[test]
    fn test_builtin_capabilities() {
        let registry = ActionRegistry::builtin();
        let pairs: Vec<(&str, &str)> = registry.iter().map(|a| (a.name, a.capability)).collect();
        assert_eq!(
            pairs,
            vec![("lint", "Linter"), ("format", "Formatter"), ("test", "Tester")]
        );
    }

    #[test]
    fn test_augmented_cli_is_well_formed() {
        root().debug_assert();
    }

    #[test]
    fn test_parse_format_invocation() {
        let registry = ActionRegistry::builtin();
        let matches = registry
            .augment(Cli::command())
            .try_get_matches_from([
                "toolwarden",
                "format",
                "--check",
                "--line-length",
                "100",
                "--dry-run",
                "src/*.py",
                "b.rs",
            ])
            .unwrap();

        let invocation = registry.parse(&matches).unwrap();
        assert_eq!(invocation.action, "format");
        assert_eq!(invocation.capability, "Formatter");
        assert_eq!(invocation.patterns, vec!["src/*.py", "b.rs"]);
        assert_eq!(invocation.options.get("check"), Some(&json!(true)));
        assert_eq!(invocation.options.get("line_length"), Some(&json!("100")));
        assert!(!invocation.options.contains_key("config"));
        assert!(invocation.dry_run);
        assert!(!invocation.strict);
    }

    #[test]
    fn test_action_requires_files() {
        assert!(root().try_get_matches_from(["toolwarden", "lint"]).is_err());
    }

    #[test]
    fn test_global_flags_survive_action() {
        let registry = ActionRegistry::builtin();
        let matches = registry
            .augment(Cli::command())
            .try_get_matches_from(["toolwarden", "-v", "lint", "--fix", "a.py"])
            .unwrap();

        let cli = Cli::from_arg_matches(&matches).unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(cli.command.is_none());
        let invocation = registry.parse(&matches).unwrap();
        assert_eq!(invocation.options.get("fix"), Some(&json!(true)));
    }

    #[test]
    fn test_builtin_subcommand_is_not_an_action() {
        let registry = ActionRegistry::builtin();
        let matches = registry
            .augment(Cli::command())
            .try_get_matches_from(["toolwarden", "reconcile"])
            .unwrap();
        assert!(registry.parse(&matches).is_none());
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("check"), Some(("check".into(), json!(true))));
        assert_eq!(
            parse_assignment("config=c.toml"),
            Some(("config".into(), json!("c.toml")))
        );
        assert_eq!(parse_assignment("fix=false"), Some(("fix".into(), json!(false))));
        assert_eq!(parse_assignment("x=a=b"), Some(("x".into(), json!("a=b"))));
        assert_eq!(parse_assignment("=v"), None);
    }
}
