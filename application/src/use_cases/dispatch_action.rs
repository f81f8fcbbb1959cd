//! Dispatch Action use case
//!
//! Runs a generic action (lint, format, test) by picking, per file, the tool
//! that provides the requested capability and rendering its native argv.

use crate::ports::command_runner::{CommandRunner, RunnerError};
use crate::ports::tool_store::ToolStore;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use warden_domain::{ActivatedOptions, ToolDefinition, build_command, group_by_tool, select};

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("No target files given")]
    NoFiles,

    #[error("Running {tool_id} failed: {source}")]
    Runner {
        tool_id: String,
        #[source]
        source: RunnerError,
    },
}

/// Input for the DispatchAction use case
#[derive(Debug, Clone, Default)]
pub struct DispatchInput {
    pub capability: String,
    pub files: Vec<PathBuf>,
    pub options: ActivatedOptions,
    /// Plan only; nothing is executed
    pub dry_run: bool,
    /// Unmatched files fail the action
    pub strict: bool,
}

impl DispatchInput {
    pub fn new(capability: impl Into<String>, files: Vec<PathBuf>) -> Self {
        Self {
            capability: capability.into(),
            files,
            ..Self::default()
        }
    }

    pub fn with_options(mut self, options: ActivatedOptions) -> Self {
        self.options = options;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// One tool invocation covering a group of files
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedCommand {
    pub tool_id: String,
    pub argv: Vec<String>,
    pub files: Vec<PathBuf>,
    /// `None` in dry-run mode
    pub exit_code: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub commands: Vec<PlannedCommand>,
    pub unmatched: Vec<PathBuf>,
    pub strict: bool,
}

impl DispatchOutcome {
    /// First non-zero tool exit code; otherwise 1 for unmatched files under
    /// `strict`; otherwise 0.
    pub fn exit_code(&self) -> i32 {
        if let Some(code) = self
            .commands
            .iter()
            .filter_map(|c| c.exit_code)
            .find(|code| *code != 0)
        {
            return code;
        }
        if self.strict && !self.unmatched.is_empty() {
            1
        } else {
            0
        }
    }
}

/// Use case for dispatching a capability over a set of files
pub struct DispatchActionUseCase<S: ToolStore, R: CommandRunner> {
    store: Arc<S>,
    runner: Arc<R>,
}

impl<S: ToolStore, R: CommandRunner> DispatchActionUseCase<S, R> {
    pub fn new(store: Arc<S>, runner: Arc<R>) -> Self {
        Self { store, runner }
    }

    pub async fn execute(&self, input: DispatchInput) -> Result<DispatchOutcome, DispatchError> {
        if input.files.is_empty() {
            return Err(DispatchError::NoFiles);
        }

        let loaded = self.store.load_definitions();
        for e in &loaded.errors {
            warn!("Skipping unreadable definition: {}", e);
        }

        let plan = group_by_tool(select(&input.capability, &input.files, &loaded.definitions));
        info!(
            "{}: {} tool group(s), {} unmatched file(s)",
            input.capability,
            plan.groups.len(),
            plan.unmatched.len()
        );
        for path in &plan.unmatched {
            warn!("No {} handles {}", input.capability, path.display());
        }

        let mut outcome = DispatchOutcome {
            commands: Vec::with_capacity(plan.groups.len()),
            unmatched: plan.unmatched,
            strict: input.strict,
        };

        for (tool_id, files) in plan.groups {
            let Some(definition) = find_definition(&loaded.definitions, &tool_id) else {
                continue;
            };
            let argv = build_command(definition, &input.options, &files);

            let exit_code = if input.dry_run {
                None
            } else {
                debug!("Running {:?}", argv);
                let code = self
                    .runner
                    .run(&argv)
                    .await
                    .map_err(|source| DispatchError::Runner {
                        tool_id: tool_id.clone(),
                        source,
                    })?;
                Some(code)
            };

            outcome.commands.push(PlannedCommand {
                tool_id,
                argv,
                files,
                exit_code,
            });
        }

        Ok(outcome)
    }
}

fn find_definition<'a>(
    definitions: &'a [ToolDefinition],
    tool_id: &str,
) -> Option<&'a ToolDefinition> {
    definitions.iter().find(|d| d.tool_id() == tool_id)
}
