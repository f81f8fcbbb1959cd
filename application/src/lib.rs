//! Application layer for toolwarden
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{BatchParams, CaptureParams, DEFAULT_MAX_WORKERS, MAX_WORKERS_LIMIT};
pub use ports::{
    capturer::{CaptureError, CaptureRequest, Capturer},
    command_runner::{CommandRunner, RunnerError},
    discovery::ToolDiscovery,
    progress::{BaselineProgressNotifier, NoProgress},
    tool_index::ToolIndexRepository,
    tool_store::{LoadedDefinitions, StoreError, ToolStore},
};
pub use use_cases::audit_definitions::{AuditDefinitionsUseCase, AuditEntry, AuditReport};
pub use use_cases::dispatch_action::{
    DispatchActionUseCase, DispatchError, DispatchInput, DispatchOutcome, PlannedCommand,
};
pub use use_cases::generate_baseline::{
    BaselineError, BaselineOutcome, BaselineReport, GenerateBaselineUseCase, help_command,
};
pub use use_cases::reconcile_tools::{
    ReconcileError, ReconcileInput, ReconcileOutput, ReconcileToolsUseCase, baseline_targets,
};
pub use use_cases::run_baselines::{BatchSummary, RunBaselinesUseCase};
