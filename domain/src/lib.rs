//! Domain layer for toolwarden
//!
//! This crate contains the core types and algorithms of the tool
//! orchestration engine. It has no dependencies on infrastructure or
//! presentation concerns.
//!
//! # Core Concepts
//!
//! ## Baselines
//!
//! A baseline is the canonical `--help` output of a managed tool, captured in
//! a pseudo-terminal. Its [`Fingerprint`] is recorded in the [`ToolIndex`];
//! a changed fingerprint means the tool's interface has drifted.
//!
//! ## Reconciliation
//!
//! Every tool name found in the environment, the whitelist or the blacklist
//! is classified into exactly one [`ReconciliationStatus`]. `ERROR_*`
//! statuses break the build.
//!
//! ## Dispatch
//!
//! Generic actions name a capability (`Formatter`, `Linter`, `Tester`). The
//! dispatcher picks the most specific [`ToolDefinition`] per file and the
//! argument builder renders canonical options as tool-native flags.

pub mod capture;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod index;
pub mod reconcile;
pub mod tool;

// Re-export commonly used types
pub use capture::{
    CaptureResult, DecodeErrorPolicy, EXIT_CAPTURE_FAILED, EXIT_DECODE_FAILED, EXIT_TIMED_OUT,
    TextEncoding, decode_output, shell_exit_code,
};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::error::DomainError;
pub use dispatch::{ActivatedOptions, DispatchPlan, FileSelection, build_command, group_by_tool, select};
pub use index::{SubcommandEntry, ToolIndex, ToolIndexEntry};
pub use reconcile::{ReconciliationReport, ReconciliationStatus, ToolTree, Violation, reconcile};
pub use tool::{
    CommandSequence, DefinitionAudit, Fingerprint, OptionKind, OptionTable, ToolDefinition,
    ToolMetadata, ToolOption, audit_definition, normalize_baseline, normalize_line_endings,
};
