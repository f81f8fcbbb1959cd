//! Tool domain module
//!
//! A managed tool is identified by its [`CommandSequence`] (`["git", "commit"]`)
//! and described on disk by a [`ToolDefinition`]: how its native options map
//! onto canonical options, which capabilities it provides and which file types
//! it accepts.
//!
//! ```text
//! ┌──────────────────┐   tool_id = "git_commit"
//! │ CommandSequence  │────────────────────────────┐
//! └────────┬─────────┘                            ▼
//!          │                           ┌────────────────────┐
//!          ▼                           │ <tool_dir>/        │
//! ┌──────────────────┐                 │   git_commit.json  │
//! │ ToolDefinition   │◀───────────────▶│   git_commit.txt   │
//! │  options         │                 └────────────────────┘
//! │  arguments       │
//! │  metadata        │──▶ ground_truth_crc: Fingerprint
//! └──────────────────┘
//! ```
//!
//! The `.txt` file is the baseline (canonical `--help` output); its
//! [`Fingerprint`] is what the tool index tracks for drift detection.

pub mod audit;
pub mod entities;
pub mod fingerprint;
pub mod value_objects;

pub use audit::{DefinitionAudit, audit_definition};
pub use entities::{OptionKind, OptionTable, ToolDefinition, ToolMetadata, ToolOption};
pub use fingerprint::{Fingerprint, normalize_baseline, normalize_line_endings};
pub use value_objects::CommandSequence;
