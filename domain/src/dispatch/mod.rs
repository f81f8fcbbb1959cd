//! Capability dispatch
//!
//! Generic actions (lint, format, test) are not bound to a tool. At request
//! time the dispatcher picks, per file, the definition that provides the
//! requested capability for that file type, and the argument builder turns
//! the caller's canonical options into that tool's native argv.
//!
//! ```text
//! "Formatter", [a.py, b.rs, c.md]
//!        │
//!        ▼  select()                      build_command()
//! a.py → black      ─┐  group_by_tool()  ┌─▶ black --check a.py
//! b.rs → rustfmt    ─┼──────────────────▶┼─▶ rustfmt --check b.rs
//! c.md → prettier * ─┘                   └─▶ prettier --check c.md
//! ```

pub mod args;
pub mod selector;

pub use args::{ActivatedOptions, build_command, is_truthy, stringify};
pub use selector::{
    DispatchPlan, FileSelection, MatchKind, group_by_tool, match_definition, select,
    select_for_file,
};
