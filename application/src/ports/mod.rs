//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod capturer;
pub mod command_runner;
pub mod discovery;
pub mod progress;
pub mod tool_index;
pub mod tool_store;
