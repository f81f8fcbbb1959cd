//! Use cases (application services)

pub mod audit_definitions;
pub mod dispatch_action;
pub mod generate_baseline;
pub mod reconcile_tools;
pub mod run_baselines;
