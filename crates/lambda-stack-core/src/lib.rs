// crates/lambda-stack-core/src/lib.rs
// ============================================================================
// Module: Lambda Stack Core Library
// Description: Public API surface for the Terraform stack test runner.
// Purpose: Expose stack lifecycle, output, assertion, and scenario helpers.
// Dependencies: crate::{assertions, config, outputs, stack, terraform, tool}
// ============================================================================

//! ## Overview
//! Lambda Stack core drives a provisioning tool (Terraform by default) through
//! a linear test lifecycle: provision a stack, read its outputs, assert on
//! them, and tear it down on every exit path. Assertion mismatches are
//! collected without aborting so cleanup and reporting always run.
//!
//! ```no_run
//! use lambda_stack_core::Assertions;
//! use lambda_stack_core::Stack;
//! use lambda_stack_core::StackOptions;
//! use lambda_stack_core::TerraformCli;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = StackOptions::new("stacks/use-case-1").var("function_name", "test_lambda");
//! let mut stack = Stack::provision(TerraformCli::default(), options)?;
//! let checks = stack.verify("use-case-1", |outputs, checks| {
//!     checks.output_contains(outputs, "lambda_arn", "test_lambda");
//! })?;
//! stack.teardown()?;
//! checks.finish()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod assertions;
pub mod config;
pub mod logging;
pub mod options;
pub mod outputs;
pub mod retry;
pub mod scenario;
pub mod stack;
pub mod terraform;
pub mod tool;
pub mod workdir;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use assertions::AssertionError;
pub use assertions::AssertionFailure;
pub use assertions::AssertionKind;
pub use assertions::Assertions;
pub use config::ConfigError;
pub use config::RunnerConfig;
pub use options::StackOptions;
pub use outputs::OutputError;
pub use outputs::OutputMap;
pub use outputs::OutputPath;
pub use outputs::OutputValue;
pub use retry::RetryPolicy;
pub use scenario::Expectation;
pub use scenario::ScenarioError;
pub use scenario::ScenarioReport;
pub use scenario::ScenarioSpec;
pub use scenario::run_scenario_spec;
pub use stack::Stack;
pub use stack::StackError;
pub use stack::StackState;
pub use stack::run_scenario;
pub use terraform::TerraformCli;
pub use tool::ProvisioningTool;
pub use tool::ToolCommand;
pub use tool::ToolError;
