// crates/lambda-stack-core/src/tool.rs
// ============================================================================
// Module: Provisioning Tool Interface
// Description: Backend-agnostic interface for apply/output/destroy operations.
// Purpose: Decouple the stack lifecycle from the Terraform CLI adapter.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The stack lifecycle drives any [`ProvisioningTool`]. [`crate::TerraformCli`]
//! is the production implementation; tests substitute recording fakes.
//! Calls are synchronous and block until the tool returns.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

use crate::options::StackOptions;
use crate::outputs::OutputError;
use crate::outputs::OutputMap;

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Provisioning tool commands issued by the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolCommand {
    /// Prepare the working directory (providers, modules, backend).
    Init,
    /// Provision resources.
    Apply,
    /// Read declared outputs.
    Output,
    /// Deprovision resources.
    Destroy,
}

impl ToolCommand {
    /// Returns the stable subcommand label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Apply => "apply",
            Self::Output => "output",
            Self::Destroy => "destroy",
        }
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by a provisioning tool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// The tool process could not be started.
    #[error("failed to run {program} {command}: {message}")]
    Spawn {
        /// Command being issued.
        command: ToolCommand,
        /// Program that failed to start.
        program: String,
        /// Operating system error message.
        message: String,
    },
    /// The tool exited unsuccessfully.
    #[error("{command} failed after {attempts} attempt(s) (exit status {exit}): {stderr}", exit = display_status(*.status))]
    Failed {
        /// Command being issued.
        command: ToolCommand,
        /// Exit code when the process was not killed by a signal.
        status: Option<i32>,
        /// Tail of the tool's error output.
        stderr: String,
        /// Number of attempts made.
        attempts: u32,
    },
    /// The tool succeeded but its outputs could not be parsed.
    #[error("output parsing failed: {0}")]
    Outputs(#[from] OutputError),
}

impl ToolError {
    /// Returns the command associated with the error, when known.
    #[must_use]
    pub const fn command(&self) -> ToolCommand {
        match self {
            Self::Spawn {
                command, ..
            }
            | Self::Failed {
                command, ..
            } => *command,
            Self::Outputs(_) => ToolCommand::Output,
        }
    }
}

/// Renders an optional exit status.
fn display_status(status: Option<i32>) -> String {
    status.map_or_else(|| "signal".to_string(), |code| code.to_string())
}

// ============================================================================
// SECTION: Interface
// ============================================================================

/// Synchronous provisioning backend.
pub trait ProvisioningTool {
    /// Prepares the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when initialization fails.
    fn init(&self, options: &StackOptions) -> Result<(), ToolError>;

    /// Provisions the stack.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when provisioning fails, possibly after partial
    /// resource creation.
    fn apply(&self, options: &StackOptions) -> Result<(), ToolError>;

    /// Reads every declared output.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when outputs cannot be read or parsed.
    fn outputs(&self, options: &StackOptions) -> Result<OutputMap, ToolError>;

    /// Deprovisions the stack.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when deprovisioning fails.
    fn destroy(&self, options: &StackOptions) -> Result<(), ToolError>;
}

impl<T: ProvisioningTool + ?Sized> ProvisioningTool for &T {
    fn init(&self, options: &StackOptions) -> Result<(), ToolError> {
        (**self).init(options)
    }

    fn apply(&self, options: &StackOptions) -> Result<(), ToolError> {
        (**self).apply(options)
    }

    fn outputs(&self, options: &StackOptions) -> Result<OutputMap, ToolError> {
        (**self).outputs(options)
    }

    fn destroy(&self, options: &StackOptions) -> Result<(), ToolError> {
        (**self).destroy(options)
    }
}
