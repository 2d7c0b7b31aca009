// crates/lambda-stack-core/src/stack.rs
// ============================================================================
// Module: Stack Lifecycle
// Description: Scoped provisioning guard for one infrastructure stack.
// Purpose: Guarantee exactly one destroy for every attempted apply.
// Dependencies: crate::{assertions, options, outputs, tool, workdir}, tracing
// ============================================================================

//! ## Overview
//! A [`Stack`] moves through `Init -> Provisioned -> Asserted -> Destroyed`.
//! Once apply has been attempted the stack owns a destroy obligation that is
//! discharged exactly once, either by [`Stack::teardown`] or, on early return
//! and panic paths, by `Drop`.
//!
//! Invariants:
//! - A failed init creates nothing and triggers no destroy.
//! - A failed apply triggers an immediate best-effort destroy before the error
//!   is returned, since resources may have been partially created.
//! - Destroy is never issued twice for the same stack.
//! - A scratch copy whose destroy failed is kept on disk, since it holds the
//!   only local state for the resources still alive.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use tempfile::TempDir;
use thiserror::Error;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::assertions::Assertions;
use crate::options::StackOptions;
use crate::outputs::OutputMap;
use crate::tool::ProvisioningTool;
use crate::tool::ToolError;
use crate::workdir::copy_to_scratch;

// ============================================================================
// SECTION: State
// ============================================================================

/// Lifecycle state of a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StackState {
    /// Options built; nothing provisioned yet.
    Init,
    /// Apply succeeded.
    Provisioned,
    /// Outputs have been checked.
    Asserted,
    /// Destroy has been issued.
    Destroyed,
}

impl StackState {
    /// Returns a stable label for the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Provisioned => "provisioned",
            Self::Asserted => "asserted",
            Self::Destroyed => "destroyed",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal stack lifecycle errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    /// The scratch working directory could not be prepared.
    #[error("failed to prepare scratch copy of {dir}: {message}")]
    Workdir {
        /// Stack directory.
        dir: String,
        /// I/O error message.
        message: String,
    },
    /// Init failed; nothing was provisioned.
    #[error("init failed for {dir}: {source}")]
    Init {
        /// Stack directory.
        dir: String,
        /// Tool failure.
        source: ToolError,
    },
    /// Apply failed; a best-effort destroy was attempted.
    #[error(
        "apply failed for {dir}: {source}{note}",
        note = cleanup_note(.cleanup.as_ref(), .kept_workdir.as_deref())
    )]
    Apply {
        /// Stack directory.
        dir: String,
        /// Tool failure.
        source: ToolError,
        /// Destroy failure during cleanup, if any.
        cleanup: Option<ToolError>,
        /// Scratch copy kept because cleanup failed.
        kept_workdir: Option<PathBuf>,
    },
    /// Outputs could not be read.
    #[error(
        "reading outputs failed for {dir}: {source}{note}",
        note = cleanup_note(.cleanup.as_ref(), .kept_workdir.as_deref())
    )]
    Outputs {
        /// Stack directory.
        dir: String,
        /// Tool failure.
        source: ToolError,
        /// Destroy failure during cleanup, if any.
        cleanup: Option<ToolError>,
        /// Scratch copy kept because cleanup failed.
        kept_workdir: Option<PathBuf>,
    },
    /// Destroy failed; resources may have leaked.
    #[error("destroy failed for {dir}: {source}{note}", note = kept_note(.kept_workdir.as_deref()))]
    Destroy {
        /// Stack directory.
        dir: String,
        /// Tool failure.
        source: ToolError,
        /// Scratch copy holding the remaining state, when isolated.
        kept_workdir: Option<PathBuf>,
    },
}

/// Renders the cleanup suffix of an error message.
fn cleanup_note(cleanup: Option<&ToolError>, kept: Option<&Path>) -> String {
    cleanup.map_or_else(String::new, |err| {
        format!(" (cleanup destroy also failed: {err}){}", kept_note(kept))
    })
}

/// Renders the kept-workdir suffix of an error message.
fn kept_note(kept: Option<&Path>) -> String {
    kept.map_or_else(String::new, |path| format!("; state kept in {}", path.display()))
}

// ============================================================================
// SECTION: Stack Guard
// ============================================================================

/// A provisioned stack that is destroyed exactly once.
pub struct Stack<T: ProvisioningTool> {
    /// Provisioning backend.
    tool: T,
    /// Options with the working directory in effect.
    options: StackOptions,
    /// Directory the configuration was read from.
    source_dir: PathBuf,
    /// Current lifecycle state.
    state: StackState,
    /// Set once apply has been issued.
    apply_started: bool,
    /// Scratch copy, removed after a successful destroy.
    scratch: Option<TempDir>,
}

impl<T: ProvisioningTool> Stack<T> {
    /// Initializes and applies the configuration described by `options`.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Workdir`], [`StackError::Init`], or
    /// [`StackError::Apply`]. An apply failure is returned only after a
    /// best-effort destroy.
    pub fn provision(tool: T, options: StackOptions) -> Result<Self, StackError> {
        let source_dir = options.stack_dir.clone();
        let (scratch, working) = if options.isolated {
            let scratch = copy_to_scratch(&source_dir).map_err(|err| StackError::Workdir {
                dir: source_dir.display().to_string(),
                message: err.to_string(),
            })?;
            let working = options.relocated(scratch.path());
            (Some(scratch), working)
        } else {
            (None, options)
        };
        let mut stack = Self {
            tool,
            options: working,
            source_dir,
            state: StackState::Init,
            apply_started: false,
            scratch,
        };

        info!(stack = %stack.source_dir.display(), workdir = %stack.working_dir().display(), "initializing stack");
        if let Err(source) = stack.tool.init(&stack.options) {
            return Err(StackError::Init {
                dir: stack.dir_label(),
                source,
            });
        }

        info!(stack = %stack.source_dir.display(), vars = stack.options.vars.len(), "applying stack");
        stack.apply_started = true;
        if let Err(source) = stack.tool.apply(&stack.options) {
            error!(stack = %stack.source_dir.display(), %source, "apply failed; destroying partial stack");
            let (cleanup, kept_workdir) = stack.destroy_or_keep_state();
            return Err(StackError::Apply {
                dir: stack.dir_label(),
                source,
                cleanup,
                kept_workdir,
            });
        }
        stack.transition(StackState::Provisioned);
        Ok(stack)
    }

    /// Reads every declared output.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Outputs`]; the stack is still destroyed on drop.
    pub fn outputs(&self) -> Result<OutputMap, StackError> {
        let outputs = self.tool.outputs(&self.options).map_err(|source| StackError::Outputs {
            dir: self.dir_label(),
            source,
            cleanup: None,
            kept_workdir: None,
        })?;
        info!(stack = %self.source_dir.display(), outputs = %outputs.redacted(), "read stack outputs");
        Ok(outputs)
    }

    /// Reads outputs, runs `checks` against them, and marks the stack asserted.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Outputs`] when outputs cannot be read. Assertion
    /// mismatches are not errors; they are carried in the returned collector.
    pub fn verify<F>(&mut self, label: &str, checks: F) -> Result<Assertions, StackError>
    where
        F: FnOnce(&OutputMap, &mut Assertions),
    {
        let outputs = self.outputs()?;
        let mut assertions = Assertions::new(label);
        checks(&outputs, &mut assertions);
        self.transition(StackState::Asserted);
        Ok(assertions)
    }

    /// Destroys the stack, consuming the guard.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Destroy`] when deprovisioning fails.
    /// When isolated, the scratch copy is kept on disk and its path is
    /// reported in the error so the stack can still be destroyed from there.
    pub fn teardown(mut self) -> Result<(), StackError> {
        match self.destroy_or_keep_state() {
            (None, _) => Ok(()),
            (Some(source), kept_workdir) => Err(StackError::Destroy {
                dir: self.dir_label(),
                source,
                kept_workdir,
            }),
        }
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> StackState {
        self.state
    }

    /// Returns the options in effect, including the working directory.
    #[must_use]
    pub const fn options(&self) -> &StackOptions {
        &self.options
    }

    /// Returns the directory the configuration was read from.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Returns the directory commands run in.
    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.options.stack_dir
    }

    /// Returns the scratch copy in use, when isolated.
    #[must_use]
    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch.as_ref().map(TempDir::path)
    }

    /// Returns the provisioning backend.
    #[must_use]
    pub const fn tool(&self) -> &T {
        &self.tool
    }

    /// Issues destroy unless it was already issued or apply never started.
    fn destroy_once(&mut self) -> Result<(), ToolError> {
        if self.state == StackState::Destroyed || !self.apply_started {
            return Ok(());
        }
        info!(stack = %self.source_dir.display(), from = self.state.as_str(), "destroying stack");
        self.transition(StackState::Destroyed);
        self.tool.destroy(&self.options)
    }

    /// Issues destroy and, if it fails, keeps the scratch copy on disk.
    fn destroy_or_keep_state(&mut self) -> (Option<ToolError>, Option<PathBuf>) {
        match self.destroy_once() {
            Ok(()) => (None, None),
            Err(err) => {
                let kept = self.scratch.take().map(TempDir::keep);
                if let Some(path) = &kept {
                    error!(stack = %self.source_dir.display(), kept = %path.display(), "destroy failed; keeping scratch copy with state");
                }
                (Some(err), kept)
            }
        }
    }

    /// Moves to `next` and logs the transition.
    fn transition(&mut self, next: StackState) {
        info!(stack = %self.source_dir.display(), from = self.state.as_str(), to = next.as_str(), "stack state");
        self.state = next;
    }

    /// Returns the stack directory for error messages.
    fn dir_label(&self) -> String {
        self.source_dir.display().to_string()
    }
}

impl<T: ProvisioningTool> Drop for Stack<T> {
    fn drop(&mut self) {
        if self.state == StackState::Destroyed || !self.apply_started {
            return;
        }
        warn!(stack = %self.source_dir.display(), "stack dropped before teardown; destroying");
        if let (Some(err), kept) = self.destroy_or_keep_state() {
            let kept = kept.map(|path| path.display().to_string()).unwrap_or_default();
            error!(stack = %self.source_dir.display(), %err, kept = %kept, "teardown failed; resources may have leaked");
        }
    }
}

// ============================================================================
// SECTION: Scenario Helper
// ============================================================================

/// Provisions `options` and reads its outputs.
///
/// The returned stack still owes a teardown; it is destroyed on drop if the
/// caller does not call [`Stack::teardown`].
///
/// # Errors
///
/// Returns the provisioning errors of [`Stack::provision`], or
/// [`StackError::Outputs`] after destroying the stack when outputs cannot be
/// read.
pub fn run_scenario<T: ProvisioningTool>(
    tool: T,
    options: StackOptions,
) -> Result<(Stack<T>, OutputMap), StackError> {
    let mut stack = Stack::provision(tool, options)?;
    match stack.tool.outputs(&stack.options) {
        Ok(outputs) => {
            info!(stack = %stack.source_dir.display(), outputs = %outputs.redacted(), "read stack outputs");
            Ok((stack, outputs))
        }
        Err(source) => {
            let (cleanup, kept_workdir) = stack.destroy_or_keep_state();
            Err(StackError::Outputs {
                dir: stack.dir_label(),
                source,
                cleanup,
                kept_workdir,
            })
        }
    }
}
