// crates/lambda-stack-core/src/options.rs
// ============================================================================
// Module: Stack Options
// Description: Immutable description of a stack to provision.
// Purpose: Carry the stack directory, input variables, and CLI flags.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`StackOptions`] names a self-contained infrastructure configuration and the
//! string variables applied to it. Variables are held in a `BTreeMap` so the
//! generated `-var` arguments are emitted in a stable order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::RunnerConfig;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Options describing one stack and how to drive the provisioning tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackOptions {
    /// Directory holding the infrastructure configuration.
    pub stack_dir: PathBuf,
    /// Input variables passed as `-var key=value`.
    pub vars: BTreeMap<String, String>,
    /// Extra environment variables for every tool invocation.
    pub env: BTreeMap<String, String>,
    /// Disable colored tool output.
    pub no_color: bool,
    /// Hold the state lock during state-mutating commands.
    pub lock: bool,
    /// Optional state lock timeout forwarded to the tool.
    pub lock_timeout: Option<Duration>,
    /// Run against a scratch copy of `stack_dir`.
    pub isolated: bool,
}

impl StackOptions {
    /// Creates options for the configuration at `stack_dir` with locking on.
    #[must_use]
    pub fn new(stack_dir: impl Into<PathBuf>) -> Self {
        Self {
            stack_dir: stack_dir.into(),
            vars: BTreeMap::new(),
            env: BTreeMap::new(),
            no_color: false,
            lock: true,
            lock_timeout: None,
            isolated: false,
        }
    }

    /// Applies runner-wide defaults from configuration.
    #[must_use]
    pub fn with_config(mut self, config: &RunnerConfig) -> Self {
        self.no_color = config.no_color;
        self.lock = config.lock;
        self.lock_timeout = config.lock_timeout;
        self.isolated = self.isolated || config.isolate;
        self
    }

    /// Adds one input variable.
    #[must_use]
    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Adds several input variables.
    #[must_use]
    pub fn vars<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars.extend(vars.into_iter().map(|(key, value)| (key.into(), value.into())));
        self
    }

    /// Adds one environment variable for tool invocations.
    #[must_use]
    pub fn env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Sets whether colored output is disabled.
    #[must_use]
    pub const fn no_color(mut self, no_color: bool) -> Self {
        self.no_color = no_color;
        self
    }

    /// Sets whether the state lock is held.
    #[must_use]
    pub const fn lock(mut self, lock: bool) -> Self {
        self.lock = lock;
        self
    }

    /// Sets the state lock timeout.
    #[must_use]
    pub const fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }

    /// Sets whether the stack runs in a scratch copy.
    #[must_use]
    pub const fn isolated(mut self, isolated: bool) -> Self {
        self.isolated = isolated;
        self
    }

    /// Returns a copy pointed at a different working directory.
    #[must_use]
    pub fn relocated(&self, stack_dir: &Path) -> Self {
        Self {
            stack_dir: stack_dir.to_path_buf(),
            ..self.clone()
        }
    }
}
