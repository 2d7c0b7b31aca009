// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for stack system tests.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: lambda-stack-core
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use lambda_stack_core::ConfigError;
use lambda_stack_core::StackOptions;
use lambda_stack_core::config::read_env_nonempty;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Stacks root used when no override is set, relative to the crate directory.
pub const DEFAULT_STACKS_ROOT: &str = "../stacks";

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackTestEnv {
    /// Optional run root override.
    RunRoot,
    /// Optional directory holding the `use-case-N` stacks.
    StacksRoot,
    /// Optional AWS region forwarded to terraform.
    AwsRegion,
}

impl StackTestEnv {
    /// All keys, for tests that clear the environment.
    pub const ALL: [Self; 3] = [Self::RunRoot, Self::StacksRoot, Self::AwsRegion];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "LAMBDA_STACK_SYSTEM_TEST_RUN_ROOT",
            Self::StacksRoot => "LAMBDA_STACK_SYSTEM_TEST_STACKS_ROOT",
            Self::AwsRegion => "LAMBDA_STACK_SYSTEM_TEST_AWS_REGION",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackTestConfig {
    /// Optional run root override.
    pub run_root: Option<PathBuf>,
    /// Directory holding the `use-case-N` stacks.
    pub stacks_root: PathBuf,
    /// Optional AWS region for the provider.
    pub aws_region: Option<String>,
}

impl Default for StackTestConfig {
    fn default() -> Self {
        Self {
            run_root: None,
            stacks_root: PathBuf::from(DEFAULT_STACKS_ROOT),
            aws_region: None,
        }
    }
}

impl StackTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an environment value is not valid UTF-8 or
    /// is empty.
    pub fn load() -> Result<Self, ConfigError> {
        let run_root = read_env_nonempty(StackTestEnv::RunRoot.as_str())?.map(PathBuf::from);
        let stacks_root = read_env_nonempty(StackTestEnv::StacksRoot.as_str())?
            .map_or_else(|| PathBuf::from(DEFAULT_STACKS_ROOT), PathBuf::from);
        let aws_region = read_env_nonempty(StackTestEnv::AwsRegion.as_str())?
            .map(|region| region.trim().to_string());
        Ok(Self {
            run_root,
            stacks_root,
            aws_region,
        })
    }

    /// Returns the directory of the named use-case stack.
    #[must_use]
    pub fn stack_dir(&self, use_case: &str) -> PathBuf {
        self.stacks_root.join(use_case)
    }

    /// Returns true when the named stack directory exists.
    #[must_use]
    pub fn has_stack(&self, use_case: &str) -> bool {
        self.stack_dir(use_case).is_dir()
    }

    /// Forwards the configured region to terraform's AWS provider.
    #[must_use]
    pub fn apply_region(&self, options: StackOptions) -> StackOptions {
        match &self.aws_region {
            Some(region) => {
                options.env_var("AWS_REGION", region).env_var("AWS_DEFAULT_REGION", region)
            }
            None => options,
        }
    }
}
