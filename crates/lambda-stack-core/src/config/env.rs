// crates/lambda-stack-core/src/config/env.rs
// ============================================================================
// Module: Runner Environment
// Description: Environment-backed configuration for the stack runner.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8, empty values, and malformed numbers or
//! booleans fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::retry::DEFAULT_BACKOFF;
use crate::retry::RetryPolicy;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for runner configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerEnv {
    /// Optional terraform binary override.
    TerraformBinary,
    /// Disable colored tool output (`true`/`false` or `1`/`0`).
    NoColor,
    /// Hold the state lock (`true`/`false` or `1`/`0`).
    Lock,
    /// Optional state lock timeout in seconds (positive integer).
    LockTimeoutSeconds,
    /// Total attempts for retryable commands (positive integer).
    RetryAttempts,
    /// Delay between attempts in seconds (positive integer).
    RetryBackoffSeconds,
    /// Run stacks in a scratch copy (`true`/`false` or `1`/`0`).
    Isolate,
}

impl RunnerEnv {
    /// Every runner environment key.
    pub const ALL: [Self; 7] = [
        Self::TerraformBinary,
        Self::NoColor,
        Self::Lock,
        Self::LockTimeoutSeconds,
        Self::RetryAttempts,
        Self::RetryBackoffSeconds,
        Self::Isolate,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TerraformBinary => "LAMBDA_STACK_TERRAFORM_BIN",
            Self::NoColor => "LAMBDA_STACK_NO_COLOR",
            Self::Lock => "LAMBDA_STACK_LOCK",
            Self::LockTimeoutSeconds => "LAMBDA_STACK_LOCK_TIMEOUT_SEC",
            Self::RetryAttempts => "LAMBDA_STACK_RETRY_ATTEMPTS",
            Self::RetryBackoffSeconds => "LAMBDA_STACK_RETRY_BACKOFF_SEC",
            Self::Isolate => "LAMBDA_STACK_ISOLATE",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A variable is set but is not valid UTF-8.
    #[error("{0} must be valid UTF-8")]
    NotUtf8(String),
    /// A variable is set but empty or whitespace.
    #[error("{0} must not be empty")]
    Empty(String),
    /// A variable holds an unparseable value.
    #[error("{name} {reason}")]
    Invalid {
        /// Variable name.
        name: String,
        /// Validation failure description.
        reason: String,
    },
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Default terraform binary, resolved through `PATH`.
const DEFAULT_TERRAFORM_BINARY: &str = "terraform";

/// Typed runner configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Terraform binary to invoke.
    pub terraform_binary: PathBuf,
    /// Disable colored tool output.
    pub no_color: bool,
    /// Hold the state lock.
    pub lock: bool,
    /// Optional state lock timeout.
    pub lock_timeout: Option<Duration>,
    /// Total attempts for retryable commands.
    pub retry_attempts: u32,
    /// Delay between attempts.
    pub retry_backoff: Duration,
    /// Run stacks in a scratch copy.
    pub isolate: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            terraform_binary: PathBuf::from(DEFAULT_TERRAFORM_BINARY),
            no_color: false,
            lock: true,
            lock_timeout: None,
            retry_attempts: 1,
            retry_backoff: DEFAULT_BACKOFF,
            isolate: false,
        }
    }
}

impl RunnerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an environment value is not valid UTF-8, is
    /// empty, or fails validation (for example, a zero timeout).
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let terraform_binary = read_env_nonempty(RunnerEnv::TerraformBinary.as_str())?
            .map_or(defaults.terraform_binary, PathBuf::from);
        let no_color = parse_bool(
            RunnerEnv::NoColor.as_str(),
            read_env_nonempty(RunnerEnv::NoColor.as_str())?,
            defaults.no_color,
        )?;
        let lock = parse_bool(
            RunnerEnv::Lock.as_str(),
            read_env_nonempty(RunnerEnv::Lock.as_str())?,
            defaults.lock,
        )?;
        let lock_timeout = read_env_nonempty(RunnerEnv::LockTimeoutSeconds.as_str())?
            .map(|value| parse_positive_seconds(RunnerEnv::LockTimeoutSeconds.as_str(), &value))
            .transpose()?;
        let retry_attempts = read_env_nonempty(RunnerEnv::RetryAttempts.as_str())?
            .map(|value| parse_positive_count(RunnerEnv::RetryAttempts.as_str(), &value))
            .transpose()?
            .unwrap_or(defaults.retry_attempts);
        let retry_backoff = read_env_nonempty(RunnerEnv::RetryBackoffSeconds.as_str())?
            .map(|value| parse_positive_seconds(RunnerEnv::RetryBackoffSeconds.as_str(), &value))
            .transpose()?
            .unwrap_or(defaults.retry_backoff);
        let isolate = parse_bool(
            RunnerEnv::Isolate.as_str(),
            read_env_nonempty(RunnerEnv::Isolate.as_str())?,
            defaults.isolate,
        )?;
        Ok(Self {
            terraform_binary,
            no_color,
            lock,
            lock_timeout,
            retry_attempts,
            retry_backoff,
            isolate,
        })
    }

    /// Returns the retry policy implied by this configuration.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        if self.retry_attempts <= 1 {
            return RetryPolicy::disabled();
        }
        RetryPolicy::transient().with_attempts(self.retry_attempts).with_backoff(self.retry_backoff)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns [`ConfigError::NotUtf8`] when the variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| ConfigError::NotUtf8(name.to_string()))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns [`ConfigError::Empty`] when the variable is set but empty or
/// whitespace.
pub fn read_env_nonempty(name: &str) -> Result<Option<String>, ConfigError> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(name.to_string())),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive number of seconds.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the value is non-numeric or zero.
pub fn parse_positive_seconds(name: &str, raw: &str) -> Result<Duration, ConfigError> {
    parse_positive_count(name, raw).map(|secs| Duration::from_secs(u64::from(secs)))
}

/// Parses a positive integer count.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the value is non-numeric or zero.
fn parse_positive_count(name: &str, raw: &str) -> Result<u32, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    let value: u32 =
        raw.trim().parse().map_err(|_| invalid("must be a positive integer"))?;
    if value == 0 {
        return Err(invalid("must be greater than zero"));
    }
    Ok(value)
}

/// Parses a boolean environment value, falling back to `default` when unset.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the value is not a recognized boolean
/// literal.
pub fn parse_bool(name: &str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = raw else {
        return Ok(default);
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(ConfigError::Invalid {
        name: name.to_string(),
        reason: "must be 1, 0, true, or false".to_string(),
    })
}
