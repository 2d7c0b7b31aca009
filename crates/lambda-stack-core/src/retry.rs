// crates/lambda-stack-core/src/retry.rs
// ============================================================================
// Module: Retry Policy
// Description: Retry rules for transient provisioning failures.
// Purpose: Decide whether a failed tool invocation should be attempted again.
// Dependencies: regex
// ============================================================================

//! ## Overview
//! Retries are opt-in. A failed `init`, `apply`, or `destroy` is repeated only
//! when its combined output matches one of the policy's patterns and attempts
//! remain. Output reads are never retried.
//!
//! [`RetryPolicy::transient`] carries messages Terraform emits for registry,
//! provider download, and plugin start-up hiccups that usually clear on a
//! second attempt.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use regex::Regex;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Known-transient Terraform failure messages.
pub const TRANSIENT_ERROR_PATTERNS: &[&str] = &[
    r"(?i)timeout while waiting for plugin to start",
    r"(?i)timed out waiting for server handshake",
    r"(?i)error installing provider",
    r"(?i)failed to install provider",
    r"(?i)failed to query available provider packages",
    r"(?i)could not query provider registry",
    r"(?i)unable to verify signature",
    r"(?i)unable to verify checksum",
    r"(?i)tls handshake timeout",
    r"(?i)connection reset by peer",
];

/// Default total attempts for [`RetryPolicy::transient`].
pub const DEFAULT_TRANSIENT_ATTEMPTS: u32 = 3;

/// Default delay between attempts.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(5);

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Retry policy for provisioning commands.
///
/// # Invariants
/// - `max_attempts` is at least one.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    max_attempts: u32,
    /// Fixed delay between attempts.
    backoff: Duration,
    /// Output patterns that mark a failure as retryable.
    patterns: Vec<Regex>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

impl RetryPolicy {
    /// Returns a policy that never retries.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            max_attempts: 1,
            backoff: DEFAULT_BACKOFF,
            patterns: Vec::new(),
        }
    }

    /// Returns a policy retrying known-transient Terraform failures.
    #[must_use]
    pub fn transient() -> Self {
        Self {
            max_attempts: DEFAULT_TRANSIENT_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
            patterns: TRANSIENT_ERROR_PATTERNS
                .iter()
                .filter_map(|pattern| Regex::new(pattern).ok())
                .collect(),
        }
    }

    /// Sets the total attempt count; values below one are raised to one.
    #[must_use]
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Sets the delay between attempts.
    #[must_use]
    pub const fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Adds a retryable output pattern.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] when the pattern does not compile.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.patterns.push(Regex::new(pattern)?);
        Ok(self)
    }

    /// Returns the total attempt count.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the delay between attempts.
    #[must_use]
    pub const fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Returns the first pattern matching `output`.
    #[must_use]
    pub fn matching_pattern(&self, output: &str) -> Option<&str> {
        self.patterns.iter().find(|pattern| pattern.is_match(output)).map(Regex::as_str)
    }

    /// Returns true when attempt number `attempt` (1-based) failed with a
    /// retryable `output` and another attempt is allowed.
    #[must_use]
    pub fn should_retry(&self, attempt: u32, output: &str) -> bool {
        attempt < self.max_attempts && self.matching_pattern(output).is_some()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
