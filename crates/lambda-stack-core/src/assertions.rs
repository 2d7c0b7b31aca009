// crates/lambda-stack-core/src/assertions.rs
// ============================================================================
// Module: Output Assertions
// Description: Non-fatal expected-vs-actual checks on stack outputs.
// Purpose: Collect every mismatch so cleanup and reporting still run.
// Dependencies: crate::outputs, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`Assertions`] records each check instead of aborting on the first
//! mismatch. [`Assertions::finish`] turns recorded failures into a single
//! [`AssertionError`] naming every expected and actual value.
//!
//! Invariants:
//! - A collector holding failures must be finished or converted; dropping it
//!   otherwise fails the enclosing test.
//! - Values of sensitive outputs never appear in failure messages.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use tracing::error;
use tracing::warn;

use crate::outputs::OutputMap;
use crate::outputs::OutputPath;
use crate::outputs::REDACTED;

// ============================================================================
// SECTION: Failures
// ============================================================================

/// Comparison applied by an assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionKind {
    /// Actual value must equal the expected value.
    Equals,
    /// Actual value must contain the expected substring.
    Contains,
}

impl AssertionKind {
    /// Returns the phrase used in failure messages.
    const fn phrase(self) -> &'static str {
        match self {
            Self::Equals => "expected",
            Self::Contains => "expected to contain",
        }
    }

    /// Applies the comparison.
    fn holds(self, actual: &str, expected: &str) -> bool {
        match self {
            Self::Equals => actual == expected,
            Self::Contains => actual.contains(expected),
        }
    }
}

/// One recorded assertion mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionFailure {
    /// Output path that was checked.
    pub path: String,
    /// Comparison applied.
    pub kind: AssertionKind,
    /// Expected value or substring.
    pub expected: String,
    /// Actual value, when the path resolved.
    pub actual: Option<String>,
    /// Resolution error, when the path did not resolve.
    pub detail: Option<String>,
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "output `{}`: {} \"{}\"", self.path, self.kind.phrase(), self.expected)?;
        match (&self.actual, &self.detail) {
            (Some(actual), _) => write!(f, ", actual \"{actual}\""),
            (None, Some(detail)) => write!(f, ", but {detail}"),
            (None, None) => Ok(()),
        }
    }
}

/// Aggregated assertion failures for one test.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct AssertionError {
    /// Label of the test or scenario.
    pub label: String,
    /// Number of checks that passed.
    pub passed: usize,
    /// Every recorded mismatch, in check order.
    pub failures: Vec<AssertionFailure>,
}

impl fmt::Display for AssertionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} assertion(s) failed", self.label, self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n  - {failure}")?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Collector
// ============================================================================

/// Collector for non-fatal output assertions.
#[must_use = "assertion failures are only reported by `finish`"]
#[derive(Debug)]
pub struct Assertions {
    /// Label of the test or scenario.
    label: String,
    /// Number of checks that passed.
    passed: usize,
    /// Recorded mismatches.
    failures: Vec<AssertionFailure>,
    /// Set once failures have been handed to the caller.
    reported: bool,
}

impl Assertions {
    /// Creates an empty collector.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            passed: 0,
            failures: Vec::new(),
            reported: false,
        }
    }

    /// Checks that the output at `path` equals `expected`.
    ///
    /// Returns `true` on a match. A mismatch is recorded and `false` returned.
    pub fn output_equals(&mut self, outputs: &OutputMap, path: &str, expected: &str) -> bool {
        self.check(outputs, path, AssertionKind::Equals, expected)
    }

    /// Checks that the output at `path` contains `needle`.
    ///
    /// Returns `true` on a match. A mismatch is recorded and `false` returned.
    pub fn output_contains(&mut self, outputs: &OutputMap, path: &str, needle: &str) -> bool {
        self.check(outputs, path, AssertionKind::Contains, needle)
    }

    /// Applies `kind` to the output at `path`.
    pub fn check(
        &mut self,
        outputs: &OutputMap,
        path: &str,
        kind: AssertionKind,
        expected: &str,
    ) -> bool {
        let resolved = OutputPath::parse(path).and_then(|parsed| {
            let sensitive = outputs.is_sensitive(parsed.output());
            outputs.lookup(&parsed).map(|value| (value.to_string(), sensitive))
        });
        match resolved {
            Ok((actual, _)) if kind.holds(&actual, expected) => {
                debug!(label = %self.label, path, expected, "assertion passed");
                self.passed = self.passed.saturating_add(1);
                true
            }
            Ok((actual, sensitive)) => {
                let actual = if sensitive { REDACTED.to_string() } else { actual };
                self.record(AssertionFailure {
                    path: path.to_string(),
                    kind,
                    expected: expected.to_string(),
                    actual: Some(actual),
                    detail: None,
                });
                false
            }
            Err(err) => {
                self.record(AssertionFailure {
                    path: path.to_string(),
                    kind,
                    expected: expected.to_string(),
                    actual: None,
                    detail: Some(err.to_string()),
                });
                false
            }
        }
    }

    /// Records a failure and logs it.
    fn record(&mut self, failure: AssertionFailure) {
        warn!(label = %self.label, "assertion failed: {failure}");
        self.failures.push(failure);
    }

    /// Returns the label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the number of checks that passed.
    #[must_use]
    pub const fn passed(&self) -> usize {
        self.passed
    }

    /// Returns the recorded failures.
    #[must_use]
    pub fn failures(&self) -> &[AssertionFailure] {
        &self.failures
    }

    /// Returns true when no failure has been recorded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// Consumes the collector, returning the passed count on success.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionError`] listing every recorded failure.
    pub fn finish(self) -> Result<usize, AssertionError> {
        let (label, passed, failures) = self.into_parts();
        if failures.is_empty() {
            return Ok(passed);
        }
        Err(AssertionError {
            label,
            passed,
            failures,
        })
    }

    /// Consumes the collector into `(label, passed, failures)` for reporting.
    #[must_use]
    pub fn into_parts(mut self) -> (String, usize, Vec<AssertionFailure>) {
        self.reported = true;
        (std::mem::take(&mut self.label), self.passed, std::mem::take(&mut self.failures))
    }
}

impl Drop for Assertions {
    #[allow(clippy::panic, reason = "Unreported assertion failures must fail the enclosing test.")]
    fn drop(&mut self) {
        if self.reported || self.failures.is_empty() {
            return;
        }
        let summary = AssertionError {
            label: self.label.clone(),
            passed: self.passed,
            failures: std::mem::take(&mut self.failures),
        };
        error!("assertions dropped without finish: {summary}");
        if !std::thread::panicking() {
            panic!("{summary}");
        }
    }
}
