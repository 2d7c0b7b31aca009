// crates/lambda-stack-core/src/scenario.rs
// ============================================================================
// Module: Declarative Scenarios
// Description: TOML-described test cases and their execution.
// Purpose: Run provision -> assert -> teardown from a scenario file.
// Dependencies: crate::{assertions, config, stack, tool}, serde, toml
// ============================================================================

//! ## Overview
//! A scenario names a stack directory, its string input variables, and the
//! expected outputs:
//!
//! ```toml
//! name = "use-case-1"
//! stack_dir = "../stacks/use-case-1"
//!
//! [vars]
//! function_name = "test_lambda"
//!
//! [[expect]]
//! output = "lambda_arn"
//! contains = "test_lambda"
//! ```
//!
//! Relative `stack_dir` values resolve against the scenario file's directory.
//! Each expectation carries exactly one of `equals` or `contains`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::assertions::AssertionFailure;
use crate::assertions::AssertionKind;
use crate::config::RunnerConfig;
use crate::options::StackOptions;
use crate::outputs::OutputPath;
use crate::stack::Stack;
use crate::stack::StackError;
use crate::tool::ProvisioningTool;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a scenario file.
pub const MAX_SCENARIO_BYTES: u64 = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading or running a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    /// The scenario file could not be read.
    #[error("failed to read scenario {path}: {message}")]
    Io {
        /// Scenario file path.
        path: String,
        /// I/O error message.
        message: String,
    },
    /// The scenario file exceeds [`MAX_SCENARIO_BYTES`].
    #[error("scenario {path} is {size} bytes, limit is {limit}")]
    TooLarge {
        /// Scenario file path.
        path: String,
        /// Actual size.
        size: u64,
        /// Size limit.
        limit: u64,
    },
    /// The scenario is not valid TOML or has an invalid shape.
    #[error("invalid scenario {path}: {message}")]
    Parse {
        /// Scenario source label.
        path: String,
        /// Parser message.
        message: String,
    },
    /// The scenario failed semantic validation.
    #[error("invalid scenario: {0}")]
    Invalid(String),
    /// Provisioning, output, or teardown failed.
    #[error(transparent)]
    Stack(#[from] StackError),
}

// ============================================================================
// SECTION: Expectations
// ============================================================================

/// Serialized form of an expectation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct RawExpectation {
    /// Dotted output path.
    output: String,
    /// Exact expected value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    equals: Option<String>,
    /// Expected substring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    contains: Option<String>,
}

/// One expected output value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "RawExpectation", into = "RawExpectation")]
pub struct Expectation {
    /// Dotted output path.
    pub output: String,
    /// Comparison applied.
    pub kind: AssertionKind,
    /// Expected value or substring.
    pub value: String,
}

impl Expectation {
    /// Creates an equality expectation.
    #[must_use]
    pub fn equals(output: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            kind: AssertionKind::Equals,
            value: value.into(),
        }
    }

    /// Creates a substring expectation.
    #[must_use]
    pub fn contains(output: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            kind: AssertionKind::Contains,
            value: value.into(),
        }
    }
}

impl TryFrom<RawExpectation> for Expectation {
    type Error = String;

    fn try_from(raw: RawExpectation) -> Result<Self, Self::Error> {
        OutputPath::parse(&raw.output).map_err(|err| err.to_string())?;
        match (raw.equals, raw.contains) {
            (Some(value), None) => Ok(Self::equals(raw.output, value)),
            (None, Some(value)) => Ok(Self::contains(raw.output, value)),
            (Some(_), Some(_)) => {
                Err(format!("expectation for `{}` sets both equals and contains", raw.output))
            }
            (None, None) => {
                Err(format!("expectation for `{}` needs equals or contains", raw.output))
            }
        }
    }
}

impl From<Expectation> for RawExpectation {
    fn from(expectation: Expectation) -> Self {
        let (equals, contains) = match expectation.kind {
            AssertionKind::Equals => (Some(expectation.value), None),
            AssertionKind::Contains => (None, Some(expectation.value)),
        };
        Self {
            output: expectation.output,
            equals,
            contains,
        }
    }
}

// ============================================================================
// SECTION: Scenario Files
// ============================================================================

/// A declarative test case.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioSpec {
    /// Scenario label used in logs and reports.
    pub name: String,
    /// Stack directory.
    pub stack_dir: PathBuf,
    /// Run in a scratch copy of `stack_dir`.
    #[serde(default)]
    pub isolate: bool,
    /// Input variables.
    #[serde(default)]
    pub vars: BTreeMap<String, String>,
    /// Expected outputs, checked in order.
    #[serde(default, rename = "expect")]
    pub expectations: Vec<Expectation>,
}

impl ScenarioSpec {
    /// Loads a scenario file, resolving `stack_dir` against its directory.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] when the file is unreadable, oversized, or
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let label = path.display().to_string();
        let io_error = |err: std::io::Error| ScenarioError::Io {
            path: label.clone(),
            message: err.to_string(),
        };
        let size = fs::metadata(path).map_err(io_error)?.len();
        if size > MAX_SCENARIO_BYTES {
            return Err(ScenarioError::TooLarge {
                path: path.display().to_string(),
                size,
                limit: MAX_SCENARIO_BYTES,
            });
        }
        let contents = fs::read_to_string(path).map_err(io_error)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml_str(&contents, &label, base_dir)
    }

    /// Parses scenario TOML, resolving `stack_dir` against `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Parse`] or [`ScenarioError::Invalid`].
    pub fn from_toml_str(
        contents: &str,
        label: &str,
        base_dir: &Path,
    ) -> Result<Self, ScenarioError> {
        let mut spec: Self = toml::from_str(contents).map_err(|err| ScenarioError::Parse {
            path: label.to_string(),
            message: err.to_string(),
        })?;
        if spec.stack_dir.is_relative() {
            spec.stack_dir = base_dir.join(&spec.stack_dir);
        }
        spec.validate()?;
        Ok(spec)
    }

    /// Checks semantic constraints not expressible in the schema.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Invalid`] on an empty name, an empty stack
    /// directory, or an empty variable name.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.name.trim().is_empty() {
            return Err(ScenarioError::Invalid("name must not be empty".to_string()));
        }
        if self.stack_dir.as_os_str().is_empty() {
            return Err(ScenarioError::Invalid("stack_dir must not be empty".to_string()));
        }
        if self.vars.keys().any(|key| key.trim().is_empty()) {
            return Err(ScenarioError::Invalid("variable names must not be empty".to_string()));
        }
        Ok(())
    }

    /// Builds stack options for this scenario.
    #[must_use]
    pub fn options(&self, config: &RunnerConfig) -> StackOptions {
        StackOptions::new(&self.stack_dir)
            .with_config(config)
            .vars(self.vars.clone())
            .isolated(self.isolate || config.isolate)
    }
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Result of running a scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    /// Scenario label.
    pub name: String,
    /// Stack directory.
    pub stack_dir: String,
    /// True when every expectation held.
    pub passed: bool,
    /// Number of expectations that held.
    pub assertions_passed: usize,
    /// Expectations that did not hold.
    pub failures: Vec<AssertionFailure>,
    /// Outputs with sensitive values masked.
    pub outputs: Value,
}

/// Provisions the scenario's stack, checks every expectation, and tears down.
///
/// Assertion mismatches are reported in the returned [`ScenarioReport`], not
/// as errors.
///
/// # Errors
///
/// Returns [`ScenarioError::Stack`] when provisioning, reading outputs, or
/// teardown fails.
pub fn run_scenario_spec<T: ProvisioningTool>(
    tool: T,
    spec: &ScenarioSpec,
    config: &RunnerConfig,
) -> Result<ScenarioReport, ScenarioError> {
    let mut stack = Stack::provision(tool, spec.options(config))?;
    let mut outputs = Value::Null;
    let checks = stack.verify(&spec.name, |stack_outputs, checks| {
        for expectation in &spec.expectations {
            checks.check(stack_outputs, &expectation.output, expectation.kind, &expectation.value);
        }
        outputs = stack_outputs.redacted_json();
    })?;
    let (_, assertions_passed, failures) = checks.into_parts();
    stack.teardown()?;
    Ok(ScenarioReport {
        name: spec.name.clone(),
        stack_dir: spec.stack_dir.display().to_string(),
        passed: failures.is_empty(),
        assertions_passed,
        failures,
        outputs,
    })
}
