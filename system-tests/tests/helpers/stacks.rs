// system-tests/tests/helpers/stacks.rs
// ============================================================================
// Module: Use-Case Stack Runner
// Description: Provision, verify, and destroy one use-case stack.
// Purpose: Share the live lifecycle and its artifact reporting across suites.
// Dependencies: system-tests, lambda-stack-core
// ============================================================================

use std::collections::BTreeMap;

use lambda_stack_core::AssertionError;
use lambda_stack_core::Assertions;
use lambda_stack_core::OutputMap;
use lambda_stack_core::RunnerConfig;
use lambda_stack_core::Stack;
use lambda_stack_core::StackOptions;
use lambda_stack_core::TerraformCli;
use lambda_stack_core::logging::init_test_logging;
use serde_json::Value;
use serde_json::json;
use system_tests::config::StackTestConfig;

use super::artifacts::TestReporter;

/// Result type shared by the suites.
pub type SuiteResult = Result<(), Box<dyn std::error::Error>>;

/// One live use-case run.
pub struct UseCase {
    test_name: &'static str,
    stack: &'static str,
    vars: BTreeMap<String, String>,
}

impl UseCase {
    /// Creates a run for `stack` under the configured stacks root.
    pub fn new(test_name: &'static str, stack: &'static str) -> Self {
        Self {
            test_name,
            stack,
            vars: BTreeMap::new(),
        }
    }

    /// Adds an input variable.
    pub fn var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    /// Provisions the stack, runs `checks`, destroys it, and writes a summary.
    ///
    /// Writes a `skip` summary and returns `Ok` when the stack directory is
    /// absent. Assertion failures are returned after teardown has succeeded.
    pub fn run<F>(self, checks: F) -> SuiteResult
    where
        F: FnOnce(&OutputMap, &mut Assertions),
    {
        init_test_logging();
        let config = StackTestConfig::load()?;
        let mut reporter = TestReporter::new(self.test_name, &config)?;
        let stack_dir = config.stack_dir(self.stack);
        if !config.has_stack(self.stack) {
            reporter.finish(
                "skip",
                vec![format!("stack directory {} not found", stack_dir.display())],
                vec!["summary.json".to_string(), "summary.md".to_string()],
            )?;
            return Ok(());
        }

        let runner = RunnerConfig::load()?;
        let tool = TerraformCli::from_config(&runner);
        let options = config.apply_region(
            StackOptions::new(&stack_dir).with_config(&runner).vars(self.vars.clone()),
        );

        let mut stack = Stack::provision(&tool, options)?;
        let mut outputs = Value::Null;
        let collector = stack.verify(self.test_name, |stack_outputs, assertions| {
            outputs = stack_outputs.redacted_json();
            checks(stack_outputs, assertions);
        })?;
        let (label, passed, failures) = collector.into_parts();
        reporter.artifacts().write_json("outputs.json", &outputs)?;
        reporter.artifacts().write_json(
            "assertions.json",
            &json!({ "passed": passed, "failures": failures }),
        )?;
        stack.teardown()?;

        let status = if failures.is_empty() { "pass" } else { "fail" };
        let notes = failures.iter().map(ToString::to_string).collect();
        reporter.finish(status, notes, vec![
            "summary.json".to_string(),
            "summary.md".to_string(),
            "outputs.json".to_string(),
            "assertions.json".to_string(),
        ])?;
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Box::new(AssertionError {
                label,
                passed,
                failures,
            }))
        }
    }
}
