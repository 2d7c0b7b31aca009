// crates/lambda-stack-core/tests/common/mod.rs
// ============================================================================
// Module: Core Test Fixtures
// Description: Recording provisioning tool for lifecycle tests.
// Purpose: Observe every tool call without touching real infrastructure.
// Dependencies: lambda-stack-core, serde_json
// ============================================================================

//! Shared fixtures for lambda-stack-core integration tests.

#![allow(dead_code, reason = "Fixtures are shared across multiple test binaries.")]
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    reason = "Test fixtures use unwrap on deterministic inputs."
)]

use std::collections::BTreeSet;
use std::sync::Mutex;

use lambda_stack_core::OutputMap;
use lambda_stack_core::ProvisioningTool;
use lambda_stack_core::StackOptions;
use lambda_stack_core::ToolCommand;
use lambda_stack_core::ToolError;
use serde_json::json;

/// Provisioning tool that records calls and fails on request.
pub struct RecordingTool {
    calls: Mutex<Vec<ToolCommand>>,
    outputs: OutputMap,
    failing: BTreeSet<&'static str>,
}

impl RecordingTool {
    pub fn new(outputs: OutputMap) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            outputs,
            failing: BTreeSet::new(),
        }
    }

    pub fn failing(mut self, command: ToolCommand) -> Self {
        self.failing.insert(command.as_str());
        self
    }

    pub fn calls(&self) -> Vec<ToolCommand> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, command: ToolCommand) -> usize {
        self.calls().into_iter().filter(|call| *call == command).count()
    }

    fn record(&self, command: ToolCommand) -> Result<(), ToolError> {
        self.calls.lock().unwrap().push(command);
        if self.failing.contains(command.as_str()) {
            return Err(ToolError::Failed {
                command,
                status: Some(1),
                stderr: format!("Error: simulated {command} failure"),
                attempts: 1,
            });
        }
        Ok(())
    }
}

impl ProvisioningTool for RecordingTool {
    fn init(&self, _options: &StackOptions) -> Result<(), ToolError> {
        self.record(ToolCommand::Init)
    }

    fn apply(&self, _options: &StackOptions) -> Result<(), ToolError> {
        self.record(ToolCommand::Apply)
    }

    fn outputs(&self, _options: &StackOptions) -> Result<OutputMap, ToolError> {
        self.record(ToolCommand::Output)?;
        Ok(self.outputs.clone())
    }

    fn destroy(&self, _options: &StackOptions) -> Result<(), ToolError> {
        self.record(ToolCommand::Destroy)
    }
}

/// Outputs shaped like the use-case stacks: an ARN plus two invocation results.
pub fn lambda_outputs(first_status: u16, second_status: u16) -> OutputMap {
    let document = json!({
        "lambda_arn": {
            "sensitive": false,
            "type": "string",
            "value": "arn:aws:lambda:eu-west-1:123456789012:function:test_lambda"
        },
        "use_case_3_lambda1_result": {
            "sensitive": false,
            "type": ["object", {"statusCode": "number", "body": "string"}],
            "value": {"statusCode": first_status, "body": "{\"AccountId\": \"123456789012\"}"}
        },
        "use_case_3_lambda2_result": {
            "sensitive": false,
            "type": ["object", {"statusCode": "number", "body": "string"}],
            "value": {"statusCode": second_status, "body": "{}"}
        },
        "deploy_token": {
            "sensitive": true,
            "type": "string",
            "value": "s3cr3t"
        }
    });
    OutputMap::from_terraform_json(&document.to_string()).unwrap()
}
