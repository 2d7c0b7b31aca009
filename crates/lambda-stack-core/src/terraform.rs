// crates/lambda-stack-core/src/terraform.rs
// ============================================================================
// Module: Terraform CLI Adapter
// Description: ProvisioningTool implementation backed by the terraform binary.
// Purpose: Build deterministic argument vectors and run them with retries.
// Dependencies: crate::{options, outputs, retry, tool}, tracing
// ============================================================================

//! ## Overview
//! Each lifecycle step is a blocking `terraform` invocation in the stack
//! directory. Input is disabled and approvals are automatic so runs never
//! wait on a prompt. Variables are emitted in sorted key order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;
use std::process::Stdio;

use tracing::debug;
use tracing::warn;

use crate::config::RunnerConfig;
use crate::options::StackOptions;
use crate::outputs::OutputMap;
use crate::retry::RetryPolicy;
use crate::tool::ProvisioningTool;
use crate::tool::ToolCommand;
use crate::tool::ToolError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum bytes of tool error output kept in [`ToolError::Failed`].
const MAX_ERROR_TAIL_BYTES: usize = 4 * 1024;

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Terraform CLI provisioning backend.
#[derive(Debug, Clone)]
pub struct TerraformCli {
    /// Binary to invoke.
    binary: PathBuf,
    /// Retry policy for init, apply, and destroy.
    retry: RetryPolicy,
}

impl Default for TerraformCli {
    fn default() -> Self {
        Self::from_config(&RunnerConfig::default())
    }
}

impl TerraformCli {
    /// Creates an adapter for `binary` with retries disabled.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            retry: RetryPolicy::disabled(),
        }
    }

    /// Creates an adapter from runner configuration.
    #[must_use]
    pub fn from_config(config: &RunnerConfig) -> Self {
        Self {
            binary: config.terraform_binary.clone(),
            retry: config.retry_policy(),
        }
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the binary path.
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Builds the argument vector for `command`.
    #[must_use]
    pub fn command_args(command: ToolCommand, options: &StackOptions) -> Vec<String> {
        let mut args = vec![command.as_str().to_string()];
        match command {
            ToolCommand::Init => {
                args.push("-upgrade=false".to_string());
                args.push("-input=false".to_string());
            }
            ToolCommand::Apply => {
                args.push("-input=false".to_string());
                args.push("-auto-approve".to_string());
            }
            ToolCommand::Destroy => {
                args.push("-auto-approve".to_string());
                args.push("-input=false".to_string());
            }
            ToolCommand::Output => {
                args.push("-no-color".to_string());
                args.push("-json".to_string());
                return args;
            }
        }
        if options.no_color {
            args.push("-no-color".to_string());
        }
        args.push(format!("-lock={}", options.lock));
        if let Some(timeout) = options.lock_timeout {
            args.push(format!("-lock-timeout={}s", timeout.as_secs()));
        }
        if matches!(command, ToolCommand::Apply | ToolCommand::Destroy) {
            for (key, value) in &options.vars {
                args.push("-var".to_string());
                args.push(format!("{key}={value}"));
            }
        }
        args
    }

    /// Runs `command` once and captures its output.
    fn run_once(&self, command: ToolCommand, options: &StackOptions) -> Result<Output, ToolError> {
        let args = Self::command_args(command, options);
        debug!(
            binary = %self.binary.display(),
            dir = %options.stack_dir.display(),
            args = %args.join(" "),
            "running terraform"
        );
        Command::new(&self.binary)
            .args(&args)
            .current_dir(&options.stack_dir)
            .envs(&options.env)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| ToolError::Spawn {
                command,
                program: self.binary.display().to_string(),
                message: err.to_string(),
            })
    }

    /// Runs `command`, retrying retryable failures per the policy.
    fn run(&self, command: ToolCommand, options: &StackOptions) -> Result<String, ToolError> {
        let mut attempt = 1u32;
        loop {
            let output = self.run_once(command, options)?;
            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            log_lines(command, &stdout);
            if output.status.success() {
                debug!(%command, attempt, "terraform succeeded");
                return Ok(stdout);
            }
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            log_lines(command, &stderr);
            let combined = format!("{stdout}\n{stderr}");
            let retryable = command != ToolCommand::Output && self.retry.should_retry(attempt, &combined);
            if !retryable {
                let detail = if stderr.trim().is_empty() { &stdout } else { &stderr };
                return Err(ToolError::Failed {
                    command,
                    status: output.status.code(),
                    stderr: tail(detail, MAX_ERROR_TAIL_BYTES).to_string(),
                    attempts: attempt,
                });
            }
            warn!(
                %command,
                attempt,
                max_attempts = self.retry.max_attempts(),
                pattern = self.retry.matching_pattern(&combined).unwrap_or_default(),
                "retryable terraform failure"
            );
            std::thread::sleep(self.retry.backoff());
            attempt = attempt.saturating_add(1);
        }
    }
}

impl ProvisioningTool for TerraformCli {
    fn init(&self, options: &StackOptions) -> Result<(), ToolError> {
        self.run(ToolCommand::Init, options).map(drop)
    }

    fn apply(&self, options: &StackOptions) -> Result<(), ToolError> {
        self.run(ToolCommand::Apply, options).map(drop)
    }

    fn outputs(&self, options: &StackOptions) -> Result<OutputMap, ToolError> {
        let stdout = self.run(ToolCommand::Output, options)?;
        Ok(OutputMap::from_terraform_json(&stdout)?)
    }

    fn destroy(&self, options: &StackOptions) -> Result<(), ToolError> {
        self.run(ToolCommand::Destroy, options).map(drop)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Logs tool output line by line under the `terraform` target.
fn log_lines(command: ToolCommand, text: &str) {
    for line in text.lines().filter(|line| !line.trim().is_empty()) {
        debug!(target: "terraform", %command, "{line}");
    }
}

/// Returns at most the last `max_bytes` of `text`, on a char boundary.
fn tail(text: &str, max_bytes: usize) -> &str {
    let trimmed = text.trim_end();
    if trimmed.len() <= max_bytes {
        return trimmed;
    }
    let mut start = trimmed.len() - max_bytes;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    &trimmed[start..]
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn apply_args_carry_lock_and_sorted_vars() {
        let options = StackOptions::new("stacks/use-case-1")
            .var("zone", "b")
            .var("function_name", "test_lambda")
            .lock_timeout(Duration::from_secs(60));
        assert_eq!(TerraformCli::command_args(ToolCommand::Apply, &options), vec![
            "apply",
            "-input=false",
            "-auto-approve",
            "-lock=true",
            "-lock-timeout=60s",
            "-var",
            "function_name=test_lambda",
            "-var",
            "zone=b",
        ]);
    }

    #[test]
    fn init_args_skip_vars() {
        let options = StackOptions::new("stack").var("function_name", "x").no_color(true);
        assert_eq!(TerraformCli::command_args(ToolCommand::Init, &options), vec![
            "init",
            "-upgrade=false",
            "-input=false",
            "-no-color",
            "-lock=true",
        ]);
    }

    #[test]
    fn output_args_are_fixed() {
        let options = StackOptions::new("stack").var("function_name", "x").lock(false);
        assert_eq!(TerraformCli::command_args(ToolCommand::Output, &options), vec![
            "output",
            "-no-color",
            "-json",
        ]);
    }

    #[test]
    fn destroy_args_mirror_apply_vars() {
        let options = StackOptions::new("stack").var("function_name", "x").lock(false);
        assert_eq!(TerraformCli::command_args(ToolCommand::Destroy, &options), vec![
            "destroy",
            "-auto-approve",
            "-input=false",
            "-lock=false",
            "-var",
            "function_name=x",
        ]);
    }

    #[test]
    fn tail_respects_char_boundaries() {
        let text = "ééééé";
        let tailed = tail(text, 3);
        assert!(tailed.len() <= 3);
        assert!(text.ends_with(tailed));
    }
}
