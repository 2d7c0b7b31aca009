// crates/lambda-stack-cli/src/main.rs
// ============================================================================
// Module: Lambda Stack CLI Entry Point
// Description: Command dispatcher for stack scenario runs and cleanup.
// Purpose: Run a scenario from a file or flags and report the result as JSON.
// Dependencies: clap, lambda-stack-core, serde_jcs, thiserror, tracing.
// ============================================================================

//! ## Overview
//! `lambda-stack run` provisions a stack, checks its outputs, tears it down,
//! and prints a canonical JSON report. The exit code is zero only when every
//! expectation held. `lambda-stack destroy` removes a stack left behind by an
//! interrupted run.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use lambda_stack_core::Expectation;
use lambda_stack_core::OutputPath;
use lambda_stack_core::ProvisioningTool;
use lambda_stack_core::RunnerConfig;
use lambda_stack_core::ScenarioReport;
use lambda_stack_core::ScenarioSpec;
use lambda_stack_core::StackOptions;
use lambda_stack_core::TerraformCli;
use lambda_stack_core::logging::init_stderr_logging;
use lambda_stack_core::run_scenario_spec;
use thiserror::Error;
use tracing::info;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "lambda-stack", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Provision a stack, check its outputs, and tear it down.
    Run(RunCommand),
    /// Destroy a stack left behind by an interrupted run.
    Destroy(DestroyCommand),
}

/// Arguments for `run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// Scenario file describing the stack and its expectations.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["dir", "vars", "expect_eq", "expect_contains"])]
    scenario: Option<PathBuf>,
    /// Stack directory for an inline scenario.
    #[arg(long, value_name = "DIR", required_unless_present = "scenario")]
    dir: Option<PathBuf>,
    /// Scenario label; overrides the name in a scenario file.
    #[arg(long, value_name = "NAME")]
    name: Option<String>,
    /// Input variable, repeatable.
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    vars: Vec<(String, String)>,
    /// Output that must equal a value, repeatable.
    #[arg(long, value_name = "PATH=VALUE", value_parser = parse_key_value)]
    expect_eq: Vec<(String, String)>,
    /// Output that must contain a substring, repeatable.
    #[arg(long, value_name = "PATH=VALUE", value_parser = parse_key_value)]
    expect_contains: Vec<(String, String)>,
    /// Run in a scratch copy of the stack directory, also for scenario files.
    #[arg(long)]
    isolate: bool,
}

/// Arguments for `destroy`.
#[derive(Args, Debug)]
struct DestroyCommand {
    /// Stack directory to destroy.
    #[arg(long, value_name = "DIR")]
    dir: PathBuf,
    /// Input variable, repeatable.
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    vars: Vec<(String, String)>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a printable message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    init_stderr_logging();
    let config = RunnerConfig::load().map_err(|err| CliError::new(err.to_string()))?;
    let tool = TerraformCli::from_config(&config);
    match cli.command {
        Commands::Run(command) => command_run(&tool, command, &config),
        Commands::Destroy(command) => command_destroy(&tool, &command, &config),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Runs a scenario and prints its report.
fn command_run<T: ProvisioningTool>(
    tool: T,
    command: RunCommand,
    config: &RunnerConfig,
) -> CliResult<ExitCode> {
    let spec = scenario_from_args(command)?;
    info!(scenario = %spec.name, stack = %spec.stack_dir.display(), "running scenario");
    let report = run_scenario_spec(tool, &spec, config).map_err(|err| CliError::new(err.to_string()))?;
    write_report(&report)?;
    if report.passed {
        Ok(ExitCode::SUCCESS)
    } else {
        for failure in &report.failures {
            write_stderr_line(&failure.to_string())
                .map_err(|err| CliError::new(output_error("stderr", &err)))?;
        }
        Ok(ExitCode::FAILURE)
    }
}

/// Initializes and destroys a stack directory.
fn command_destroy<T: ProvisioningTool>(
    tool: T,
    command: &DestroyCommand,
    config: &RunnerConfig,
) -> CliResult<ExitCode> {
    let options =
        StackOptions::new(&command.dir).with_config(config).vars(command.vars.iter().cloned());
    let label = command.dir.display().to_string();
    tool.init(&options).map_err(|err| CliError::new(format!("init failed for {label}: {err}")))?;
    tool.destroy(&options)
        .map_err(|err| CliError::new(format!("destroy failed for {label}: {err}")))?;
    write_stdout_line(&format!("destroyed {label}"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Argument Helpers
// ============================================================================

/// Builds a scenario from either `--scenario` or inline flags.
fn scenario_from_args(command: RunCommand) -> CliResult<ScenarioSpec> {
    if let Some(path) = command.scenario {
        let mut spec = ScenarioSpec::load(&path).map_err(|err| CliError::new(err.to_string()))?;
        if let Some(name) = command.name {
            spec.name = name;
        }
        spec.isolate |= command.isolate;
        spec.validate().map_err(|err| CliError::new(err.to_string()))?;
        return Ok(spec);
    }
    let Some(stack_dir) = command.dir else {
        return Err(CliError::new("either --scenario or --dir is required".to_string()));
    };
    let mut expectations = Vec::new();
    for (output, value) in command.expect_eq {
        expectations.push(Expectation::equals(checked_path(output)?, value));
    }
    for (output, value) in command.expect_contains {
        expectations.push(Expectation::contains(checked_path(output)?, value));
    }
    let name = command.name.unwrap_or_else(|| {
        stack_dir.file_name().map_or_else(
            || stack_dir.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
    });
    let spec = ScenarioSpec {
        name,
        stack_dir,
        isolate: command.isolate,
        vars: command.vars.into_iter().collect(),
        expectations,
    };
    spec.validate().map_err(|err| CliError::new(err.to_string()))?;
    Ok(spec)
}

/// Rejects malformed output paths before anything is provisioned.
fn checked_path(raw: String) -> CliResult<String> {
    OutputPath::parse(&raw).map_err(|err| CliError::new(err.to_string()))?;
    Ok(raw)
}

/// Parses a `KEY=VALUE` argument; the value may itself contain `=`.
fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(format!("expected KEY=VALUE, got `{raw}`"));
    };
    if key.trim().is_empty() {
        return Err(format!("empty key in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes the report to stdout as canonical JSON.
fn write_report(report: &ScenarioReport) -> CliResult<()> {
    let bytes = report_bytes(report)?;
    let mut stdout = std::io::stdout();
    stdout.write_all(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Serializes the report as canonical JSON with a trailing newline.
fn report_bytes(report: &ScenarioReport) -> CliResult<Vec<u8>> {
    let mut bytes = serde_jcs::to_vec(report)
        .map_err(|err| CliError::new(format!("failed to serialize report: {err}")))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a stream write failure.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
