// crates/lambda-stack-core/tests/scenario_file.rs
// ============================================================================
// Module: Scenario File Tests
// Description: Loading and running TOML scenario descriptions.
// ============================================================================
//! ## Overview
//! Covers schema validation, path resolution, and report contents.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Tests use unwrap on deterministic fixtures."
)]

mod common;

use std::fs;
use std::path::Path;

use common::RecordingTool;
use common::lambda_outputs;
use lambda_stack_core::AssertionKind;
use lambda_stack_core::Expectation;
use lambda_stack_core::RunnerConfig;
use lambda_stack_core::ScenarioError;
use lambda_stack_core::ScenarioSpec;
use lambda_stack_core::StackError;
use lambda_stack_core::ToolCommand;
use lambda_stack_core::run_scenario_spec;
use serde_json::json;

const USE_CASE_3: &str = r#"
name = "use-case-3"
stack_dir = "../stacks/use-case-3"

[vars]
region = "eu-west-1"

[[expect]]
output = "use_case_3_lambda1_result.statusCode"
equals = "200"

[[expect]]
output = "use_case_3_lambda2_result.statusCode"
equals = "200"

[[expect]]
output = "lambda_arn"
contains = "test_lambda"
"#;

fn parse(contents: &str) -> Result<ScenarioSpec, ScenarioError> {
    ScenarioSpec::from_toml_str(contents, "inline", Path::new("/work/scenarios"))
}

#[test]
fn parses_expectations_in_order() {
    let spec = parse(USE_CASE_3).unwrap();
    assert_eq!(spec.name, "use-case-3");
    assert_eq!(spec.stack_dir, Path::new("/work/scenarios/../stacks/use-case-3"));
    assert_eq!(spec.vars.get("region").map(String::as_str), Some("eu-west-1"));
    assert_eq!(spec.expectations, vec![
        Expectation::equals("use_case_3_lambda1_result.statusCode", "200"),
        Expectation::equals("use_case_3_lambda2_result.statusCode", "200"),
        Expectation::contains("lambda_arn", "test_lambda"),
    ]);
    assert_eq!(spec.expectations[2].kind, AssertionKind::Contains);
}

#[test]
fn absolute_stack_dir_is_kept() {
    let spec = parse("name = \"abs\"\nstack_dir = \"/stacks/use-case-1\"\n").unwrap();
    assert_eq!(spec.stack_dir, Path::new("/stacks/use-case-1"));
    assert!(spec.expectations.is_empty());
    assert!(!spec.isolate);
}

#[test]
fn expectation_needs_exactly_one_comparison() {
    let both = r#"
name = "x"
stack_dir = "s"
[[expect]]
output = "lambda_arn"
equals = "a"
contains = "b"
"#;
    let neither = r#"
name = "x"
stack_dir = "s"
[[expect]]
output = "lambda_arn"
"#;
    assert!(matches!(parse(both), Err(ScenarioError::Parse { .. })));
    assert!(matches!(parse(neither), Err(ScenarioError::Parse { .. })));
}

#[test]
fn unknown_keys_and_bad_paths_are_rejected() {
    assert!(matches!(
        parse("name = \"x\"\nstack_dir = \"s\"\nretries = 3\n"),
        Err(ScenarioError::Parse { .. })
    ));
    let bad_path = "name = \"x\"\nstack_dir = \"s\"\n[[expect]]\noutput = \"result..code\"\nequals = \"1\"\n";
    assert!(matches!(parse(bad_path), Err(ScenarioError::Parse { .. })));
}

#[test]
fn blank_name_is_invalid() {
    assert!(matches!(
        parse("name = \" \"\nstack_dir = \"s\"\n"),
        Err(ScenarioError::Invalid(_))
    ));
}

#[test]
fn load_resolves_against_file_directory() {
    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("use-case-3.toml");
    fs::write(&file, USE_CASE_3).unwrap();
    let spec = ScenarioSpec::load(&file).unwrap();
    assert_eq!(spec.stack_dir, dir.path().join("../stacks/use-case-3"));
}

#[test]
fn load_reports_missing_file() {
    let err = ScenarioSpec::load(Path::new("/nonexistent/scenario.toml")).unwrap_err();
    assert!(matches!(err, ScenarioError::Io { .. }));
}

#[test]
fn passing_scenario_reports_outputs_and_destroys() {
    let spec = parse(USE_CASE_3).unwrap();
    let tool = RecordingTool::new(lambda_outputs(200, 200));
    let report = run_scenario_spec(&tool, &spec, &RunnerConfig::default()).unwrap();

    assert!(report.passed);
    assert_eq!(report.assertions_passed, 3);
    assert!(report.failures.is_empty());
    assert_eq!(report.outputs["use_case_3_lambda1_result"]["statusCode"], json!("200"));
    assert_eq!(report.outputs["deploy_token"], json!("<sensitive>"));
    assert_eq!(tool.count(ToolCommand::Destroy), 1);
}

#[test]
fn failing_scenario_still_destroys_and_lists_failures() {
    let spec = parse(USE_CASE_3).unwrap();
    let tool = RecordingTool::new(lambda_outputs(500, 404));
    let report = run_scenario_spec(&tool, &spec, &RunnerConfig::default()).unwrap();

    assert!(!report.passed);
    assert_eq!(report.assertions_passed, 1);
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[1].actual.as_deref(), Some("404"));
    assert_eq!(tool.count(ToolCommand::Destroy), 1);
}

#[test]
fn destroy_failure_fails_the_scenario() {
    let spec = parse(USE_CASE_3).unwrap();
    let tool = RecordingTool::new(lambda_outputs(200, 200)).failing(ToolCommand::Destroy);
    let err = run_scenario_spec(&tool, &spec, &RunnerConfig::default()).unwrap_err();
    assert!(matches!(err, ScenarioError::Stack(StackError::Destroy { .. })));
}

#[test]
fn report_serializes_failure_kinds() {
    let spec = parse(USE_CASE_3).unwrap();
    let tool = RecordingTool::new(lambda_outputs(500, 200));
    let report = run_scenario_spec(&tool, &spec, &RunnerConfig::default()).unwrap();
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["failures"][0]["kind"], json!("equals"));
    assert_eq!(value["failures"][0]["expected"], json!("200"));
    assert_eq!(value["passed"], json!(false));
}
