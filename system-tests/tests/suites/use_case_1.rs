// system-tests/tests/suites/use_case_1.rs
// ============================================================================
// Module: Use Case 1
// Description: Single function deployed under a caller-chosen name.
// Purpose: Validate the function ARN reflects the `function_name` input.
// Dependencies: system-tests helpers
// ============================================================================

//! Use case 1: the deployed function's ARN carries its configured name.

use helpers::stacks::SuiteResult;
use helpers::stacks::UseCase;

use crate::helpers;

#[test]
fn lambda_arn_contains_function_name() -> SuiteResult {
    UseCase::new("use_case_1_lambda_arn", "use-case-1").var("function_name", "test_lambda").run(
        |outputs, checks| {
            checks.output_contains(outputs, "lambda_arn", "test_lambda");
        },
    )
}
