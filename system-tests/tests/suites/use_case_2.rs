// system-tests/tests/suites/use_case_2.rs
// ============================================================================
// Module: Use Case 2
// Description: Function invoked during apply with its result exported.
// Purpose: Validate the invocation returned HTTP status 200.
// Dependencies: system-tests helpers
// ============================================================================

//! Use case 2: the invocation result reports `statusCode` 200.

use helpers::stacks::SuiteResult;
use helpers::stacks::UseCase;

use crate::helpers;

#[test]
fn lambda_result_status_is_ok() -> SuiteResult {
    UseCase::new("use_case_2_status", "use-case-2").run(|outputs, checks| {
        checks.output_equals(outputs, "use_case_2_lambda_result.statusCode", "200");
    })
}
