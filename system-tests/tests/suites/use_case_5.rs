// system-tests/tests/suites/use_case_5.rs
// ============================================================================
// Module: Use Case 5
// Description: Function packaged from a separate source tree.
// Purpose: Validate the invocation returned HTTP status 200.
// Dependencies: system-tests helpers
// ============================================================================

//! Use case 5: the invocation result reports `statusCode` 200.

use helpers::stacks::SuiteResult;
use helpers::stacks::UseCase;

use crate::helpers;

#[test]
fn lambda_result_status_is_ok() -> SuiteResult {
    UseCase::new("use_case_5_status", "use-case-5").run(|outputs, checks| {
        checks.output_equals(outputs, "use_case_5_lambda_result.statusCode", "200");
    })
}
