// system-tests/tests/suites/use_case_3.rs
// ============================================================================
// Module: Use Case 3
// Description: Two functions invoked during apply.
// Purpose: Validate both invocation results independently.
// Dependencies: system-tests helpers
// ============================================================================

//! Use case 3: each of the two invocation results reports `statusCode` 200.
//! Both checks run even when the first fails.

use helpers::stacks::SuiteResult;
use helpers::stacks::UseCase;

use crate::helpers;

#[test]
fn both_lambda_results_are_ok() -> SuiteResult {
    UseCase::new("use_case_3_status", "use-case-3").run(|outputs, checks| {
        checks.output_equals(outputs, "use_case_3_lambda1_result.statusCode", "200");
        checks.output_equals(outputs, "use_case_3_lambda2_result.statusCode", "200");
    })
}
