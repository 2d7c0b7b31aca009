// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for live stack system-tests.
// Purpose: Provide artifact reporting and the use-case stack runner.
// Dependencies: system-tests, lambda-stack-core
// ============================================================================

//! ## Overview
//! Shared helpers for the live AWS suites.
//! Invariants:
//! - Every provisioned stack is destroyed before the test returns.
//! - A missing stack directory is reported as a skip, never a pass.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
pub mod stacks;
