// system-tests/src/lib.rs
// ============================================================================
// Module: Lambda Stack System Tests Library
// Description: Shared configuration for live stack system tests.
// Purpose: Provide common settings for the use-case suites.
// Dependencies: lambda-stack-core
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the live AWS suites in
//! `system-tests/tests`. The suites themselves only build with the
//! `system-tests` feature.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
