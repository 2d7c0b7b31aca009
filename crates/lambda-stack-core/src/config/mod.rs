// crates/lambda-stack-core/src/config/mod.rs
// ============================================================================
// Module: Runner Configuration
// Description: Centralized configuration for the stack test runner.
// Purpose: Provide typed access to runner environment settings and defaults.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Runner configuration is read from environment variables and mapped into a
//! small typed structure shared by tests and the CLI.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::ConfigError;
pub use env::RunnerConfig;
pub use env::RunnerEnv;
pub use env::parse_bool;
pub use env::parse_positive_seconds;
pub use env::read_env_nonempty;
pub use env::read_env_strict;
