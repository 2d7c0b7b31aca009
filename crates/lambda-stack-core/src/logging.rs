// crates/lambda-stack-core/src/logging.rs
// ============================================================================
// Module: Logging Setup
// Description: tracing subscriber initialization for tests and tools.
// Purpose: Route runner events through an env-filtered fmt subscriber.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! Filters come from `RUST_LOG`; when it is unset or invalid, `info` is used.
//! Initialization is idempotent: later calls are ignored once a global
//! subscriber is installed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

// ============================================================================
// SECTION: Initialization
// ============================================================================

/// Builds the env filter, falling back to [`DEFAULT_FILTER`].
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs a subscriber writing through the test harness capture.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt().with_env_filter(env_filter()).with_test_writer().try_init();
}

/// Installs a subscriber writing to stderr without ANSI colors.
pub fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .try_init();
}
