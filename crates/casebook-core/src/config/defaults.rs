//! Default values for Casebook configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Store Defaults
// ============================================================================

/// Base URL of the test case API.
pub const DEFAULT_API_URL: &str = "http://localhost:3001";

/// Resource path for test cases.
pub const DEFAULT_CASES_PATH: &str = "testCases";

/// Resource path for test suites.
pub const DEFAULT_SUITES_PATH: &str = "testSuites";

// ============================================================================
// Sync Defaults
// ============================================================================

/// Author recorded on commits and new test cases.
pub const DEFAULT_AUTHOR: &str = "QA Engineer";

/// Test case that a pull reports as edited on the remote.
pub const DEFAULT_CONFLICT_CASE_ID: &str = "tc-002";

/// Description given to the local side of a pulled conflict.
pub const DEFAULT_LOCAL_DESCRIPTION: &str = "Local change: Updated login error message text.";

/// Description given to the remote side of a pulled conflict.
pub const DEFAULT_REMOTE_DESCRIPTION: &str =
    "Remote change: Added validation for empty password field.";

// ============================================================================
// Runner Defaults
// ============================================================================

/// Chance that a single test run passes.
pub const DEFAULT_PASS_RATE: f64 = 0.7;

/// Chance that each case of a suite run passes.
pub const DEFAULT_SUITE_PASS_RATE: f64 = 0.8;

/// Shortest simulated single run (ms).
pub const DEFAULT_MIN_DELAY_MS: u64 = 1000;

/// Longest simulated single run (ms).
pub const DEFAULT_MAX_DELAY_MS: u64 = 3000;

/// Shortest simulated suite run (ms).
pub const DEFAULT_SUITE_MIN_DELAY_MS: u64 = 3000;

/// Longest simulated suite run (ms).
pub const DEFAULT_SUITE_MAX_DELAY_MS: u64 = 5000;

// ============================================================================
// Files
// ============================================================================

/// Project-local config file name.
pub const DEFAULT_CONFIG_FILE: &str = "casebook.toml";

/// Directory under the user config dir.
pub const DEFAULT_CONFIG_DIR: &str = "casebook";
