//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the assets explorer.
///
/// - 0: Success
/// - 1: General error (bad config, I/O failure, tool failure)
/// - 2: Asset not found (a `find` lookup came back empty)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the command completed.
    Success = 0,
    /// General error: the command failed.
    GeneralError = 1,
    /// Not found: the requested GUID does not exist in any template.
    NotFound = 2,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "AE000",
            Self::GeneralError => "AE001",
            Self::NotFound => "AE002",
        }
    }
}

/// Structured error information for `--json-errors`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "AE001")
    pub code: String,
    pub exit_code: i32,
    /// Human-readable error message, including its causes.
    pub message: String,
}

impl StructuredError {
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
        }
    }
}
