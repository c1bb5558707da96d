//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the loctree application.
///
/// - 0: Success (run completed normally)
/// - 1: General error (unexpected failure, including traversal errors)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the count completed normally.
    Success = 0,
    /// General error: an unexpected error occurred.
    GeneralError = 1,
    /// Interrupted: the run was interrupted by the user (Ctrl+C).
    Interrupted = 130,
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
            Self::Success => "LT000",
            Self::GeneralError => "LT001",
            Self::Interrupted => "LT130",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "LT001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::Interrupted.as_i32(), 130);
    }

    #[test]
    fn test_code_prefixes() {
        assert_eq!(ExitCode::Success.code_prefix(), "LT000");
        assert_eq!(ExitCode::GeneralError.code_prefix(), "LT001");
        assert_eq!(ExitCode::Interrupted.code_prefix(), "LT130");
    }

    #[test]
    fn test_structured_error_from_anyhow() {
        let err = anyhow::anyhow!("directory vanished");
        let structured = StructuredError::new(&err, ExitCode::GeneralError);
        assert_eq!(structured.code, "LT001");
        assert_eq!(structured.exit_code, 1);
        assert_eq!(structured.message, "directory vanished");
        assert!(!structured.interrupted);
    }

    #[test]
    fn test_structured_error_interrupted() {
        let err = anyhow::anyhow!("Interrupted");
        let structured = StructuredError::new(&err, ExitCode::Interrupted);
        assert!(structured.interrupted);
        assert_eq!(structured.exit_code, 130);
    }
}
