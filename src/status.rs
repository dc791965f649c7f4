//! Exit status codes for the CLI
//!
//! - 0: Execution completed (or a successful `--validate` / `--dry-run`)
//! - 1: Usage, configuration or diagram parse error
//! - 10: Execution finished with status FAILED

use std::process::{ExitCode, Termination};

use crate::pipeline::ExecutionStatus;

/// Exit status codes following standard Unix conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    /// Every step succeeded
    Success = 0,
    /// Could not start: bad arguments, config or diagram
    Error = 1,
    /// The execution ran and at least one step did not succeed
    ExecutionFailed = 10,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status as u8)
    }
}

impl Termination for ExitStatus {
    fn report(self) -> ExitCode {
        ExitCode::from(self as u8)
    }
}

impl ExitStatus {
    /// Exit status for a finished execution
    pub fn from_execution(status: ExecutionStatus) -> Self {
        match status {
            ExecutionStatus::Completed => ExitStatus::Success,
            ExecutionStatus::Running | ExecutionStatus::Failed => ExitStatus::ExecutionFailed,
        }
    }

    /// Create an exit status from a raw exit code
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ExitStatus::Success,
            10 => ExitStatus::ExecutionFailed,
            _ => ExitStatus::Error,
        }
    }
}
