//! Exit code logic for the simbad-report process.
//!
//! Single responsibility: map batch completion/failure counts to the process exit outcome.

use std::process::ExitCode;

/// Final outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Every object was reported.
    Success,
    /// Some objects failed, others were reported.
    Partial,
    /// No object was reported, or the run could not start.
    Failure,
}

impl ProcessExit {
    /// Numeric process exit status.
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Partial => 1,
            Self::Failure => 2,
        }
    }
}

impl From<ProcessExit> for ExitCode {
    fn from(outcome: ProcessExit) -> Self {
        ExitCode::from(outcome.code())
    }
}

/// Determines the process exit outcome from completed and failed object counts.
pub(crate) fn determine_exit_outcome(completed: usize, failed: usize) -> ProcessExit {
    if failed == 0 {
        ProcessExit::Success
    } else if completed > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}
