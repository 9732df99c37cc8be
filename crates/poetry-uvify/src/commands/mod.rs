//! Command dispatch for poetry-uvify.

use std::process::ExitCode;

use anyhow::Result;

use crate::cli::UvifyArgs;
use crate::printer::Printer;

mod uvify;

/// Exit status for poetry-uvify commands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    /// The command succeeded.
    Success,

    /// The command failed due to an error in the user input.
    Failure,

    /// The command failed with an unexpected error.
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => Self::from(0),
            ExitStatus::Failure => Self::from(1),
            ExitStatus::Error => Self::from(2),
        }
    }
}

/// Run the conversion described by the parsed arguments.
pub fn dispatch(args: &UvifyArgs, printer: Printer) -> Result<ExitStatus> {
    uvify::execute(args, printer)
}
