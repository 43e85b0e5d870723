//! Error types and result aliases for logos-format.
//!
//! - [`Result<T>`]: Type alias for `anyhow::Result<T>` used by the glue code
//! - [`LogosFormatError`]: the failures that decide the process exit code

use std::path::PathBuf;

use anyhow::Result as AnyhowResult;
use thiserror::Error;

pub type Result<T> = AnyhowResult<T>;

/// Exit code for any failure that is not the formatter's own exit status
pub const GENERIC_FAILURE_CODE: i32 = 1;

#[derive(Debug, Error)]
pub enum LogosFormatError {
    /// A recognized Logos file can't be read or written
    #[error("Can't {access} Logos file '{}'", path.display())]
    Precondition {
        path: PathBuf,
        access: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The formatter ran and exited unsuccessfully
    #[error("formatter exited with {}", describe_code(*code))]
    FormatterFailed { code: Option<i32>, output: String },

    /// The formatter couldn't be started or waited on
    #[error("failed to run '{}'", program.display())]
    FormatterInvocation {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Replacing an original file with its formatted content failed
    #[error("failed to overwrite '{}'", path.display())]
    Commit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Creating the temporary workspace or one of its files failed
    #[error("workspace error at '{}'", path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LogosFormatError {
    /// Process exit code this error should produce
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            LogosFormatError::FormatterFailed {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => GENERIC_FAILURE_CODE,
        }
    }
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("return code {code}"),
        None => "no return code (terminated by signal)".to_string(),
    }
}

/// Exit code for an error that reached the top level
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<LogosFormatError>()
        .map_or(GENERIC_FAILURE_CODE, LogosFormatError::exit_code)
}
