//! Running the external formatter
//!
//! clang-format is treated as a black box: arguments in, text and an exit
//! status out. Standard output and standard error are captured separately so
//! diagnostics never end up inside formatted code.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::info;

use crate::error::LogosFormatError;

/// Formatter used when nothing else is configured
pub const DEFAULT_FORMATTER: &str = "clang-format";

/// Flag that makes the formatter edit files in place
pub const IN_PLACE_FLAG: &str = "-i";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    Failure,
}

/// What a finished formatter run produced
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
    /// Raw standard output; formatted code may hold bytes that aren't UTF-8
    pub stdout: Vec<u8>,
    pub stderr: String,
    pub outcome: RunOutcome,
}

impl RunResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome == RunOutcome::Success
    }

    /// Standard output as text, for logs and messages
    #[must_use]
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Standard output followed by standard error
    #[must_use]
    pub fn combined_output(&self) -> String {
        let mut out = self.stdout_lossy();
        if !out.is_empty() && !self.stderr.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&self.stderr);
        out
    }

    /// Error describing this run, used when the outcome is a failure
    #[must_use]
    pub fn to_error(&self) -> LogosFormatError {
        LogosFormatError::FormatterFailed {
            code: self.code,
            output: self.combined_output(),
        }
    }
}

/// Handle on the formatter executable
#[derive(Debug, Clone)]
pub struct Formatter {
    program: PathBuf,
}

impl Default for Formatter {
    fn default() -> Self {
        Formatter::new(DEFAULT_FORMATTER)
    }
}

impl Formatter {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Formatter {
            program: program.into(),
        }
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Printable command line for logs
    #[must_use]
    pub fn command_line(&self, args: &[OsString]) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(args.iter().map(OsString::as_os_str))
            .map(OsStr::to_string_lossy)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the formatter once and wait for it
    ///
    /// A non-zero exit is reported through [`RunResult::outcome`], not as an
    /// error. Only failing to start or wait on the process is an error.
    pub fn run(&self, args: &[OsString]) -> Result<RunResult, LogosFormatError> {
        info!("Running '{}'", self.command_line(args));
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::inherit())
            .output()
            .map_err(|source| LogosFormatError::FormatterInvocation {
                program: self.program.clone(),
                source,
            })?;

        let outcome = if output.status.success() {
            RunOutcome::Success
        } else {
            RunOutcome::Failure
        };
        Ok(RunResult {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            outcome,
        })
    }

    /// Output of `<formatter> --version`
    pub fn version(&self) -> Result<String, LogosFormatError> {
        self.query("--version")
    }

    /// Output of `<formatter> -h`
    pub fn help_text(&self) -> Result<String, LogosFormatError> {
        self.query("-h")
    }

    fn query(&self, flag: &str) -> Result<String, LogosFormatError> {
        let result = self.run(&[OsString::from(flag)])?;
        if result.is_success() {
            Ok(result.stdout_lossy())
        } else {
            Err(result.to_error())
        }
    }
}
