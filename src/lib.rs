//! logos-format - clang-format for Logos source files
//!
//! Hides Logos directives (`%hook`, `%orig`, ...) from clang-format behind
//! Objective-C-looking markers, formats, and puts the directives back.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::struct_excessive_bools)]

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod formatter;
pub mod help;
pub mod interrupt;
pub mod mapper;
pub mod process;
pub mod session;
pub mod tokens;
pub mod workspace;

// Re-export commonly used types
pub use cli::{build_cli, parse_args, parse_args_from, CliArgs};
pub use config::Config;
pub use error::{LogosFormatError, Result};
pub use formatter::{Formatter, RunResult};
pub use mapper::TokenMapper;
pub use process::{Pipeline, PipelineOptions, PipelineStatus};
pub use tokens::{TokenRule, TokenRuleSet, LOGOS_RULES};
