//! Command-line interface for logos-format.
//!
//! The wrapper owns a handful of flags; everything else belongs to
//! clang-format. Raw arguments are split first so wrapper flags can be mixed
//! freely with formatter flags and files, then the wrapper's share is parsed
//! with the clap builder API.

use std::ffi::{OsStr, OsString};

use clap::{Arg, ArgAction, Command};

/// Name the wrapper presents itself under
pub const PROGRAM_NAME: &str = "logos-format";

/// Flags parsed by the wrapper rather than forwarded
const WRAPPER_FLAGS: &[&str] = &[
    "--verbose-logos",
    "--save-logos-temps",
    "-i",
    "--version",
    "-h",
    "--help",
];

/// Marks the end of wrapper flag recognition
const END_OF_FLAGS: &str = "--";

/// CLI arguments parsed from command line
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Log what the wrapper does
    pub verbose_logos: bool,

    /// Keep the temporary workspace
    pub save_logos_temps: bool,

    /// Rewrite the Logos files instead of printing
    pub in_place: bool,

    /// Print version information
    pub version: bool,

    /// Print help
    pub help: bool,

    /// Everything destined for the formatter, in original order
    pub formatter_args: Vec<OsString>,
}

/// Build the clap Command for the wrapper's own flags
#[must_use]
pub fn build_cli() -> Command {
    Command::new(PROGRAM_NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool to format Logos code with clang-format")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("verbose-logos")
                .long("verbose-logos")
                .help(format!("If set, shows verbose operation of {PROGRAM_NAME}"))
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("save-logos-temps")
                .long("save-logos-temps")
                .help(format!("If set, don't delete temporary {PROGRAM_NAME} files"))
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("in-place")
                .short('i')
                .help("Inplace edit <file>s, if specified")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .help("Display the version of this program")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("help")
                .short('h')
                .long("help")
                .help("Display available options")
                .action(ArgAction::SetTrue),
        )
}

/// Parse CLI arguments from command line
#[must_use]
pub fn parse_args() -> CliArgs {
    parse_args_from(std::env::args_os())
}

/// Parse CLI arguments from an iterator (for testing)
///
/// The first item is the program name.
#[must_use]
pub fn parse_args_from<I, T>(args: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let (wrapper_args, formatter_args) = split_args(args);
    let matches = build_cli().get_matches_from(wrapper_args);
    CliArgs {
        verbose_logos: matches.get_flag("verbose-logos"),
        save_logos_temps: matches.get_flag("save-logos-temps"),
        in_place: matches.get_flag("in-place"),
        version: matches.get_flag("version"),
        help: matches.get_flag("help"),
        formatter_args,
    }
}

/// Help for the wrapper flags alone, used when the formatter has none to offer
#[must_use]
pub fn render_wrapper_help() -> String {
    build_cli().render_help().to_string()
}

/// Separate wrapper flags from formatter arguments
///
/// Returns `(wrapper, formatter)`. The program name leads the wrapper list.
/// A wrapper flag given twice is kept once. Everything from `--` on, `--`
/// included, goes to the formatter.
fn split_args<I, T>(args: I) -> (Vec<OsString>, Vec<OsString>)
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut iter = args.into_iter().map(Into::into);
    let mut wrapper: Vec<OsString> = iter
        .next()
        .map_or_else(|| vec![OsString::from(PROGRAM_NAME)], |name| vec![name]);
    let mut formatter = Vec::new();
    let mut flags_done = false;

    for arg in iter {
        if !flags_done && arg == END_OF_FLAGS {
            flags_done = true;
            formatter.push(arg);
        } else if !flags_done && is_wrapper_flag(&arg) {
            if !wrapper[1..].contains(&arg) {
                wrapper.push(arg);
            }
        } else {
            formatter.push(arg);
        }
    }
    (wrapper, formatter)
}

fn is_wrapper_flag(arg: &OsStr) -> bool {
    arg.to_str().is_some_and(|s| WRAPPER_FLAGS.contains(&s))
}
