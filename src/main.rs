//! logos-format - clang-format for Logos source files

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::io::{self, Write};
use std::panic::{self, UnwindSafe};
use std::path::Path;

use logos_format::cli::{render_wrapper_help, PROGRAM_NAME};
use logos_format::error::{exit_code_for, GENERIC_FAILURE_CODE};
use logos_format::help::synthesize_help;
use logos_format::{
    interrupt, parse_args, CliArgs, Config, Formatter, Pipeline, PipelineOptions,
    PipelineStatus, Result,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    std::process::exit(run_guarded(run));
}

/// Run `body`, turning a panic into the generic failure code
fn run_guarded<F>(body: F) -> i32
where
    F: FnOnce() -> i32 + UnwindSafe,
{
    panic::catch_unwind(body).unwrap_or(GENERIC_FAILURE_CODE)
}

fn run() -> i32 {
    let args = parse_args();

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            init_logging(args.verbose_logos);
            error!("Can't determine the current directory: {e}");
            return GENERIC_FAILURE_CODE;
        }
    };

    // CLI flags can only switch things on
    let (mut config, config_problems) = Config::load(&cwd);
    config.verbose |= args.verbose_logos;
    config.save_temps |= args.save_logos_temps;
    init_logging(config.verbose);
    for problem in &config_problems {
        warn!("Ignoring config file: {problem}");
    }

    match real_main(&args, &config, &cwd) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            exit_code_for(&e)
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over the verbosity flag
fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
    panic::set_hook(Box::new(|info| error!("internal error: {info}")));
}

fn real_main(args: &CliArgs, config: &Config, cwd: &Path) -> Result<i32> {
    if let Some(error) = config.validate() {
        anyhow::bail!("Invalid configuration: {error}");
    }
    let formatter = Formatter::new(&config.clang_format);

    if args.help {
        print_help(&formatter)?;
        return Ok(0);
    }
    if args.version {
        print_version(&formatter)?;
        return Ok(0);
    }

    if config.verbose {
        info!("{PROGRAM_NAME}: verbose-logos mode enabled");
    }
    interrupt::install_handler();

    let options = PipelineOptions {
        in_place: args.in_place,
        save_temps: config.save_temps,
        verbose: config.verbose,
        watch_interrupts: true,
    };
    let mut pipeline = Pipeline::new(&formatter, options, cwd, io::stdout().lock());
    if pipeline.run(&args.formatter_args)? == PipelineStatus::Interrupted {
        info!("{PROGRAM_NAME} was interrupted");
    }
    Ok(0)
}

fn print_help(formatter: &Formatter) -> Result<()> {
    let help = match formatter.help_text() {
        Ok(text) => synthesize_help(&text),
        Err(e) => {
            warn!("Couldn't get help from the formatter ({e}), showing {PROGRAM_NAME} options only");
            render_wrapper_help()
        }
    };
    io::stdout().write_all(help.as_bytes())?;
    Ok(())
}

fn print_version(formatter: &Formatter) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "{PROGRAM_NAME} version {}",
        env!("CARGO_PKG_VERSION")
    )?;
    match formatter.version() {
        Ok(version) => stdout.write_all(version.as_bytes())?,
        Err(e) => warn!("Couldn't get the formatter's version: {e}"),
    }
    Ok(())
}
