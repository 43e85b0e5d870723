//! Help text built from the formatter's own `-h` output
//!
//! Users see clang-format's option list with the wrapper's name, the extra
//! wrapper flags slotted in next to `--verbose`, and the Logos extensions
//! listed among the Objective-C ones.

use std::sync::LazyLock;

use regex::Regex;

use crate::cli::PROGRAM_NAME;

/// `--verbose` option line: indentation, the flag, padding, then the `-` of its description
static VERBOSE_OPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<pre_space>\s+)--verbose\s+-").unwrap_or_else(|_| panic!("Invalid regex"))
});

/// `clang-format` not preceded by a dot, so `.clang-format` file names survive
static FORMATTER_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[^.])clang-format").unwrap_or_else(|_| panic!("Invalid regex"))
});

const OBJC_EXTENSIONS: &str = "Objective-C: .m .mm";
const OBJC_AND_LOGOS_EXTENSIONS: &str = "Objective-C: .m .mm .x .xi .xm .xmi";

/// Turn the formatter's help text into the wrapper's
#[must_use]
pub fn synthesize_help(formatter_help: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for (i, line) in formatter_help.lines().enumerate() {
        if i == 0 {
            lines.push(format!(
                "OVERVIEW: {PROGRAM_NAME}: A tool to format Logos code."
            ));
            continue;
        }
        lines.push(line.to_string());
        if let Some(caps) = VERBOSE_OPTION_RE.captures(line) {
            let pre_space = &caps["pre_space"];
            // Column of the description's leading `-`
            let desc_column = caps[0].len() - 1;
            lines.push(option_line(
                pre_space,
                "--verbose-logos",
                desc_column,
                &format!("If set, shows verbose operation of {PROGRAM_NAME}."),
            ));
            lines.push(option_line(
                pre_space,
                "--save-logos-temps",
                desc_column,
                &format!("If set, don't delete temporary {PROGRAM_NAME} files."),
            ));
        }
    }

    let joined = lines.join("\n");
    let renamed = FORMATTER_NAME_RE.replace_all(&joined, format!("${{1}}{PROGRAM_NAME}"));
    let mut help = renamed.replace(OBJC_EXTENSIONS, OBJC_AND_LOGOS_EXTENSIONS);
    help.push('\n');
    help
}

fn option_line(pre_space: &str, flag: &str, desc_column: usize, description: &str) -> String {
    let head = format!("{pre_space}{flag}");
    let padding = desc_column.saturating_sub(head.len()).max(1);
    format!("{head}{}- {description}", " ".repeat(padding))
}
