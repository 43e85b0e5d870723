//! Line-by-line rewriting between Logos and clang-format-legal text
//!
//! [`TokenMapper::forward_line`] hides directives from clang-format,
//! [`TokenMapper::reverse_line`] brings them back. The two are close to
//! inverses but not exact: reverse doesn't know which `;` it added, so it
//! strips trailing terminators from any line that ends up holding a
//! block-level directive.

use std::borrow::Cow;
use std::io::{self, BufRead, Write};

use regex::NoExpand;

use crate::tokens::{TokenRuleSet, DIRECTIVE_PREFIX, LOGOS_RULES, MARKER_PREFIX, TERMINATOR};

#[derive(Debug, Clone, Copy)]
enum Direction {
    Forward,
    Reverse,
}

/// Applies a [`TokenRuleSet`] to lines and streams
#[derive(Debug, Clone, Copy)]
pub struct TokenMapper<'r> {
    rules: &'r TokenRuleSet,
}

impl Default for TokenMapper<'static> {
    fn default() -> Self {
        TokenMapper::new(&LOGOS_RULES)
    }
}

impl<'r> TokenMapper<'r> {
    #[must_use]
    pub fn new(rules: &'r TokenRuleSet) -> Self {
        TokenMapper { rules }
    }

    /// Rewrite directives in a single line into markers
    ///
    /// Plain directives are replaced first. Each block-level directive
    /// occurrence is then replaced and adds one `;` at the end of the line
    /// content, before any line ending.
    #[must_use]
    pub fn forward_line<'a>(&self, line: &'a str) -> Cow<'a, str> {
        let (content, ending) = split_line_ending(line);
        if !content.contains(DIRECTIVE_PREFIX) {
            return Cow::Borrowed(line);
        }

        let mut mapped = Cow::Borrowed(content);
        for rule in self.rules.plain() {
            if rule.is_match(&mapped) {
                let replaced = rule
                    .pattern()
                    .replace_all(&mapped, NoExpand(rule.marker()))
                    .into_owned();
                mapped = Cow::Owned(replaced);
            }
        }

        let mut terminators = 0;
        for rule in self.rules.terminated() {
            let count = rule.count_matches(&mapped);
            if count > 0 {
                let replaced = rule
                    .pattern()
                    .replace_all(&mapped, NoExpand(rule.marker()))
                    .into_owned();
                mapped = Cow::Owned(replaced);
                terminators += count;
            }
        }

        match mapped {
            Cow::Borrowed(_) => Cow::Borrowed(line),
            Cow::Owned(mut out) => {
                out.extend(std::iter::repeat(TERMINATOR).take(terminators));
                out.push_str(ending);
                Cow::Owned(out)
            }
        }
    }

    /// Rewrite markers in a single line back into directives
    #[must_use]
    pub fn reverse_line<'a>(&self, line: &'a str) -> Cow<'a, str> {
        let (content, ending) = split_line_ending(line);
        if !content.contains(MARKER_PREFIX) {
            return Cow::Borrowed(line);
        }

        let mut out = content.replace(MARKER_PREFIX, DIRECTIVE_PREFIX);
        let terminators: usize = self
            .rules
            .terminated()
            .iter()
            .map(|rule| rule.count_matches(&out))
            .sum();
        for _ in 0..terminators {
            if !strip_trailing_terminator(&mut out) {
                break;
            }
        }
        out.push_str(ending);
        Cow::Owned(out)
    }

    /// Forward-map every line of `input` into `output`
    pub fn forward_stream<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> io::Result<()> {
        self.map_stream(input, output, Direction::Forward)
    }

    /// Reverse-map every line of `input` into `output`
    pub fn reverse_stream<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> io::Result<()> {
        self.map_stream(input, output, Direction::Reverse)
    }

    /// Reverse-map a whole text held in memory, such as captured formatter output
    ///
    /// Works on bytes so lines that aren't UTF-8 come back unchanged.
    pub fn reverse_text(&self, text: &[u8]) -> io::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(text.len());
        self.reverse_stream(&mut &*text, &mut out)?;
        Ok(out)
    }

    fn map_line<'a>(&self, line: &'a str, direction: Direction) -> Cow<'a, str> {
        match direction {
            Direction::Forward => self.forward_line(line),
            Direction::Reverse => self.reverse_line(line),
        }
    }

    fn map_stream<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
        direction: Direction,
    ) -> io::Result<()> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            // Directives are ASCII; a line that isn't UTF-8 can't hold one we'd rewrite safely
            match std::str::from_utf8(&buf) {
                Ok(line) => output.write_all(self.map_line(line, direction).as_bytes())?,
                Err(_) => output.write_all(&buf)?,
            }
        }
        output.flush()
    }
}

/// Split a line into its content and its `\n` / `\r\n` ending (possibly empty)
fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, &line[content.len()..])
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, &line[content.len()..])
    } else {
        (line, "")
    }
}

/// Remove the last terminator if it is the last non-whitespace character.
/// Whitespace after it is kept.
fn strip_trailing_terminator(content: &mut String) -> bool {
    let trimmed_len = content.trim_end().len();
    if content[..trimmed_len].ends_with(TERMINATOR) {
        content.remove(trimmed_len - TERMINATOR.len_utf8());
        true
    } else {
        false
    }
}
