//! Catalog of Logos directives and how each one is rewritten.
//!
//! Every directive is a `%`-prefixed word that clang-format doesn't understand.
//! On the way in it becomes an Objective-C-looking `@logosformat<name>` marker;
//! on the way out the marker prefix turns back into `%`.
//!
//! The table is fixed and compiled once at first access.
use std::sync::LazyLock;

use regex::Regex;

/// Prefix every directive's marker starts with
pub const MARKER_PREFIX: &str = "@logosformat";

/// Prefix every directive starts with
pub const DIRECTIVE_PREFIX: &str = "%";

/// Statement terminator appended after block-level directives
pub const TERMINATOR: char = ';';

/// Block-level directives. clang-format needs a `;` after these or it glues
/// the following method declaration onto the directive line.
pub const TERMINATED_DIRECTIVES: &[&str] = &["%hook", "%end", "%new", "%group", "%subclass"];

/// Directives rewritten without a terminator
pub const PLAIN_DIRECTIVES: &[&str] = &[
    "%property",
    "%config",
    "%hookf",
    "%ctor",
    "%dtor",
    "%init",
    "%c",
    "%orig",
    "%log",
];

/// Whether a rewrite also adds and removes a terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCategory {
    Plain,
    Terminated,
}

/// A single directive with its marker and match pattern
#[derive(Debug, Clone)]
pub struct TokenRule {
    directive: &'static str,
    category: RuleCategory,
    marker: String,
    pattern: Regex,
}

impl TokenRule {
    fn new(directive: &'static str, category: RuleCategory) -> Self {
        let name = directive
            .strip_prefix(DIRECTIVE_PREFIX)
            .unwrap_or(directive);
        TokenRule {
            directive,
            category,
            marker: format!("{MARKER_PREFIX}{name}"),
            pattern: build_directive_re(name),
        }
    }

    /// Directive spelling, e.g. `%hook`
    #[must_use]
    pub fn directive(&self) -> &'static str {
        self.directive
    }

    #[must_use]
    pub fn category(&self) -> RuleCategory {
        self.category
    }

    /// Marker spelling, e.g. `@logosformathook`
    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Word-boundary pattern for the directive
    #[must_use]
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Check whether the directive occurs in `line` as a whole word
    #[must_use]
    pub fn is_match(&self, line: &str) -> bool {
        line.contains(self.directive) && self.pattern.is_match(line)
    }

    /// Number of whole-word occurrences in `line`
    #[must_use]
    pub fn count_matches(&self, line: &str) -> usize {
        if line.contains(self.directive) {
            self.pattern.find_iter(line).count()
        } else {
            0
        }
    }
}

/// Build the pattern for a directive name (without the `%`).
///
/// # Panics
///
/// Panics if the pattern is invalid, which only a bad catalog entry can cause.
fn build_directive_re(name: &str) -> Regex {
    Regex::new(&format!(r"%({})\b", regex::escape(name)))
        .unwrap_or_else(|_| panic!("Invalid directive pattern for: {name}"))
}

/// The full set of rewrite rules
#[derive(Debug, Clone)]
pub struct TokenRuleSet {
    plain: Vec<TokenRule>,
    terminated: Vec<TokenRule>,
}

impl TokenRuleSet {
    /// Build a rule set from the two directive catalogs
    #[must_use]
    pub fn from_catalogs(terminated: &[&'static str], plain: &[&'static str]) -> Self {
        TokenRuleSet {
            plain: plain
                .iter()
                .map(|d| TokenRule::new(d, RuleCategory::Plain))
                .collect(),
            terminated: terminated
                .iter()
                .map(|d| TokenRule::new(d, RuleCategory::Terminated))
                .collect(),
        }
    }

    /// Rules that don't touch terminators, in catalog order
    #[must_use]
    pub fn plain(&self) -> &[TokenRule] {
        &self.plain
    }

    /// Rules that append/strip a terminator, in catalog order
    #[must_use]
    pub fn terminated(&self) -> &[TokenRule] {
        &self.terminated
    }

    /// All rules, plain ones first
    pub fn iter(&self) -> impl Iterator<Item = &TokenRule> {
        self.plain.iter().chain(self.terminated.iter())
    }
}

/// Rules for the built-in Logos catalog
pub static LOGOS_RULES: LazyLock<TokenRuleSet> =
    LazyLock::new(|| TokenRuleSet::from_catalogs(TERMINATED_DIRECTIVES, PLAIN_DIRECTIVES));
