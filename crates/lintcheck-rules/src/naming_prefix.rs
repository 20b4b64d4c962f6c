//! Rule requiring method descriptions to start with `.` or `#`.
//!
//! # Rationale
//!
//! A group describing a method reads best when the label says which kind of
//! method it is: `.build` for a class method, `#save` for an instance method.
//! A bare `describe 'save'` leaves the reader guessing.
//!
//! # Detected Patterns
//!
//! Suites and examples directly under a top-level suite whose label is a
//! single identifier, optionally ending in `?`, `!` or `=`
//! (`describe 'save'`, `it 'valid?'`).
//!
//! # Configuration
//!
//! - `suite_pattern`: regex for suite labels
//! - `example_pattern`: regex for example labels. Projects that write
//!   one-word prose examples (`it 'adds'`) can set it to
//!   [`METHOD_SIGNAL_EXAMPLE_PATTERN`], which only matches identifiers that
//!   carry an underscore, a trailing `?`/`!`/`=`, or an argument list.

use lintcheck_core::{
    Block, BlockKind, ConfigError, FileContext, Rule, RuleConfig, Severity, Suggestion, Violation,
};
use regex::Regex;

/// Rule code for naming-prefix.
pub const CODE: &str = "LC001";

/// Rule name for naming-prefix.
pub const NAME: &str = "naming-prefix";

/// Identifier-like label, optionally followed by `?`, `!` or `=`.
const DEFAULT_PATTERN: &str = r"^[a-z_][A-Za-z0-9_]*[?!=]?$";

/// Narrower example pattern that leaves one-word prose alone.
pub const METHOD_SIGNAL_EXAMPLE_PATTERN: &str =
    r"^[a-z_][A-Za-z0-9_]*(?:_[A-Za-z0-9_]*[?!=]?|[?!=]|\(.*\))$";

/// Requires method descriptions to carry a `.` or `#` prefix.
#[derive(Debug, Clone)]
pub struct NamingPrefix {
    suite_pattern: Regex,
    example_pattern: Regex,
    severity: Severity,
}

impl NamingPrefix {
    /// Builds the rule from its configuration table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if a configured regex does
    /// not compile.
    pub fn from_config(config: &RuleConfig) -> Result<Self, ConfigError> {
        let compile = |key: &str, default: &str| {
            let pattern = config.get_str(key, default);
            Regex::new(pattern).map_err(|e| crate::invalid_pattern(NAME, pattern, &e))
        };
        Ok(Self {
            suite_pattern: compile("suite_pattern", DEFAULT_PATTERN)?,
            example_pattern: compile("example_pattern", DEFAULT_PATTERN)?,
            severity: Severity::Warning,
        })
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn looks_like_method(&self, block: &Block) -> bool {
        let label = block.label().trim();
        if label.is_empty() || label.starts_with('.') || label.starts_with('#') {
            return false;
        }
        match block.kind() {
            BlockKind::Suite => self.suite_pattern.is_match(label),
            BlockKind::Example => self.example_pattern.is_match(label),
            BlockKind::Context => false,
        }
    }
}

/// A suite that sits directly under the file root.
fn is_top_level_suite(ancestors: &[&Block]) -> bool {
    matches!(ancestors, [_root, parent] if parent.kind() == BlockKind::Suite)
}

impl Rule for NamingPrefix {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Method descriptions start with '.' (class) or '#' (instance)"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext, block: &Block, ancestors: &[&Block]) -> Vec<Violation> {
        if !is_top_level_suite(ancestors) || !self.looks_like_method(block) {
            return Vec::new();
        }

        let label = block.label().trim();
        vec![Violation::new(
            CODE,
            NAME,
            self.severity,
            ctx.block_location(block),
            format!("'{label}' looks like a method name but has no '.' or '#' prefix"),
        )
        .with_suggestion(Suggestion::new(format!(
            "Use '#{label}' for an instance method or '.{label}' for a class method"
        )))]
    }
}
