//! Rule requiring context labels to open with a condition word.
//!
//! A context describes the situation the examples run in, so it reads best
//! as `context 'when logged in'`, `context 'with a coupon'` or
//! `context 'without a token'`.
//!
//! # Configuration
//!
//! - `prefixes`: accepted first words (default: `when`, `with`, `without`)

use lintcheck_core::{
    Block, BlockKind, ConfigError, FileContext, Rule, RuleConfig, Severity, Suggestion, Violation,
};

/// Rule code for context-wording.
pub const CODE: &str = "LC005";

/// Rule name for context-wording.
pub const NAME: &str = "context-wording";

const DEFAULT_PREFIXES: &[&str] = &["when", "with", "without"];

/// Requires context labels to start with a condition word.
#[derive(Debug, Clone)]
pub struct ContextWording {
    prefixes: Vec<String>,
    severity: Severity,
}

impl Default for ContextWording {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextWording {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefixes: DEFAULT_PREFIXES.iter().map(|p| (*p).to_string()).collect(),
            severity: Severity::Warning,
        }
    }

    /// Builds the rule from its configuration table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if `prefixes` is empty.
    pub fn from_config(config: &RuleConfig) -> Result<Self, ConfigError> {
        let mut rule = Self::new();
        if let Some(prefixes) = config.get_str_array("prefixes") {
            if prefixes.is_empty() {
                return Err(ConfigError::InvalidPattern {
                    owner: format!("rule '{NAME}'"),
                    pattern: "prefixes".to_string(),
                    message: "at least one prefix is required".to_string(),
                });
            }
            rule = rule.prefixes(prefixes);
        }
        Ok(rule)
    }

    /// Sets the accepted first words.
    #[must_use]
    pub fn prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.prefixes = prefixes.into_iter().map(|p| p.to_lowercase()).collect();
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for ContextWording {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Context labels start with 'when', 'with' or 'without'"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext, block: &Block, _ancestors: &[&Block]) -> Vec<Violation> {
        if block.kind() != BlockKind::Context {
            return Vec::new();
        }
        let first = block
            .label()
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();
        if self.prefixes.contains(&first) {
            return Vec::new();
        }

        vec![Violation::new(
            CODE,
            NAME,
            self.severity,
            ctx.block_location(block),
            format!(
                "Context '{}' should start with one of: {}",
                block.label(),
                self.prefixes.join(", ")
            ),
        )
        .with_suggestion(Suggestion::new(format!(
            "e.g. context 'when {}'",
            block.label().trim()
        )))]
    }
}
