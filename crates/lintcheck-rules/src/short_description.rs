//! Rule keeping example descriptions short.
//!
//! Long descriptions usually hide a condition that belongs in a context:
//! `it 'returns nil when the user is missing'` reads better as
//! `context 'when the user is missing'` + `it 'returns nil'`.
//!
//! # Configuration
//!
//! - `max_length`: longest accepted label, in characters (default: 40)

use lintcheck_core::{
    Block, BlockKind, ConfigError, FileContext, Rule, RuleConfig, Severity, Suggestion, Violation,
};

/// Rule code for short-description.
pub const CODE: &str = "LC007";

/// Rule name for short-description.
pub const NAME: &str = "short-description";

const DEFAULT_MAX_LENGTH: usize = 40;

/// Flags example labels longer than a limit.
#[derive(Debug, Clone)]
pub struct ShortDescription {
    max_length: usize,
    severity: Severity,
}

impl Default for ShortDescription {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortDescription {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            severity: Severity::Info,
        }
    }

    /// Builds the rule from its configuration table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if `max_length` is not positive.
    pub fn from_config(config: &RuleConfig) -> Result<Self, ConfigError> {
        let raw = config.get_int("max_length", DEFAULT_MAX_LENGTH as i64);
        let max_length = usize::try_from(raw)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ConfigError::InvalidPattern {
                owner: format!("rule '{NAME}'"),
                pattern: "max_length".to_string(),
                message: format!("expected a positive length, got {raw}"),
            })?;
        Ok(Self::new().max_length(max_length))
    }

    /// Sets the longest accepted label.
    #[must_use]
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for ShortDescription {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Example descriptions stay under a length limit"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext, block: &Block, _ancestors: &[&Block]) -> Vec<Violation> {
        if block.kind() != BlockKind::Example {
            return Vec::new();
        }
        let length = block.label().trim().chars().count();
        if length <= self.max_length {
            return Vec::new();
        }

        vec![Violation::new(
            CODE,
            NAME,
            self.severity,
            ctx.block_location(block),
            format!(
                "Example description is {length} characters long (max {})",
                self.max_length
            ),
        )
        .with_suggestion(Suggestion::new(
            "Move conditions into a context and keep the example label short",
        ))]
    }
}
