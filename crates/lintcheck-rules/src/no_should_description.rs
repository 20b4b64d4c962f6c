//! Rule forbidding example descriptions that start with "should".
//!
//! `it 'should return nil'` repeats what every example implies. The
//! present tense (`it 'returns nil'`) is shorter and reads as a statement
//! of behaviour.

use lintcheck_core::{
    Block, BlockKind, ConfigError, FileContext, Rule, RuleConfig, Severity, Suggestion, Violation,
};

/// Rule code for no-should-description.
pub const CODE: &str = "LC006";

/// Rule name for no-should-description.
pub const NAME: &str = "no-should-description";

/// Flags example labels that open with "should".
#[derive(Debug, Clone)]
pub struct NoShouldDescription {
    severity: Severity,
}

impl Default for NoShouldDescription {
    fn default() -> Self {
        Self::new()
    }
}

impl NoShouldDescription {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Warning,
        }
    }

    /// Builds the rule from its configuration table.
    ///
    /// # Errors
    ///
    /// Never fails; the signature matches the other rules.
    #[allow(clippy::unnecessary_wraps)]
    pub fn from_config(_config: &RuleConfig) -> Result<Self, ConfigError> {
        Ok(Self::new())
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// Splits off a leading "should"/"shouldn't"/"should not" word.
fn strip_should(label: &str) -> Option<(bool, &str)> {
    let trimmed = label.trim_start();
    let (word, rest) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));
    match word.to_lowercase().as_str() {
        "should" => match rest.trim_start().strip_prefix("not ") {
            Some(after_not) => Some((true, after_not.trim_start())),
            None => Some((false, rest.trim_start())),
        },
        "shouldn't" | "shouldnt" => Some((true, rest.trim_start())),
        _ => None,
    }
}

/// Third person singular of a bare verb: "return" → "returns".
fn third_person(verb: &str) -> String {
    match verb {
        "be" => "is".to_string(),
        "have" => "has".to_string(),
        "do" => "does".to_string(),
        "go" => "goes".to_string(),
        _ if verb.ends_with('y')
            && !verb.ends_with("ay")
            && !verb.ends_with("ey")
            && !verb.ends_with("oy") =>
        {
            format!("{}ies", &verb[..verb.len() - 1])
        }
        _ if ["s", "sh", "ch", "x", "z"].iter().any(|s| verb.ends_with(s)) => format!("{verb}es"),
        _ => format!("{verb}s"),
    }
}

/// Rewrites "should return nil" as "returns nil".
fn present_tense(negated: bool, rest: &str) -> String {
    if negated {
        return format!("does not {rest}").trim_end().to_string();
    }
    let (verb, tail) = rest.split_once(' ').unwrap_or((rest, ""));
    if verb.is_empty() {
        return String::new();
    }
    format!("{} {tail}", third_person(verb)).trim_end().to_string()
}

impl Rule for NoShouldDescription {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Example descriptions do not start with 'should'"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext, block: &Block, _ancestors: &[&Block]) -> Vec<Violation> {
        if block.kind() != BlockKind::Example {
            return Vec::new();
        }
        let Some((negated, rest)) = strip_should(block.label()) else {
            return Vec::new();
        };

        let violation = Violation::new(
            CODE,
            NAME,
            self.severity,
            ctx.block_location(block),
            format!("Example description '{}' starts with 'should'", block.label()),
        );
        let rewrite = present_tense(negated, rest);
        let violation = if rewrite.is_empty() {
            violation.with_suggestion(Suggestion::new("Describe the behaviour in the present tense"))
        } else {
            violation.with_suggestion(Suggestion::new(format!("Use the present tense: '{rewrite}'")))
        };
        vec![violation]
    }
}
