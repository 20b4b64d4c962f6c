//! Rule flagging discouraged expectation syntax.
//!
//! # Detected Patterns
//!
//! A deny-list of regexes matched against each example statement (string
//! contents and comments blanked out). Each entry carries the preferred
//! form, which becomes the violation's suggestion. Defaults:
//!
//! - `lambda { ... }.should raise_error` → `expect { ... }.to raise_error`
//! - `.not_to be_falsey` → `.to be_truthy`
//! - `.not_to be_invalid` → `.to be_valid`
//! - `obj.should ...` → `expect(obj).to ...`
//! - `expect(list.size).to eq n` → `expect(list).to have_attributes(size: n)`
//!
//! A statement is reported once, for the first entry that matches it.
//!
//! # Configuration
//!
//! ```toml
//! [rules.discouraged-syntax]
//! patterns = [
//!   { pattern = '\.should\b', prefer = "expect(...).to", message = "legacy should syntax" },
//! ]
//! ```
//!
//! A configured `patterns` list replaces the defaults.

use lintcheck_core::{
    code_only, Block, BlockKind, ConfigError, FileContext, Rule, RuleConfig, Severity, Statement,
    Suggestion, Violation,
};
use regex::Regex;
use serde::Deserialize;

/// Rule code for discouraged-syntax.
pub const CODE: &str = "LC004";

/// Rule name for discouraged-syntax.
pub const NAME: &str = "discouraged-syntax";

/// `(pattern, prefer, message)`
const DEFAULT_PATTERNS: &[(&str, &str, &str)] = &[
    (
        r"(?:\blambda\b|\bproc\b|->)\s*(?:\{|\bdo\b).*\.should(?:_not)?\s+raise_error",
        "expect { ... }.to raise_error(...)",
        "Lambda-style raise expectation",
    ),
    (
        r"\.(?:not_to|to_not)\s+be_falsey\b",
        "expect(...).to be_truthy",
        "Double negative: not_to be_falsey",
    ),
    (
        r"\.(?:not_to|to_not)\s+be_invalid\b",
        "expect(...).to be_valid",
        "Double negative: not_to be_invalid",
    ),
    (
        r"\.should(?:_not)?\b",
        "expect(...).to ...",
        "Legacy should syntax",
    ),
    (
        r"\bexpect\(\s*[^()]*\.(?:size|length|count)\s*\)\s*\.to\s+eq\b",
        "expect(collection).to have_attributes(size: n)",
        "Raw size equality check",
    ),
];

/// One entry of the deny-list as written in the configuration file.
#[derive(Debug, Clone, Deserialize)]
struct PatternConfig {
    pattern: String,
    prefer: String,
    #[serde(default)]
    message: Option<String>,
}

/// A compiled deny-list entry.
#[derive(Debug, Clone)]
pub struct DiscouragedPattern {
    regex: Regex,
    prefer: String,
    message: String,
}

impl DiscouragedPattern {
    /// Compiles a deny-list entry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if `pattern` is not a valid regex.
    pub fn new(
        pattern: &str,
        prefer: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            regex: Regex::new(pattern).map_err(|e| crate::invalid_pattern(NAME, pattern, &e))?,
            prefer: prefer.into(),
            message: message.into(),
        })
    }
}

/// Flags statements that use discouraged syntax.
#[derive(Debug, Clone)]
pub struct DiscouragedSyntax {
    patterns: Vec<DiscouragedPattern>,
    severity: Severity,
}

impl DiscouragedSyntax {
    /// Builds the rule from its configuration table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if a pattern does not compile
    /// and [`ConfigError::Parse`] if the `patterns` table is malformed.
    pub fn from_config(config: &RuleConfig) -> Result<Self, ConfigError> {
        let patterns = match config.options.get("patterns") {
            Some(value) => {
                let entries: Vec<PatternConfig> =
                    value.clone().try_into().map_err(|e: toml::de::Error| {
                        ConfigError::Parse {
                            message: format!("rules.{NAME}.patterns: {e}"),
                        }
                    })?;
                entries
                    .into_iter()
                    .map(|entry| {
                        let message = entry
                            .message
                            .unwrap_or_else(|| format!("Matches discouraged pattern '{}'", entry.pattern));
                        DiscouragedPattern::new(&entry.pattern, entry.prefer, message)
                    })
                    .collect::<Result<Vec<_>, _>>()?
            }
            None => DEFAULT_PATTERNS
                .iter()
                .map(|(pattern, prefer, message)| DiscouragedPattern::new(pattern, *prefer, *message))
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(Self {
            patterns,
            severity: Severity::Info,
        })
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn check_statement(&self, ctx: &FileContext, statement: &Statement) -> Option<Violation> {
        let code = code_only(&statement.text);
        let (pattern, found) = self
            .patterns
            .iter()
            .find_map(|p| p.regex.find(&code).map(|m| (p, m)))?;

        // Statements are trimmed slices of their line, possibly after a
        // one-liner's `{` or a `;`.
        let offset = ctx.line(statement.line).map_or(0, |line| {
            line.find(statement.text.as_str())
                .unwrap_or_else(|| line.len() - line.trim_start().len())
        });

        Some(
            Violation::new(
                CODE,
                NAME,
                self.severity,
                ctx.location(statement.line, offset + found.start() + 1),
                pattern.message.clone(),
            )
            .with_suggestion(Suggestion::new(format!("Prefer `{}`", pattern.prefer))),
        )
    }
}

impl Rule for DiscouragedSyntax {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags deprecated or awkward expectation syntax"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext, block: &Block, _ancestors: &[&Block]) -> Vec<Violation> {
        if block.kind() != BlockKind::Example {
            return Vec::new();
        }
        block
            .statements()
            .iter()
            .filter_map(|s| self.check_statement(ctx, s))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::check_source;

    fn rule() -> DiscouragedSyntax {
        DiscouragedSyntax::from_config(&RuleConfig::default()).expect("defaults compile")
    }

    fn messages(source: &str) -> Vec<String> {
        check_source(&rule(), source)
            .into_iter()
            .map(|v| v.message)
            .collect()
    }

    #[test]
    fn flags_each_default_pattern() {
        let source = r"describe Account do
  it 'raises' do
    lambda { account.withdraw(500) }.should raise_error(InsufficientFunds)
  end
  it 'is active' do
    expect(account.active?).not_to be_falsey
  end
  it 'is valid' do
    expect(account).to_not be_invalid
  end
  it 'has a name' do
    account.name.should eq 'main'
  end
  it 'has entries' do
    expect(account.entries.size).to eq 2
  end
end
";
        assert_eq!(
            messages(source),
            vec![
                "Lambda-style raise expectation",
                "Double negative: not_to be_falsey",
                "Double negative: not_to be_invalid",
                "Legacy should syntax",
                "Raw size equality check",
            ]
        );
    }

    #[test]
    fn preferred_forms_pass() {
        let source = r"describe Account do
  it 'raises' do
    expect { account.withdraw(500) }.to raise_error(InsufficientFunds)
  end
  it 'is valid' do
    expect(account).to be_valid
  end
  it { is_expected.to have_attributes(size: 2) }
end
";
        assert!(messages(source).is_empty());
    }

    #[test]
    fn reports_statement_line_column_and_suggestion() {
        let source = "describe A do\n  it 'x' do\n    setup\n    a.should be_nil\n  end\nend\n";
        let violations = check_source(&rule(), source);
        assert_eq!(violations.len(), 1);
        let v = &violations[0];
        assert_eq!(v.severity, Severity::Info);
        assert_eq!((v.location.line, v.location.column), (4, 6));
        assert_eq!(
            v.suggestion.as_ref().map(|s| s.message.as_str()),
            Some("Prefer `expect(...).to ...`")
        );
    }

    #[test]
    fn one_liner_columns_point_at_the_match() {
        let source = "describe A do\n  it { a.should be_nil }\n  it('b') { setup; b.should be_nil }\nend\n";
        let columns: Vec<(usize, usize)> = check_source(&rule(), source)
            .iter()
            .map(|v| (v.location.line, v.location.column))
            .collect();
        assert_eq!(columns, vec![(2, 9), (3, 21)]);
    }

    #[test]
    fn text_inside_strings_is_ignored() {
        let source = "describe A do\n  it 'x' do\n    expect(log).to include('user.should be ok')\n  end\nend\n";
        assert!(messages(source).is_empty());
    }

    #[test]
    fn configured_patterns_replace_defaults() {
        let config: RuleConfig = toml::from_str(
            r#"
patterns = [
  { pattern = '\bsleep\b', prefer = "a time helper", message = "Sleeping in a test" },
  { pattern = '\ballow_any_instance_of\b', prefer = "instance_double" },
]
"#,
        )
        .unwrap();
        let rule = DiscouragedSyntax::from_config(&config).unwrap();
        let source = "describe A do\n  it 'x' do\n    sleep 1\n    a.should be_nil\n    allow_any_instance_of(A).to receive(:b)\n  end\nend\n";
        let messages: Vec<String> = check_source(&rule, source)
            .into_iter()
            .map(|v| v.message)
            .collect();
        assert_eq!(
            messages,
            vec![
                "Sleeping in a test".to_string(),
                r"Matches discouraged pattern '\ballow_any_instance_of\b'".to_string(),
            ]
        );
    }

    #[test]
    fn malformed_patterns_are_config_errors() {
        let config: RuleConfig = toml::from_str(r#"patterns = [{ pattern = "(", prefer = "x" }]"#).unwrap();
        assert!(matches!(
            DiscouragedSyntax::from_config(&config),
            Err(ConfigError::InvalidPattern { .. })
        ));

        let config: RuleConfig = toml::from_str(r#"patterns = ["just a string"]"#).unwrap();
        assert!(matches!(
            DiscouragedSyntax::from_config(&config),
            Err(ConfigError::Parse { .. })
        ));
    }
}
