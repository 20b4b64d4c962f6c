//! Rule limiting each example to a single expectation.
//!
//! # Rationale
//!
//! An example with one expectation fails for exactly one reason and its
//! description says what that reason is. Several expectations hide later
//! failures behind the first one.
//!
//! # Detected Patterns
//!
//! Examples whose statements contain more than `max` assertion markers,
//! counted as whole words outside string literals and comments.
//!
//! # Configuration
//!
//! - `max`: allowed markers per example (default: 1)
//! - `markers`: marker words (default: `expect`, `is_expected`, `should`,
//!   `should_not`, `assert`)

use lintcheck_core::{
    code_only, Block, BlockKind, ConfigError, FileContext, Rule, RuleConfig, Severity, Suggestion,
    Violation,
};
use regex::Regex;

/// Rule code for single-expectation.
pub const CODE: &str = "LC002";

/// Rule name for single-expectation.
pub const NAME: &str = "single-expectation";

const DEFAULT_MARKERS: &[&str] = &["expect", "is_expected", "should", "should_not", "assert"];

/// Flags examples with more than one expectation.
#[derive(Debug, Clone)]
pub struct SingleExpectation {
    max: usize,
    markers: Regex,
    severity: Severity,
}

impl SingleExpectation {
    /// Builds the rule from its configuration table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if the marker list is empty
    /// or `max` is negative.
    pub fn from_config(config: &RuleConfig) -> Result<Self, ConfigError> {
        let markers = config
            .get_str_array("markers")
            .unwrap_or_else(|| DEFAULT_MARKERS.iter().map(|m| (*m).to_string()).collect());
        let alternation = markers
            .iter()
            .map(|m| regex::escape(m.trim()))
            .filter(|m| !m.is_empty())
            .collect::<Vec<_>>()
            .join("|");
        if alternation.is_empty() {
            return Err(ConfigError::InvalidPattern {
                owner: format!("rule '{NAME}'"),
                pattern: "markers".to_string(),
                message: "at least one marker is required".to_string(),
            });
        }
        let pattern = format!(r"\b(?:{alternation})\b");
        let markers = Regex::new(&pattern).map_err(|e| crate::invalid_pattern(NAME, &pattern, &e))?;

        let max = config.get_int("max", 1);
        let max = usize::try_from(max).map_err(|_| ConfigError::InvalidPattern {
            owner: format!("rule '{NAME}'"),
            pattern: "max".to_string(),
            message: format!("expected a non-negative count, got {max}"),
        })?;

        Ok(Self {
            max,
            markers,
            severity: Severity::Error,
        })
    }

    /// Sets the allowed number of expectations.
    #[must_use]
    pub fn max(mut self, max: usize) -> Self {
        self.max = max;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Counts marker occurrences in an example body.
    #[must_use]
    pub fn count(&self, block: &Block) -> usize {
        block
            .statements()
            .iter()
            .map(|s| self.markers.find_iter(&code_only(&s.text)).count())
            .sum()
    }
}

impl Rule for SingleExpectation {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Each example makes a single expectation"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext, block: &Block, _ancestors: &[&Block]) -> Vec<Violation> {
        if block.kind() != BlockKind::Example {
            return Vec::new();
        }
        let count = self.count(block);
        if count <= self.max {
            return Vec::new();
        }

        vec![Violation::new(
            CODE,
            NAME,
            self.severity,
            ctx.block_location(block),
            format!("Example has {count} expectations (max {})", self.max),
        )
        .with_suggestion(Suggestion::new(
            "Split it into one example per expectation, or use aggregate_failures",
        ))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::check_source;

    fn rule() -> SingleExpectation {
        SingleExpectation::from_config(&RuleConfig::default()).expect("defaults compile")
    }

    #[test]
    fn one_expectation_passes() {
        let source = r"describe Stack do
  it 'starts empty' do
    stack = Stack.new
    expect(stack).to be_empty
  end
  it { is_expected.to respond_to(:push) }
end
";
        assert!(check_source(&rule(), source).is_empty());
    }

    #[test]
    fn two_expectations_fail() {
        let source = r"describe Stack do
  it 'pushes' do
    stack.push(1)
    expect(stack.size).to eq 1
    expect(stack.top).to eq 1
  end
end
";
        let violations = check_source(&rule(), source);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, CODE);
        assert_eq!(violations[0].severity, Severity::Error);
        assert_eq!(violations[0].location.line, 2);
        assert_eq!(violations[0].message, "Example has 2 expectations (max 1)");
    }

    #[test]
    fn markers_on_one_line_count_separately() {
        let source = "describe A do\n  it('x') { expect(a).to eq 1; expect(b).to eq 2 }\nend\n";
        assert_eq!(check_source(&rule(), source).len(), 1);
    }

    #[test]
    fn whole_words_outside_strings_only() {
        let source = r#"describe Page do
  it 'shows text' do
    visit '/expectations'
    expected_title = "expect this"
    expect(page).to have_content(expected_title)
  end
end
"#;
        assert!(check_source(&rule(), source).is_empty());
    }

    #[test]
    fn should_and_should_not_are_distinct_words() {
        let rule = rule();
        let root = lintcheck_core::parse("it 'x' do\n  a.should_not be_nil\nend\n").unwrap();
        assert_eq!(rule.count(&root.children()[0]), 1);
    }

    #[test]
    fn configured_max_and_markers() {
        let config: RuleConfig = toml::from_str("max = 2\nmarkers = [\"assert_equal\"]").unwrap();
        let rule = SingleExpectation::from_config(&config).unwrap();
        let source = r"describe Math do
  it 'adds' do
    assert_equal 2, 1 + 1
    assert_equal 3, 1 + 2
    expect(1).to eq 1
  end
  it 'multiplies' do
    assert_equal 4, 2 * 2
    assert_equal 6, 2 * 3
    assert_equal 8, 2 * 4
  end
end
";
        let violations = check_source(&rule, source);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 7);
    }

    #[test]
    fn empty_markers_rejected() {
        let config: RuleConfig = toml::from_str("markers = []").unwrap();
        assert!(SingleExpectation::from_config(&config).is_err());
    }
}
