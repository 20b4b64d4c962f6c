//! Rule forbidding sibling contexts with the same label.
//!
//! Two `context 'when valid'` blocks under one parent usually mean a
//! copy-paste slip, and the report output cannot tell them apart.
//!
//! Labels are compared after trimming and collapsing whitespace, ignoring
//! case unless `case_sensitive = true`.

use lintcheck_core::{
    Block, BlockKind, ConfigError, FileContext, Rule, RuleConfig, Severity, Suggestion, Violation,
};
use std::collections::HashMap;

/// Rule code for no-duplicate-context.
pub const CODE: &str = "LC003";

/// Rule name for no-duplicate-context.
pub const NAME: &str = "no-duplicate-context";

/// Flags sibling contexts that repeat a label.
#[derive(Debug, Clone)]
pub struct NoDuplicateContext {
    case_sensitive: bool,
    severity: Severity,
}

impl Default for NoDuplicateContext {
    fn default() -> Self {
        Self::new()
    }
}

impl NoDuplicateContext {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            case_sensitive: false,
            severity: Severity::Error,
        }
    }

    /// Builds the rule from its configuration table.
    ///
    /// # Errors
    ///
    /// Never fails; the signature matches the other rules.
    #[allow(clippy::unnecessary_wraps)]
    pub fn from_config(config: &RuleConfig) -> Result<Self, ConfigError> {
        Ok(Self::new().case_sensitive(config.get_bool("case_sensitive", false)))
    }

    /// Sets whether label comparison is case-sensitive.
    #[must_use]
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn normalize(&self, label: &str) -> String {
        let collapsed = label.split_whitespace().collect::<Vec<_>>().join(" ");
        if self.case_sensitive {
            collapsed
        } else {
            collapsed.to_lowercase()
        }
    }
}

impl Rule for NoDuplicateContext {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Sibling contexts have distinct labels"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext, block: &Block, _ancestors: &[&Block]) -> Vec<Violation> {
        let mut first_seen: HashMap<String, usize> = HashMap::new();
        let mut violations = Vec::new();

        for child in block.children() {
            if child.kind() != BlockKind::Context {
                continue;
            }
            let key = self.normalize(child.label());
            let line = child.span().start_line;
            match first_seen.get(&key) {
                Some(first) => violations.push(
                    Violation::new(
                        CODE,
                        NAME,
                        self.severity,
                        ctx.block_location(child),
                        format!(
                            "Duplicate context '{}' (first defined on line {first})",
                            child.label()
                        ),
                    )
                    .with_suggestion(Suggestion::new(
                        "Merge the two contexts or give each a distinct label",
                    )),
                ),
                None => {
                    first_seen.insert(key, line);
                }
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::check_source;

    #[test]
    fn flags_repeated_sibling_label() {
        let source = r"describe User do
  context 'when valid' do
    it { is_expected.to be_valid }
  end

  context 'when valid' do
    it { is_expected.to be_persisted }
  end
end
";
        let violations = check_source(&NoDuplicateContext::new(), source);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, CODE);
        assert_eq!(violations[0].location.line, 6);
        assert_eq!(
            violations[0].message,
            "Duplicate context 'when valid' (first defined on line 2)"
        );
    }

    #[test]
    fn distinct_labels_pass() {
        let source = r"describe User do
  context 'when valid' do
  end
  context 'when invalid' do
  end
end
";
        assert!(check_source(&NoDuplicateContext::new(), source).is_empty());
    }

    #[test]
    fn same_label_under_different_parents_passes() {
        let source = r"describe User do
  describe '#save' do
    context 'when valid' do
    end
  end
  describe '#update' do
    context 'when valid' do
    end
  end
end
";
        assert!(check_source(&NoDuplicateContext::new(), source).is_empty());
    }

    #[test]
    fn comparison_normalizes_whitespace_and_case() {
        let source = r"describe User do
  context 'when valid' do
  end
  context '  When   VALID ' do
  end
  context 'when  valid' do
  end
end
";
        let violations = check_source(&NoDuplicateContext::new(), source);
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| v.message.ends_with("line 2)")));

        let strict = NoDuplicateContext::new().case_sensitive(true);
        assert_eq!(check_source(&strict, source).len(), 1);
    }

    #[test]
    fn suites_with_same_label_are_not_contexts() {
        let source = r"describe User do
  describe '#save' do
  end
  describe '#save' do
  end
end
";
        assert!(check_source(&NoDuplicateContext::new(), source).is_empty());
    }
}
