//! Comment-based allowance directives.
//!
//! Supports directives like:
//! ```text
//! # lintcheck: allow(single-expectation) reason="checks a pair"
//! ```
//!
//! A directive applies to its own line and to the line below it, so it can
//! trail the offending code or sit on its own line above it.

use std::collections::HashSet;

/// Result of checking for allow directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// Rule is not allowed.
    Denied,
    /// Rule is allowed with optional reason.
    Allowed {
        /// The reason provided (if any).
        reason: Option<String>,
    },
}

impl AllowCheck {
    /// Returns true if allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if allowed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// Parsed allowance directive.
#[derive(Debug, Clone)]
pub struct AllowDirective {
    /// Rule names or codes that are allowed.
    pub rules: HashSet<String>,
    /// Optional reason for the allowance.
    pub reason: Option<String>,
}

impl AllowDirective {
    fn covers(&self, rule_name: &str, rule_code: &str) -> bool {
        self.rules.contains("all") || self.rules.contains(rule_name) || self.rules.contains(rule_code)
    }
}

/// Checks the lines of a file for an allowance directive covering a rule.
///
/// Looks at `line` and the line before it (both 1-indexed). The rule
/// matches by name or by code.
#[must_use]
pub fn check_allow_with_reason(
    lines: &[&str],
    line: usize,
    rule_name: &str,
    rule_code: &str,
) -> AllowCheck {
    for check_line in [line, line.saturating_sub(1)] {
        if check_line == 0 || check_line > lines.len() {
            continue;
        }

        if let Some(directive) = parse_allow_directive(lines[check_line - 1]) {
            if directive.covers(rule_name, rule_code) {
                return AllowCheck::Allowed {
                    reason: directive.reason,
                };
            }
        }
    }

    AllowCheck::Denied
}

/// Parses an allowance directive from the comment part of a line.
fn parse_allow_directive(line: &str) -> Option<AllowDirective> {
    line.match_indices('#')
        .find_map(|(i, _)| parse_directive_body(line[i + 1..].trim_start()))
}

fn parse_directive_body(comment: &str) -> Option<AllowDirective> {
    let directive = comment.strip_prefix("lintcheck:")?.trim();
    let allow_content = directive.strip_prefix("allow(")?.trim();

    let paren_end = allow_content.find(')')?;
    let rules: HashSet<String> = allow_content[..paren_end]
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if rules.is_empty() {
        return None;
    }

    let rest = allow_content[paren_end + 1..].trim();
    let reason = rest
        .strip_prefix("reason=")
        .and_then(|r| r.trim().strip_prefix('"'))
        .and_then(|r| r.find('"').map(|end| r[..end].trim().to_string()))
        .filter(|r| !r.is_empty());

    Some(AllowDirective { rules, reason })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(content: &str) -> Vec<&str> {
        content.lines().collect()
    }

    #[test]
    fn test_parse_allow_directive() {
        let directive = parse_allow_directive("# lintcheck: allow(single-expectation)").unwrap();
        assert!(directive.rules.contains("single-expectation"));
        assert!(directive.reason.is_none());
    }

    #[test]
    fn test_parse_allow_directive_with_reason() {
        let directive =
            parse_allow_directive("#lintcheck: allow(LC004) reason=\"legacy matcher\"").unwrap();
        assert!(directive.rules.contains("LC004"));
        assert_eq!(directive.reason, Some("legacy matcher".to_string()));
    }

    #[test]
    fn test_parse_multiple_rules() {
        let directive =
            parse_allow_directive("# lintcheck: allow(naming-prefix, short-description)").unwrap();
        assert!(directive.rules.contains("naming-prefix"));
        assert!(directive.rules.contains("short-description"));
    }

    #[test]
    fn test_ignores_other_comments() {
        assert!(parse_allow_directive("# rubocop:disable Foo").is_none());
        assert!(parse_allow_directive("# lintcheck: allow()").is_none());
        assert!(parse_allow_directive("expect(x).to eq 1").is_none());
    }

    #[test]
    fn test_trailing_directive_on_same_line() {
        let content = "it 'x' do\n  expect(a).to eq 1; expect(b).to eq 2 # lintcheck: allow(all) reason=\"pair\"\nend\n";
        let result = check_allow_with_reason(&lines(content), 2, "single-expectation", "LC002");
        assert!(result.is_allowed());
        assert_eq!(result.reason(), Some("pair"));
    }

    #[test]
    fn test_directive_on_line_above() {
        let content = "describe A do\n  # lintcheck: allow(LC003)\n  context 'when a' do\n  end\nend\n";
        assert!(check_allow_with_reason(&lines(content), 3, "no-duplicate-context", "LC003").is_allowed());
        assert!(!check_allow_with_reason(&lines(content), 3, "context-wording", "LC005").is_allowed());
        assert!(!check_allow_with_reason(&lines(content), 4, "no-duplicate-context", "LC003").is_allowed());
    }

    #[test]
    fn test_check_allow_denied() {
        let content = "it 'x' do\n  expect(a).to eq 1\nend\n";
        let result = check_allow_with_reason(&lines(content), 2, "single-expectation", "LC002");
        assert!(!result.is_allowed());
        assert_eq!(result.reason(), None);
    }
}
