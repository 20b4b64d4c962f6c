//! Applies rules over a parsed block tree.

use crate::block::Block;
use crate::config::Config;
use crate::context::FileContext;
use crate::rule::RuleBox;
use crate::types::{Severity, Suggestion, Violation};
use crate::utils::allowance::check_allow_with_reason;
use tracing::debug;

/// Runs a fixed set of rules over the blocks of a file.
///
/// The engine owns its configuration and rules; it keeps no state between
/// files, so one engine can check many files from several threads.
pub struct RuleEngine {
    config: Config,
    rules: Vec<RuleBox>,
}

impl RuleEngine {
    /// Creates an engine. Rules disabled in `config` are dropped here.
    #[must_use]
    pub fn new(config: Config, rules: Vec<RuleBox>) -> Self {
        let rules = rules
            .into_iter()
            .filter(|rule| {
                let enabled = config.is_rule_enabled(rule.name());
                if !enabled {
                    debug!("Skipping disabled rule: {}", rule.name());
                }
                enabled
            })
            .collect();
        Self { config, rules }
    }

    /// Active rules, in registration order.
    #[must_use]
    pub fn rules(&self) -> &[RuleBox] {
        &self.rules
    }

    /// Checks every block of `root` depth-first and returns the violations
    /// that survive allow directives, with severity overrides applied.
    #[must_use]
    pub fn check(&self, ctx: &FileContext, root: &Block) -> Vec<Violation> {
        let mut violations = Vec::new();
        root.walk(&mut |block, ancestors| {
            for rule in &self.rules {
                for violation in rule.check(ctx, block, ancestors) {
                    if let Some(v) = self.filter(ctx, rule, violation) {
                        violations.push(v);
                    }
                }
            }
        });
        violations
    }

    /// Applies allow directives and the configured severity to one violation.
    fn filter(&self, ctx: &FileContext, rule: &RuleBox, mut violation: Violation) -> Option<Violation> {
        let allow = check_allow_with_reason(
            ctx.lines(),
            violation.location.line,
            rule.name(),
            rule.code(),
        );
        if allow.is_allowed() {
            if rule.requires_allow_reason() && allow.reason().is_none() {
                return Some(
                    Violation::new(
                        rule.code(),
                        rule.name(),
                        Severity::Warning,
                        violation.location,
                        format!("Allow directive for '{}' is missing required reason", rule.name()),
                    )
                    .with_suggestion(Suggestion::new(
                        "Add reason=\"...\" to explain why this exception is necessary",
                    )),
                );
            }
            return None;
        }

        if let Some(severity) = self.config.rule_severity(rule.name()) {
            violation.severity = severity;
        }
        Some(violation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use crate::config::RuleConfig;
    use crate::parser::parse;
    use crate::rule::Rule;
    use std::path::Path;

    /// Flags every example.
    struct EveryExample;

    impl Rule for EveryExample {
        fn name(&self) -> &'static str {
            "every-example"
        }
        fn code(&self) -> &'static str {
            "T001"
        }
        fn check(&self, ctx: &FileContext, block: &Block, ancestors: &[&Block]) -> Vec<Violation> {
            if block.kind() != BlockKind::Example {
                return Vec::new();
            }
            vec![Violation::new(
                self.code(),
                self.name(),
                self.default_severity(),
                ctx.block_location(block),
                format!("example at depth {}", ancestors.len()),
            )]
        }
    }

    fn run(config: Config, source: &str) -> Vec<Violation> {
        let engine = RuleEngine::new(config, vec![Box::new(EveryExample)]);
        let root = parse(source).unwrap();
        let ctx = FileContext::new(Path::new("a_spec.rb"), source, Path::new("."));
        engine.check(&ctx, &root)
    }

    const SOURCE: &str = "describe A do\n  context 'when b' do\n    it 'c' do\n    end\n  end\nend\n";

    #[test]
    fn walks_with_ancestors() {
        let violations = run(Config::default(), SOURCE);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].message, "example at depth 3");
        assert_eq!(violations[0].location.line, 3);
        assert_eq!(violations[0].severity, Severity::Error);
    }

    #[test]
    fn disabled_rule_does_not_run() {
        let mut config = Config::default();
        config.rules.insert(
            "every-example".to_string(),
            RuleConfig {
                enabled: Some(false),
                ..RuleConfig::default()
            },
        );
        let engine = RuleEngine::new(config, vec![Box::new(EveryExample)]);
        assert!(engine.rules().is_empty());
    }

    #[test]
    fn severity_override() {
        let mut config = Config::default();
        config.rules.insert(
            "every-example".to_string(),
            RuleConfig {
                severity: Some(Severity::Info),
                ..RuleConfig::default()
            },
        );
        let violations = run(config, SOURCE);
        assert_eq!(violations[0].severity, Severity::Info);
    }

    #[test]
    fn allow_with_reason_suppresses() {
        let source = "describe A do\n  # lintcheck: allow(every-example) reason=\"fixture\"\n  it 'c' do\n  end\nend\n";
        assert!(run(Config::default(), source).is_empty());
    }

    #[test]
    fn allow_directives_apply_per_line_in_crlf_files() {
        let source = "describe A do\r\n  it 'a' do # lintcheck: allow(T001) reason=\"one\"\r\n  end\r\n  it 'b' do\r\n  end\r\n  # lintcheck: allow(every-example) reason=\"two\"\r\n  it 'c' do\r\n  end\r\nend\r\n";
        let violations = run(Config::default(), source);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 4);
    }

    #[test]
    fn allow_without_reason_warns() {
        let source = "describe A do\n  it 'c' do # lintcheck: allow(T001)\n  end\nend\n";
        let violations = run(Config::default(), source);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Warning);
        assert!(violations[0].message.contains("missing required reason"));
    }
}
