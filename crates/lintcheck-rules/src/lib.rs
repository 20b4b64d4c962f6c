//! # lintcheck-rules
//!
//! Built-in test style rules for lintcheck.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | LC001 | `naming-prefix` | Method descriptions start with `.` or `#` |
//! | LC002 | `single-expectation` | One expectation per example |
//! | LC003 | `no-duplicate-context` | Sibling contexts have distinct labels |
//! | LC004 | `discouraged-syntax` | Flags deprecated or awkward matcher syntax |
//! | LC005 | `context-wording` | Context labels start with `when`, `with` or `without` |
//! | LC006 | `no-should-description` | Example labels do not start with "should" |
//! | LC007 | `short-description` | Example labels stay short |
//!
//! ## Usage
//!
//! ```no_run
//! use lintcheck_core::{Analyzer, Config};
//! use lintcheck_rules::Preset;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let analyzer = Analyzer::builder()
//!     .root("./spec")
//!     .rules(Preset::Recommended.rules(&config)?)
//!     .config(config)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod context_wording;
mod discouraged_syntax;
mod naming_prefix;
mod no_duplicate_context;
mod no_should_description;
mod presets;
mod short_description;
mod single_expectation;

pub use context_wording::ContextWording;
pub use discouraged_syntax::{DiscouragedPattern, DiscouragedSyntax};
pub use naming_prefix::{NamingPrefix, METHOD_SIGNAL_EXAMPLE_PATTERN};
pub use no_duplicate_context::NoDuplicateContext;
pub use no_should_description::NoShouldDescription;
pub use presets::{
    all_rules, build_rule, minimal_rules, recommended_rules, rules_for, select_rules,
    strict_rules, Preset, RuleInfo, RULES,
};
pub use short_description::ShortDescription;
pub use single_expectation::SingleExpectation;

/// Re-export core types for convenience.
pub use lintcheck_core::{Rule, Severity, Violation};

fn invalid_pattern(rule: &str, pattern: &str, error: &regex::Error) -> lintcheck_core::ConfigError {
    lintcheck_core::ConfigError::InvalidPattern {
        owner: format!("rule '{rule}'"),
        pattern: pattern.to_string(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod test_support {
    use lintcheck_core::{parse, FileContext, Rule, Violation};
    use std::path::Path;

    /// Parses `source` and runs one rule over every block.
    pub fn check_source(rule: &dyn Rule, source: &str) -> Vec<Violation> {
        let root = parse(source).expect("test source should parse");
        let ctx = FileContext::new(Path::new("test_spec.rb"), source, Path::new("."));
        let mut violations = Vec::new();
        root.walk(&mut |block, ancestors| {
            violations.extend(rule.check(&ctx, block, ancestors));
        });
        violations
    }
}
