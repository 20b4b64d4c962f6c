//! Check command implementation.

use anyhow::{Context, Result};
use lintcheck_core::Analyzer;
use lintcheck_rules::{all_rules, rules_for, select_rules, RULES};
use std::path::Path;

use crate::config_resolver;
use crate::CheckArgs;

/// Runs the check command and returns the process exit code.
///
/// # Errors
///
/// Returns an error for fatal conditions: unreadable config, invalid
/// patterns, or a missing root path.
pub fn run(args: &CheckArgs, config_path: Option<&Path>) -> Result<u8> {
    let target = args.path.as_deref().unwrap_or(Path::new("."));
    let source = config_resolver::resolve(target, config_path);
    let mut config = source.load()?;

    if let Some(level) = args.severity_fail {
        config.fail_on = Some(level.into());
    }
    let fail_on = config.fail_on();

    for name in &args.rules {
        let wanted = name.trim().to_lowercase();
        let known = RULES
            .iter()
            .any(|r| r.name == wanted || r.code.to_lowercase() == wanted);
        if !known {
            tracing::warn!("Unknown rule: {}", name);
        }
    }

    let preset_rules =
        rules_for(&config, args.preset.as_deref()).context("Failed to configure rules")?;
    // An explicit --rules list may name rules outside the preset.
    let rules = if args.rules.is_empty() {
        preset_rules
    } else {
        select_rules(all_rules(&config)?, &args.rules)
    };

    let mut builder = Analyzer::builder()
        .rules(rules)
        .excludes(args.exclude.iter().cloned())
        .config(config);
    if let Some(path) = &args.path {
        builder = builder.root(path);
    }

    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!(
        "Analyzing {} with {} rules",
        analyzer.root().display(),
        analyzer.rule_count()
    );

    let report = analyzer.analyze().context("Analysis failed")?;

    super::output::print(&report, args.format)?;

    let code = report.exit_code(fail_on);
    if code != 0 {
        tracing::debug!("Failing: violations at or above {fail_on}");
    }
    Ok(code)
}
