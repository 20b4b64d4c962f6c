//! List rules command implementation.

use anyhow::Result;
use lintcheck_core::Config;
use lintcheck_rules::{Preset, RULES};

/// Runs the list-rules command.
pub fn run() -> Result<()> {
    println!("Available rules:\n");
    println!("{:<8} {:<24} {:<9} Description", "Code", "Name", "Severity");
    println!("{}", "-".repeat(80));

    for rule in RULES {
        println!(
            "{:<8} {:<24} {:<9} {}",
            rule.code,
            rule.name,
            rule.default_severity.to_string(),
            rule.description
        );
    }

    println!("\nPresets:");
    let config = Config::default();
    for preset in [Preset::Recommended, Preset::Strict, Preset::Minimal] {
        let codes: Vec<&str> = preset.rules(&config)?.iter().map(|r| r.code()).collect();
        let marker = if preset == Preset::default() { " (default)" } else { "" };
        println!("  {:<12} - {}{}", preset.name(), codes.join(", "), marker);
    }

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  lintcheck check --rules single-expectation,no-duplicate-context");
    println!("  lintcheck check --rules LC002,LC003");

    Ok(())
}
