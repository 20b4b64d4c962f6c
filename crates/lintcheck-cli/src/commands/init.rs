//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const CONFIG_FILE: &str = "lintcheck.toml";

const DEFAULT_CONFIG: &str = r#"# lintcheck configuration

# Rule preset: "recommended" (default), "strict" or "minimal"
preset = "recommended"

# Lowest severity that makes the run fail: "error", "warning" or "info"
fail_on = "error"

[scan]
# Directory (or single file) to analyze
root = "spec"

# File name suffixes that mark test files
suffixes = ["_spec.rb"]

# Extra glob patterns to exclude from analysis.
# vendor/, node_modules/ and tmp/ are always skipped.
exclude = ["**/fixtures/**"]

# Respect .gitignore files
respect_gitignore = true

# Worker threads (default: one per CPU)
# parallelism = 4

# [parser]
# Extra block keywords can be added here, e.g. for custom DSL helpers.
# example_keywords = ["it", "specify", "example", "scenario", "its"]

# Rule configurations
# Each rule can be enabled/disabled and have its severity overridden

[rules.single-expectation]
enabled = true
# severity = "warning"
max = 1
# markers = ["expect", "is_expected", "should", "should_not", "assert"]

[rules.no-duplicate-context]
case_sensitive = false

# [rules.naming-prefix]
# suite_pattern = '^[a-z_][A-Za-z0-9_]*[?!=]?$'

# [rules.discouraged-syntax]
# patterns = [
#   { pattern = '\bsleep\b', prefer = "a time helper", message = "Sleeping in a test" },
# ]

# Style rules outside the recommended preset
# [rules.context-wording]
# enabled = true
# prefixes = ["when", "with", "without"]

# [rules.short-description]
# enabled = true
# max_length = 40
"#;

/// Runs the init command in the current directory.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new("."), force)?;

    println!("Created {CONFIG_FILE}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE} to configure rules");
    println!("  2. Run: lintcheck check");

    Ok(())
}

fn write_config(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintcheck_core::{Config, Severity};
    use tempfile::TempDir;

    #[test]
    fn template_is_a_valid_config() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.preset.as_deref(), Some("recommended"));
        assert_eq!(config.fail_on(), Severity::Error);
        assert_eq!(config.rule("single-expectation").get_int("max", 0), 1);
        assert!(config
            .scan
            .exclude
            .iter()
            .all(|p| !lintcheck_core::DEFAULT_EXCLUDES.contains(&p.as_str())));
        assert!(lintcheck_rules::rules_for(&config, None).is_ok());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), false).unwrap();
        assert!(write_config(tmp.path(), false).is_err());
        assert!(write_config(tmp.path(), true).is_ok());
    }
}
