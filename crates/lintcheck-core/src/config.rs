//! Configuration types for lintcheck.

use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Top-level configuration for lintcheck.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Preset to use ("recommended", "strict" or "minimal").
    #[serde(default)]
    pub preset: Option<String>,

    /// Severity threshold for a failing exit status (default: "error").
    #[serde(default)]
    pub fail_on: Option<Severity>,

    /// File discovery settings.
    #[serde(default)]
    pub scan: ScanConfig,

    /// Block keyword settings.
    #[serde(default)]
    pub parser: ParserConfig,

    /// Per-rule configurations, keyed by rule name.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }

    /// Gets the configuration table of a rule, or an empty one.
    #[must_use]
    pub fn rule(&self, rule_name: &str) -> RuleConfig {
        self.rules.get(rule_name).cloned().unwrap_or_default()
    }

    /// Effective failing severity (default: error).
    #[must_use]
    pub fn fail_on(&self) -> Severity {
        self.fail_on.unwrap_or(Severity::Error)
    }
}

/// Directories never scanned, whatever `[scan] exclude` says.
pub const DEFAULT_EXCLUDES: &[&str] = &["**/vendor/**", "**/node_modules/**", "**/tmp/**"];

/// File discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Root directory to scan (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// File name suffixes that mark test files.
    #[serde(default = "default_suffixes")]
    pub suffixes: Vec<String>,

    /// Glob patterns to exclude from scanning, applied on top of
    /// [`DEFAULT_EXCLUDES`].
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Maximum number of files processed in parallel (default: one per core).
    #[serde(default)]
    pub parallelism: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            suffixes: default_suffixes(),
            exclude: Vec::new(),
            respect_gitignore: true,
            parallelism: None,
        }
    }
}

/// Keywords that open structural blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Keywords opening a suite block.
    #[serde(default = "default_suite_keywords")]
    pub suite_keywords: Vec<String>,

    /// Keywords opening a context block.
    #[serde(default = "default_context_keywords")]
    pub context_keywords: Vec<String>,

    /// Keywords opening an example block.
    #[serde(default = "default_example_keywords")]
    pub example_keywords: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            suite_keywords: default_suite_keywords(),
            context_keywords: default_context_keywords(),
            example_keywords: default_example_keywords(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

fn default_suffixes() -> Vec<String> {
    vec!["_spec.rb".to_string()]
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn default_suite_keywords() -> Vec<String> {
    strings(&[
        "describe",
        "RSpec.describe",
        "xdescribe",
        "fdescribe",
        "feature",
        "shared_examples",
        "shared_examples_for",
        "shared_context",
    ])
}

fn default_context_keywords() -> Vec<String> {
    strings(&["context", "xcontext", "fcontext"])
}

fn default_example_keywords() -> Vec<String> {
    strings(&["it", "xit", "fit", "specify", "example", "scenario", "its"])
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets a boolean option with a default value.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.options
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(default)
    }

    /// Gets an integer option with a default value.
    #[must_use]
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.options
            .get(key)
            .and_then(toml::Value::as_integer)
            .unwrap_or(default)
    }

    /// Gets a string option with a default value.
    #[must_use]
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.options
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
    }

    /// Gets a string array option, or `None` when the key is absent.
    #[must_use]
    pub fn get_str_array(&self, key: &str) -> Option<Vec<String>> {
        self.options.get(key).and_then(|v| v.as_array()).map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A configured regex or glob does not compile.
    #[error("Invalid pattern '{pattern}' for {owner}: {message}")]
    InvalidPattern {
        /// Rule or section that owns the pattern.
        owner: String,
        /// The offending pattern.
        pattern: String,
        /// Compiler error message.
        message: String,
    },

    /// Unknown preset name.
    #[error("Unknown preset '{0}' (expected recommended, strict or minimal)")]
    UnknownPreset(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.scan.respect_gitignore);
        assert_eq!(config.scan.suffixes, vec!["_spec.rb"]);
        assert!(config.rules.is_empty());
        assert_eq!(config.fail_on(), Severity::Error);
        assert!(config
            .parser
            .example_keywords
            .iter()
            .any(|k| k == "it"));
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
preset = "strict"
fail_on = "warning"

[scan]
root = "./spec"
exclude = ["**/fixtures/**"]
parallelism = 2

[parser]
example_keywords = ["it", "scenario"]

[rules.single-expectation]
enabled = true
severity = "warning"
max = 2
markers = ["expect", "assert_equal"]

[rules.context-wording]
enabled = false
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.preset.as_deref(), Some("strict"));
        assert_eq!(config.fail_on(), Severity::Warning);
        assert_eq!(config.scan.root, PathBuf::from("./spec"));
        assert_eq!(config.scan.parallelism, Some(2));
        assert_eq!(config.scan.suffixes, vec!["_spec.rb"]);
        assert_eq!(config.scan.exclude, vec!["**/fixtures/**"]);
        assert_eq!(config.parser.example_keywords, vec!["it", "scenario"]);
        assert_eq!(config.parser.context_keywords, vec!["context", "xcontext", "fcontext"]);

        assert!(config.is_rule_enabled("single-expectation"));
        assert!(!config.is_rule_enabled("context-wording"));
        assert!(config.is_rule_enabled("never-configured"));
        assert_eq!(
            config.rule_severity("single-expectation"),
            Some(Severity::Warning)
        );

        let rule = config.rule("single-expectation");
        assert_eq!(rule.get_int("max", 1), 2);
        assert_eq!(
            rule.get_str_array("markers"),
            Some(vec!["expect".to_string(), "assert_equal".to_string()])
        );
        assert_eq!(rule.get_str_array("missing"), None);
    }

    #[test]
    fn test_parse_rejects_bad_severity() {
        let err = Config::parse("fail_on = \"fatal\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
