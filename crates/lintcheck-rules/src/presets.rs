//! Rule presets for common configurations.

use crate::{
    context_wording, discouraged_syntax, naming_prefix, no_duplicate_context,
    no_should_description, short_description, single_expectation, ContextWording,
    DiscouragedSyntax, NamingPrefix, NoDuplicateContext, NoShouldDescription, ShortDescription,
    SingleExpectation,
};
use lintcheck_core::{Config, ConfigError, RuleBox, RuleConfig, Severity};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Static metadata of a built-in rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleInfo {
    /// Rule name (e.g. `single-expectation`).
    pub name: &'static str,
    /// Rule code (e.g. `LC002`).
    pub code: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Severity used when the config does not override it.
    pub default_severity: Severity,
}

/// Every built-in rule, ordered by code.
pub const RULES: &[RuleInfo] = &[
    RuleInfo {
        name: naming_prefix::NAME,
        code: naming_prefix::CODE,
        description: "Method descriptions start with '.' (class) or '#' (instance)",
        default_severity: Severity::Warning,
    },
    RuleInfo {
        name: single_expectation::NAME,
        code: single_expectation::CODE,
        description: "Each example makes a single expectation",
        default_severity: Severity::Error,
    },
    RuleInfo {
        name: no_duplicate_context::NAME,
        code: no_duplicate_context::CODE,
        description: "Sibling contexts have distinct labels",
        default_severity: Severity::Error,
    },
    RuleInfo {
        name: discouraged_syntax::NAME,
        code: discouraged_syntax::CODE,
        description: "Flags deprecated or awkward expectation syntax",
        default_severity: Severity::Info,
    },
    RuleInfo {
        name: context_wording::NAME,
        code: context_wording::CODE,
        description: "Context labels start with 'when', 'with' or 'without'",
        default_severity: Severity::Warning,
    },
    RuleInfo {
        name: no_should_description::NAME,
        code: no_should_description::CODE,
        description: "Example descriptions do not start with 'should'",
        default_severity: Severity::Warning,
    },
    RuleInfo {
        name: short_description::NAME,
        code: short_description::CODE,
        description: "Example descriptions stay under a length limit",
        default_severity: Severity::Info,
    },
];

/// Preset configurations for lintcheck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// The four core rules (LC001-LC004).
    #[default]
    Recommended,
    /// Every built-in rule.
    Strict,
    /// Only `single-expectation`, for gradual adoption.
    Minimal,
}

impl Preset {
    /// Preset name as written in config files and on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Recommended => "recommended",
            Self::Strict => "strict",
            Self::Minimal => "minimal",
        }
    }

    /// Names of the rules this preset turns on.
    #[must_use]
    pub fn rule_names(self) -> Vec<&'static str> {
        match self {
            Self::Recommended => vec![
                naming_prefix::NAME,
                single_expectation::NAME,
                no_duplicate_context::NAME,
                discouraged_syntax::NAME,
            ],
            Self::Strict => RULES.iter().map(|info| info.name).collect(),
            Self::Minimal => vec![single_expectation::NAME],
        }
    }

    /// Returns the rules for this preset, configured from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if a rule's configuration table is invalid.
    pub fn rules(self, config: &Config) -> Result<Vec<RuleBox>, ConfigError> {
        let mut rules = Vec::new();
        for name in self.rule_names() {
            if let Some(rule) = build_rule(name, &config.rule(name))? {
                rules.push(rule);
            }
        }
        Ok(rules)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recommended" => Ok(Self::Recommended),
            "strict" => Ok(Self::Strict),
            "minimal" => Ok(Self::Minimal),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }
}

/// Builds one rule by name from its configuration table.
///
/// Returns `Ok(None)` for names that are not built-in rules.
///
/// # Errors
///
/// Returns an error if the rule rejects its configuration.
pub fn build_rule(name: &str, config: &RuleConfig) -> Result<Option<RuleBox>, ConfigError> {
    let rule: RuleBox = match name {
        naming_prefix::NAME => Box::new(NamingPrefix::from_config(config)?),
        single_expectation::NAME => Box::new(SingleExpectation::from_config(config)?),
        no_duplicate_context::NAME => Box::new(NoDuplicateContext::from_config(config)?),
        discouraged_syntax::NAME => Box::new(DiscouragedSyntax::from_config(config)?),
        context_wording::NAME => Box::new(ContextWording::from_config(config)?),
        no_should_description::NAME => Box::new(NoShouldDescription::from_config(config)?),
        short_description::NAME => Box::new(ShortDescription::from_config(config)?),
        _ => return Ok(None),
    };
    Ok(Some(rule))
}

/// Returns the recommended set of rules.
///
/// Includes:
/// - `naming-prefix` (LC001)
/// - `single-expectation` (LC002)
/// - `no-duplicate-context` (LC003)
/// - `discouraged-syntax` (LC004)
///
/// # Errors
///
/// Returns an error if a rule's configuration table is invalid.
pub fn recommended_rules(config: &Config) -> Result<Vec<RuleBox>, ConfigError> {
    Preset::Recommended.rules(config)
}

/// Returns the strict set of rules: every built-in rule.
///
/// # Errors
///
/// Returns an error if a rule's configuration table is invalid.
pub fn strict_rules(config: &Config) -> Result<Vec<RuleBox>, ConfigError> {
    Preset::Strict.rules(config)
}

/// Returns the minimal set of rules (`single-expectation` only).
///
/// # Errors
///
/// Returns an error if a rule's configuration table is invalid.
pub fn minimal_rules(config: &Config) -> Result<Vec<RuleBox>, ConfigError> {
    Preset::Minimal.rules(config)
}

/// Returns all available rules.
///
/// # Errors
///
/// Returns an error if a rule's configuration table is invalid.
pub fn all_rules(config: &Config) -> Result<Vec<RuleBox>, ConfigError> {
    strict_rules(config)
}

/// Resolves the active rule set for a run.
///
/// The preset comes from `preset_override`, then `config.preset`, then
/// [`Preset::Recommended`]. Rules outside the preset that the config turns
/// on with `enabled = true` are appended.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownPreset`] for an unrecognised preset name,
/// or the error of a rule that rejects its configuration.
pub fn rules_for(config: &Config, preset_override: Option<&str>) -> Result<Vec<RuleBox>, ConfigError> {
    let preset = match preset_override.or(config.preset.as_deref()) {
        Some(name) => name.parse::<Preset>()?,
        None => Preset::default(),
    };
    debug!("Using preset: {preset}");

    let mut rules = preset.rules(config)?;
    let in_preset = preset.rule_names();
    for info in RULES {
        if in_preset.contains(&info.name) {
            continue;
        }
        let explicitly_enabled = config
            .rules
            .get(info.name)
            .is_some_and(|rule| rule.enabled == Some(true));
        if explicitly_enabled {
            debug!("Enabling rule outside preset: {}", info.name);
            if let Some(rule) = build_rule(info.name, &config.rule(info.name))? {
                rules.push(rule);
            }
        }
    }
    Ok(rules)
}

/// Keeps only the rules whose name or code appears in `filter`.
///
/// Matching ignores case and surrounding whitespace. An empty filter keeps
/// every rule.
#[must_use]
pub fn select_rules(rules: Vec<RuleBox>, filter: &[String]) -> Vec<RuleBox> {
    if filter.is_empty() {
        return rules;
    }
    let wanted: Vec<String> = filter.iter().map(|f| f.trim().to_lowercase()).collect();
    rules
        .into_iter()
        .filter(|rule| {
            wanted
                .iter()
                .any(|w| *w == rule.name() || *w == rule.code().to_lowercase())
        })
        .collect()
}
