//! Core types for lint violations and reports.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Severity level for lint violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail lint by default.
    Info,
    /// Convention that should be followed.
    Warning,
    /// Convention that must be followed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// Source code location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path relative to the scan root.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl Location {
    /// Creates a new location with explicit values.
    #[must_use]
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }
}

/// A suggested fix for a violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Human-readable description of the fix.
    pub message: String,
}

impl Suggestion {
    /// Creates a new suggestion.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A lint violation found during analysis.
///
/// Violations are built once by a rule and never modified afterwards,
/// except for the severity override the engine applies from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule code (e.g., "LC002").
    pub code: String,
    /// Rule name (e.g., "single-expectation").
    pub rule: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Location of the offending block or statement.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
    /// Optional suggestion for fixing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            severity,
            location,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Adds a suggestion to this violation.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestion = Some(suggestion);
        self
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.location.file.display(),
            self.location.line,
            self.location.column,
            self.severity,
            self.code,
            self.message
        )
    }
}

/// A file the scanner found but could not read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path of the skipped file.
    pub path: PathBuf,
    /// Why the file was skipped.
    pub message: String,
}

/// Violation counts per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    /// Number of error-level violations.
    pub errors: usize,
    /// Number of warning-level violations.
    pub warnings: usize,
    /// Number of info-level violations.
    pub infos: usize,
}

/// Result of one lint run.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Report {
    /// All violations found, sorted by file then line once finalized.
    pub violations: Vec<Violation>,
    /// Number of files parsed (including files that failed to parse).
    pub files_checked: usize,
    /// Files skipped because they could not be read.
    #[serde(default)]
    pub scan_warnings: Vec<ScanWarning>,
}

impl Report {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_violations_at(Severity::Error)
    }

    /// Checks if any violations meet or exceed the given severity threshold.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.violations.iter().any(|v| v.severity >= severity)
    }

    /// Counts violations by severity.
    #[must_use]
    pub fn count_by_severity(&self) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        for v in &self.violations {
            match v.severity {
                Severity::Error => counts.errors += 1,
                Severity::Warning => counts.warnings += 1,
                Severity::Info => counts.infos += 1,
            }
        }
        counts
    }

    /// Groups violations by file, preserving line order within each file.
    #[must_use]
    pub fn by_file(&self) -> BTreeMap<&Path, Vec<&Violation>> {
        let mut groups: BTreeMap<&Path, Vec<&Violation>> = BTreeMap::new();
        for v in &self.violations {
            groups.entry(v.location.file.as_path()).or_default().push(v);
        }
        for list in groups.values_mut() {
            list.sort_by_key(|v| (v.location.line, v.location.column));
        }
        groups
    }

    /// Sorts violations by file, line, column, then rule code.
    pub fn sort(&mut self) {
        self.violations.sort_by(|a, b| {
            a.location
                .file
                .cmp(&b.location.file)
                .then(a.location.line.cmp(&b.location.line))
                .then(a.location.column.cmp(&b.location.column))
                .then(a.code.cmp(&b.code))
        });
        self.scan_warnings.sort_by(|a, b| a.path.cmp(&b.path));
    }

    /// Process exit code for this report: 1 if any violation reaches
    /// `fail_on`, 0 otherwise.
    #[must_use]
    pub fn exit_code(&self, fail_on: Severity) -> u8 {
        u8::from(self.has_violations_at(fail_on))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_violation(file: &str, line: usize, severity: Severity) -> Violation {
        Violation::new(
            "LC002",
            "single-expectation",
            severity,
            Location::new(PathBuf::from(file), line, 3),
            "example has 2 expectations",
        )
    }

    #[test]
    fn severity_orders_info_below_error() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("ERROR".parse::<Severity>(), Ok(Severity::Error));
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn violation_display_is_compact() {
        let v = make_violation("spec/user_spec.rb", 12, Severity::Error);
        assert_eq!(
            v.to_string(),
            "spec/user_spec.rb:12:3: error [LC002] example has 2 expectations"
        );
    }

    #[test]
    fn exit_code_ignores_warnings_when_failing_on_error() {
        let mut report = Report::new();
        report
            .violations
            .push(make_violation("a_spec.rb", 1, Severity::Warning));
        report
            .violations
            .push(make_violation("a_spec.rb", 2, Severity::Info));
        assert_eq!(report.exit_code(Severity::Error), 0);
        assert_eq!(report.exit_code(Severity::Warning), 1);
    }

    #[test]
    fn exit_code_is_one_with_an_error() {
        let mut report = Report::new();
        report
            .violations
            .push(make_violation("a_spec.rb", 1, Severity::Error));
        assert!(report.has_errors());
        assert_eq!(report.exit_code(Severity::Error), 1);
    }

    #[test]
    fn count_by_severity_counts_each_level() {
        let mut report = Report::new();
        report
            .violations
            .push(make_violation("a_spec.rb", 1, Severity::Error));
        report
            .violations
            .push(make_violation("a_spec.rb", 2, Severity::Warning));
        report
            .violations
            .push(make_violation("b_spec.rb", 2, Severity::Warning));
        assert_eq!(
            report.count_by_severity(),
            SeverityCounts {
                errors: 1,
                warnings: 2,
                infos: 0
            }
        );
    }

    #[test]
    fn sort_orders_by_file_then_line() {
        let mut report = Report::new();
        report
            .violations
            .push(make_violation("b_spec.rb", 1, Severity::Error));
        report
            .violations
            .push(make_violation("a_spec.rb", 9, Severity::Error));
        report
            .violations
            .push(make_violation("a_spec.rb", 2, Severity::Error));
        report.sort();

        let order: Vec<(String, usize)> = report
            .violations
            .iter()
            .map(|v| (v.location.file.display().to_string(), v.location.line))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a_spec.rb".to_string(), 2),
                ("a_spec.rb".to_string(), 9),
                ("b_spec.rb".to_string(), 1),
            ]
        );
    }

    #[test]
    fn by_file_groups_violations() {
        let mut report = Report::new();
        report
            .violations
            .push(make_violation("b_spec.rb", 4, Severity::Error));
        report
            .violations
            .push(make_violation("a_spec.rb", 7, Severity::Info));
        report
            .violations
            .push(make_violation("b_spec.rb", 1, Severity::Warning));

        let groups = report.by_file();
        let files: Vec<&Path> = groups.keys().copied().collect();
        assert_eq!(files, vec![Path::new("a_spec.rb"), Path::new("b_spec.rb")]);
        let lines: Vec<usize> = groups[Path::new("b_spec.rb")]
            .iter()
            .map(|v| v.location.line)
            .collect();
        assert_eq!(lines, vec![1, 4]);
    }
}
