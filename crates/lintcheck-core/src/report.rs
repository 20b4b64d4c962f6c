//! Rendering of lint reports.
//!
//! Every renderer returns a `String`; printing is left to the caller.

use crate::types::{Report, Severity, Violation};
use serde::Serialize;
use std::fmt::Write;

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const GREEN: &str = "\x1b[32m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Returns false when `NO_COLOR` is set to a non-empty value.
#[must_use]
pub fn color_enabled() -> bool {
    std::env::var_os("NO_COLOR").map_or(true, |v| v.is_empty())
}

struct Painter {
    color: bool,
}

impl Painter {
    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn severity(&self, severity: Severity) -> String {
        let code = match severity {
            Severity::Error => RED,
            Severity::Warning => YELLOW,
            Severity::Info => BLUE,
        };
        self.paint(code, &severity.to_string())
    }
}

/// Renders violations grouped by file, followed by a summary line.
#[must_use]
pub fn render_text(report: &Report, color: bool) -> String {
    let painter = Painter { color };
    let mut out = String::new();

    for warning in &report.scan_warnings {
        let _ = writeln!(
            out,
            "{}: skipped {}: {}",
            painter.severity(Severity::Warning),
            warning.path.display(),
            warning.message
        );
    }
    if !report.scan_warnings.is_empty() {
        out.push('\n');
    }

    for (file, violations) in report.by_file() {
        let _ = writeln!(out, "{}", painter.paint(BOLD, &file.display().to_string()));
        for v in violations {
            let _ = writeln!(
                out,
                "  {}:{}  {} [{}] {}: {}",
                v.location.line,
                v.location.column,
                painter.severity(v.severity),
                v.code,
                v.rule,
                v.message
            );
            if let Some(suggestion) = &v.suggestion {
                let _ = writeln!(out, "      = help: {}", suggestion.message);
            }
        }
        out.push('\n');
    }

    let counts = report.count_by_severity();
    let summary_color = if counts.errors > 0 {
        RED
    } else if counts.warnings > 0 {
        YELLOW
    } else {
        GREEN
    };
    let summary = format!(
        "Found {} error(s), {} warning(s), {} info(s) in {} file(s)",
        counts.errors, counts.warnings, counts.infos, report.files_checked
    );
    let _ = writeln!(out, "{}", painter.paint(summary_color, &summary));
    out
}

#[derive(Serialize)]
struct JsonViolation<'a> {
    file: String,
    line: usize,
    rule: &'a str,
    severity: Severity,
    message: &'a str,
}

impl<'a> From<&'a Violation> for JsonViolation<'a> {
    fn from(v: &'a Violation) -> Self {
        Self {
            file: v.location.file.display().to_string(),
            line: v.location.line,
            rule: &v.rule,
            severity: v.severity,
            message: &v.message,
        }
    }
}

/// Renders violations as a JSON array of
/// `{file, line, rule, severity, message}` objects.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(report: &Report) -> Result<String, serde_json::Error> {
    let items: Vec<JsonViolation> = report.violations.iter().map(JsonViolation::from).collect();
    serde_json::to_string_pretty(&items)
}

/// Renders one line per violation.
#[must_use]
pub fn render_compact(report: &Report) -> String {
    let mut out = String::new();
    for violation in &report.violations {
        let _ = writeln!(out, "{violation}");
    }
    out
}
