//! Integration test: scanner, parser, engine and reporter end-to-end.
//!
//! Uses the fixture tree under `tests/fixtures/suite/`.

use lintcheck_core::{
    parse, report, Analyzer, Block, BlockKind, Config, FileContext, Rule, Severity, Violation,
    PARSE_ERROR_CODE,
};
use std::path::PathBuf;

fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/suite")
}

/// Flags examples with more than one line calling `expect(`.
struct TwoExpects;

impl Rule for TwoExpects {
    fn name(&self) -> &'static str {
        "two-expects"
    }
    fn code(&self) -> &'static str {
        "T100"
    }
    fn check(&self, ctx: &FileContext, block: &Block, _ancestors: &[&Block]) -> Vec<Violation> {
        let count = block
            .statements()
            .iter()
            .filter(|s| s.text.contains("expect("))
            .count();
        if block.kind() == BlockKind::Example && count > 1 {
            vec![Violation::new(
                self.code(),
                self.name(),
                self.default_severity(),
                ctx.block_location(block),
                format!("{count} expectations"),
            )]
        } else {
            Vec::new()
        }
    }
}

fn analyze(config: Config) -> lintcheck_core::Report {
    Analyzer::builder()
        .root(fixture_root())
        .config(config)
        .rule(TwoExpects)
        .build()
        .expect("analyzer should build")
        .analyze()
        .expect("analysis should succeed")
}

// ── Happy path ──

#[test]
fn analyzes_fixture_tree() {
    let result = analyze(Config::default());

    // broken_spec.rb, models/user_spec.rb, requests/orders_spec.rb; vendor/
    // is excluded and spec_helper.rb lacks the suffix.
    assert_eq!(result.files_checked, 3);
    assert!(result.scan_warnings.is_empty());

    let found: Vec<(String, usize, &str)> = result
        .violations
        .iter()
        .map(|v| {
            (
                v.location.file.display().to_string().replace('\\', "/"),
                v.location.line,
                v.code.as_str(),
            )
        })
        .collect();
    assert_eq!(
        found,
        vec![
            ("spec/broken_spec.rb".to_string(), 1, PARSE_ERROR_CODE),
            ("spec/requests/orders_spec.rb".to_string(), 3, "T100"),
        ]
    );
    assert_eq!(result.exit_code(Severity::Error), 1);
}

#[test]
fn json_output_is_an_array() {
    let result = analyze(Config::default());
    let json = report::render_json(&result).expect("json renders");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    let items = value.as_array().expect("array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["rule"], "two-expects");
    assert_eq!(items[1]["severity"], "error");
}

// ── Configuration ──

#[test]
fn config_disables_rule_and_excludes_files() {
    let config = Config::parse(
        r#"
[scan]
exclude = ["spec/broken_spec.rb"]

[rules.two-expects]
enabled = false
"#,
    )
    .expect("config parses");

    let result = analyze(config);
    assert_eq!(result.files_checked, 2);
    assert!(result.violations.is_empty());
    assert_eq!(result.exit_code(Severity::Info), 0);
}

#[test]
fn severity_override_changes_exit_code() {
    let config = Config::parse(
        r#"
[scan]
exclude = ["spec/broken_spec.rb"]

[rules.two-expects]
severity = "warning"
"#,
    )
    .expect("config parses");

    let result = analyze(config);
    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].severity, Severity::Warning);
    assert_eq!(result.exit_code(Severity::Error), 0);
    assert_eq!(result.exit_code(Severity::Warning), 1);
}

// ── Parser round-trip on real files ──

#[test]
fn fixture_files_round_trip_through_outline() {
    for rel in ["spec/models/user_spec.rb", "spec/requests/orders_spec.rb"] {
        let text = std::fs::read_to_string(fixture_root().join(rel)).expect("fixture exists");
        let tree = parse(&text).expect("fixture parses");
        let again = parse(&tree.outline()).expect("outline parses");
        assert!(tree.same_structure(&again), "{rel}:\n{}", tree.outline());
    }
}
