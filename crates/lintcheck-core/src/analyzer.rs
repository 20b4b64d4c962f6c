//! Core analyzer for orchestrating lint execution.

use crate::config::{Config, ConfigError};
use crate::context::FileContext;
use crate::engine::RuleEngine;
use crate::parser::{ParseError, Parser};
use crate::rule::{Rule, RuleBox};
use crate::scanner::{ScanEntry, ScanError, Scanner};
use crate::types::{Report, ScanWarning, Severity, Suggestion, Violation};

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Rule name reported for files whose block structure is malformed.
pub const PARSE_ERROR_RULE: &str = "parse-error";

/// Rule code reported for files whose block structure is malformed.
pub const PARSE_ERROR_CODE: &str = "LC000";

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The root could not be scanned.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The worker pool could not be started.
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// What happened to one discovered file.
#[derive(Debug)]
pub enum FileOutcome {
    /// The file was read and checked.
    Checked(Vec<Violation>),
    /// The file could not be read.
    Skipped(ScanWarning),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root path to analyze (a directory or a single file).
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a rule to the analyzer.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds several boxed rules.
    #[must_use]
    pub fn rules(mut self, rules: impl IntoIterator<Item = RuleBox>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Adds an exclude glob pattern on top of the configured ones.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if an exclude pattern is invalid or the worker pool
    /// cannot be created.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();
        let root = self.root.unwrap_or_else(|| config.scan.root.clone());

        let mut scan = config.scan.clone();
        scan.exclude.extend(self.exclude_patterns);
        let scanner = Scanner::new(root, &scan)?;

        let pool = match config.scan.parallelism {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?,
            ),
            None => None,
        };

        Ok(Analyzer {
            scanner,
            parser: Parser::new(&config.parser),
            engine: RuleEngine::new(config, self.rules),
            pool,
        })
    }
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    scanner: Scanner,
    parser: Parser,
    engine: RuleEngine,
    pool: Option<rayon::ThreadPool>,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root path being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.scanner.root()
    }

    /// Returns the number of active rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.engine.rules().len()
    }

    /// Analyzes all test files under the root.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is missing or cannot be listed.
    pub fn analyze(&self) -> Result<Report, AnalyzerError> {
        info!("Starting analysis at {}", self.root().display());

        let files = self.scanner.discover()?;
        info!("Found {} files to analyze", files.len());

        let outcomes = match &self.pool {
            Some(pool) => pool.install(|| self.check_paths(&files)),
            None => self.check_paths(&files),
        };

        let mut report = Report::new();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Checked(violations) => {
                    report.violations.extend(violations);
                    report.files_checked += 1;
                }
                FileOutcome::Skipped(warning) => report.scan_warnings.push(warning),
            }
        }
        report.sort();

        info!(
            "Analysis complete: {} violations in {} files",
            report.violations.len(),
            report.files_checked
        );

        Ok(report)
    }

    fn check_paths(&self, files: &[PathBuf]) -> Vec<FileOutcome> {
        files.par_iter().map(|path| self.check_path(path)).collect()
    }

    /// Reads and checks one file.
    #[must_use]
    pub fn check_path(&self, path: &Path) -> FileOutcome {
        match self.scanner.read(path) {
            ScanEntry::File(file) => FileOutcome::Checked(self.check_source(&file.path, &file.text)),
            ScanEntry::Skipped(warning) => FileOutcome::Skipped(warning),
        }
    }

    /// Parses and checks source text as if it were the file at `path`.
    ///
    /// A file that fails to parse yields a single `parse-error` violation and
    /// no rule runs on it.
    #[must_use]
    pub fn check_source(&self, path: &Path, text: &str) -> Vec<Violation> {
        debug!("Analyzing: {}", path.display());
        let ctx = FileContext::new(path, text, self.scanner.root());

        match self.parser.parse(text) {
            Ok(root) => self.engine.check(&ctx, &root),
            Err(e) => {
                debug!("Failed to parse {}: {e}", path.display());
                vec![parse_error_violation(&ctx, &e)]
            }
        }
    }
}

fn parse_error_violation(ctx: &FileContext, error: &ParseError) -> Violation {
    let violation = Violation::new(
        PARSE_ERROR_CODE,
        PARSE_ERROR_RULE,
        Severity::Error,
        ctx.location(error.line, 1),
        error.kind.to_string(),
    );
    match miette::Diagnostic::help(error) {
        Some(help) => violation.with_suggestion(Suggestion::new(help.to_string())),
        None => violation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Block, BlockKind};
    use std::fs;

    struct CountStatements;

    impl Rule for CountStatements {
        fn name(&self) -> &'static str {
            "count-statements"
        }
        fn code(&self) -> &'static str {
            "T002"
        }
        fn default_severity(&self) -> Severity {
            Severity::Warning
        }
        fn check(&self, ctx: &FileContext, block: &Block, _ancestors: &[&Block]) -> Vec<Violation> {
            if block.kind() == BlockKind::Example && block.statements().len() > 1 {
                vec![Violation::new(
                    self.code(),
                    self.name(),
                    self.default_severity(),
                    ctx.block_location(block),
                    "long example",
                )]
            } else {
                Vec::new()
            }
        }
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("spec")).unwrap();
        fs::write(
            dir.path().join("spec/b_spec.rb"),
            "describe B do\n  it 'x' do\n    a\n    b\n  end\nend\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("spec/a_spec.rb"),
            "describe A do\n  it 'x' do\n    a\n  end\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn analyzes_tree_and_reports_parse_errors() {
        let dir = fixture();
        let analyzer = Analyzer::builder()
            .root(dir.path())
            .rule(CountStatements)
            .build()
            .unwrap();
        assert_eq!(analyzer.rule_count(), 1);

        let report = analyzer.analyze().unwrap();
        assert_eq!(report.files_checked, 2);
        assert_eq!(report.violations.len(), 2);

        let parse_error = &report.violations[0];
        assert_eq!(parse_error.code, PARSE_ERROR_CODE);
        assert_eq!(parse_error.location.file, PathBuf::from("spec/a_spec.rb"));
        assert_eq!(parse_error.location.line, 1);
        assert!(parse_error.suggestion.is_some());

        let long = &report.violations[1];
        assert_eq!(long.code, "T002");
        assert_eq!(long.location.file, PathBuf::from("spec/b_spec.rb"));
        assert_eq!(long.location.line, 2);
    }

    #[test]
    fn dedicated_pool_gives_same_result() {
        let dir = fixture();
        let mut config = Config::default();
        config.scan.parallelism = Some(2);
        let analyzer = Analyzer::builder()
            .root(dir.path())
            .config(config)
            .rule(CountStatements)
            .build()
            .unwrap();
        assert_eq!(analyzer.analyze().unwrap().violations.len(), 2);
    }

    #[test]
    fn builder_excludes_add_to_config() {
        let dir = fixture();
        let analyzer = Analyzer::builder()
            .root(dir.path())
            .exclude("spec/a_spec.rb")
            .rule(CountStatements)
            .build()
            .unwrap();
        let report = analyzer.analyze().unwrap();
        assert_eq!(report.files_checked, 1);
        assert_eq!(report.violations.len(), 1);
    }

    #[test]
    fn missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = Analyzer::builder()
            .root(dir.path().join("missing"))
            .build()
            .unwrap();
        assert!(matches!(
            analyzer.analyze(),
            Err(AnalyzerError::Scan(ScanError::RootNotFound { .. }))
        ));
    }

    #[test]
    fn check_source_without_files() {
        let analyzer = Analyzer::builder().root(".").rule(CountStatements).build().unwrap();
        let violations =
            analyzer.check_source(Path::new("inline_spec.rb"), "it 'x' do\n  a\n  b\nend\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.file, PathBuf::from("inline_spec.rb"));
    }
}
