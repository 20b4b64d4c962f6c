//! # lintcheck-core
//!
//! Core framework for linting behaviour-driven test files.
//!
//! This crate provides the foundational traits and types:
//!
//! - [`Scanner`] for discovering test files
//! - [`Parser`] for turning a file into a tree of [`Block`]s
//! - [`Rule`] trait for checks over a block and its ancestors
//! - [`RuleEngine`] for running rules over one tree
//! - [`Analyzer`] for orchestrating a whole run into a [`Report`]
//! - [`report`] renderers for text, JSON and compact output
//!
//! ## Example
//!
//! ```no_run
//! use lintcheck_core::{report, Analyzer};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let analyzer = Analyzer::builder().root("./spec").build()?;
//! let result = analyzer.analyze()?;
//! print!("{}", report::render_text(&result, report::color_enabled()));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod block;
mod config;
mod context;
mod engine;
pub mod parser;
pub mod report;
mod rule;
mod scanner;
mod types;

/// Utility modules for rule implementations.
pub mod utils;

pub use analyzer::{
    Analyzer, AnalyzerBuilder, AnalyzerError, FileOutcome, PARSE_ERROR_CODE, PARSE_ERROR_RULE,
};
pub use block::{Block, BlockError, BlockKind, Span, Statement};
pub use config::{Config, ConfigError, ParserConfig, RuleConfig, ScanConfig, DEFAULT_EXCLUDES};
pub use context::FileContext;
pub use engine::RuleEngine;
pub use parser::{code_only, parse, ParseError, ParseErrorKind, Parser};
pub use rule::{Rule, RuleBox};
pub use scanner::{ScanEntry, ScanError, Scanner, SourceFile};
pub use types::{
    Location, Report, ScanWarning, Severity, SeverityCounts, Suggestion, Violation,
};
pub use utils::allowance::AllowCheck;
