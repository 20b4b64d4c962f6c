//! Rule trait for defining lint rules.

use crate::block::Block;
use crate::context::FileContext;
use crate::types::{Severity, Violation};

/// A lint rule over the block tree of one file.
///
/// The engine calls [`Rule::check`] once for every block of the tree,
/// depth-first, passing the chain of enclosing blocks (the synthetic file
/// root first). Rules hold only their configuration and must not depend on
/// being called in any particular order relative to other rules.
///
/// # Example
///
/// ```
/// use lintcheck_core::{Block, BlockKind, FileContext, Rule, Severity, Violation};
///
/// pub struct NoEmptyExamples;
///
/// impl Rule for NoEmptyExamples {
///     fn name(&self) -> &'static str { "no-empty-examples" }
///     fn code(&self) -> &'static str { "LC100" }
///
///     fn check(&self, ctx: &FileContext, block: &Block, _ancestors: &[&Block]) -> Vec<Violation> {
///         if block.kind() == BlockKind::Example && block.statements().is_empty() {
///             vec![Violation::new(
///                 self.code(),
///                 self.name(),
///                 self.default_severity(),
///                 ctx.block_location(block),
///                 "example has no body",
///             )]
///         } else {
///             Vec::new()
///         }
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "single-expectation").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "LC002").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Whether this rule requires a reason when using allow directives.
    ///
    /// By default, rules with `Severity::Error` require a reason.
    fn requires_allow_reason(&self) -> bool {
        self.default_severity() == Severity::Error
    }

    /// Checks one block and returns any violations found.
    ///
    /// `ancestors` lists the enclosing blocks, outermost first; it is empty
    /// only for the file root.
    fn check(&self, ctx: &FileContext, block: &Block, ancestors: &[&Block]) -> Vec<Violation>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;
