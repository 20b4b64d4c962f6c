//! Single-pass block parser for test files.
//!
//! The parser walks the file line by line, keeping a stack of open frames
//! keyed by explicit delimiters (`do`/`end`, `{`/`}` and the keywords that
//! close with `end`). Lines whose first word is a configured structural
//! keyword open [`Block`]s; every other opener becomes an opaque frame
//! (hooks, `let` blocks, loops) that only has to balance.

mod lexer;

use crate::block::{Block, BlockKind, Span, Statement};
use crate::config::ParserConfig;
use lexer::{Delim, Token};
use std::collections::HashMap;
use tracing::trace;

/// What went wrong while parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    /// A closer with no open block.
    #[error("unexpected `{token}` with no open block")]
    UnexpectedCloser {
        /// The closer found.
        token: &'static str,
    },
    /// A closer of the wrong kind.
    #[error("expected `{expected}` to close the block opened on line {opened_at}, found `{found}`")]
    MismatchedCloser {
        /// Closer the innermost block needs.
        expected: &'static str,
        /// Closer found.
        found: &'static str,
        /// Line of the innermost open block.
        opened_at: usize,
    },
    /// A block still open at end of file.
    #[error("block is never closed")]
    Unclosed,
    /// A suite or context without a label.
    #[error("`{keyword}` block has no label")]
    MissingLabel {
        /// Keyword of the block.
        keyword: String,
    },
    /// A suite or context header with no `do`/`{`.
    #[error("`{keyword}` is not followed by a block")]
    ExpectedBlock {
        /// Keyword of the block.
        keyword: String,
    },
    /// A structural block inside an example body.
    #[error("`{keyword}` cannot be nested inside an example")]
    NestedInExample {
        /// Keyword of the nested block.
        keyword: String,
    },
}

impl ParseErrorKind {
    fn help(&self) -> Option<String> {
        match self {
            Self::UnexpectedCloser { .. } => Some("remove the extra closer".to_string()),
            Self::MismatchedCloser { expected, .. } => Some(format!("close with `{expected}`")),
            Self::Unclosed => Some("add the missing `end` or `}`".to_string()),
            Self::MissingLabel { .. } => {
                Some("describe what is under test, e.g. `describe '#save' do`".to_string())
            }
            Self::ExpectedBlock { .. } => Some("open the group with `do`".to_string()),
            Self::NestedInExample { .. } => {
                Some("move the group out of the example body".to_string())
            }
        }
    }
}

/// Malformed block structure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
#[error("line {line}: {kind}")]
#[diagnostic(code(lintcheck::parse_error))]
pub struct ParseError {
    /// Offending line (1-indexed).
    pub line: usize,
    /// Error detail.
    pub kind: ParseErrorKind,
    #[help]
    help: Option<String>,
}

impl ParseError {
    /// Creates a parse error at `line`.
    #[must_use]
    pub fn new(line: usize, kind: ParseErrorKind) -> Self {
        let help = kind.help();
        Self { line, kind, help }
    }
}

#[derive(Debug)]
struct Frame {
    delim: Delim,
    line: usize,
    /// Set for the frame of an open structural block: byte offset right
    /// after its opener on the header line.
    structural: Option<usize>,
}

/// Parser for behaviour-driven test files.
#[derive(Debug, Clone)]
pub struct Parser {
    keywords: HashMap<String, BlockKind>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(&ParserConfig::default())
    }
}

impl Parser {
    /// Creates a parser recognizing the configured keywords.
    ///
    /// A keyword listed under several kinds keeps the last one
    /// (examples win over contexts, contexts over suites).
    #[must_use]
    pub fn new(config: &ParserConfig) -> Self {
        let mut keywords = HashMap::new();
        for (list, kind) in [
            (&config.suite_keywords, BlockKind::Suite),
            (&config.context_keywords, BlockKind::Context),
            (&config.example_keywords, BlockKind::Example),
        ] {
            for keyword in list {
                keywords.insert(keyword.clone(), kind);
            }
        }
        Self { keywords }
    }

    /// Parses the text of one file into its root suite.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when block nesting is unbalanced, a suite or
    /// context has no label, or a group is nested inside an example.
    pub fn parse(&self, text: &str) -> Result<Block, ParseError> {
        let lines: Vec<&str> = text.lines().collect();
        let mut state = ParseState::new(lines.len());
        let mut index = 0;

        while index < lines.len() {
            let line_no = index + 1;
            let raw = lines[index];
            index += 1;

            if state.skip_special(line_no, raw)? {
                continue;
            }
            if raw.trim() == "__END__" {
                break;
            }

            let mut masked = lexer::mask(raw);
            let header = lexer::leading_word(&masked)
                .filter(|&(_, _, end)| lexer::begins_call(&masked[end..]))
                .and_then(|(word, start, end)| self.keywords.get(word).map(|k| (*k, start, end)));

            match header {
                Some((kind, start, end)) => {
                    // Headers ending in `,` continue on the next line.
                    let mut joined = raw.to_string();
                    while masked.trim_end().ends_with(',') && index < lines.len() {
                        joined.push(' ');
                        joined.push_str(lines[index].trim());
                        index += 1;
                        masked = lexer::mask(&joined);
                    }
                    state.header(line_no, &joined, &masked, kind, start, end)?;
                }
                None => state.body_line(line_no, raw, &masked)?,
            }

            if state.heredoc.is_none() {
                state.heredoc = lexer::heredoc_terminator(raw, &masked);
            }
        }

        state.finish()
    }
}

/// Blanks out string literal contents and comments in one line, keeping
/// byte offsets intact.
///
/// Rules use this to match code patterns without hitting text inside
/// strings.
#[must_use]
pub fn code_only(line: &str) -> String {
    lexer::mask(line)
}

/// Parses `text` with the default keywords.
///
/// # Errors
///
/// See [`Parser::parse`].
pub fn parse(text: &str) -> Result<Block, ParseError> {
    Parser::default().parse(text)
}

struct ParseState {
    root: Block,
    open: Vec<Block>,
    frames: Vec<Frame>,
    heredoc: Option<String>,
    in_block_comment: bool,
}

impl ParseState {
    fn new(line_count: usize) -> Self {
        Self {
            root: Block::root(line_count),
            open: Vec::new(),
            frames: Vec::new(),
            heredoc: None,
            in_block_comment: false,
        }
    }

    fn in_example(&self) -> bool {
        self.open
            .last()
            .is_some_and(|b| b.kind() == BlockKind::Example)
    }

    /// Handles heredoc bodies and `=begin`/`=end` comments. Returns true
    /// when the line was consumed.
    fn skip_special(&mut self, line_no: usize, raw: &str) -> Result<bool, ParseError> {
        if let Some(terminator) = &self.heredoc {
            if raw.trim() == terminator {
                self.heredoc = None;
            }
            self.record_statement(line_no, raw)?;
            return Ok(true);
        }
        if self.in_block_comment {
            if raw.starts_with("=end") {
                self.in_block_comment = false;
            }
            return Ok(true);
        }
        if raw.starts_with("=begin") {
            self.in_block_comment = true;
            return Ok(true);
        }
        Ok(false)
    }

    fn record_statement(&mut self, line_no: usize, raw: &str) -> Result<(), ParseError> {
        let text = raw.trim();
        if text.is_empty() {
            return Ok(());
        }
        if let Some(example) = self.open.last_mut() {
            if example.kind() == BlockKind::Example {
                example
                    .push_statement(Statement::new(line_no, text))
                    .map_err(|_| ParseError::new(line_no, ParseErrorKind::Unclosed))?;
            }
        }
        Ok(())
    }

    fn header(
        &mut self,
        line_no: usize,
        raw: &str,
        masked: &str,
        kind: BlockKind,
        kw_start: usize,
        kw_end: usize,
    ) -> Result<(), ParseError> {
        let keyword = masked[kw_start..kw_end].to_string();
        if self.in_example() {
            return Err(ParseError::new(
                line_no,
                ParseErrorKind::NestedInExample { keyword },
            ));
        }

        let tokens: Vec<Token> = lexer::tokenize(masked)
            .into_iter()
            .filter(|t| token_start(*t) >= kw_end)
            .collect();
        let opener = structural_opener(&tokens);

        let label_end = match opener {
            Some(i) => token_start(tokens[i]),
            None => masked.trim_end().len().max(kw_end),
        };
        let label = extract_label(&raw[kw_end..label_end]);

        if kind != BlockKind::Example && label.is_none() {
            return Err(ParseError::new(
                line_no,
                ParseErrorKind::MissingLabel { keyword },
            ));
        }
        let label = label.unwrap_or_default();
        let span = Span::at(line_no, kw_start + 1);
        trace!(line = line_no, %kind, %label, "block header");

        let Some(opener) = opener else {
            if kind != BlockKind::Example {
                return Err(ParseError::new(
                    line_no,
                    ParseErrorKind::ExpectedBlock { keyword },
                ));
            }
            // Pending example without a body.
            return self.attach(line_no, Block::example(label, span));
        };

        self.open.push(Block::of_kind(kind, label, span));
        for (i, token) in tokens.into_iter().enumerate() {
            let structural = (i == opener).then(|| token_end(token));
            self.apply(line_no, raw, masked, token, structural)?;
        }
        Ok(())
    }

    fn body_line(&mut self, line_no: usize, raw: &str, masked: &str) -> Result<(), ParseError> {
        let example_depth = self.in_example().then_some(self.open.len());
        for token in lexer::tokenize(masked) {
            self.apply(line_no, raw, masked, token, None)?;
        }
        // The line that closes the example is not part of its body.
        if let Some(depth) = example_depth {
            if self.open.len() == depth && !masked.trim().is_empty() {
                self.record_statement(line_no, raw)?;
            }
        }
        Ok(())
    }

    fn apply(
        &mut self,
        line_no: usize,
        raw: &str,
        masked: &str,
        token: Token,
        structural: Option<usize>,
    ) -> Result<(), ParseError> {
        match token {
            Token::Open { delim, .. } => {
                self.frames.push(Frame {
                    delim,
                    line: line_no,
                    structural,
                });
                Ok(())
            }
            Token::Close { delim, start } => {
                let Some(frame) = self.frames.pop() else {
                    return Err(ParseError::new(
                        line_no,
                        ParseErrorKind::UnexpectedCloser {
                            token: delim.closer(),
                        },
                    ));
                };
                if frame.delim != delim {
                    return Err(ParseError::new(
                        line_no,
                        ParseErrorKind::MismatchedCloser {
                            expected: frame.delim.closer(),
                            found: delim.closer(),
                            opened_at: frame.line,
                        },
                    ));
                }
                match frame.structural {
                    Some(body_start) => {
                        let inline = (frame.line == line_no)
                            .then(|| inline_statements(raw, masked, body_start, start));
                        self.close_block(line_no, inline)
                    }
                    None => Ok(()),
                }
            }
        }
    }

    fn close_block(
        &mut self,
        line_no: usize,
        inline: Option<Vec<String>>,
    ) -> Result<(), ParseError> {
        let Some(mut block) = self.open.pop() else {
            return Err(ParseError::new(
                line_no,
                ParseErrorKind::UnexpectedCloser { token: "end" },
            ));
        };

        if let Some(statements) = inline {
            // Opened and closed on one line: a childless example.
            let mut example = Block::example(block.label(), block.span());
            for text in statements {
                example
                    .push_statement(Statement::new(line_no, text))
                    .map_err(|_| ParseError::new(line_no, ParseErrorKind::Unclosed))?;
            }
            block = example;
        } else {
            block.set_end_line(line_no);
        }

        self.attach(line_no, block)
    }

    fn attach(&mut self, line_no: usize, block: Block) -> Result<(), ParseError> {
        let keyword = block.kind().keyword().to_string();
        let parent = self.open.last_mut().unwrap_or(&mut self.root);
        parent
            .push_child(block)
            .map_err(|_| ParseError::new(line_no, ParseErrorKind::NestedInExample { keyword }))
    }

    fn finish(self) -> Result<Block, ParseError> {
        if let Some(frame) = self.frames.last() {
            return Err(ParseError::new(frame.line, ParseErrorKind::Unclosed));
        }
        Ok(self.root)
    }
}

fn token_start(token: Token) -> usize {
    match token {
        Token::Open { start, .. } | Token::Close { start, .. } => start,
    }
}

fn token_end(token: Token) -> usize {
    match token {
        Token::Open { end, .. } => end,
        Token::Close { start, delim } => start + delim.closer().len(),
    }
}

/// Index of the opener that belongs to the header: the last one seen at
/// nesting depth zero, so argument hashes before `do` are skipped.
fn structural_opener(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0usize;
    let mut found = None;
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Open { .. } => {
                if depth == 0 {
                    found = Some(i);
                }
                depth += 1;
            }
            Token::Close { .. } => depth = depth.saturating_sub(1),
        }
    }
    found
}

/// Extracts a block label from the header arguments.
///
/// Quoted labels are unescaped; unquoted ones (`User`, `:name`) run up to
/// the first comma.
fn extract_label(args: &str) -> Option<String> {
    let mut args = args.trim();
    if let Some(inner) = args.strip_prefix('(') {
        args = inner.trim_end().strip_suffix(')').unwrap_or(inner).trim();
    }

    let mut chars = args.chars();
    match chars.next()? {
        q @ ('\'' | '"') => {
            let mut label = String::new();
            let mut escaped = false;
            for c in chars {
                if escaped {
                    if c != q && c != '\\' {
                        label.push('\\');
                    }
                    label.push(c);
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    return Some(label);
                } else {
                    label.push(c);
                }
            }
            Some(label)
        }
        _ => {
            let label = args.split(',').next().unwrap_or(args).trim();
            (!label.is_empty()).then(|| label.to_string())
        }
    }
}

/// Splits the body of a one-line block on top-level `;`.
fn inline_statements(raw: &str, masked: &str, from: usize, to: usize) -> Vec<String> {
    if from >= to {
        return Vec::new();
    }
    let mut statements = Vec::new();
    let mut piece_start = from;
    for (offset, b) in masked.as_bytes()[from..to].iter().enumerate() {
        if *b == b';' {
            statements.push(&raw[piece_start..from + offset]);
            piece_start = from + offset + 1;
        }
    }
    statements.push(&raw[piece_start..to]);
    statements
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
