//! Line-level tokenizer for block delimiters.
//!
//! Works on one physical line at a time. String, regex and `%` literal
//! contents and trailing comments are masked with spaces first, so byte offsets in the
//! masked line match the raw line.

/// Which closer ends a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delim {
    /// Closed by `end` (`do`, `if`, `def`, ...).
    End,
    /// Closed by `}`.
    Brace,
}

impl Delim {
    pub(crate) fn closer(self) -> &'static str {
        match self {
            Self::End => "end",
            Self::Brace => "}",
        }
    }
}

/// A delimiter token with its byte range in the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token {
    /// Opens a frame; `start..end` covers the token text.
    Open { delim: Delim, start: usize, end: usize },
    /// Closes a frame.
    Close { delim: Delim, start: usize },
}

/// Keywords that open an `end`-terminated frame when they lead a statement.
const LEADING_OPENERS: &[&str] = &[
    "if", "unless", "while", "until", "case", "begin", "def", "class", "module", "for",
];

/// Characters after which a keyword starts a new expression.
const EXPRESSION_STARTS: &[u8] = b"=(;[,{|&:?";

/// Characters after which `/` or `%` opens a literal instead of dividing.
const LITERAL_STARTS: &[u8] = b"=(,[{|&!;~?:>";

/// Operators that make a leading keyword an operand (`context || x`).
const BINARY_OPERATORS: &[u8] = b"+-*/%<>|&^!?";

/// A literal whose contents are being masked.
#[derive(Debug, Clone, Copy)]
enum Literal {
    /// Quoted string closed by the same quote.
    Quote(u8),
    /// `/.../` regex.
    Regex,
    /// `%w[...]`, `%r{...}`, `%(...)`; bracket delimiters nest.
    Percent { open: u8, close: u8, depth: usize },
}

/// Replaces string, regex and `%` literal contents and comments with
/// spaces.
///
/// Quote and slash characters are kept so an empty literal is still
/// visible as code; `%` literal delimiters are blanked. An unterminated
/// literal masks to the end of the line.
pub(crate) fn mask(line: &str) -> String {
    let bytes = line.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut literal: Option<Literal> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let Some(open) = literal else {
            match b {
                b'\'' | b'"' | b'`' => {
                    literal = Some(Literal::Quote(b));
                    out.push(b);
                }
                b'/' if opens_literal(&out, bytes.get(i + 1).copied()) => {
                    literal = Some(Literal::Regex);
                    out.push(b);
                }
                b'%' => match percent_literal(&bytes[i + 1..]) {
                    Some((prefix, open, close)) if opens_literal(&out, Some(bytes[i + 1])) => {
                        out.push(b'%');
                        out.extend_from_slice(&bytes[i + 1..i + prefix]);
                        out.push(b' ');
                        literal = Some(Literal::Percent {
                            open,
                            close,
                            depth: 0,
                        });
                        i += prefix + 1;
                        continue;
                    }
                    _ => out.push(b),
                },
                b'#' => {
                    out.extend(std::iter::repeat(b' ').take(bytes.len() - i));
                    break;
                }
                _ => out.push(b),
            }
            i += 1;
            continue;
        };

        if b == b'\\' && i + 1 < bytes.len() {
            out.extend_from_slice(b"  ");
            i += 2;
            continue;
        }
        match open {
            Literal::Quote(q) if b == q => {
                literal = None;
                out.push(b);
            }
            Literal::Regex if b == b'/' => {
                literal = None;
                out.push(b);
            }
            Literal::Percent { close, depth: 0, .. } if b == close => {
                literal = None;
                out.push(b' ');
            }
            Literal::Percent {
                open,
                close,
                depth,
            } if open != close && (b == open || b == close) => {
                let depth = if b == open { depth + 1 } else { depth - 1 };
                literal = Some(Literal::Percent { open, close, depth });
                out.push(b' ');
            }
            _ => out.push(b' '),
        }
        i += 1;
    }

    // Masked multi-byte characters become runs of spaces.
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Whether a `/` or `%` following the masked text `before` starts a
/// literal. `next` is the byte after it.
fn opens_literal(before: &[u8], next: Option<u8>) -> bool {
    let Some(p) = before.iter().rposition(|b| !b.is_ascii_whitespace()) else {
        return true;
    };
    if LITERAL_STARTS.contains(&before[p]) {
        return true;
    }
    // `match /x/` is an argument, `total / 2` and `a /= 2` divide.
    is_word_byte(before[p])
        && p + 1 < before.len()
        && next.is_some_and(|n| !n.is_ascii_whitespace() && n != b'=')
}

/// Parses the head of a `%` literal after the `%`. Returns the length of
/// the head up to the delimiter, and the opening and closing delimiters.
fn percent_literal(rest: &[u8]) -> Option<(usize, u8, u8)> {
    let (prefix, delim) = match rest {
        [kind, delim, ..] if b"qQwWiIrsx".contains(kind) => (2, *delim),
        [delim, ..] if b"([{<".contains(delim) => (1, *delim),
        _ => return None,
    };
    if delim.is_ascii_alphanumeric() || delim.is_ascii_whitespace() {
        return None;
    }
    let close = match delim {
        b'(' => b')',
        b'[' => b']',
        b'{' => b'}',
        b'<' => b'>',
        other => other,
    };
    Some((prefix, delim, close))
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Returns the leading word of a masked line, allowing dots
/// (`RSpec.describe`), and its byte range.
pub(crate) fn leading_word(masked: &str) -> Option<(&str, usize, usize)> {
    let bytes = masked.as_bytes();
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace())?;
    let mut end = start;
    while end < bytes.len() && (is_word_byte(bytes[end]) || bytes[end] == b'.') {
        end += 1;
    }
    if end == start {
        return None;
    }
    Some((&masked[start..end], start, end))
}

/// Whether the masked text after a leading keyword reads as the start of a
/// call (`it 'works'`, `describe(User)`, `it {`) rather than a local
/// variable of the same name (`context = build`, `feature[:id]`).
pub(crate) fn begins_call(rest: &str) -> bool {
    let bytes = rest.as_bytes();
    match bytes.first() {
        None | Some(b'(' | b'{') => true,
        Some(b) if b.is_ascii_whitespace() => match rest.trim_start().as_bytes() {
            [] => true,
            [b'=' | b'.' | b',' | b')' | b']' | b'}', ..] => false,
            [op, tail @ ..] if BINARY_OPERATORS.contains(op) => {
                let tail = tail.strip_prefix(&[*op]).unwrap_or(tail);
                !matches!(tail.first(), None | Some(b' ' | b'\t' | b'='))
            }
            _ => true,
        },
        Some(_) => false,
    }
}

/// Tokenizes block delimiters in a masked line.
pub(crate) fn tokenize(masked: &str) -> Vec<Token> {
    let bytes = masked.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'{' {
            tokens.push(Token::Open {
                delim: Delim::Brace,
                start: i,
                end: i + 1,
            });
            i += 1;
            continue;
        }
        if b == b'}' {
            tokens.push(Token::Close {
                delim: Delim::Brace,
                start: i,
            });
            i += 1;
            continue;
        }
        if !is_word_byte(b) {
            i += 1;
            continue;
        }

        let start = i;
        while i < bytes.len() && is_word_byte(bytes[i]) {
            i += 1;
        }
        // Method suffixes make a different identifier (`end?`, `begin!`).
        if i < bytes.len() && matches!(bytes[i], b'?' | b'!') {
            i += 1;
            continue;
        }
        let word = &masked[start..i];

        let prev = start.checked_sub(1).map(|p| bytes[p]);
        let next = bytes.get(i).copied();
        // `.end`, `:end`, `@end`, `$end` and `end:` are not keywords.
        if matches!(prev, Some(b'.' | b':' | b'@' | b'$')) || next == Some(b':') {
            continue;
        }

        match word {
            "do" => tokens.push(Token::Open {
                delim: Delim::End,
                start,
                end: i,
            }),
            "end" => tokens.push(Token::Close {
                delim: Delim::End,
                start,
            }),
            w if LEADING_OPENERS.contains(&w) && starts_expression(bytes, start) => {
                tokens.push(Token::Open {
                    delim: Delim::End,
                    start,
                    end: i,
                });
            }
            _ => {}
        }
    }

    tokens
}

fn starts_expression(bytes: &[u8], start: usize) -> bool {
    match bytes[..start].iter().rev().find(|b| !b.is_ascii_whitespace()) {
        None => true,
        Some(b) => EXPRESSION_STARTS.contains(b),
    }
}

/// Detects a heredoc opener (`<<~EOS`, `<<-SQL`, `<<'TEXT'`) and returns its
/// terminator.
pub(crate) fn heredoc_terminator(raw: &str, masked: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let masked_bytes = masked.as_bytes();
    let mut i = 0;
    while i + 2 < bytes.len() {
        if bytes[i] == b'<' && bytes[i + 1] == b'<' && masked_bytes.get(i) == Some(&b'<') {
            let mut j = i + 2;
            if matches!(bytes.get(j), Some(b'~' | b'-')) {
                j += 1;
            }
            if matches!(bytes.get(j), Some(b'\'' | b'"')) {
                j += 1;
            }
            let id_start = j;
            while j < bytes.len() && is_heredoc_id_byte(bytes[j], j > id_start) {
                j += 1;
            }
            if j > id_start {
                return Some(raw[id_start..j].to_string());
            }
        }
        i += 1;
    }
    None
}

fn is_heredoc_id_byte(b: u8, allow_digit: bool) -> bool {
    b.is_ascii_uppercase() || b == b'_' || (allow_digit && b.is_ascii_digit())
}
