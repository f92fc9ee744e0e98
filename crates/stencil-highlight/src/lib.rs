//! Stencil Highlight Tokenizer
//!
//! Turns template source into a gap-free sequence of semantically
//! classified spans for syntax highlighting. The pipeline runs five
//! stages over one scanner pass:
//!
//! ```text
//! source → scan → normalize → annotate → classify → assemble → [HighlightToken]
//! ```
//!
//! `tokenize` is total: it never panics and never returns an error. When
//! the scanner fails partway through (templates being actively typed,
//! broken syntax), everything lexed so far keeps its classification and
//! the remainder of the input is emitted as plain text.
//!
//! # Example
//!
//! ```
//! use stencil_highlight::{tokenize, Category};
//!
//! let tokens = tokenize("{{name}}");
//! assert_eq!(tokens[1].category, Category::Variable);
//! assert_eq!(tokens[1].value, "name");
//! ```

mod annotate;
mod assemble;
mod classify;
mod normalize;

use serde::Serialize;
use stencil_lexer::{Scanner, Token, TokenKind};

/// Semantic highlight category of an output span.
///
/// Serializes to the stable kebab-case names consumed by editor themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Text,
    Variable,
    VariablePath,
    BlockKeyword,
    BlockParam,
    Helper,
    HelperArg,
    HashKey,
    HashValue,
    Literal,
    DataVar,
    SubexprParen,
    Comment,
    Raw,
    Brace,
}

impl Category {
    /// The stable string name of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Text => "text",
            Category::Variable => "variable",
            Category::VariablePath => "variable-path",
            Category::BlockKeyword => "block-keyword",
            Category::BlockParam => "block-param",
            Category::Helper => "helper",
            Category::HelperArg => "helper-arg",
            Category::HashKey => "hash-key",
            Category::HashValue => "hash-value",
            Category::Literal => "literal",
            Category::DataVar => "data-var",
            Category::SubexprParen => "subexpr-paren",
            Category::Comment => "comment",
            Category::Raw => "raw",
            Category::Brace => "brace",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified span of the input.
///
/// Concatenating `value` over a `tokenize` result reproduces the input
/// exactly; `start`/`end` byte ranges partition `[0, len)` with no gaps,
/// no overlaps, and no zero-length spans.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightToken {
    #[serde(rename = "type")]
    pub category: Category,
    pub value: String,
    pub start: usize,
    pub end: usize,
}

/// Tokenize template source into highlight spans covering every character.
pub fn tokenize(content: &str) -> Vec<HighlightToken> {
    let raw = scan(content);
    let raw = normalize::normalize(raw);
    let annotated = annotate::annotate(raw);
    let categories = classify::classify(&annotated);
    assemble::assemble(content, &annotated, &categories)
}

/// Stage 1: drive a fresh scanner over the input, collecting raw tokens
/// until EOF or the first scanner error. On error the tokens produced so
/// far are kept; the unconsumed remainder becomes a text gap for the
/// assembly stage to backfill.
fn scan(content: &str) -> Vec<Token> {
    let mut scanner = Scanner::new(content);
    let mut tokens = Vec::new();

    loop {
        match scanner.next_token() {
            Ok(token) => {
                if token.kind == TokenKind::Eof {
                    break;
                }
                tokens.push(token);
            }
            Err(_) => break,
        }
    }

    tokens
}
