//! Stencil Lexer
//!
//! Scans Handlebars-style template source into a stream of tokens.
//! Handles the full delimiter family (`{{` `{{{` `{{#` `{{/` `{{^` `{{>`
//! `{{{{`), comments, quoted strings, numbers, paths, hash arguments,
//! subexpressions, block parameters, and raw content runs between
//! expressions.
//!
//! The scanner is a stateful, single-use resource: construct one per
//! input string and drive it with [`Scanner::next_token`]. It is never
//! shared between logical calls; callers needing parallelism create
//! independent instances.
//!
//! # Example
//!
//! ```
//! use stencil_lexer::Scanner;
//!
//! let tokens = Scanner::tokenize("").unwrap();
//! assert_eq!(tokens.len(), 1); // Just EOF
//! ```

pub mod scanner;
pub mod token;

pub use scanner::Scanner;
pub use token::{is_built_in, Span, Token, TokenKind, BUILT_IN_HELPERS};

/// Lexer error with position information.
///
/// `offset` is the byte position at which scanning stopped; consumers use
/// it to truncate (highlighting) or resynchronize (extraction).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Lexer error at line {line}, column {column}: {message}")]
pub struct LexerError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}
