/// A position in source text. `start`/`end` are byte offsets into the
/// original input; `line`/`column` are 1-based and kept for error reporting.
///
/// `&source[span.start..span.end]` is always the token's exact text, so a
/// token stream can reconstruct the regions of the input it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

/// Token classification for template source.
///
/// Data-carrying variants embed their value directly (no separate `value`
/// field on Token). The raw text of any token, data-carrying or not, is the
/// source slice of its span.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Expression-opening delimiters
    Open,        // {{
    OpenUnescaped, // {{{
    OpenBlock,   // {{#
    OpenEndBlock, // {{/
    OpenInverse, // {{^
    OpenPartial, // {{>
    OpenRawBlock, // {{{{

    // Expression-closing delimiters
    Close,         // }}
    CloseUnescaped, // }}}
    CloseRawBlock, // }}}}

    // Literals (carry data)
    Identifier(String),
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    Undefined,

    // Punctuation inside expressions
    Sep,    // . or / between path segments
    Equals, // = in hash arguments
    Data,   // @ data-variable sigil
    OpenSexpr,  // (
    CloseSexpr, // )
    OpenBlockParams,  // as |
    CloseBlockParams, // |

    // Outside expressions (carry data)
    Content(String),
    Comment(String),

    // End of input
    Eof,
}

impl TokenKind {
    /// True for any expression-opening delimiter.
    pub fn is_opener(&self) -> bool {
        matches!(
            self,
            TokenKind::Open
                | TokenKind::OpenUnescaped
                | TokenKind::OpenBlock
                | TokenKind::OpenEndBlock
                | TokenKind::OpenInverse
                | TokenKind::OpenPartial
                | TokenKind::OpenRawBlock
        )
    }

    /// True for any expression-closing delimiter.
    pub fn is_closer(&self) -> bool {
        matches!(
            self,
            TokenKind::Close | TokenKind::CloseUnescaped | TokenKind::CloseRawBlock
        )
    }

    /// True for literal value tokens (strings, numbers, booleans, null, undefined).
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::String(_)
                | TokenKind::Number(_)
                | TokenKind::Boolean(_)
                | TokenKind::Null
                | TokenKind::Undefined
        )
    }
}

/// A token produced by the template scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Built-in helper and keyword names recognized by the template language.
pub const BUILT_IN_HELPERS: &[&str] = &[
    "if", "unless", "each", "with", "lookup", "log", "this", "else",
];

/// Check if a name is a built-in helper or keyword.
pub fn is_built_in(name: &str) -> bool {
    BUILT_IN_HELPERS.contains(&name)
}
