use crate::token::{Span, Token, TokenKind};
use crate::LexerError;

/// What closes the expression currently being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExprFlavor {
    /// `{{ ... }}`
    Normal,
    /// `{{{ ... }}}`
    Unescaped,
    /// `{{{{ ... }}}}`
    Raw,
}

/// Scanner mode determines how input is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScannerMode {
    /// Raw template content between expressions.
    Content,
    /// Inside a `{{ ... }}` expression.
    Expression(ExprFlavor),
}

/// Template source scanner.
///
/// Tokenizes Handlebars-style template source into a stream of tokens.
/// Content mode consumes raw text runs up to the next `{{`; expression
/// mode lexes identifiers, literals, paths, hash arguments, subexpressions
/// and block parameters until the matching closing delimiter.
///
/// Internal cursor and mode state are not reentrant: one scanner serves
/// exactly one pass over one input.
///
/// - `Vec<char>` source for index-based navigation
/// - Separate byte-offset cursor so spans slice the source exactly
/// - Mode-aware brace handling
/// - Position tracking on every token
pub struct Scanner<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
    offset: usize,
    line: usize,
    column: usize,
    mode: ScannerMode,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
            offset: 0,
            line: 1,
            column: 1,
            mode: ScannerMode::Content,
        }
    }

    /// Tokenize the entire source into a vector of tokens (EOF included).
    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
        let mut scanner = Scanner::new(source);
        let mut tokens = Vec::new();

        loop {
            let token = scanner.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }

    /// Read the next token from the source.
    ///
    /// Returns `TokenKind::Eof` at end of input, including when the input
    /// ends mid-expression (`{{user.` is three tokens then EOF, not an
    /// error). Errors are raised only for unterminated strings and
    /// comments and for unexpected characters inside an expression.
    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        match self.mode {
            ScannerMode::Content => self.content_token(),
            ScannerMode::Expression(flavor) => self.expression_token(flavor),
        }
    }

    // --- Content mode ---

    /// Scan a raw content run, an opening delimiter, or a whole comment.
    fn content_token(&mut self) -> Result<Token, LexerError> {
        if self.is_at_end() {
            return Ok(self.eof_token());
        }

        if self.lookahead_is("{{") {
            return self.open_delimiter();
        }

        let start = self.mark();
        let mut text = String::new();
        while !self.is_at_end() && !self.lookahead_is("{{") {
            text.push(self.advance());
        }
        Ok(self.finish(TokenKind::Content(text), start))
    }

    /// Scan an opening delimiter and switch to expression mode, or capture
    /// a whole `{{! ... }}` comment without leaving content mode.
    fn open_delimiter(&mut self) -> Result<Token, LexerError> {
        let start = self.mark();
        self.advance(); // {
        self.advance(); // {

        let kind = match self.peek() {
            '{' => {
                self.advance();
                if self.peek() == '{' {
                    self.advance();
                    self.mode = ScannerMode::Expression(ExprFlavor::Raw);
                    TokenKind::OpenRawBlock
                } else {
                    self.mode = ScannerMode::Expression(ExprFlavor::Unescaped);
                    TokenKind::OpenUnescaped
                }
            }
            '#' => {
                self.advance();
                self.mode = ScannerMode::Expression(ExprFlavor::Normal);
                TokenKind::OpenBlock
            }
            '/' => {
                self.advance();
                self.mode = ScannerMode::Expression(ExprFlavor::Normal);
                TokenKind::OpenEndBlock
            }
            '^' => {
                self.advance();
                self.mode = ScannerMode::Expression(ExprFlavor::Normal);
                TokenKind::OpenInverse
            }
            '>' => {
                self.advance();
                self.mode = ScannerMode::Expression(ExprFlavor::Normal);
                TokenKind::OpenPartial
            }
            '!' => {
                self.advance();
                return self.scan_comment(start);
            }
            _ => {
                self.mode = ScannerMode::Expression(ExprFlavor::Normal);
                TokenKind::Open
            }
        };

        Ok(self.finish(kind, start))
    }

    /// Scan a comment after `{{!` has been consumed. Comments are opaque:
    /// the whole `{{! ... }}` or `{{!-- ... --}}` becomes one token,
    /// embedded newlines and all.
    fn scan_comment(&mut self, start: Mark) -> Result<Token, LexerError> {
        let long_form = self.lookahead_is("--");
        if long_form {
            self.advance();
            self.advance();
        }
        let terminator = if long_form { "--}}" } else { "}}" };

        let mut content = String::new();
        loop {
            if self.is_at_end() {
                return Err(self.error("Unterminated comment".into()));
            }
            if self.lookahead_is(terminator) {
                for _ in 0..terminator.len() {
                    self.advance();
                }
                break;
            }
            content.push(self.advance());
        }

        Ok(self.finish(TokenKind::Comment(content), start))
    }

    // --- Expression mode ---

    /// Scan the next token inside an expression.
    fn expression_token(&mut self, flavor: ExprFlavor) -> Result<Token, LexerError> {
        while !self.is_at_end() && self.peek().is_whitespace() {
            self.advance();
        }

        if self.is_at_end() {
            return Ok(self.eof_token());
        }

        let start = self.mark();
        let ch = self.peek();

        match ch {
            '}' => self.close_delimiter(flavor, start),

            '(' => {
                self.advance();
                Ok(self.finish(TokenKind::OpenSexpr, start))
            }
            ')' => {
                self.advance();
                Ok(self.finish(TokenKind::CloseSexpr, start))
            }
            '|' => {
                self.advance();
                Ok(self.finish(TokenKind::CloseBlockParams, start))
            }
            '@' => {
                self.advance();
                Ok(self.finish(TokenKind::Data, start))
            }
            '.' | '/' => {
                self.advance();
                Ok(self.finish(TokenKind::Sep, start))
            }
            '=' => {
                self.advance();
                Ok(self.finish(TokenKind::Equals, start))
            }

            '"' | '\'' => self.scan_string(start),

            '0'..='9' => self.scan_number(start),
            '-' if self.peek_next().is_ascii_digit() => self.scan_number(start),

            c if c.is_alphabetic() || c == '_' || c == '$' => self.scan_identifier(start),

            _ => Err(self.error(format!("Unexpected character: '{ch}'"))),
        }
    }

    /// Scan the closing delimiter matching the current expression flavor
    /// and switch back to content mode.
    fn close_delimiter(&mut self, flavor: ExprFlavor, start: Mark) -> Result<Token, LexerError> {
        let (expected, kind) = match flavor {
            ExprFlavor::Normal => ("}}", TokenKind::Close),
            ExprFlavor::Unescaped => ("}}}", TokenKind::CloseUnescaped),
            ExprFlavor::Raw => ("}}}}", TokenKind::CloseRawBlock),
        };

        if !self.lookahead_is(expected) {
            return Err(self.error(format!("Expected '{expected}' to close expression")));
        }
        for _ in 0..expected.len() {
            self.advance();
        }

        self.mode = ScannerMode::Content;
        Ok(self.finish(kind, start))
    }

    /// Scan a quoted string literal. The token value is the unescaped
    /// content; the span covers the quotes.
    fn scan_string(&mut self, start: Mark) -> Result<Token, LexerError> {
        let quote = self.advance();

        let mut value = String::new();
        while !self.is_at_end() && self.peek() != quote {
            if self.peek() == '\\' {
                self.advance(); // consume backslash
                if self.is_at_end() {
                    return Err(self.error("Unterminated string".into()));
                }
                match self.peek() {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    '\\' => value.push('\\'),
                    c if c == quote => value.push(c),
                    c => {
                        value.push('\\');
                        value.push(c);
                    }
                }
                self.advance();
            } else {
                value.push(self.advance());
            }
        }

        if self.is_at_end() {
            return Err(self.error("Unterminated string".into()));
        }

        self.advance(); // consume closing quote
        Ok(self.finish(TokenKind::String(value), start))
    }

    /// Scan a number literal (integer, float, optional leading minus).
    fn scan_number(&mut self, start: Mark) -> Result<Token, LexerError> {
        if self.peek() == '-' {
            self.advance();
        }
        while !self.is_at_end() && (self.peek().is_ascii_digit() || self.peek() == '.') {
            self.advance();
        }

        let text = &self.source[start.offset..self.offset];
        let value: f64 = text
            .parse()
            .map_err(|_| self.error(format!("Invalid number: '{text}'")))?;

        Ok(self.finish(TokenKind::Number(value), start))
    }

    /// Scan an identifier or keyword. `as` directly followed by a pipe
    /// opens a block-parameter list and is captured as one token together
    /// with the pipe.
    fn scan_identifier(&mut self, start: Mark) -> Result<Token, LexerError> {
        let mut ident = String::new();
        ident.push(self.advance());

        while !self.is_at_end() && Self::is_ident_char(self.peek()) {
            ident.push(self.advance());
        }

        let kind = match ident.as_str() {
            "true" => TokenKind::Boolean(true),
            "false" => TokenKind::Boolean(false),
            "null" => TokenKind::Null,
            "undefined" => TokenKind::Undefined,
            "as" => {
                if self.consume_block_params_pipe() {
                    TokenKind::OpenBlockParams
                } else {
                    TokenKind::Identifier(ident)
                }
            }
            _ => TokenKind::Identifier(ident),
        };

        Ok(self.finish(kind, start))
    }

    /// After the identifier `as`, consume inline whitespace and a `|` if
    /// present. Restores the cursor when no pipe follows.
    fn consume_block_params_pipe(&mut self) -> bool {
        let saved = (self.pos, self.offset, self.line, self.column);
        while !self.is_at_end() && (self.peek() == ' ' || self.peek() == '\t') {
            self.advance();
        }
        if !self.is_at_end() && self.peek() == '|' {
            self.advance();
            return true;
        }
        (self.pos, self.offset, self.line, self.column) = saved;
        false
    }

    fn is_ident_char(c: char) -> bool {
        c.is_alphanumeric() || c == '_' || c == '-' || c == '$'
    }

    // --- Helpers ---

    fn eof_token(&self) -> Token {
        Token::new(
            TokenKind::Eof,
            Span::new(self.offset, self.offset, self.line, self.column),
        )
    }

    fn mark(&self) -> Mark {
        Mark {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    fn finish(&self, kind: TokenKind, start: Mark) -> Token {
        Token::new(
            kind,
            Span::new(start.offset, self.offset, start.line, start.column),
        )
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.chars[self.pos]
        }
    }

    fn peek_next(&self) -> char {
        if self.pos + 1 >= self.chars.len() {
            '\0'
        } else {
            self.chars[self.pos + 1]
        }
    }

    /// True when the upcoming characters match `expected` exactly.
    fn lookahead_is(&self, expected: &str) -> bool {
        let mut i = self.pos;
        for c in expected.chars() {
            if i >= self.chars.len() || self.chars[i] != c {
                return false;
            }
            i += 1;
        }
        true
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.pos];
        self.pos += 1;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn error(&self, message: String) -> LexerError {
        LexerError {
            message,
            line: self.line,
            column: self.column,
            offset: self.offset,
        }
    }
}

/// Saved start position of an in-progress token.
#[derive(Clone, Copy)]
struct Mark {
    offset: usize,
    line: usize,
    column: usize,
}
