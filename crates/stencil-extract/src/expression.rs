//! Expression segmentation with error resynchronization.
//!
//! Re-drives the scanner over successive suffixes of the input: parse
//! forward collecting whole expressions until the scanner fails or input
//! is exhausted; on failure, seek the next `{{` in the unconsumed
//! remainder and resume with a fresh scanner, discarding the malformed
//! span in between. Well-formed expressions survive no matter how broken
//! their surroundings are.

use stencil_lexer::{Scanner, Token, TokenKind};

/// Which kind of construct an expression is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionKind {
    /// `{{ ... }}` or `{{{ ... }}}` value output.
    Mustache,
    /// `{{# ... }}` block opening tag.
    Block,
    /// `{{^ ... }}` inverse section opening tag.
    Inverse,
    /// `{{/ ... }}` block closing tag.
    EndBlock,
    /// `{{> ... }}` partial invocation.
    Partial,
}

/// One fully delimited expression: the tokens between an opening
/// delimiter and its matching close.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub tokens: Vec<Token>,
    /// Text of the first identifier token, or `None` for a bare
    /// data-variable or punctuation-only expression.
    pub helper_name: Option<String>,
}

/// Parse every well-formed expression out of the input.
pub fn parse_expressions(content: &str) -> Vec<Expression> {
    let mut expressions = Vec::new();
    let mut offset = 0;

    // scanning → recovering on failure → scanning again at the next `{{`
    loop {
        match scan_suffix(&content[offset..], &mut expressions) {
            Ok(()) => break,
            Err(stopped_at) => {
                let resume = offset + stopped_at;
                match content[resume..].find("{{") {
                    Some(found) => offset = resume + found,
                    None => break,
                }
            }
        }
    }

    expressions
}

/// Collect expressions from one scanner pass. Returns the byte offset
/// (relative to `input`) where scanning stopped on failure.
fn scan_suffix(input: &str, expressions: &mut Vec<Expression>) -> Result<(), usize> {
    let mut scanner = Scanner::new(input);
    let mut current: Option<(ExpressionKind, Vec<Token>)> = None;

    loop {
        let token = scanner.next_token().map_err(|e| e.offset)?;

        match &token.kind {
            // An expression left open at EOF is discarded
            TokenKind::Eof => return Ok(()),

            TokenKind::Content(_) | TokenKind::Comment(_) => {}

            // Raw-block delimiters never start or end an expression
            TokenKind::OpenRawBlock | TokenKind::CloseRawBlock => current = None,

            TokenKind::Open | TokenKind::OpenUnescaped => {
                current = Some((ExpressionKind::Mustache, Vec::new()));
            }
            TokenKind::OpenBlock => {
                current = Some((ExpressionKind::Block, Vec::new()));
            }
            TokenKind::OpenInverse => {
                current = Some((ExpressionKind::Inverse, Vec::new()));
            }
            TokenKind::OpenEndBlock => {
                current = Some((ExpressionKind::EndBlock, Vec::new()));
            }
            TokenKind::OpenPartial => {
                current = Some((ExpressionKind::Partial, Vec::new()));
            }

            TokenKind::Close | TokenKind::CloseUnescaped => {
                if let Some((kind, tokens)) = current.take() {
                    expressions.push(finish(kind, tokens));
                }
            }

            _ => {
                if let Some((_, tokens)) = &mut current {
                    tokens.push(token);
                }
            }
        }
    }
}

fn finish(kind: ExpressionKind, tokens: Vec<Token>) -> Expression {
    let helper_name = tokens.iter().find_map(|t| match &t.kind {
        TokenKind::Identifier(name) => Some(name.clone()),
        _ => None,
    });
    Expression {
        kind,
        tokens,
        helper_name,
    }
}
