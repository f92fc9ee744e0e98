//! Stage 2: context-free token repair.
//!
//! Punctuation that reaches the identifier bucket is retyped to its true
//! kind: a lone `.` is a path separator, a lone `=` a hash-equals. The
//! repair is applied uniformly, independent of position, and never touches
//! spans or text.

use stencil_lexer::{Token, TokenKind};

/// Repair known identifier misclassifications in place.
pub(crate) fn normalize(mut tokens: Vec<Token>) -> Vec<Token> {
    for token in &mut tokens {
        if let TokenKind::Identifier(text) = &token.kind {
            match text.as_str() {
                "." => token.kind = TokenKind::Sep,
                "=" => token.kind = TokenKind::Equals,
                _ => {}
            }
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_lexer::Span;

    fn tok(kind: TokenKind, start: usize, end: usize) -> Token {
        Token::new(kind, Span::new(start, end, 1, start + 1))
    }

    #[test]
    fn test_lone_dot_becomes_separator() {
        let tokens = normalize(vec![tok(TokenKind::Identifier(".".into()), 2, 3)]);
        assert_eq!(tokens[0].kind, TokenKind::Sep);
        assert_eq!(tokens[0].span.start, 2);
        assert_eq!(tokens[0].span.end, 3);
    }

    #[test]
    fn test_lone_equals_becomes_hash_equals() {
        let tokens = normalize(vec![tok(TokenKind::Identifier("=".into()), 5, 6)]);
        assert_eq!(tokens[0].kind, TokenKind::Equals);
    }

    #[test]
    fn test_regular_identifiers_untouched() {
        let tokens = normalize(vec![
            tok(TokenKind::Identifier("name".into()), 0, 4),
            tok(TokenKind::Identifier("a.b".into()), 5, 8),
        ]);
        assert_eq!(tokens[0].kind, TokenKind::Identifier("name".into()));
        // Only an exact single-character match is retyped
        assert_eq!(tokens[1].kind, TokenKind::Identifier("a.b".into()));
    }

    #[test]
    fn test_non_identifiers_untouched() {
        let tokens = normalize(vec![tok(TokenKind::Sep, 0, 1), tok(TokenKind::Equals, 1, 2)]);
        assert_eq!(tokens[0].kind, TokenKind::Sep);
        assert_eq!(tokens[1].kind, TokenKind::Equals);
    }
}
