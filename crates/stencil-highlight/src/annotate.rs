//! Stage 3: structural context annotation.
//!
//! A single forward pass assigns each token the kind of expression it sits
//! in, whether it is inside a block-parameter list, and whether the path it
//! belongs to trails a helper invocation. Path continuations inherit the
//! flag computed at their root as the pass goes, so the pass stays linear
//! with no look-back re-derivation on long paths.

use stencil_lexer::{Token, TokenKind};

/// Which kind of `{{ }}` construct encloses a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExprKind {
    /// Outside any expression.
    None,
    /// `{{ ... }}` or `{{{ ... }}}` value output.
    Mustache,
    /// `{{# ... }}`, `{{^ ... }}` or `{{{{ ... }}}}` block opening tag.
    BlockOpen,
    /// `{{/ ... }}` block closing tag.
    BlockClose,
    /// `{{> ... }}` partial invocation.
    Partial,
}

/// A raw token plus its derived structural context. Built once per
/// tokenize call, never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AnnotatedToken {
    pub token: Token,
    pub expr: ExprKind,
    pub in_block_params: bool,
    pub after_helper: bool,
}

/// Annotate a normalized token stream in one left-to-right pass.
pub(crate) fn annotate(tokens: Vec<Token>) -> Vec<AnnotatedToken> {
    let mut out = Vec::with_capacity(tokens.len());

    let mut expr = ExprKind::None;
    let mut in_block_params = false;
    // An identifier has already been consumed in the current expression,
    // so later path roots are arguments rather than the primary subject.
    let mut seen_ident = false;
    // The after-helper flag computed at the current path's root.
    let mut path_after_helper = false;
    // Continuation detection: the previous token was a separator that
    // itself followed an identifier.
    let mut prev_was_ident = false;
    let mut prev_was_path_sep = false;

    for token in tokens {
        let mut after_helper = false;

        match &token.kind {
            kind if kind.is_opener() => {
                expr = match kind {
                    TokenKind::Open | TokenKind::OpenUnescaped => ExprKind::Mustache,
                    TokenKind::OpenBlock | TokenKind::OpenInverse | TokenKind::OpenRawBlock => {
                        ExprKind::BlockOpen
                    }
                    TokenKind::OpenEndBlock => ExprKind::BlockClose,
                    TokenKind::OpenPartial => ExprKind::Partial,
                    _ => unreachable!("is_opener covers all opener kinds"),
                };
                seen_ident = false;
                in_block_params = false;
                path_after_helper = false;
            }
            TokenKind::Identifier(_) => {
                let continues_path = prev_was_path_sep;
                after_helper = if continues_path {
                    path_after_helper
                } else {
                    seen_ident
                };
                path_after_helper = after_helper;
                seen_ident = true;
            }
            TokenKind::OpenBlockParams => in_block_params = true,
            _ => {}
        }

        let is_ident = matches!(token.kind, TokenKind::Identifier(_));
        prev_was_path_sep = token.kind == TokenKind::Sep && prev_was_ident;
        prev_was_ident = is_ident;

        let is_closer = token.kind.is_closer();
        let closes_params = token.kind == TokenKind::CloseBlockParams;

        out.push(AnnotatedToken {
            expr,
            in_block_params,
            after_helper,
            token,
        });

        if is_closer {
            expr = ExprKind::None;
            seen_ident = false;
            in_block_params = false;
            path_after_helper = false;
        }
        if closes_params {
            in_block_params = false;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_lexer::Scanner;

    fn annotated(source: &str) -> Vec<AnnotatedToken> {
        let tokens: Vec<Token> = Scanner::tokenize(source)
            .unwrap()
            .into_iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .collect();
        annotate(tokens)
    }

    fn idents(source: &str) -> Vec<(String, ExprKind, bool, bool)> {
        annotated(source)
            .into_iter()
            .filter_map(|a| match &a.token.kind {
                TokenKind::Identifier(name) => Some((
                    name.clone(),
                    a.expr,
                    a.in_block_params,
                    a.after_helper,
                )),
                _ => None,
            })
            .collect()
    }

    // =========================================================================
    // Expression kinds
    // =========================================================================

    #[test]
    fn test_mustache_kind() {
        let anns = annotated("{{name}}");
        assert!(anns.iter().all(|a| a.expr == ExprKind::Mustache));
    }

    #[test]
    fn test_kind_resets_between_expressions() {
        let anns = annotated("{{a}} mid {{#b}}");
        let content = anns
            .iter()
            .find(|a| matches!(a.token.kind, TokenKind::Content(_)))
            .unwrap();
        assert_eq!(content.expr, ExprKind::None);
        let last = anns.last().unwrap();
        assert_eq!(last.expr, ExprKind::BlockOpen);
    }

    #[test]
    fn test_block_and_partial_kinds() {
        assert_eq!(idents("{{#each xs}}")[0].1, ExprKind::BlockOpen);
        assert_eq!(idents("{{/each}}")[0].1, ExprKind::BlockClose);
        assert_eq!(idents("{{^none}}")[0].1, ExprKind::BlockOpen);
        assert_eq!(idents("{{> card}}")[0].1, ExprKind::Partial);
    }

    // =========================================================================
    // Block params flag
    // =========================================================================

    #[test]
    fn test_block_params_flag() {
        let result = idents("{{#each items as |item idx|}}");
        assert_eq!(result[0], ("each".into(), ExprKind::BlockOpen, false, false));
        assert_eq!(result[1].0, "items");
        assert!(!result[1].2);
        assert_eq!(result[2], ("item".into(), ExprKind::BlockOpen, true, true));
        assert_eq!(result[3].0, "idx");
        assert!(result[3].2);
    }

    #[test]
    fn test_params_flag_cleared_after_pipe() {
        let anns = annotated("{{#each xs as |x|}}{{y}}");
        let y = anns
            .iter()
            .find(|a| a.token.kind == TokenKind::Identifier("y".into()))
            .unwrap();
        assert!(!y.in_block_params);
    }

    // =========================================================================
    // after_helper propagation
    // =========================================================================

    #[test]
    fn test_first_identifier_not_after_helper() {
        assert!(!idents("{{name}}")[0].3);
    }

    #[test]
    fn test_second_root_is_after_helper() {
        let result = idents("{{format date}}");
        assert!(!result[0].3);
        assert!(result[1].3);
    }

    #[test]
    fn test_path_continuation_inherits_root_flag() {
        // user.created trails the helper: every segment inherits true
        let result = idents("{{format user.created.at}}");
        assert!(!result[0].3);
        assert!(result[1].3);
        assert!(result[2].3);
        assert!(result[3].3);
    }

    #[test]
    fn test_plain_path_segments_not_after_helper() {
        let result = idents("{{user.profile.bio}}");
        assert!(result.iter().all(|(_, _, _, after)| !after));
    }

    #[test]
    fn test_flag_resets_per_expression() {
        let result = idents("{{format date}}{{name}}");
        assert!(result[1].3);
        assert!(!result[2].3, "new expression starts a fresh helper context");
    }
}
