//! Stage 4: semantic classification.
//!
//! Non-identifier tokens map statically from terminal kind to category.
//! Identifiers go through an ordered rule chain mixing local neighbors
//! (previous/next token) with the structural context computed in stage 3;
//! the first matching rule wins.

use crate::annotate::{AnnotatedToken, ExprKind};
use crate::Category;
use stencil_lexer::TokenKind;

/// Classify every annotated token. The result is parallel to the input.
pub(crate) fn classify(tokens: &[AnnotatedToken]) -> Vec<Category> {
    (0..tokens.len())
        .map(|i| classify_at(tokens, i))
        .collect()
}

fn classify_at(tokens: &[AnnotatedToken], i: usize) -> Category {
    let ann = &tokens[i];
    let prev = i.checked_sub(1).map(|p| &tokens[p].token.kind);
    let next = tokens.get(i + 1).map(|n| &n.token.kind);

    let name = match &ann.token.kind {
        TokenKind::Identifier(name) => name,
        kind => return static_category(kind),
    };

    // 1. `this` always refers to the current context
    if name == "this" {
        return Category::DataVar;
    }

    // 2. Block-parameter names
    if ann.in_block_params {
        return Category::BlockParam;
    }

    // 3. Hash arguments: key before `=`, value after it
    if next == Some(&TokenKind::Equals) {
        return Category::HashKey;
    }
    if prev == Some(&TokenKind::Equals) {
        return Category::HashValue;
    }

    // 4. `@`-prefixed data variables
    if prev == Some(&TokenKind::Data) {
        return Category::DataVar;
    }

    // 5. Path continuations inherit from their root
    if prev == Some(&TokenKind::Sep) {
        return if ann.after_helper {
            Category::HelperArg
        } else {
            Category::VariablePath
        };
    }

    // 6. Contextual rules by enclosing expression kind
    match ann.expr {
        ExprKind::BlockOpen | ExprKind::BlockClose => {
            if prev.is_some_and(|k| k.is_opener()) {
                Category::BlockKeyword
            } else {
                Category::HelperArg
            }
        }
        ExprKind::Partial => {
            if prev == Some(&TokenKind::OpenPartial) {
                Category::Helper
            } else {
                Category::HelperArg
            }
        }
        _ if prev == Some(&TokenKind::OpenSexpr) => Category::Helper,
        ExprKind::Mustache => {
            if ann.after_helper {
                Category::HelperArg
            } else {
                first_identifier_category(next)
            }
        }
        _ => Category::Variable,
    }
}

/// The first identifier of a value-output expression is a helper when an
/// argument follows it, a variable otherwise (a trailing path separator
/// also means variable).
fn first_identifier_category(next: Option<&TokenKind>) -> Category {
    match next {
        Some(TokenKind::Sep) => Category::Variable,
        Some(TokenKind::Identifier(_)) | Some(TokenKind::Data) | Some(TokenKind::OpenSexpr) => {
            Category::Helper
        }
        Some(kind) if kind.is_literal() => Category::Helper,
        _ => Category::Variable,
    }
}

/// Static terminal-kind to category mapping for non-identifier tokens.
fn static_category(kind: &TokenKind) -> Category {
    match kind {
        TokenKind::OpenRawBlock | TokenKind::CloseRawBlock => Category::Raw,
        kind if kind.is_opener() || kind.is_closer() => Category::Brace,
        TokenKind::Sep | TokenKind::Equals => Category::Brace,
        TokenKind::Comment(_) => Category::Comment,
        kind if kind.is_literal() => Category::Literal,
        TokenKind::Data => Category::DataVar,
        TokenKind::OpenBlockParams | TokenKind::CloseBlockParams => Category::BlockKeyword,
        TokenKind::OpenSexpr | TokenKind::CloseSexpr => Category::SubexprParen,
        TokenKind::Content(_) => Category::Text,
        _ => Category::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::annotate;
    use stencil_lexer::Scanner;

    /// Helper: classify a source and return (text, category) for identifiers.
    fn ident_categories(source: &str) -> Vec<(String, Category)> {
        let tokens: Vec<_> = Scanner::tokenize(source)
            .unwrap()
            .into_iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .collect();
        let annotated = annotate(tokens);
        let categories = classify(&annotated);
        annotated
            .iter()
            .zip(&categories)
            .filter_map(|(a, c)| match &a.token.kind {
                TokenKind::Identifier(name) => Some((name.clone(), *c)),
                _ => None,
            })
            .collect()
    }

    fn category_of(source: &str, name: &str) -> Category {
        ident_categories(source)
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
            .unwrap_or_else(|| panic!("no identifier {name:?} in {source:?}"))
    }

    // =========================================================================
    // Precedence rules, top to bottom
    // =========================================================================

    #[test]
    fn test_this_beats_everything() {
        assert_eq!(category_of("{{#if this}}", "this"), Category::DataVar);
        assert_eq!(category_of("{{log this}}", "this"), Category::DataVar);
    }

    #[test]
    fn test_block_param_names() {
        assert_eq!(
            category_of("{{#each xs as |row|}}", "row"),
            Category::BlockParam
        );
    }

    #[test]
    fn test_hash_key_and_value() {
        assert_eq!(category_of("{{f k=v}}", "k"), Category::HashKey);
        assert_eq!(category_of("{{f k=v}}", "v"), Category::HashValue);
    }

    #[test]
    fn test_data_var_after_sigil() {
        assert_eq!(category_of("{{@last}}", "last"), Category::DataVar);
        assert_eq!(category_of("{{f @key}}", "key"), Category::DataVar);
    }

    #[test]
    fn test_path_inheritance() {
        assert_eq!(category_of("{{a.b}}", "b"), Category::VariablePath);
        assert_eq!(category_of("{{f a.b}}", "b"), Category::HelperArg);
    }

    #[test]
    fn test_block_keyword_position() {
        assert_eq!(category_of("{{#custom arg}}", "custom"), Category::BlockKeyword);
        assert_eq!(category_of("{{#custom arg}}", "arg"), Category::HelperArg);
        assert_eq!(category_of("{{/custom}}", "custom"), Category::BlockKeyword);
    }

    #[test]
    fn test_partial_name_and_args() {
        assert_eq!(category_of("{{> row item}}", "row"), Category::Helper);
        assert_eq!(category_of("{{> row item}}", "item"), Category::HelperArg);
    }

    #[test]
    fn test_subexpression_head_is_helper() {
        assert_eq!(category_of("{{f (g x)}}", "g"), Category::Helper);
        assert_eq!(category_of("{{f (g x)}}", "x"), Category::HelperArg);
    }

    #[test]
    fn test_bare_variable() {
        assert_eq!(category_of("{{count}}", "count"), Category::Variable);
    }

    #[test]
    fn test_path_root_is_variable() {
        assert_eq!(category_of("{{user.name}}", "user"), Category::Variable);
    }

    #[test]
    fn test_helper_detected_by_following_argument() {
        assert_eq!(category_of("{{fmt date}}", "fmt"), Category::Helper);
        assert_eq!(category_of("{{fmt 1}}", "fmt"), Category::Helper);
        assert_eq!(category_of("{{fmt \"s\"}}", "fmt"), Category::Helper);
        assert_eq!(category_of("{{fmt @idx}}", "fmt"), Category::Helper);
        assert_eq!(category_of("{{fmt (g)}}", "fmt"), Category::Helper);
    }
}
