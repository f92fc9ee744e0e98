//! Stage 5: gap-free reassembly.
//!
//! Walks the classified tokens in order, filling untokenized runs with
//! synthetic text spans so the output partitions the whole input. A `@`
//! sigil directly adjacent to the following identifier is merged into a
//! single data-var span (`@index` is one token, not two).

use crate::annotate::AnnotatedToken;
use crate::{Category, HighlightToken};
use stencil_lexer::TokenKind;

/// Reassemble classified tokens into full-coverage highlight spans.
pub(crate) fn assemble(
    source: &str,
    tokens: &[AnnotatedToken],
    categories: &[Category],
) -> Vec<HighlightToken> {
    let mut out = Vec::with_capacity(tokens.len() + 2);
    let mut cursor = 0;
    let mut i = 0;

    while i < tokens.len() {
        let span = tokens[i].token.span;

        if span.start > cursor {
            push_span(&mut out, source, Category::Text, cursor, span.start);
        }

        // Merge `@` with a directly adjacent identifier
        let merged = tokens[i].token.kind == TokenKind::Data
            && tokens.get(i + 1).is_some_and(|n| {
                matches!(n.token.kind, TokenKind::Identifier(_)) && n.token.span.start == span.end
            });
        if merged {
            let end = tokens[i + 1].token.span.end;
            push_span(&mut out, source, Category::DataVar, span.start, end);
            cursor = end;
            i += 2;
            continue;
        }

        push_span(&mut out, source, categories[i], span.start, span.end);
        cursor = span.end;
        i += 1;
    }

    if cursor < source.len() {
        push_span(&mut out, source, Category::Text, cursor, source.len());
    }

    out
}

fn push_span(
    out: &mut Vec<HighlightToken>,
    source: &str,
    category: Category,
    start: usize,
    end: usize,
) {
    if end <= start {
        return;
    }
    out.push(HighlightToken {
        category,
        value: source[start..end].to_string(),
        start,
        end,
    });
}
