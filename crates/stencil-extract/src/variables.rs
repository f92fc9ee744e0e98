//! Variable extraction over parsed expressions.
//!
//! Walks the expression stream with a stack of open block frames,
//! recording every variable path a template references. Paths inside
//! `each` and `with` blocks are prefixed with their context so
//! `{{#each items}}{{name}}{{/each}}` reports `items[].name`.

use std::collections::HashSet;

use serde::Serialize;
use stencil_lexer::{is_built_in, Token, TokenKind};

use crate::expression::{parse_expressions, Expression, ExpressionKind};

/// Shape of an extracted variable reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    /// A bare top-level name.
    Simple,
    /// A dotted path, or a name resolved inside a block scope.
    Nested,
    /// The subject of a block helper.
    Block,
}

/// Built-in block helper that introduced a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    If,
    Each,
    With,
    Unless,
}

impl BlockType {
    fn from_helper(name: &str) -> Option<Self> {
        match name {
            "if" => Some(BlockType::If),
            "each" => Some(BlockType::Each),
            "with" => Some(BlockType::With),
            "unless" => Some(BlockType::Unless),
            _ => None,
        }
    }
}

/// One variable reference found in a template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedVariable {
    /// First segment of the reference as written.
    pub name: String,
    /// Full path including any block-scope prefix.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: VariableKind,
    #[serde(rename = "blockType", skip_serializing_if = "Option::is_none")]
    pub block_type: Option<BlockType>,
    /// Name of the enclosing block subject, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Full extraction result for one template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    pub variables: Vec<ExtractedVariable>,
    /// Top-level names in first-seen order.
    #[serde(rename = "rootVariables")]
    pub root_variables: Vec<String>,
}

/// Extract every variable referenced by the template.
///
/// Never fails: malformed spans are skipped by the expression parser and
/// extraction proceeds with whatever parsed cleanly.
pub fn extract(content: &str) -> Extraction {
    let mut extractor = Extractor::new();
    for expression in parse_expressions(content) {
        extractor.process(&expression);
    }
    Extraction {
        variables: extractor.variables,
        root_variables: extractor.root_variables,
    }
}

/// One open block on the scope stack.
struct BlockFrame {
    helper: String,
    /// Subject name contributing to nested paths, empty when the block
    /// does not introduce a scope (`if`, subexpression subjects, `@data`).
    context: String,
}

struct Extractor {
    stack: Vec<BlockFrame>,
    variables: Vec<ExtractedVariable>,
    seen_paths: HashSet<String>,
    root_variables: Vec<String>,
}

impl Extractor {
    fn new() -> Self {
        Self {
            stack: Vec::new(),
            variables: Vec::new(),
            seen_paths: HashSet::new(),
            root_variables: Vec::new(),
        }
    }

    fn process(&mut self, expression: &Expression) {
        match expression.kind {
            ExpressionKind::Mustache => self.process_mustache(&expression.tokens),
            ExpressionKind::Block => self.process_block(expression),
            ExpressionKind::Inverse => self.process_inverse(&expression.tokens),
            ExpressionKind::EndBlock => {
                self.stack.pop();
            }
            ExpressionKind::Partial => self.process_partial(&expression.tokens),
        }
    }

    fn process_mustache(&mut self, tokens: &[Token]) {
        let Some(first) = tokens.first() else {
            return;
        };
        // `{{@index}}` and friends are loop metadata, not data variables
        if first.kind == TokenKind::Data {
            return;
        }

        let Some(name) = identifier_text(first) else {
            self.extract_arguments(tokens);
            return;
        };

        if is_built_in(name) {
            self.extract_arguments(&tokens[1..]);
            return;
        }

        let (segments, consumed) = collect_path(tokens, 0);
        if consumed == tokens.len() {
            // A lone path is a variable output
            self.record(&segments, None);
        } else {
            // Anything after the path makes it a helper call
            self.extract_arguments(&tokens[consumed..]);
        }
    }

    fn process_block(&mut self, expression: &Expression) {
        let tokens = &expression.tokens;
        let Some(helper) = expression.helper_name.clone() else {
            self.stack.push(BlockFrame {
                helper: String::new(),
                context: String::new(),
            });
            return;
        };

        match helper.as_str() {
            "each" | "with" => self.open_scoped_block(&helper, tokens),
            name if is_built_in(name) => self.open_conditional_block(&helper, tokens),
            _ => {
                // Unknown block helper: its arguments are still data refs,
                // but it introduces no scope
                let after = skip_leading_path(tokens);
                self.extract_arguments(&tokens[after..]);
                self.stack.push(BlockFrame {
                    helper,
                    context: String::new(),
                });
            }
        }
    }

    /// `{{#each ...}}` and `{{#with ...}}` introduce a scope whose subject
    /// prefixes paths inside the block.
    fn open_scoped_block(&mut self, helper: &str, tokens: &[Token]) {
        let start = helper_position(tokens, helper) + 1;
        let subject = tokens.get(start);

        // `{{#each (lookup ...)}}` or `{{#each @root.items}}` cannot name
        // a context, so the frame is scopeless
        let scopeless = match subject.map(|t| &t.kind) {
            Some(TokenKind::OpenSexpr) | Some(TokenKind::Data) | None => true,
            _ => false,
        };
        if scopeless {
            self.extract_arguments(&tokens[start..]);
            self.stack.push(BlockFrame {
                helper: helper.to_string(),
                context: String::new(),
            });
            return;
        }

        let (segments, consumed) = collect_path(tokens, start);
        if segments.is_empty() || is_built_in(&segments[0]) {
            self.extract_arguments(&tokens[start..]);
            self.stack.push(BlockFrame {
                helper: helper.to_string(),
                context: String::new(),
            });
            return;
        }

        self.record(&segments, BlockType::from_helper(helper));
        self.extract_arguments(&tokens[start + consumed..]);
        self.stack.push(BlockFrame {
            helper: helper.to_string(),
            context: segments[0].clone(),
        });
    }

    /// `{{#if ...}}` and `{{#unless ...}}` record their subject but do not
    /// change what paths inside the block resolve against.
    fn open_conditional_block(&mut self, helper: &str, tokens: &[Token]) {
        let start = helper_position(tokens, helper) + 1;

        match tokens.get(start).map(|t| &t.kind) {
            Some(TokenKind::OpenSexpr) => self.extract_arguments(&tokens[start..]),
            _ => {
                let (segments, consumed) = collect_path(tokens, start);
                if segments.is_empty() {
                    self.extract_arguments(&tokens[start..]);
                } else {
                    if !is_built_in(&segments[0]) {
                        self.record(&segments, BlockType::from_helper(helper));
                    }
                    self.extract_arguments(&tokens[start + consumed..]);
                }
            }
        }

        self.stack.push(BlockFrame {
            helper: helper.to_string(),
            context: String::new(),
        });
    }

    /// `{{^name}}` renders when its subject is falsy. The subject is a
    /// variable reference like the argument of `unless`; the section
    /// introduces no scope.
    fn process_inverse(&mut self, tokens: &[Token]) {
        match tokens.first().map(|t| &t.kind) {
            Some(TokenKind::OpenSexpr) => self.extract_arguments(tokens),
            _ => {
                let (segments, consumed) = collect_path(tokens, 0);
                if segments.is_empty() {
                    self.extract_arguments(tokens);
                } else {
                    if !is_built_in(&segments[0]) {
                        self.record(&segments, Some(BlockType::Unless));
                    }
                    self.extract_arguments(&tokens[consumed..]);
                }
            }
        }

        self.stack.push(BlockFrame {
            helper: String::new(),
            context: String::new(),
        });
    }

    fn process_partial(&mut self, tokens: &[Token]) {
        // The partial name itself is not a data variable
        let after_name = match tokens.first().map(|t| &t.kind) {
            Some(TokenKind::Identifier(_)) => skip_leading_path(tokens),
            Some(TokenKind::String(_)) => 1,
            _ => 0,
        };
        self.extract_arguments(&tokens[after_name..]);
    }

    /// Walk an argument run and record every path that refers to data.
    fn extract_arguments(&mut self, tokens: &[Token]) {
        let mut i = 0;
        while i < tokens.len() {
            match &tokens[i].kind {
                // Inside a subexpression the first path is a helper name
                TokenKind::OpenSexpr => {
                    i += 1;
                    i += skip_leading_path(&tokens[i..]);
                    continue;
                }
                TokenKind::Data => {
                    i += 1;
                    i += skip_leading_path(&tokens[i..]);
                    continue;
                }
                // Block parameters bind new names, they reference nothing
                TokenKind::OpenBlockParams => {
                    while i < tokens.len() && tokens[i].kind != TokenKind::CloseBlockParams {
                        i += 1;
                    }
                    i += 1;
                    continue;
                }
                TokenKind::Identifier(name) => {
                    // Hash key: `key=value`
                    if matches!(tokens.get(i + 1).map(|t| &t.kind), Some(TokenKind::Equals)) {
                        i += 2;
                        continue;
                    }
                    if is_built_in(name) {
                        i += 1;
                        continue;
                    }
                    let (segments, consumed) = collect_path(tokens, i);
                    if !segments.is_empty() {
                        self.record(&segments, None);
                    }
                    i += consumed.max(1);
                }
                _ => i += 1,
            }
        }
    }

    /// Current path prefix and root context from the open block stack.
    fn scope(&self) -> (String, Option<String>) {
        let mut prefix = String::new();
        let mut root = None;
        for frame in &self.stack {
            if frame.context.is_empty() {
                continue;
            }
            if frame.helper == "each" {
                prefix.push_str(&frame.context);
                prefix.push_str("[].");
            } else {
                prefix.push_str(&frame.context);
                prefix.push('.');
            }
            if root.is_none() {
                root = Some(frame.context.clone());
            }
        }
        (prefix, root)
    }

    fn record(&mut self, segments: &[String], block_type: Option<BlockType>) {
        if segments.is_empty() {
            return;
        }
        let (prefix, context) = self.scope();
        let path = format!("{}{}", prefix, segments.join("."));

        if !self.seen_paths.insert(path.clone()) {
            return;
        }

        let kind = if block_type.is_some() {
            VariableKind::Block
        } else if path.contains('.') || context.is_some() {
            VariableKind::Nested
        } else {
            VariableKind::Simple
        };

        let name = segments[0].clone();
        if context.is_none() && !self.root_variables.contains(&name) {
            self.root_variables.push(name.clone());
        }

        self.variables.push(ExtractedVariable {
            name,
            path,
            kind,
            block_type,
            context,
        });
    }
}

fn identifier_text(token: &Token) -> Option<&str> {
    match &token.kind {
        TokenKind::Identifier(name) => Some(name),
        _ => None,
    }
}

/// Index of the token holding the helper name.
fn helper_position(tokens: &[Token], helper: &str) -> usize {
    tokens
        .iter()
        .position(|t| identifier_text(t) == Some(helper))
        .unwrap_or(0)
}

/// Collect a dotted path starting at `start`, returning its segments and
/// the number of tokens consumed. Stops before a hash key, wherever it
/// appears, so neither `a b=c` nor `a.b=c` swallows `b`.
fn collect_path(tokens: &[Token], start: usize) -> (Vec<String>, usize) {
    let mut segments = Vec::new();
    let mut i = start;

    while i < tokens.len() {
        let Some(name) = identifier_text(&tokens[i]) else {
            break;
        };
        if matches!(tokens.get(i + 1).map(|t| &t.kind), Some(TokenKind::Equals)) {
            break;
        }
        segments.push(name.to_string());
        i += 1;
        match tokens.get(i).map(|t| &t.kind) {
            Some(TokenKind::Sep) => i += 1,
            _ => break,
        }
    }

    (segments, i - start)
}

/// Number of tokens spanned by a leading dotted path, zero if the run
/// does not start with an identifier.
fn skip_leading_path(tokens: &[Token]) -> usize {
    let (_, consumed) = collect_path(tokens, 0);
    consumed
}
