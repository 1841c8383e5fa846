//! Lexical outline of a script: every `def`/`class` name in source order.

use serde::Serialize;

use crate::lexer::{Lexer, TokenKind};
use crate::syntax::SyntaxConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlineKind {
    Function,
    Class,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineItem {
    pub name: String,
    /// Byte offset of the name's first character.
    pub offset: usize,
    pub len: usize,
    pub kind: OutlineKind,
}

/// Scans `source` for definitions without executing it.
///
/// Nested definitions are included since no scoping is tracked. Scanning stops
/// quietly at the first lexical error; everything found before it is returned.
pub fn extract_outline(source: &str) -> Vec<OutlineItem> {
    collect_definitions(source, Lexer::new(source))
}

/// [`extract_outline`] using the reserved words and string delimiters of
/// `syntax`.
pub fn extract_outline_with(source: &str, syntax: &SyntaxConfig) -> Vec<OutlineItem> {
    collect_definitions(source, Lexer::with_syntax(source, syntax))
}

fn collect_definitions(source: &str, mut lexer: Lexer<'_>) -> Vec<OutlineItem> {
    let mut items = Vec::new();

    while let Some(token) = lexer.next() {
        let kind = match token.kind {
            TokenKind::Def => OutlineKind::Function,
            TokenKind::Class => OutlineKind::Class,
            _ => continue,
        };
        match lexer.next() {
            Some(name) if name.kind == TokenKind::Identifier => items.push(OutlineItem {
                name: name.text(source).to_string(),
                offset: name.start,
                len: name.len,
                kind,
            }),
            Some(_) => {}
            None => break,
        }
    }
    items
}
