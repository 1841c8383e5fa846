//! Tokenizer for script source, used for editor tooling only.
//!
//! The lexer never fails: malformed input produces a single
//! [`TokenKind::Error`] token after which iteration stops.

use crate::syntax::{SyntaxConfig, KEYWORDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Def,
    Class,
    /// Any other reserved word.
    Keyword,
    Identifier,
    Number,
    Str,
    Operator,
    Error,
    Eof,
}

/// A token as a byte span into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub len: usize,
}

impl Token {
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start..self.start + self.len]
    }
}

pub struct Lexer<'s> {
    source: &'s str,
    /// Keyword and delimiter tables; the builtin language when `None`.
    syntax: Option<&'s SyntaxConfig>,
    pos: usize,
    done: bool,
}

impl<'s> Lexer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            syntax: None,
            pos: 0,
            done: false,
        }
    }

    /// Lexer that takes reserved words and string delimiters from `syntax`.
    /// `def` and `class` are always recognized.
    pub fn with_syntax(source: &'s str, syntax: &'s SyntaxConfig) -> Self {
        Self {
            syntax: Some(syntax),
            ..Self::new(source)
        }
    }

    fn is_keyword(&self, word: &str) -> bool {
        match self.syntax {
            Some(syntax) => syntax.is_keyword(word),
            None => KEYWORDS.contains(&word),
        }
    }

    fn is_quote(&self, ch: char) -> bool {
        match self.syntax {
            Some(syntax) => syntax.is_string_delimiter(ch),
            None => matches!(ch, '\'' | '"'),
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(offset)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '#' {
                while let Some(ch) = self.peek() {
                    if ch == '\n' {
                        break;
                    }
                    self.bump();
                }
            } else if ch.is_whitespace() || (ch == '\\' && self.peek_at(1) == Some('\n')) {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            start,
            len: self.pos - start,
        }
    }

    /// Scans the next token. Returns `Eof` repeatedly once input is exhausted.
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();
        let start = self.pos;
        let Some(ch) = self.peek() else {
            return self.token(TokenKind::Eof, start);
        };

        if is_ident_start(ch) {
            if let Some(prefix_len) = self.string_prefix_len() {
                for _ in 0..prefix_len {
                    self.bump();
                }
                return self.string(start);
            }
            while self.peek().is_some_and(is_ident_continue) {
                self.bump();
            }
            let kind = match &self.source[start..self.pos] {
                "def" => TokenKind::Def,
                "class" => TokenKind::Class,
                word if self.is_keyword(word) => TokenKind::Keyword,
                _ => TokenKind::Identifier,
            };
            return self.token(kind, start);
        }

        if ch.is_ascii_digit() || (ch == '.' && self.peek_at(1).is_some_and(|c| c.is_ascii_digit())) {
            while self
                .peek()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
            {
                self.bump();
            }
            return self.token(TokenKind::Number, start);
        }

        if self.is_quote(ch) {
            return self.string(start);
        }

        self.bump();
        if ch.is_ascii_punctuation() && !matches!(ch, '$' | '?' | '`') {
            self.token(TokenKind::Operator, start)
        } else {
            self.token(TokenKind::Error, start)
        }
    }

    /// Length of an `r`/`b`/`f` style prefix directly followed by a quote.
    fn string_prefix_len(&self) -> Option<usize> {
        let rest = &self.source[self.pos..];
        let prefix_len = rest
            .chars()
            .take_while(|c| matches!(c, 'r' | 'R' | 'b' | 'B' | 'f' | 'F'))
            .take(2)
            .count();
        if prefix_len == 0 {
            return None;
        }
        match rest[prefix_len..].chars().next() {
            Some(ch) if self.is_quote(ch) => Some(prefix_len),
            _ => None,
        }
    }

    fn string(&mut self, start: usize) -> Token {
        let Some(quote) = self.bump() else {
            return self.token(TokenKind::Error, start);
        };
        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.bump();
            self.bump();
        }

        loop {
            match self.bump() {
                None => return self.token(TokenKind::Error, start),
                Some('\\') => {
                    self.bump();
                }
                Some('\n') if !triple => return self.token(TokenKind::Error, start),
                Some(ch) if ch == quote => {
                    if !triple {
                        break;
                    }
                    if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
                        self.bump();
                        self.bump();
                        break;
                    }
                }
                Some(_) => {}
            }
        }
        self.token(TokenKind::Str, start)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields tokens up to and including the first error; stops at end of input.
    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        let token = self.next_token();
        match token.kind {
            TokenKind::Eof => {
                self.done = true;
                None
            }
            TokenKind::Error => {
                self.done = true;
                Some(token)
            }
            _ => Some(token),
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch == '_' || ch.is_alphabetic()
}

fn is_ident_continue(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}
