//! Recursive-descent parser producing the syntax tree of a value string.
//!
//! ```text
//! value    := call | redirect | color | list | STRING | WORD
//! call     := WORD '(' [arg {',' arg}] ')'
//! arg      := [WORD ':'] value
//! list     := '[' [value {(',' | '|') value}] ']'
//! redirect := '$' WORD
//! color    := '#' WORD
//! ```
//!
//! The tree is purely syntactic. Keyword dispatch and typing happen in
//! [`super::parse`].

use super::lexer::{Token, TokenKind, Tokenizer};
use crate::error::RhsError;

/// A syntactic value.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    Word(&'a str),
    Str(&'a str),
    /// Hex digits following `#`.
    Color(&'a str),
    /// Dotted path following `$`.
    Redirect(&'a str),
    Call { name: &'a str, args: Vec<Arg<'a>> },
    List(Vec<Expr<'a>>),
}

/// A call argument, optionally labelled (`to: 1`).
#[derive(Debug, Clone, PartialEq)]
pub struct Arg<'a> {
    pub label: Option<&'a str>,
    pub value: Expr<'a>,
    /// Source text of the argument value.
    pub raw: &'a str,
}

impl<'a> Expr<'a> {
    /// The text of a word or quoted string.
    pub fn text(&self) -> Option<&'a str> {
        match self {
            Expr::Word(text) | Expr::Str(text) => Some(text),
            _ => None,
        }
    }
}

/// Parses a complete value string into an [`Expr`].
pub fn parse_expr(input: &str) -> Result<Expr<'_>, RhsError> {
    let mut parser = Parser {
        input,
        tokens: Tokenizer::new(input).collect(),
        pos: 0,
    };
    let expr = parser.value()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(parser.unexpected(token)),
    }
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_kind(&self, offset: usize) -> Option<TokenKind<'a>> {
        self.tokens.get(self.pos + offset).map(|t| t.kind)
    }

    fn advance(&mut self) -> Option<Token<'a>> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind<'a>, what: &str) -> Result<Token<'a>, RhsError> {
        match self.advance() {
            Some(token) if token.kind == kind => Ok(token),
            Some(token) => Err(self.unexpected(token)),
            None => Err(RhsError::malformed(
                self.input,
                format!("expected {} at end of input", what),
            )),
        }
    }

    fn unexpected(&self, token: Token<'a>) -> RhsError {
        let reason = match token.kind {
            TokenKind::Unterminated => "unterminated string".to_string(),
            _ => format!(
                "unexpected `{}` at offset {}",
                &self.input[token.start..token.end],
                token.start
            ),
        };
        RhsError::malformed(self.input, reason)
    }

    fn end_offset(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|last| self.tokens.get(last))
            .map_or(0, |t| t.end)
    }

    fn value(&mut self) -> Result<Expr<'a>, RhsError> {
        let token = self.advance().ok_or_else(|| {
            RhsError::malformed(self.input, "expected a value")
        })?;
        match token.kind {
            TokenKind::Word(name) if self.peek_kind(0) == Some(TokenKind::LParen) => {
                self.pos += 1;
                let args = self.args()?;
                Ok(Expr::Call { name, args })
            }
            TokenKind::Word(word) => Ok(Expr::Word(word)),
            TokenKind::Str(text) => Ok(Expr::Str(text)),
            TokenKind::Dollar => match self.advance() {
                Some(Token {
                    kind: TokenKind::Word(path),
                    ..
                }) => Ok(Expr::Redirect(path)),
                Some(other) => Err(self.unexpected(other)),
                None => Err(RhsError::malformed(self.input, "expected a path after `$`")),
            },
            TokenKind::Hash => match self.advance() {
                Some(Token {
                    kind: TokenKind::Word(hex),
                    ..
                }) => Ok(Expr::Color(hex)),
                Some(other) => Err(self.unexpected(other)),
                None => Err(RhsError::malformed(self.input, "expected hex digits after `#`")),
            },
            TokenKind::LBracket => self.list(),
            _ => Err(self.unexpected(token)),
        }
    }

    /// Arguments after the opening parenthesis, through the closing one.
    fn args(&mut self) -> Result<Vec<Arg<'a>>, RhsError> {
        let mut args = Vec::new();
        if self.peek_kind(0) == Some(TokenKind::RParen) {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            let label = match (self.peek_kind(0), self.peek_kind(1)) {
                (Some(TokenKind::Word(label)), Some(TokenKind::Colon)) => {
                    self.pos += 2;
                    Some(label)
                }
                _ => None,
            };
            let start = self.peek().map_or(self.input.len(), |t| t.start);
            let value = self.value()?;
            let raw = &self.input[start..self.end_offset().max(start)];
            args.push(Arg { label, value, raw });

            match self.advance() {
                Some(Token {
                    kind: TokenKind::Comma,
                    ..
                }) => continue,
                Some(Token {
                    kind: TokenKind::RParen,
                    ..
                }) => return Ok(args),
                Some(other) => return Err(self.unexpected(other)),
                None => {
                    return Err(RhsError::malformed(self.input, "expected `)` at end of input"))
                }
            }
        }
    }

    /// List items after the opening bracket, through the closing one.
    fn list(&mut self) -> Result<Expr<'a>, RhsError> {
        let mut items = Vec::new();
        if self.peek_kind(0) == Some(TokenKind::RBracket) {
            self.pos += 1;
            return Ok(Expr::List(items));
        }
        loop {
            items.push(self.value()?);
            match self.peek_kind(0) {
                Some(TokenKind::Comma) | Some(TokenKind::Pipe) => self.pos += 1,
                _ => {
                    self.expect(TokenKind::RBracket, "`]`")?;
                    return Ok(Expr::List(items));
                }
            }
        }
    }
}
