//! Tokenizer for right-hand side value strings.
//!
//! Splits an input such as `font(Helvetica Neue, 14pt, bold)` into
//! punctuation and word tokens. Words are maximal runs of non-delimiter
//! characters with surrounding whitespace trimmed, so multi-word font names,
//! dotted redirect paths and numbers with unit suffixes each lex as a single
//! word.
//!
//! Every token carries the byte span it was read from, which lets the parser
//! recover the raw source of an argument (used by `call(...)`).

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    /// A run of non-delimiter characters, trimmed.
    Word(&'a str),
    /// The contents of a double- or single-quoted string.
    Str(&'a str),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Pipe,
    Dollar,
    Hash,
    /// A quote that is never closed.
    Unterminated,
}

/// A token with its byte span in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub start: usize,
    pub end: usize,
}

/// Iterator over the tokens of a value string.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn is_delimiter(c: char) -> bool {
        matches!(
            c,
            '(' | ')' | '[' | ']' | ',' | ':' | '|' | '$' | '#' | '"' | '\''
        )
    }

    fn punct(c: char) -> Option<TokenKind<'a>> {
        match c {
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            '[' => Some(TokenKind::LBracket),
            ']' => Some(TokenKind::RBracket),
            ',' => Some(TokenKind::Comma),
            ':' => Some(TokenKind::Colon),
            '|' => Some(TokenKind::Pipe),
            '$' => Some(TokenKind::Dollar),
            '#' => Some(TokenKind::Hash),
            _ => None,
        }
    }

    fn token(&mut self, kind: TokenKind<'a>, start: usize, end: usize) -> Token<'a> {
        self.pos = end;
        Token { kind, start, end }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let remaining = &self.input[self.pos..];
        let skipped = remaining.len() - remaining.trim_start().len();
        let start = self.pos + skipped;
        let rest = &self.input[start..];
        let c = rest.chars().next()?;

        if let Some(kind) = Self::punct(c) {
            return Some(self.token(kind, start, start + c.len_utf8()));
        }

        if c == '"' || c == '\'' {
            let body = &rest[1..];
            return Some(match body.find(c) {
                Some(close) => {
                    let end = start + 1 + close + 1;
                    self.token(TokenKind::Str(&body[..close]), start, end)
                }
                None => self.token(TokenKind::Unterminated, start, self.input.len()),
            });
        }

        let len = rest.find(Self::is_delimiter).unwrap_or(rest.len());
        let word = rest[..len].trim_end();
        let end = start + word.len();
        // Trailing whitespace is consumed with the word.
        let token = Token {
            kind: TokenKind::Word(word),
            start,
            end,
        };
        self.pos = start + len;
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind<'_>> {
        Tokenizer::new(input).map(|t| t.kind).collect()
    }

    #[test]
    fn test_call_with_spaced_word() {
        assert_eq!(
            kinds("font(Helvetica Neue, 14pt)"),
            vec![
                TokenKind::Word("font"),
                TokenKind::LParen,
                TokenKind::Word("Helvetica Neue"),
                TokenKind::Comma,
                TokenKind::Word("14pt"),
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn test_redirect_and_color() {
        assert_eq!(
            kinds("$Typography.title"),
            vec![TokenKind::Dollar, TokenKind::Word("Typography.title")]
        );
        assert_eq!(
            kinds("#ff00aa"),
            vec![TokenKind::Hash, TokenKind::Word("ff00aa")]
        );
    }

    #[test]
    fn test_labels_and_lists() {
        assert_eq!(
            kinds("all:[a|b]"),
            vec![
                TokenKind::Word("all"),
                TokenKind::Colon,
                TokenKind::LBracket,
                TokenKind::Word("a"),
                TokenKind::Pipe,
                TokenKind::Word("b"),
                TokenKind::RBracket,
            ]
        );
    }

    #[test]
    fn test_quoted_strings() {
        assert_eq!(
            kinds("image(\"icon, large\")"),
            vec![
                TokenKind::Word("image"),
                TokenKind::LParen,
                TokenKind::Str("icon, large"),
                TokenKind::RParen,
            ]
        );
        assert_eq!(kinds("'open"), vec![TokenKind::Unterminated]);
    }

    #[test]
    fn test_spans_cover_raw_text() {
        let input = "call(S.Colors.tint(), UIColor)";
        let tokens: Vec<Token> = Tokenizer::new(input).collect();
        assert_eq!(&input[tokens[2].start..tokens[2].end], "S.Colors.tint");
        assert_eq!(tokens.last().map(|t| t.end), Some(input.len()));
    }

    #[test]
    fn test_empty_input() {
        assert!(kinds("   ").is_empty());
    }
}
