//! Lexer (tokenizer) for the scripting subset
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! NUMBER lexemes are normalized on the way out: radix prefix letters and the
//! exponent marker are uppercased and `_` digit separators are dropped, which is
//! the text form [`super::literal`] interprets.

use std::fmt;

use thiserror::Error;

/// Terminal kinds recognized by the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    Eof,
    LineEnd,
    Number,
    Plus,             // +
    Div,              // /
    Modulo,           // %
    EqEqEq,           // ===
    EqualTilde,       // =~
    ExclamationTilde, // !~
}

impl TokenKind {
    /// The terminal's name as written in the grammar.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Eof => "EOF",
            TokenKind::LineEnd => "LINE_END",
            TokenKind::Number => "NUMBER",
            TokenKind::Plus => "PLUS",
            TokenKind::Div => "DIV",
            TokenKind::Modulo => "MODULO",
            TokenKind::EqEqEq => "EQEQEQ",
            TokenKind::EqualTilde => "EQUAL_TILDE",
            TokenKind::ExclamationTilde => "EXCLAMATION_TILDE",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single lexeme with its kind and the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
        }
    }
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lexer error at line {line}: {message}")]
pub struct LexError {
    pub message: String,
    pub line: usize,
}

/// Lexer for the scripting subset
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
        }
    }

    /// Tokenize the entire input, ending with exactly one EOF token.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();

            if self.is_at_end() {
                tokens.push(Token::new(TokenKind::Eof, "", self.line));
                break;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    /// Get next token
    fn next_token(&mut self) -> Result<Token, LexError> {
        let line = self.line;
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file".to_string(),
            line,
        })?;

        match ch {
            '\n' | ';' => Ok(Token::new(TokenKind::LineEnd, ch, line)),
            '0'..='9' => self.number_literal(ch),
            '+' => Ok(Token::new(TokenKind::Plus, "+", line)),
            '/' => Ok(Token::new(TokenKind::Div, "/", line)),
            '%' => Ok(Token::new(TokenKind::Modulo, "%", line)),
            '=' => {
                if self.peek() == Some('=') && self.peek_ahead(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Ok(Token::new(TokenKind::EqEqEq, "===", line))
                } else if self.peek() == Some('~') {
                    self.advance();
                    Ok(Token::new(TokenKind::EqualTilde, "=~", line))
                } else {
                    Err(LexError {
                        message: "Expected '===' or '=~' after '='".to_string(),
                        line,
                    })
                }
            }
            '!' => {
                if self.peek() == Some('~') {
                    self.advance();
                    Ok(Token::new(TokenKind::ExclamationTilde, "!~", line))
                } else {
                    Err(LexError {
                        message: "Expected '~' after '!'".to_string(),
                        line,
                    })
                }
            }
            _ => Err(LexError {
                message: format!("Unexpected character: '{}'", ch),
                line,
            }),
        }
    }

    /// Parse numeric literal: decimal with optional fraction and exponent, or
    /// a `0x`/`0o`/`0b` radix literal.
    fn number_literal(&mut self, first_digit: char) -> Result<Token, LexError> {
        let line = self.line;
        let mut text = String::new();
        text.push(first_digit);

        if first_digit == '0' {
            let radix = match self.peek() {
                Some('x') | Some('X') => Some(16),
                Some('o') | Some('O') => Some(8),
                Some('b') | Some('B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                if let Some(marker) = self.advance() {
                    text.push(marker.to_ascii_uppercase());
                }
                let before = text.len();
                self.take_digits(&mut text, |c| c.is_digit(radix));
                if text.len() == before {
                    return Err(LexError {
                        message: format!("Missing digits after '{}'", text),
                        line,
                    });
                }
                return Ok(Token::new(TokenKind::Number, text, line));
            }
        }

        self.take_digits(&mut text, |c| c.is_ascii_digit());

        if self.peek() == Some('.')
            && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit())
        {
            self.advance();
            text.push('.');
            self.take_digits(&mut text, |c| c.is_ascii_digit());
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            let signed = matches!(self.peek_ahead(1), Some('+') | Some('-'));
            let digit_at = if signed { 2 } else { 1 };
            if self
                .peek_ahead(digit_at)
                .is_some_and(|c| c.is_ascii_digit())
            {
                self.advance();
                text.push('E');
                if signed {
                    if let Some(sign) = self.advance() {
                        text.push(sign);
                    }
                }
                self.take_digits(&mut text, |c| c.is_ascii_digit());
            }
        }

        Ok(Token::new(TokenKind::Number, text, line))
    }

    /// Consume digits accepted by `is_digit`, dropping `_` separators.
    fn take_digits(&mut self, text: &mut String, is_digit: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek() {
            if is_digit(ch) {
                text.push(ch.to_ascii_uppercase());
                self.advance();
            } else if ch == '_' && self.peek_ahead(1).is_some_and(&is_digit) {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Skip spaces, tabs, carriage returns and `#` comments. Newlines are
    /// significant and left in place.
    fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.peek() {
            match ch {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '#' => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        // A newline token still belongs to the line it terminates; the count
        // moves on once it has been consumed.
        if ch == '\n' {
            self.line += 1;
        }

        Some(ch)
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("1 + 2 / 3 % 4 === 5 =~ 6 !~ 7"),
            vec![
                TokenKind::Number,
                TokenKind::Plus,
                TokenKind::Number,
                TokenKind::Div,
                TokenKind::Number,
                TokenKind::Modulo,
                TokenKind::Number,
                TokenKind::EqEqEq,
                TokenKind::Number,
                TokenKind::EqualTilde,
                TokenKind::Number,
                TokenKind::ExclamationTilde,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_line_ends_and_lines() {
        let tokens = Lexer::new("1\n2; 3 # trailing\n").tokenize().unwrap();

        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].kind, TokenKind::LineEnd);
        assert_eq!(tokens[1].line, 1);
        assert_eq!(tokens[2].line, 2);
        assert_eq!(tokens[3].kind, TokenKind::LineEnd);
        assert_eq!(tokens[4].text, "3");
        assert_eq!(tokens[5].kind, TokenKind::LineEnd);
        assert_eq!(tokens[6].kind, TokenKind::Eof);
        assert_eq!(tokens[6].line, 3);
    }

    #[test]
    fn test_number_normalization() {
        let texts: Vec<String> = Lexer::new("0xff 0o17 0b101 1_000 2.5e-3 7e2")
            .tokenize()
            .unwrap()
            .into_iter()
            .filter(|t| t.kind == TokenKind::Number)
            .map(|t| t.text)
            .collect();

        assert_eq!(texts, vec!["0XFF", "0O17", "0B101", "1000", "2.5E-3", "7E2"]);
    }

    #[test]
    fn test_invalid_characters() {
        let err = Lexer::new("1 +\n2 - 3").tokenize().unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains('-'));

        assert!(Lexer::new("1 == 2").tokenize().is_err());
        assert!(Lexer::new("0x").tokenize().is_err());
    }
}
