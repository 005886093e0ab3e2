//! Shell Lexer (Tokenizer)
//!
//! This module converts statement text into a stream of tokens.

use super::token::Token;
use crate::error::{Error, Result};

/// Statement lexer
pub struct Lexer {
    /// Input characters
    input: Vec<char>,
    /// Current position in input
    position: usize,
}

impl Lexer {
    /// Create a new lexer for the given input
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Tokenize the entire input, ending with [`Token::Eof`]
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments();

        if self.is_at_end() {
            return Ok(Token::Eof);
        }

        let ch = self.current_char();
        let single = match ch {
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            ',' => Some(Token::Comma),
            ';' => Some(Token::Semicolon),
            '.' => Some(Token::Dot),
            '*' => Some(Token::Asterisk),
            '=' => Some(Token::Eq),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(token);
        }

        match ch {
            '<' => {
                self.advance();
                Ok(match self.peek_is(&['=', '>']) {
                    Some('=') => Token::Lte,
                    Some(_) => Token::Neq,
                    None => Token::Lt,
                })
            }
            '>' => {
                self.advance();
                Ok(match self.peek_is(&['=']) {
                    Some(_) => Token::Gte,
                    None => Token::Gt,
                })
            }
            '!' => {
                let start = self.position;
                self.advance();
                match self.peek_is(&['=']) {
                    Some(_) => Ok(Token::Neq),
                    None => Err(Error::UnexpectedCharacter('!', start)),
                }
            }
            '-' => {
                if self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                    return self.read_number();
                }
                Err(Error::UnexpectedCharacter('-', self.position))
            }
            '\'' => self.read_string(),
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_alphabetic() || c == '_' => Ok(self.read_identifier()),
            c => Err(Error::UnexpectedCharacter(c, self.position)),
        }
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_char(&self) -> char {
        self.input[self.position]
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    /// Consume the current character if it is one of `expected`
    fn peek_is(&mut self, expected: &[char]) -> Option<char> {
        if self.is_at_end() {
            return None;
        }
        let ch = self.current_char();
        if expected.contains(&ch) {
            self.advance();
            Some(ch)
        } else {
            None
        }
    }

    /// Skip whitespace and `--` line comments
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while !self.is_at_end() && self.current_char().is_whitespace() {
                self.advance();
            }
            if !self.is_at_end() && self.current_char() == '-' && self.peek_char() == Some('-') {
                while !self.is_at_end() && self.current_char() != '\n' {
                    self.advance();
                }
            } else {
                return;
            }
        }
    }

    /// Read a string literal (single-quoted, '' escapes a quote)
    fn read_string(&mut self) -> Result<Token> {
        let start_pos = self.position;
        self.advance(); // skip opening quote

        let mut value = String::new();
        while !self.is_at_end() {
            let ch = self.current_char();
            self.advance();
            if ch != '\'' {
                value.push(ch);
            } else if !self.is_at_end() && self.current_char() == '\'' {
                value.push('\'');
                self.advance();
            } else {
                return Ok(Token::StringLiteral(value));
            }
        }

        Err(Error::UnterminatedString(start_pos))
    }

    /// Read a number (integer or float), with an optional leading `-`
    fn read_number(&mut self) -> Result<Token> {
        let start_pos = self.position;
        let mut value = String::new();
        let mut is_float = false;

        if self.current_char() == '-' {
            value.push('-');
            self.advance();
        }

        while !self.is_at_end() {
            let ch = self.current_char();
            if ch.is_ascii_digit() {
                value.push(ch);
                self.advance();
            } else if ch == '.' && !is_float && self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                is_float = true;
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if is_float {
            value
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Token::FloatLiteral)
                .ok_or(Error::InvalidNumber(start_pos))
        } else {
            value
                .parse::<i64>()
                .map(Token::IntegerLiteral)
                .map_err(|_| Error::InvalidNumber(start_pos))
        }
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        let mut value = String::new();
        while !self.is_at_end() {
            let ch = self.current_char();
            if ch.is_alphanumeric() || ch == '_' {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        Token::from_keyword(&value).unwrap_or(Token::Identifier(value))
    }
}
