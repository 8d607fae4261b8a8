pub mod token;

use crate::scanner::token::{Token, TokenType};
use crate::span::Span;
use std::collections::HashMap;

pub struct Scanner {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    line_start: usize,
    start_span: Span,
    keywords: HashMap<String, TokenType>,
}

impl Scanner {
    pub fn new(source: impl Into<String>, keywords: &HashMap<String, TokenType>) -> Self {
        // Carriage returns are dropped up front so CRLF input scans like LF.
        Scanner {
            source: source.into().chars().filter(|&c| c != '\r').collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            line_start: 0,
            start_span: Span::new(1, 1),
            keywords: keywords.clone(),
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    /// Scan the whole input. Never fails: unrecognized input becomes
    /// `Illegal` tokens, and the result always ends with exactly one `Eof`.
    pub fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.start_span = Span::new(self.line, self.current - self.line_start + 1);
            self.scan_token();
        }

        let eof_span = Span::new(self.line, self.current - self.line_start + 1);
        self.tokens.push(Token::new(TokenType::Eof, "", eof_span));
        self.tokens
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '{' => self.add_token(TokenType::LeftBrace),
            '}' => self.add_token(TokenType::RightBrace),
            '[' => self.add_token(TokenType::LeftBracket),
            ']' => self.add_token(TokenType::RightBracket),
            ',' => self.add_token(TokenType::Comma),
            ':' => self.add_token(TokenType::Colon),
            '+' => self.add_token(TokenType::Plus),
            '-' => self.add_token(TokenType::Minus),
            '/' => self.add_token(TokenType::Slash),

            // Dot or range
            '.' => {
                if self.match_char('.') {
                    self.add_token(TokenType::Range)
                } else {
                    self.add_token(TokenType::Dot)
                }
            }

            '*' => {
                let t = if self.match_char('*') {
                    TokenType::Power
                } else {
                    TokenType::Star
                };
                self.add_token(t);
            }

            '!' => {
                let t = if self.match_char('=') {
                    TokenType::NotEqual
                } else {
                    TokenType::Bang
                };
                self.add_token(t);
            }

            '=' => {
                let t = if self.match_char('=') {
                    TokenType::Equal
                } else {
                    TokenType::Assign
                };
                self.add_token(t);
            }

            '>' => {
                let t = if self.match_char('=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                };
                self.add_token(t);
            }

            '<' => {
                let t = if self.match_char('=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                };
                self.add_token(t);
            }

            // && and || only exist doubled; a single & or | is illegal
            '&' => {
                if self.match_char('&') {
                    self.add_token(TokenType::And);
                } else {
                    self.add_token(TokenType::Illegal);
                }
            }

            '|' => {
                if self.match_char('|') {
                    self.add_token(TokenType::Or);
                } else {
                    self.add_token(TokenType::Illegal);
                }
            }

            // Whitespace (not newlines)
            ' ' | '\t' => {}

            // Newlines are significant: they end statements
            '\n' => {
                let span = self.start_span;
                self.line += 1;
                self.line_start = self.current;
                self.tokens.push(Token::new(TokenType::Newline, "\n", span));
            }

            // Comment to end of line
            '#' => {
                while self.peek() != Some('\n') && !self.is_at_end() {
                    self.advance();
                }
            }

            '"' => self.handle_string(),

            // Variable reference: $name yields a bare identifier token
            '$' => {
                if self.peek().is_some_and(is_ident_start) {
                    let start = self.current;
                    while self.peek().is_some_and(is_ident_part) {
                        self.advance();
                    }
                    let name: String = self.source[start..self.current].iter().collect();
                    self.tokens
                        .push(Token::new(TokenType::Identifier, name, self.start_span));
                } else {
                    self.add_token(TokenType::Illegal);
                }
            }

            c if c.is_ascii_digit() => self.handle_number(),

            c if is_ident_start(c) => self.handle_identifier(),

            _ => self.add_token(TokenType::Illegal),
        }
    }

    fn advance(&mut self) -> char {
        let ch = self.source[self.current];
        self.current += 1;
        ch
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.current).copied()
    }

    fn match_char(&mut self, expected: char) -> bool {
        match self.peek() {
            Some(ch) if ch == expected => {
                self.current += 1;
                true
            }
            _ => false,
        }
    }

    fn handle_string(&mut self) {
        let mut value = String::new();

        loop {
            match self.peek() {
                None => {
                    // Unterminated: hand back what we decoded so far
                    self.tokens
                        .push(Token::new(TokenType::Illegal, value, self.start_span));
                    return;
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some('"') => value.push('"'),
                        Some('\\') => value.push('\\'),
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        // Unknown escape: keep the char after the backslash
                        Some(other) => value.push(other),
                        None => continue,
                    }
                    self.advance();
                }
                Some('\n') => {
                    value.push('\n');
                    self.advance();
                    self.line += 1;
                    self.line_start = self.current;
                }
                Some(ch) => {
                    value.push(ch);
                    self.advance();
                }
            }
        }

        self.tokens.push(Token::new(
            TokenType::Str(value.clone()),
            value,
            self.start_span,
        ));
    }

    fn handle_number(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        self.add_token(TokenType::Number);
    }

    fn handle_identifier(&mut self) {
        while self.peek().is_some_and(is_ident_part) {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let token_type = self
            .keywords
            .get(&text)
            .cloned()
            .unwrap_or(TokenType::Identifier);
        self.add_token(token_type);
    }

    fn add_token(&mut self, t: TokenType) {
        let text: String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token::new(t, text, self.start_span));
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_part(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}
