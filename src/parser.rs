pub mod ast;
pub mod print;

use crate::diagnostics::{codes, Diagnostic};
use crate::parser::ast::{Expr, ExprKind, MapPair, NodeId, Program, Stmt, StmtKind};
use crate::scanner::token::{Token, TokenType};
use crate::span::Span;

// Binding powers, lowest to highest. Index and property access bind
// tighter than everything, then prefix operators, then `**`.
const PREC_NONE: u8 = 0;
const PREC_OR: u8 = 1;
const PREC_AND: u8 = 2;
const PREC_EQUALITY: u8 = 3;
const PREC_COMPARISON: u8 = 4;
const PREC_TERM: u8 = 5;
const PREC_FACTOR: u8 = 6;
const PREC_POWER: u8 = 7;
const PREC_PREFIX: u8 = 8;
const PREC_POSTFIX: u8 = 9;

fn infix_precedence(t: &TokenType) -> u8 {
    match t {
        TokenType::Or => PREC_OR,
        TokenType::And => PREC_AND,
        TokenType::Equal | TokenType::NotEqual => PREC_EQUALITY,
        TokenType::Less | TokenType::LessEqual | TokenType::Greater | TokenType::GreaterEqual => {
            PREC_COMPARISON
        }
        TokenType::Plus | TokenType::Minus => PREC_TERM,
        TokenType::Star | TokenType::Slash => PREC_FACTOR,
        TokenType::Power => PREC_POWER,
        TokenType::LeftBracket | TokenType::Dot => PREC_POSTFIX,
        _ => PREC_NONE,
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<Diagnostic>,
    next_id: u32,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
            next_id: 0,
        }
    }

    // utility methods
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek_next(&self) -> &Token {
        if self.current + 1 < self.tokens.len() {
            &self.tokens[self.current + 1]
        } else {
            &self.tokens[self.tokens.len() - 1]
        }
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn check(&self, token_type: &TokenType) -> bool {
        self.peek().token_type == *token_type
    }

    fn error_expected(&self, expected: &str) -> Diagnostic {
        let current = self.peek();
        let context = if self.current > 0 {
            format!(" after '{}'", self.previous().lexeme)
        } else {
            String::new()
        };
        Diagnostic::error(
            current.span,
            codes::UNEXPECTED_TOKEN,
            format!(
                "expected {}{}, got {:?}",
                expected, context, current.token_type
            ),
        )
    }

    fn consume(&mut self, token_type: TokenType, expected: &str) -> Result<&Token, Diagnostic> {
        if self.check(&token_type) {
            Ok(self.advance())
        } else {
            Err(self.error_expected(expected))
        }
    }

    fn new_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn make_stmt(&mut self, kind: StmtKind, span: Span) -> Stmt {
        Stmt {
            kind,
            span,
            id: self.new_id(),
        }
    }

    fn skip_newlines(&mut self) {
        while self.check(&TokenType::Newline) {
            self.advance();
        }
    }

    /// Skip tokens through the next newline so parsing can restart at a
    /// statement boundary.
    fn synchronize(&mut self) {
        while !self.is_at_end() {
            if self.advance().token_type == TokenType::Newline {
                return;
            }
        }
    }

    /// Parse the whole token stream. Never aborts: errors are recorded and
    /// parsing resumes at the next statement boundary.
    pub fn parse(mut self) -> (Program, Vec<Diagnostic>) {
        let mut statements = Vec::new();

        loop {
            self.skip_newlines();
            if self.is_at_end() {
                break;
            }
            match self.statement() {
                Ok(stmt) => statements.push(stmt),
                Err(diag) => {
                    self.errors.push(diag);
                    self.synchronize();
                }
            }
        }

        (Program { statements }, self.errors)
    }

    fn statement(&mut self) -> Result<Stmt, Diagnostic> {
        match self.peek().token_type {
            TokenType::Set => self.set_stmt(),
            TokenType::Echo => self.echo_stmt(),
            TokenType::Run => self.run_stmt(),
            TokenType::Return => self.return_stmt(),
            TokenType::If => self.if_stmt(),
            TokenType::For => self.for_stmt(),
            TokenType::While => self.while_stmt(),
            TokenType::Function => self.fn_decl(),
            TokenType::Break => {
                let span = self.advance().span;
                self.end_of_statement()?;
                Ok(self.make_stmt(StmtKind::Break, span))
            }
            TokenType::Continue => {
                let span = self.advance().span;
                self.end_of_statement()?;
                Ok(self.make_stmt(StmtKind::Continue, span))
            }
            TokenType::Identifier => self.ident_stmt(),
            TokenType::Illegal => {
                let token = self.advance();
                Err(Diagnostic::error(
                    token.span,
                    codes::SYNTAX,
                    format!("illegal token '{}'", token.lexeme),
                ))
            }
            _ => Err(self.error_expected("statement")),
        }
    }

    /// Consume the statement terminator: a newline, or end of input.
    fn end_of_statement(&mut self) -> Result<(), Diagnostic> {
        if self.check(&TokenType::Newline) {
            self.advance();
            Ok(())
        } else if self.is_at_end() {
            Ok(())
        } else {
            Err(self.error_expected("newline"))
        }
    }

    /// Read a name token. Keyword-shaped names are accepted here so the
    /// analyzer can reject them with a reserved-name diagnostic instead of
    /// the parser producing a less useful syntax error.
    fn expect_name(&mut self, what: &str) -> Result<String, Diagnostic> {
        let token = self.peek();
        if token.token_type == TokenType::Identifier || token.token_type.is_keyword() {
            Ok(self.advance().lexeme.clone())
        } else {
            Err(self.error_expected(what))
        }
    }

    fn set_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        let span = self.advance().span; // consume set
        let name = self.expect_name("variable name")?;
        let value = self.expression(PREC_NONE)?;
        self.end_of_statement()?;
        Ok(self.make_stmt(StmtKind::Set { name, value }, span))
    }

    fn echo_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        let span = self.advance().span; // consume echo
        let value = if self.check(&TokenType::Newline) || self.is_at_end() {
            None
        } else {
            Some(self.expression(PREC_NONE)?)
        };
        self.end_of_statement()?;
        Ok(self.make_stmt(StmtKind::Echo { value }, span))
    }

    fn run_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        let span = self.advance().span; // consume run
        let token = self.peek().clone();
        let command = match token.token_type {
            TokenType::Str(value) => {
                self.advance();
                Expr {
                    kind: ExprKind::Str(value),
                    span: token.span,
                }
            }
            _ => return Err(self.error_expected("command string")),
        };
        self.end_of_statement()?;
        Ok(self.make_stmt(StmtKind::Run { command }, span))
    }

    fn return_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        let span = self.advance().span; // consume return
        let value = if self.check(&TokenType::Newline) || self.is_at_end() {
            None
        } else {
            Some(self.expression(PREC_NONE)?)
        };
        self.end_of_statement()?;
        Ok(self.make_stmt(StmtKind::Return(value), span))
    }

    fn if_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        let span = self.advance().span; // consume if
        let cond = self.condition()?;
        self.consume(TokenType::Newline, "newline")?;

        let then_branch = self.block(&[TokenType::Else, TokenType::End]);
        let else_branch = if self.check(&TokenType::Else) {
            self.advance();
            self.consume(TokenType::Newline, "newline")?;
            self.block(&[TokenType::End])
        } else {
            Vec::new()
        };

        self.consume(TokenType::End, "'end'")?;
        self.end_of_statement()?;
        Ok(self.make_stmt(
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            },
            span,
        ))
    }

    fn for_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        let span = self.advance().span; // consume for
        let var = self.expect_name("loop variable")?;
        self.consume(TokenType::In, "'in'")?;
        let start = self.expression(PREC_NONE)?;
        self.consume(TokenType::Range, "'..'")?;
        let end = self.expression(PREC_NONE)?;
        self.consume(TokenType::Newline, "newline")?;

        let body = self.block(&[TokenType::End]);
        self.consume(TokenType::End, "'end'")?;
        self.end_of_statement()?;
        Ok(self.make_stmt(
            StmtKind::For {
                var,
                start,
                end,
                body,
            },
            span,
        ))
    }

    fn while_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        let span = self.advance().span; // consume while
        let cond = self.condition()?;
        self.consume(TokenType::Newline, "newline")?;

        let body = self.block(&[TokenType::End]);
        self.consume(TokenType::End, "'end'")?;
        self.end_of_statement()?;
        Ok(self.make_stmt(StmtKind::While { cond, body }, span))
    }

    fn fn_decl(&mut self) -> Result<Stmt, Diagnostic> {
        let span = self.advance().span; // consume fn
        let name = self.expect_name("function name")?;

        let mut params = Vec::new();
        while !self.check(&TokenType::Newline) && !self.is_at_end() {
            params.push(self.expect_name("parameter name")?);
        }
        self.consume(TokenType::Newline, "newline")?;

        let body = self.block(&[TokenType::End]);
        self.consume(TokenType::End, "'end'")?;
        self.end_of_statement()?;
        Ok(self.make_stmt(StmtKind::Fn { name, params, body }, span))
    }

    /// Assignment or call, disambiguated by one token of lookahead.
    fn ident_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        if self.peek_next().token_type == TokenType::Assign {
            let name_token = self.advance();
            let span = name_token.span;
            let name = name_token.lexeme.clone();
            self.advance(); // consume =
            let value = self.expression(PREC_NONE)?;
            self.end_of_statement()?;
            return Ok(self.make_stmt(StmtKind::Assign { name, value }, span));
        }

        let name_token = self.advance();
        let span = name_token.span;
        let name = name_token.lexeme.clone();
        let mut args = Vec::new();
        while !self.check(&TokenType::Newline) && !self.is_at_end() {
            args.push(self.expression(PREC_NONE)?);
        }
        self.end_of_statement()?;
        Ok(self.make_stmt(StmtKind::Call { name, args }, span))
    }

    /// Parse statements until one of the terminator keywords appears. The
    /// terminator is left for the caller. Errors inside the block are
    /// recorded and parsing resumes at the next line.
    fn block(&mut self, terminators: &[TokenType]) -> Vec<Stmt> {
        let mut statements = Vec::new();

        loop {
            self.skip_newlines();
            if self.is_at_end() || terminators.iter().any(|t| self.check(t)) {
                break;
            }
            match self.statement() {
                Ok(stmt) => statements.push(stmt),
                Err(diag) => {
                    self.errors.push(diag);
                    self.synchronize();
                }
            }
        }

        statements
    }

    /// An `if`/`while` condition: `exists <path>` or a plain expression.
    fn condition(&mut self) -> Result<Expr, Diagnostic> {
        if self.check(&TokenType::Exists) {
            let span = self.advance().span;
            let path = self.expression(PREC_NONE)?;
            return Ok(Expr {
                kind: ExprKind::Exists(Box::new(path)),
                span,
            });
        }
        self.expression(PREC_NONE)
    }

    // ---- Pratt expression parsing ----

    fn expression(&mut self, precedence: u8) -> Result<Expr, Diagnostic> {
        let mut left = self.prefix()?;

        while !self.is_at_end() {
            let current = infix_precedence(&self.peek().token_type);
            if precedence >= current {
                break;
            }
            left = self.infix(left)?;
        }

        Ok(left)
    }

    fn prefix(&mut self) -> Result<Expr, Diagnostic> {
        let token = self.peek().clone();
        let span = token.span;

        match &token.token_type {
            TokenType::Number => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Number(token.lexeme),
                    span,
                })
            }
            TokenType::Str(value) => {
                let value = value.clone();
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Str(value),
                    span,
                })
            }
            TokenType::True => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Bool(true),
                    span,
                })
            }
            TokenType::False => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Bool(false),
                    span,
                })
            }
            TokenType::Identifier => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Identifier(token.lexeme),
                    span,
                })
            }
            TokenType::Minus | TokenType::Bang => {
                self.advance();
                let operand = self.expression(PREC_PREFIX)?;
                Ok(Expr {
                    kind: ExprKind::Unary {
                        op: token.lexeme,
                        operand: Box::new(operand),
                    },
                    span,
                })
            }
            TokenType::LeftParen => {
                self.advance();
                let expr = self.expression(PREC_NONE)?;
                self.consume(TokenType::RightParen, "')'")?;
                Ok(expr)
            }
            TokenType::LeftBracket => self.list_literal(),
            TokenType::LeftBrace => self.map_literal(),
            _ => Err(self.error_expected("expression")),
        }
    }

    fn infix(&mut self, left: Expr) -> Result<Expr, Diagnostic> {
        let token = self.peek().clone();
        let span = token.span;

        match token.token_type {
            TokenType::LeftBracket => {
                self.advance();
                let index = self.expression(PREC_NONE)?;
                self.consume(TokenType::RightBracket, "']'")?;
                Ok(Expr {
                    kind: ExprKind::Index {
                        left: Box::new(left),
                        index: Box::new(index),
                    },
                    span,
                })
            }
            TokenType::Dot => {
                self.advance();
                let field = self
                    .consume(TokenType::Identifier, "property name")?
                    .lexeme
                    .clone();
                Ok(Expr {
                    kind: ExprKind::Property {
                        object: Box::new(left),
                        field,
                    },
                    span,
                })
            }
            _ => {
                let prec = infix_precedence(&token.token_type);
                self.advance();
                // Exponentiation is right-associative: lower the threshold
                // so the right operand re-binds the same operator.
                let next_prec = if token.token_type == TokenType::Power {
                    prec - 1
                } else {
                    prec
                };
                let right = self.expression(next_prec)?;
                Ok(Expr {
                    kind: ExprKind::Binary {
                        left: Box::new(left),
                        op: token.lexeme,
                        right: Box::new(right),
                    },
                    span,
                })
            }
        }
    }

    fn list_literal(&mut self) -> Result<Expr, Diagnostic> {
        let span = self.advance().span; // consume [
        let mut elements = Vec::new();

        if self.check(&TokenType::RightBracket) {
            self.advance();
            return Ok(Expr {
                kind: ExprKind::List(elements),
                span,
            });
        }

        loop {
            elements.push(self.expression(PREC_NONE)?);
            if self.check(&TokenType::RightBracket) {
                self.advance();
                break;
            }
            self.consume(TokenType::Comma, "',' or ']'")?;
        }

        Ok(Expr {
            kind: ExprKind::List(elements),
            span,
        })
    }

    fn map_literal(&mut self) -> Result<Expr, Diagnostic> {
        let span = self.advance().span; // consume {
        let mut pairs = Vec::new();

        if self.check(&TokenType::RightBrace) {
            self.advance();
            return Ok(Expr {
                kind: ExprKind::Map(pairs),
                span,
            });
        }

        loop {
            let key_token = self.consume(TokenType::Identifier, "map key")?;
            let key = key_token.lexeme.clone();
            let key_span = key_token.span;
            self.consume(TokenType::Colon, "':'")?;
            let value = self.expression(PREC_NONE)?;
            pairs.push(MapPair {
                key,
                value,
                span: key_span,
            });

            if self.check(&TokenType::RightBrace) {
                self.advance();
                break;
            }
            self.consume(TokenType::Comma, "',' or '}'")?;
        }

        Ok(Expr {
            kind: ExprKind::Map(pairs),
            span,
        })
    }
}
