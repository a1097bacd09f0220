//! Recursive-descent parser for Canterbury
//!
//! Consumes the token stream from the tokenizer and produces a list of
//! statements. On a syntax error the parser records it, resynchronizes at the
//! next statement boundary, and keeps going so that all errors in a source
//! unit are reported together.

use std::rc::Rc;

use crate::ast::{AssignTarget, Expr, FieldInit, FuncDecl, LiteralValue, MatchCase, Stmt, StructDecl};
use crate::error::SyntaxError;
use crate::token::{Literal, Token, TokenType};

/// Maximum number of params, arguments or imported names in one list
pub const MAX_LIST_LEN: usize = 127;

/// Maximum nesting of statements and expressions
pub const MAX_NESTING: usize = 255;

/// Marker for an error that has already been recorded
struct ParseError;

type ParseResult<T> = Result<T, ParseError>;

pub struct Parser {
    tokens: Vec<Token>,
    curr: usize,
    errors: Vec<SyntaxError>,
    function_depth: usize,
    depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenType::Eof) {
            let line = tokens.last().map(|t| t.line).unwrap_or(1);
            tokens.push(Token::new(TokenType::Eof, "", None, line));
        }
        Self {
            tokens,
            curr: 0,
            errors: Vec::new(),
            function_depth: 0,
            depth: 0,
        }
    }

    pub fn parse(mut self) -> Result<Vec<Stmt>, Vec<SyntaxError>> {
        let mut stmts = Vec::new();
        while self.has_next() {
            match self.statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(ParseError) => self.synchronize(),
            }
        }

        if self.errors.is_empty() {
            tracing::debug!(statements = stmts.len(), "parsed program");
            Ok(stmts)
        } else {
            Err(self.errors)
        }
    }

    // ---------------------------------------------------------------------
    // Token cursor
    // ---------------------------------------------------------------------

    fn has_next(&self) -> bool {
        self.peek().kind != TokenType::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.curr]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.curr - 1]
    }

    fn check(&self, kind: TokenType) -> bool {
        self.has_next() && self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        if self.has_next() {
            self.curr += 1;
        }
        self.previous().clone()
    }

    fn matches(&mut self, kinds: &[TokenType]) -> bool {
        if kinds.iter().any(|kind| self.check(*kind)) {
            self.advance();
            return true;
        }
        false
    }

    fn consume(&mut self, kind: TokenType, message: &str) -> ParseResult<Token> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        Err(self.error_at_peek(message))
    }

    fn report(&mut self, token: &Token, message: &str) {
        self.errors.push(SyntaxError::at_token(token, message));
    }

    fn error_at_peek(&mut self, message: &str) -> ParseError {
        let token = self.peek().clone();
        self.report(&token, message);
        ParseError
    }

    /// Run `f` one nesting level deeper, failing once the limit is reached
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(self.error_at_peek("Too much nesting."));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn synchronize(&mut self) {
        self.advance();
        while self.has_next() {
            if self.previous().kind == TokenType::Semicolon {
                return;
            }
            match self.peek().kind {
                TokenType::Func
                | TokenType::Struct
                | TokenType::For
                | TokenType::If
                | TokenType::While
                | TokenType::Match
                | TokenType::Import
                | TokenType::Return => return,
                _ => {}
            }
            self.advance();
        }
    }

    // ---------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------

    fn statement(&mut self) -> ParseResult<Stmt> {
        self.nested(Self::statement_inner)
    }

    fn statement_inner(&mut self) -> ParseResult<Stmt> {
        if self.matches(&[TokenType::Import]) {
            return self.import_statement();
        }
        if self.matches(&[TokenType::Return]) {
            return self.return_statement();
        }
        if self.matches(&[TokenType::If]) {
            return self.if_statement();
        }
        if self.matches(&[TokenType::For]) {
            return self.for_statement();
        }
        if self.matches(&[TokenType::While]) {
            return self.while_statement();
        }
        if self.matches(&[TokenType::Match]) {
            return self.match_statement();
        }
        if self.matches(&[TokenType::LeftBracket]) {
            return Ok(Stmt::Block {
                stmts: self.block()?,
            });
        }
        self.expression_statement()
    }

    fn import_statement(&mut self) -> ParseResult<Stmt> {
        let module = self.consume(TokenType::Identifier, "Expect module name after 'import'.")?;
        self.consume(TokenType::LeftBracket, "Expect '[' after module name.")?;
        let names = self.identifier_list("imports", "Expect import name.")?;
        Ok(Stmt::Import { module, names })
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        if self.function_depth == 0 {
            self.report(&keyword, "Cannot return from top-level code.");
        }
        let value = if self.check(TokenType::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenType::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return { keyword, value })
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenType::LeftBracket, "Expect '[' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenType::RightBracket, "Expect ']' after condition.")?;

        let then = Box::new(self.statement()?);
        let otherwise = if self.matches(&[TokenType::Elif]) {
            Some(Box::new(self.if_statement()?))
        } else if self.matches(&[TokenType::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then,
            otherwise,
        })
    }

    fn for_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        self.consume(TokenType::LeftBracket, "Expect '[' after 'for'.")?;

        let initializer = if self.check(TokenType::Comma) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenType::Comma, "Expect ',' after loop initializer.")?;

        let condition = if self.check(TokenType::Comma) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenType::Comma, "Expect ',' after loop condition.")?;

        let increment = if self.check(TokenType::RightBracket) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenType::RightBracket, "Expect ']' after loop clauses.")?;

        self.consume(TokenType::LeftBracket, "Expect '[' before loop body.")?;
        let mut body = Stmt::Block {
            stmts: self.block()?,
        };

        if let Some(increment) = increment {
            body = Stmt::Block {
                stmts: vec![body, Stmt::Expression { expr: increment }],
            };
        }

        let condition = condition.unwrap_or_else(|| Expr::literal(LiteralValue::Bool(true)));
        let mut desugared = Stmt::While {
            keyword: keyword.clone(),
            condition,
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            desugared = Stmt::Block {
                stmts: vec![Stmt::Expression { expr: initializer }, desugared],
            };
        }

        tracing::trace!(line = keyword.line, "desugared for loop");
        Ok(desugared)
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        self.consume(TokenType::LeftBracket, "Expect '[' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenType::RightBracket, "Expect ']' after condition.")?;
        self.consume(TokenType::LeftBracket, "Expect '[' before loop body.")?;
        let body = Stmt::Block {
            stmts: self.block()?,
        };
        Ok(Stmt::While {
            keyword,
            condition,
            body: Box::new(body),
        })
    }

    fn match_case(&mut self) -> ParseResult<MatchCase> {
        self.consume(TokenType::LeftBracket, "Expect '[' before case body.")?;
        let pattern = self.expression()?;
        self.consume(TokenType::Arrow, "Expect '->' in case body.")?;
        let then = self.statement()?;
        self.consume(TokenType::RightBracket, "Expect ']' after case body.")?;
        Ok(MatchCase { pattern, then })
    }

    fn match_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        self.consume(TokenType::LeftBracket, "Expect '[' after 'match'.")?;
        let subject = self.expression()?;
        self.consume(TokenType::RightBracket, "Expect ']' after expression.")?;
        self.consume(TokenType::Against, "Expect 'against' before match body.")?;
        self.consume(TokenType::LeftBracket, "Expect '[' before match body.")?;

        let mut cases = Vec::new();
        while !self.check(TokenType::RightBracket) && self.has_next() {
            cases.push(self.match_case()?);
        }
        self.consume(TokenType::RightBracket, "Expect ']' after match body.")?;

        Ok(Stmt::Match {
            keyword,
            subject,
            cases,
        })
    }

    /// Statements up to and including the closing `]`
    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.check(TokenType::RightBracket) && self.has_next() {
            stmts.push(self.statement()?);
        }
        self.consume(TokenType::RightBracket, "Expect ']' after block.")?;
        Ok(stmts)
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenType::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression { expr })
    }

    // ---------------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------------

    fn expression(&mut self) -> ParseResult<Expr> {
        self.nested(Self::assignment)
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.assignment_value()?;
        if !self.matches(&[TokenType::Walrus]) {
            return Ok(expr);
        }

        let walrus = self.previous().clone();
        let value = self.assignment_value()?;
        let target = match expr {
            Expr::Variable { name } => AssignTarget::Variable { name },
            Expr::Get { object, name } => match *object {
                Expr::SelfRef { keyword } => AssignTarget::SelfField { keyword, name },
                other => {
                    self.report(&walrus, "Invalid assignment target.");
                    return Ok(Expr::Get {
                        object: Box::new(other),
                        name,
                    });
                }
            },
            other => {
                self.report(&walrus, "Invalid assignment target.");
                return Ok(other);
            }
        };

        Ok(Expr::Assign {
            target,
            value: Box::new(value),
        })
    }

    fn assignment_value(&mut self) -> ParseResult<Expr> {
        if self.matches(&[TokenType::Struct]) {
            return self.nested(Self::struct_decl);
        }
        if self.matches(&[TokenType::Func]) {
            return self.func_decl();
        }
        self.or()
    }

    fn struct_decl(&mut self) -> ParseResult<Expr> {
        let keyword = self.previous().clone();
        self.consume(TokenType::LeftBracket, "Expect '[' after struct declaration.")?;
        let params = self.identifier_list("parameters", "Expect identifier in params body.")?;

        let mut body = Vec::new();
        if self.matches(&[TokenType::LeftBracket]) {
            while !self.check(TokenType::RightBracket) && self.has_next() {
                let name = self.consume(TokenType::Identifier, "Expect attribute name.")?;
                self.consume(TokenType::Walrus, "Expect ':=' after attribute name.")?;
                let value = self.assignment_value()?;
                self.consume(TokenType::Semicolon, "Expect ';' after attribute value.")?;
                body.push(FieldInit { name, value });
            }
            self.consume(TokenType::RightBracket, "Expect ']' after struct body.")?;
        }

        Ok(Expr::Struct {
            decl: Rc::new(StructDecl {
                keyword,
                params,
                body,
            }),
        })
    }

    fn func_decl(&mut self) -> ParseResult<Expr> {
        let keyword = self.previous().clone();
        self.consume(TokenType::LeftBracket, "Expect '[' after function declaration.")?;
        let params = self.identifier_list("parameters", "Expect identifier in params body.")?;
        self.consume(TokenType::LeftBracket, "Expect function body.")?;

        self.function_depth += 1;
        let body = self.block();
        self.function_depth -= 1;

        Ok(Expr::Func {
            decl: Rc::new(FuncDecl {
                keyword,
                params,
                body: body?,
            }),
        })
    }

    /// Comma-separated identifiers up to and including the closing `]`
    fn identifier_list(&mut self, what: &str, message: &str) -> ParseResult<Vec<Token>> {
        let mut names = Vec::new();
        if !self.check(TokenType::RightBracket) {
            loop {
                if names.len() >= MAX_LIST_LEN {
                    let token = self.peek().clone();
                    self.report(&token, &format!("Expected fewer than 128 {}.", what));
                }
                names.push(self.consume(TokenType::Identifier, message)?);
                if !self.matches(&[TokenType::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenType::RightBracket, &format!("Expect ']' after {}.", what))?;
        Ok(names)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;
        while self.matches(&[TokenType::Or]) {
            let op = self.previous().clone();
            let right = self.and()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;
        while self.matches(&[TokenType::And]) {
            let op = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn binary_level(
        &mut self,
        ops: &[TokenType],
        operand: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut expr = operand(self)?;
        while self.matches(ops) {
            let op = self.previous().clone();
            let right = operand(self)?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            &[TokenType::Equal, TokenType::Unequal, TokenType::Is],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            &[
                TokenType::Lesser,
                TokenType::LesserEqual,
                TokenType::Greater,
                TokenType::GreaterEqual,
            ],
            Self::bitwise,
        )
    }

    fn bitwise(&mut self) -> ParseResult<Expr> {
        self.binary_level(&[TokenType::BitOr, TokenType::BitAnd], Self::term)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        self.binary_level(&[TokenType::Minus, TokenType::Plus], Self::factor)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        self.binary_level(&[TokenType::Star, TokenType::Slash], Self::unary)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[TokenType::Bang, TokenType::Minus, TokenType::BitNeg]) {
            let op = self.previous().clone();
            let right = self.nested(Self::unary)?;
            return Ok(Expr::Unary {
                op,
                right: Box::new(right),
            });
        }
        self.call()
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            if self.matches(&[TokenType::LeftBracket]) {
                expr = self.finish_call(expr)?;
            } else if self.check(TokenType::Identifier) {
                let name = self.advance();
                expr = Expr::Get {
                    object: Box::new(expr),
                    name,
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut args = Vec::new();
        if !self.check(TokenType::RightBracket) {
            loop {
                if args.len() >= MAX_LIST_LEN {
                    let token = self.peek().clone();
                    self.report(&token, "Expected fewer than 128 arguments.");
                }
                args.push(self.expression()?);
                if !self.matches(&[TokenType::Comma]) {
                    break;
                }
            }
        }
        let bracket = self.consume(TokenType::RightBracket, "Expect ']' after call arguments.")?;
        Ok(Expr::Call {
            callee: Box::new(callee),
            bracket,
            args,
        })
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[TokenType::True]) {
            return Ok(Expr::literal(LiteralValue::Bool(true)));
        }
        if self.matches(&[TokenType::False]) {
            return Ok(Expr::literal(LiteralValue::Bool(false)));
        }
        if self.matches(&[TokenType::Null]) {
            return Ok(Expr::literal(LiteralValue::Null));
        }
        if self.matches(&[TokenType::Num, TokenType::Str]) {
            let value = match &self.previous().literal {
                Some(Literal::Num(n)) => LiteralValue::Num(*n),
                Some(Literal::Str(s)) => LiteralValue::Str(s.clone()),
                None => LiteralValue::Null,
            };
            return Ok(Expr::literal(value));
        }
        if self.matches(&[TokenType::SelfKw]) {
            return Ok(Expr::SelfRef {
                keyword: self.previous().clone(),
            });
        }
        if self.matches(&[TokenType::Identifier, TokenType::Underscore]) {
            return Ok(Expr::Variable {
                name: self.previous().clone(),
            });
        }
        if self.matches(&[TokenType::LeftBracket]) {
            let inner = self.expression()?;
            self.consume(TokenType::RightBracket, "Expect ']' after expression.")?;
            return Ok(Expr::Grouping {
                inner: Box::new(inner),
            });
        }

        Err(self.error_at_peek("Expect expression."))
    }
}

/// Convenience wrapper around [`Parser`]
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Stmt>, Vec<SyntaxError>> {
    Parser::new(tokens).parse()
}
