use crate::ast::{BinaryOp, Block, Expr, ExprKind, Program, Stmt, UnaryOp};
use crate::diagnostic::{Diagnostic, Label, Position, Span};
use crate::token::{Token, TokenKind};
use crate::value::Value;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("expected {expected}, found {} at {position}", .found.describe())]
pub struct ParseError {
    pub expected: String,
    pub found: TokenKind,
    pub position: Position,
    pub span: Span,
}

impl ParseError {
    pub fn new(expected: impl Into<String>, found: &Token) -> Self {
        Self {
            expected: expected.into(),
            found: found.kind.clone(),
            position: found.position,
            span: found.span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(format!(
            "expected {}, found {}",
            self.expected,
            self.found.describe()
        ))
        .with_code("E0101")
        .with_label(Label::primary(self.span, format!("expected {}", self.expected)));

        if self.expected == "`(`" {
            diag.with_help("calls need parentheses, as in `print(value)`")
        } else {
            diag
        }
    }
}

/// How deeply blocks, brackets and unary operators may nest.
pub const MAX_NESTING: usize = 64;

/// Recursive-descent parser over a token stream that ends in `Eof`.
pub struct TokenParser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
}

impl TokenParser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(Token { kind: TokenKind::Eof, .. })) {
            let (span, position) = tokens
                .last()
                .map(|last| (Span::new(last.span.end, last.span.end), last.position))
                .unwrap_or((Span::dummy(), Position::new(1, 1)));
            tokens.push(Token::new(TokenKind::Eof, span, position));
        }
        Self {
            tokens,
            current: 0,
            depth: 0,
        }
    }

    fn current_token(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current_token().kind
    }

    fn peek_kind(&self, offset: usize) -> &TokenKind {
        let index = (self.current + offset).min(self.tokens.len() - 1);
        &self.tokens[index].kind
    }

    fn previous_span(&self) -> Span {
        if self.current > 0 {
            self.tokens[self.current - 1].span
        } else {
            Span::dummy()
        }
    }

    fn previous_line(&self) -> usize {
        if self.current > 0 {
            self.tokens[self.current - 1].position.line
        } else {
            0
        }
    }

    /// Whether the current token sits on the line where the previous one ended.
    fn on_same_line(&self) -> bool {
        self.current_token().position.line == self.previous_line()
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token, ParseError> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("`{}`", expected)))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> Result<(Rc<str>, Span), ParseError> {
        match self.current_kind() {
            TokenKind::Ident(name) => {
                let name = Rc::from(name.as_str());
                let token = self.advance();
                Ok((name, token.span))
            }
            _ => Err(self.error(what)),
        }
    }

    fn error(&self, expected: impl Into<String>) -> ParseError {
        ParseError::new(expected, self.current_token())
    }

    /// Runs `parse` one nesting level deeper, failing once `MAX_NESTING` is reached.
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(format!("at most {} levels of nesting", MAX_NESTING)));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn skip_separators(&mut self) {
        while matches!(self.current_kind(), TokenKind::Semicolon) {
            self.advance();
        }
    }

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        self.skip_separators();
        while !self.is_at_end() {
            statements.push(self.parse_statement()?);
            self.skip_separators();
        }
        Ok(Program::new(statements))
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.current_kind() {
            TokenKind::Bind => self.parse_bind_statement(),
            TokenKind::Fn => self.parse_function_statement(),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Mirror => {
                self.advance();
                Ok(Stmt::Mirror(self.parse_expression()?))
            }
            TokenKind::Ident(_) if matches!(self.peek_kind(1), TokenKind::Assign) => {
                self.parse_assignment()
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_bind_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect(TokenKind::Bind)?.span;
        let (name, _) = self.expect_identifier("variable name after `bind`")?;
        self.expect(TokenKind::To)?;
        let value = self.parse_expression()?;
        let span = start.merge(value.span);
        Ok(Stmt::Bind { name, value, span })
    }

    fn parse_assignment(&mut self) -> Result<Stmt, ParseError> {
        let (name, start) = self.expect_identifier("variable name")?;
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expression()?;
        let span = start.merge(value.span);
        Ok(Stmt::Assign { name, value, span })
    }

    fn parse_function_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect(TokenKind::Fn)?.span;
        let (name, _) = self.expect_identifier("function name")?;
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let (param, _) = self.expect_identifier("parameter name")?;
                params.push(param);
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        let body = self.parse_block()?;
        let span = start.merge(body.span);
        Ok(Stmt::Function {
            name,
            params,
            body: Rc::new(body),
            span,
        })
    }

    fn parse_if_statement(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::If)?;
        let condition = self.parse_expression()?;
        let then_branch = self.parse_block()?;
        let else_branch = if self.check(&TokenKind::Else) {
            self.advance();
            if self.check(&TokenKind::If) {
                let else_start = self.current_token().span;
                let nested = self.nested(Self::parse_if_statement)?;
                Some(Block::new(vec![nested], else_start.merge(self.previous_span())))
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_while_statement(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::While)?;
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(Stmt::While { condition, body })
    }

    fn parse_return_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect(TokenKind::Return)?.span;
        if matches!(
            self.current_kind(),
            TokenKind::RBrace | TokenKind::Semicolon | TokenKind::Eof
        ) {
            return Ok(Stmt::Return {
                value: None,
                span: start,
            });
        }
        let value = self.parse_expression()?;
        let span = start.merge(value.span);
        Ok(Stmt::Return {
            value: Some(value),
            span,
        })
    }

    fn parse_expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.parse_expression()?;
        // `print "hi"` reads like a call but is two expressions glued together.
        if matches!(expr.kind, ExprKind::Identifier(_))
            && self.on_same_line()
            && self.current_kind().starts_expression()
        {
            return Err(self.error("`(`"));
        }
        Ok(Stmt::Expr(expr))
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let start = self.expect(TokenKind::LBrace)?.span;
        let statements = self.nested(|parser| {
            let mut statements = Vec::new();
            parser.skip_separators();
            while !parser.check(&TokenKind::RBrace) && !parser.is_at_end() {
                statements.push(parser.parse_statement()?);
                parser.skip_separators();
            }
            Ok(statements)
        })?;
        let end = self.expect(TokenKind::RBrace)?.span;
        Ok(Block::new(statements, start.merge(end)))
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_expr(1)
    }

    fn token_to_binary_operator(kind: &TokenKind) -> Option<(u8, BinaryOp)> {
        match kind {
            TokenKind::Or => Some((1, BinaryOp::Or)),
            TokenKind::And => Some((2, BinaryOp::And)),
            TokenKind::Eq => Some((3, BinaryOp::Eq)),
            TokenKind::NotEq => Some((3, BinaryOp::NotEq)),
            TokenKind::Less => Some((4, BinaryOp::Less)),
            TokenKind::Greater => Some((4, BinaryOp::Greater)),
            TokenKind::LessEq => Some((4, BinaryOp::LessEq)),
            TokenKind::GreaterEq => Some((4, BinaryOp::GreaterEq)),
            TokenKind::Plus => Some((5, BinaryOp::Add)),
            TokenKind::Minus => Some((5, BinaryOp::Sub)),
            TokenKind::Star => Some((6, BinaryOp::Mul)),
            TokenKind::Slash => Some((6, BinaryOp::Div)),
            _ => None,
        }
    }

    fn parse_binary_expr(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        while let Some((precedence, op)) = Self::token_to_binary_operator(self.current_kind()) {
            if precedence < min_precedence {
                break;
            }
            self.advance();
            let right = self.parse_binary_expr(precedence + 1)?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.current_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Not => UnaryOp::Not,
            _ => return self.parse_postfix(),
        };
        let start = self.advance().span;
        let expr = self.nested(Self::parse_unary)?;
        let span = start.merge(expr.span);
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                expr: Box::new(expr),
            },
            span,
        ))
    }

    /// Calls and indexing, which may chain: `table[0](x)`.
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.current_kind() {
                TokenKind::LParen => {
                    self.advance();
                    let args = self.nested(|parser| {
                        parser.parse_comma_separated(TokenKind::RParen, Self::parse_expression)
                    })?;
                    let end = self.expect(TokenKind::RParen)?.span;
                    let span = expr.span.merge(end);
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.nested(Self::parse_expression)?;
                    let end = self.expect(TokenKind::RBracket)?.span;
                    let span = expr.span.merge(end);
                    expr = Expr::new(
                        ExprKind::Index {
                            target: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Items separated by commas, allowing a trailing comma, up to (not including) `close`.
    fn parse_comma_separated<T>(
        &mut self,
        close: TokenKind,
        mut item: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        let mut items = Vec::new();
        while !self.check(&close) {
            items.push(item(self)?);
            if self.check(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        Ok(items)
    }

    fn parse_mapping_entry(&mut self) -> Result<(String, Expr), ParseError> {
        let key = match self.current_kind() {
            TokenKind::Ident(key) | TokenKind::Str(key) => key.clone(),
            _ => return Err(self.error("mapping key")),
        };
        self.advance();
        self.expect(TokenKind::Colon)?;
        let value = self.parse_expression()?;
        Ok((key, value))
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        // Inside an expression `mirror(...)` names the builtin.
        if self.check(&TokenKind::Mirror) && matches!(self.peek_kind(1), TokenKind::LParen) {
            let span = self.advance().span;
            return Ok(Expr::new(ExprKind::Identifier(Rc::from("mirror")), span));
        }
        if !self.current_kind().starts_expression() {
            return Err(self.error("expression"));
        }
        let token = self.advance();
        let span = token.span;

        match token.kind {
            TokenKind::Number(n) => Ok(Expr::new(ExprKind::Literal(Value::Number(n)), span)),
            TokenKind::Str(s) => Ok(Expr::new(ExprKind::Literal(Value::string(s)), span)),
            TokenKind::Bool(b) => Ok(Expr::new(ExprKind::Literal(Value::Bool(b)), span)),
            TokenKind::Ident(name) => Ok(Expr::new(
                ExprKind::Identifier(Rc::from(name.as_str())),
                span,
            )),
            TokenKind::LParen => {
                let expr = self.nested(Self::parse_expression)?;
                let end = self.expect(TokenKind::RParen)?.span;
                Ok(Expr::new(ExprKind::Grouped(Box::new(expr)), span.merge(end)))
            }
            TokenKind::LBracket => {
                let elements = self.nested(|parser| {
                    parser.parse_comma_separated(TokenKind::RBracket, Self::parse_expression)
                })?;
                let end = self.expect(TokenKind::RBracket)?.span;
                Ok(Expr::new(ExprKind::List { elements }, span.merge(end)))
            }
            TokenKind::LBrace => {
                let entries = self.nested(|parser| {
                    parser.parse_comma_separated(TokenKind::RBrace, Self::parse_mapping_entry)
                })?;
                let end = self.expect(TokenKind::RBrace)?.span;
                Ok(Expr::new(ExprKind::Mapping { entries }, span.merge(end)))
            }
            // `-` and `not` are consumed by parse_unary before we get here.
            _ => Err(ParseError::new("expression", &token)),
        }
    }
}

/// Parses a whole token stream; the first error aborts.
pub fn parse(tokens: Vec<Token>) -> Result<Program, ParseError> {
    let count = tokens.len();
    let program = TokenParser::new(tokens).parse_program()?;
    log::debug!(
        "parsed {} tokens into {} top-level statements",
        count,
        program.statements.len()
    );
    Ok(program)
}
