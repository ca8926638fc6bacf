//! Expression parsing with full operator precedence.
//!
//! Precedence (lowest → highest):
//! 6. `and`, `or` (one level, left-associative)
//! 5. `==`, `!=`, `<>`, `<`, `>`, `<=`, `>=` (left-associative)
//! 4. `contains`, `in` (left-associative)
//! 3. `..` (range, no chaining)
//! 2. `|` (filter application, postfix chain)
//! 1. `.name`, `.name(args)`, `[index]` on a primary
//!
//! Every link of a left-nested chain (`a.b.c`, `x | f | g`, `a or b or c`)
//! deepens the tree by one level and counts against
//! [`MAX_NESTING_DEPTH`](crate::MAX_NESTING_DEPTH) like a pair of
//! parentheses does.

use liquex_lexer::TokenKind;
use liquex_types::ast::*;
use liquex_types::{CompileResult, ErrorCode};

use crate::parser::Parser;

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Point
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse an expression.
    pub(crate) fn parse_expression(&mut self) -> CompileResult<Expr> {
        self.enter_nesting()?;
        let result = self.parse_logical();
        self.exit_nesting(1);
        result
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Precedence Chain
    // ══════════════════════════════════════════════════════════════════════════

    /// `LogicalExpr = CompExpr { ("and" | "or") CompExpr }`
    ///
    /// `and` and `or` share one level: `a or b and c` is `(a or b) and c`.
    fn parse_logical(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_comparison()?;
        let mut links = 0;
        loop {
            let op = match self.peek_kind() {
                TokenKind::And => LogicalOp::And,
                TokenKind::Or => LogicalOp::Or,
                _ => break,
            };
            self.enter_nesting()?;
            links += 1;
            self.advance();
            let right = self.parse_comparison()?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Logical {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        self.exit_nesting(links);
        Ok(left)
    }

    /// `CompExpr = MemberExpr { CompOp MemberExpr }`
    fn parse_comparison(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_membership()?;
        let mut links = 0;
        while let Some(op) = self.match_comparison_op() {
            self.enter_nesting()?;
            links += 1;
            self.advance();
            let right = self.parse_membership()?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Compare {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        self.exit_nesting(links);
        Ok(left)
    }

    /// Check if current token is a comparison operator, return corresponding CompareOp.
    fn match_comparison_op(&self) -> Option<CompareOp> {
        match self.peek_kind() {
            TokenKind::EqEq => Some(CompareOp::Eq),
            TokenKind::NotEq => Some(CompareOp::NotEq),
            TokenKind::Less => Some(CompareOp::Less),
            TokenKind::Greater => Some(CompareOp::Greater),
            TokenKind::LessEq => Some(CompareOp::LessEq),
            TokenKind::GreaterEq => Some(CompareOp::GreaterEq),
            _ => None,
        }
    }

    /// `MemberExpr = RangeExpr { ("contains" | "in") RangeExpr }`
    fn parse_membership(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_range()?;
        let mut links = 0;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Contains => MembershipOp::Contains,
                TokenKind::In => MembershipOp::In,
                _ => break,
            };
            self.enter_nesting()?;
            links += 1;
            self.advance();
            let right = self.parse_range()?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Contains {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        self.exit_nesting(links);
        Ok(left)
    }

    /// `RangeExpr = FilterExpr [ ".." FilterExpr ]`
    ///
    /// Ranges do not chain: `1..2..3` is a parse error.
    fn parse_range(&mut self) -> CompileResult<Expr> {
        let start = self.parse_filter()?;
        if !self.eat(&TokenKind::DotDot) {
            return Ok(start);
        }
        let end = self.parse_filter()?;
        if self.check_exact(&TokenKind::DotDot) {
            return Err(self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                "range operator '..' cannot be chained",
            ));
        }
        let span = start.span.merge(end.span);
        Ok(Expr::new(
            ExprKind::Range {
                start: Box::new(start),
                end: Box::new(end),
            },
            span,
        ))
    }

    /// `FilterExpr = PostfixExpr { "|" Identifier [ ":" FilterArgs ] }`
    ///
    /// Filter arguments are postfix expressions, so a following `|` always
    /// starts the next filter in the chain.
    fn parse_filter(&mut self) -> CompileResult<Expr> {
        let mut input = self.parse_postfix()?;
        let mut links = 0;
        while self.check_exact(&TokenKind::Char('|')) {
            self.enter_nesting()?;
            links += 1;
            self.advance();
            let name = self.expect_identifier("filter name")?;
            let mut args = Vec::new();
            if self.eat(&TokenKind::Char(':')) {
                loop {
                    args.push(self.parse_filter_argument()?);
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            let span = input.span.merge(self.previous_span());
            input = Expr::new(
                ExprKind::Filter {
                    input: Box::new(input),
                    name,
                    args,
                },
                span,
            );
        }
        self.exit_nesting(links);
        Ok(input)
    }

    fn parse_filter_argument(&mut self) -> CompileResult<Expr> {
        self.enter_nesting()?;
        let result = self.parse_postfix();
        self.exit_nesting(1);
        result
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Postfix: property, method call, index
    // ══════════════════════════════════════════════════════════════════════════

    /// `PostfixExpr = PrimaryExpr { "." Name [ "(" Args ")" ] | "[" Expr "]" }`
    fn parse_postfix(&mut self) -> CompileResult<Expr> {
        let mut expr = self.parse_primary()?;
        let mut links = 0;
        loop {
            if matches!(
                self.peek_kind(),
                TokenKind::Property(_) | TokenKind::Dot | TokenKind::LBracket
            ) {
                self.enter_nesting()?;
                links += 1;
            }
            match self.peek_kind().clone() {
                TokenKind::Property(name) => {
                    let token = self.advance();
                    // The property token includes its leading dot.
                    let mut span = token.span;
                    span.offset += 1;
                    span.len -= 1;
                    span.col += 1;
                    expr = self.parse_member(expr, Ident::new(name, span))?;
                }
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect_member_name()?;
                    expr = self.parse_member(expr, name)?;
                }
                TokenKind::LBracket => {
                    let open = self.advance().span;
                    let index = self.parse_expression()?;
                    let close = self.expect_closing(&TokenKind::RBracket, open)?;
                    let span = expr.span.merge(close);
                    expr = Expr::new(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                _ => break,
            }
        }
        self.exit_nesting(links);
        Ok(expr)
    }

    /// After `.name`: a method call if `(` follows, else a property read.
    fn parse_member(&mut self, object: Expr, name: Ident) -> CompileResult<Expr> {
        if !self.check_exact(&TokenKind::LParen) {
            let span = object.span.merge(name.span);
            return Ok(Expr::new(
                ExprKind::Property {
                    object: Box::new(object),
                    name,
                },
                span,
            ));
        }
        let open = self.advance().span;
        let args = self.parse_call_args(open)?;
        let span = object.span.merge(self.previous_span());
        Ok(Expr::new(
            ExprKind::MethodCall {
                object: Box::new(object),
                method: name,
                args,
            },
            span,
        ))
    }

    /// `Args = [ Expr { "," Expr } ]`, up to and including the closing `)`.
    fn parse_call_args(&mut self, open: liquex_types::Span) -> CompileResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if !self.check_exact(&TokenKind::Comma) {
                break;
            }
            self.advance();
            if self.check_exact(&TokenKind::RParen) {
                return Err(self.error_expecting(
                    ErrorCode::UNEXPECTED_TOKEN,
                    "trailing comma in argument list",
                    ["expression"],
                ));
            }
        }
        self.expect_closing(&TokenKind::RParen, open)?;
        Ok(args)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primary Expressions
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse a primary expression (literals, identifiers, grouping).
    fn parse_primary(&mut self) -> CompileResult<Expr> {
        let kind = self.peek_kind().clone();
        let span = self.current_span();
        let literal = match kind {
            TokenKind::IntLit(n) => Literal::Int(n),
            TokenKind::FloatLit(n) => Literal::Float(n),
            TokenKind::StringLit(s) => Literal::String(s),
            TokenKind::True => Literal::Bool(true),
            TokenKind::False => Literal::Bool(false),
            TokenKind::Nil => Literal::Nil,
            TokenKind::Identifier(name) => {
                self.advance();
                return Ok(Expr::new(ExprKind::Identifier(name), span));
            }
            TokenKind::LParen => {
                self.advance();
                // Grouping produces no node of its own.
                let inner = self.parse_expression()?;
                self.expect_closing(&TokenKind::RParen, span)?;
                return Ok(inner);
            }
            ref other if other.is_statement_keyword() => {
                return Err(self.error_at_current(
                    ErrorCode::STATEMENT_KEYWORD,
                    format!("'{other}' starts a tag statement and cannot appear in an expression"),
                ));
            }
            ref other => {
                return Err(self.error_expecting(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected expression, got '{other}'"),
                    ["literal", "identifier", "("],
                ));
            }
        };
        self.advance();
        Ok(Expr::new(ExprKind::Literal(literal), span))
    }
}
