//! Pratt expression parsing: precedence, associativity, and the core
//! binding loop, plus the unary/binary/dot/call parselets.
//!
//! Precedence, lowest to highest: assignment < logical-or < logical-and <
//! equality < relational < additive < multiplicative < unary prefix <
//! member access and call. Assignment is right-associative; every other
//! binary operator is left-associative.

use anodec_ast::{BinaryOp, ExprKind, NodeId, UnaryOp, VariableAccess};
use anodec_lex::{Token, TokenKind};

use crate::{ParseAborted, ParseResult, Parser};

/// Precedence levels, spaced so new operators can slot between.
pub(crate) mod prec {
    pub const NONE: i32 = 0;
    pub const ASSIGN: i32 = 10;
    pub const LOGICAL_OR: i32 = 20;
    pub const LOGICAL_AND: i32 = 30;
    pub const EQUALITY: i32 = 40;
    pub const RELATIONAL: i32 = 50;
    pub const ADDITIVE: i32 = 60;
    pub const MULTIPLICATIVE: i32 = 70;
    pub const UNARY: i32 = 80;
    pub const MEMBER: i32 = 100;
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Associativity {
    Left,
    Right,
}

pub(crate) fn operator_precedence(kind: TokenKind) -> i32 {
    match kind {
        TokenKind::OpAssign => prec::ASSIGN,
        TokenKind::OpLogicalOr => prec::LOGICAL_OR,
        TokenKind::OpLogicalAnd => prec::LOGICAL_AND,
        TokenKind::OpEq | TokenKind::OpNotEq => prec::EQUALITY,
        TokenKind::OpGreaterThan
        | TokenKind::OpGreaterThanOrEqual
        | TokenKind::OpLessThan
        | TokenKind::OpLessThanOrEqual => prec::RELATIONAL,
        TokenKind::OpAdd | TokenKind::OpSub => prec::ADDITIVE,
        TokenKind::OpMul | TokenKind::OpDiv => prec::MULTIPLICATIVE,
        TokenKind::OpDot | TokenKind::OpenParen => prec::MEMBER,
        _ => prec::NONE,
    }
}

pub(crate) fn operator_associativity(kind: TokenKind) -> Associativity {
    match kind {
        TokenKind::OpAssign => Associativity::Right,
        _ => Associativity::Left,
    }
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::OpAssign => BinaryOp::Assign,
        TokenKind::OpAdd => BinaryOp::Add,
        TokenKind::OpSub => BinaryOp::Sub,
        TokenKind::OpMul => BinaryOp::Mul,
        TokenKind::OpDiv => BinaryOp::Div,
        TokenKind::OpEq => BinaryOp::Eq,
        TokenKind::OpNotEq => BinaryOp::NotEq,
        TokenKind::OpLogicalAnd => BinaryOp::LogicalAnd,
        TokenKind::OpLogicalOr => BinaryOp::LogicalOr,
        TokenKind::OpGreaterThan => BinaryOp::GreaterThan,
        TokenKind::OpLessThan => BinaryOp::LessThan,
        TokenKind::OpGreaterThanOrEqual => BinaryOp::GreaterThanOrEqual,
        TokenKind::OpLessThanOrEqual => BinaryOp::LessThanOrEqual,
        _ => return None,
    })
}

impl Parser<'_, '_, '_> {
    /// The Pratt core: parse one prefix expression, then keep consuming
    /// infix operators that bind tighter than `precedence`.
    pub(crate) fn parse_expr(&mut self, precedence: i32) -> ParseResult<NodeId> {
        let token = self.lexer.next_token();
        if token.kind == TokenKind::EndOfInput {
            self.lexer.errors().error(
                anodec_util::ErrorKind::Syntax,
                token.span,
                "Unexpected end of input".to_owned(),
            );
            return Err(ParseAborted);
        }

        let mut left = self.parse_prefix(token)?;

        loop {
            let next = self.lexer.peek_token();
            if next.kind == TokenKind::EndOfInput {
                return Ok(left);
            }
            if precedence >= operator_precedence(next.kind) {
                return Ok(left);
            }
            let operator = self.lexer.next_token();
            left = self.parse_infix(left, operator)?;
        }
    }

    fn parse_prefix(&mut self, token: Token) -> ParseResult<NodeId> {
        match token.kind {
            TokenKind::LiteralInt => Ok(self.cx.alloc(
                token.span,
                ExprKind::LiteralInt32 {
                    value: token.int_value(),
                },
            )),
            TokenKind::LiteralFloat => Ok(self.cx.alloc(
                token.span,
                ExprKind::LiteralFloat {
                    value: token.float_value(),
                },
            )),
            TokenKind::KwTrue | TokenKind::KwFalse => Ok(self.cx.alloc(
                token.span,
                ExprKind::LiteralBool {
                    value: token.bool_value(),
                },
            )),
            TokenKind::Id => self.parse_variable_ref_or_decl(token),
            TokenKind::OpNot => self.parse_prefix_unary(token, UnaryOp::Not),
            TokenKind::OpInc => self.parse_prefix_unary(token, UnaryOp::PreIncrement),
            TokenKind::OpDec => self.parse_prefix_unary(token, UnaryOp::PreDecrement),
            TokenKind::OpenCurly => self.parse_compound(token),
            TokenKind::OpenParen => self.parse_parenthesized(),
            TokenKind::OpCond => self.parse_ternary(token),
            TokenKind::KwCast => self.parse_cast(token),
            TokenKind::KwNew => self.parse_new(token),
            TokenKind::KwIf => self.parse_if(token),
            TokenKind::KwWhile => self.parse_while(token),
            TokenKind::KwFunc => self.parse_func_def(token),
            TokenKind::KwClass => self.parse_class_def(token),
            TokenKind::KwAssert => self.parse_assert(token),
            TokenKind::KwNamespace => self.parse_namespace(token),
            TokenKind::KwTemplate => self.parse_template(token),
            TokenKind::KwExpand => self.parse_expand(token),
            _ => Err(self.surprise(token)),
        }
    }

    fn parse_infix(&mut self, left: NodeId, operator: Token) -> ParseResult<NodeId> {
        match operator.kind {
            TokenKind::OpDot => self.parse_dot(left, operator),
            TokenKind::OpenParen => self.parse_func_call(left, operator),
            _ => match binary_op(operator.kind) {
                Some(op) => self.parse_binary(left, operator, op),
                None => Err(self.surprise(operator)),
            },
        }
    }

    fn parse_binary(&mut self, left: NodeId, operator: Token, op: BinaryOp) -> ParseResult<NodeId> {
        let precedence = operator_precedence(operator.kind);
        let rhs_precedence = match operator_associativity(operator.kind) {
            Associativity::Left => precedence,
            Associativity::Right => precedence - 1,
        };

        if op == BinaryOp::Assign {
            self.mark_write_target(left);
        }

        let right = self.parse_expr(rhs_precedence)?;
        let span = self.cx.span(left).to(self.cx.span(right));
        Ok(self.cx.alloc(
            span,
            ExprKind::Binary {
                op,
                op_span: operator.span,
                lhs: left,
                rhs: right,
            },
        ))
    }

    /// An assignment writes its target: the reference (or member access)
    /// left of `=` gets its write flag set.
    fn mark_write_target(&mut self, target: NodeId) {
        match &mut self.cx.node_mut(target).kind {
            ExprKind::VariableRef { access, .. } | ExprKind::VariableDecl { access, .. } => {
                *access = VariableAccess::Write;
            }
            ExprKind::Dot { is_write, .. } => {
                *is_write = true;
            }
            _ => {}
        }
    }

    fn parse_prefix_unary(&mut self, operator: Token, op: UnaryOp) -> ParseResult<NodeId> {
        let operand = self.parse_expr(prec::UNARY)?;
        let span = operator.span.to(self.cx.span(operand));
        Ok(self.cx.alloc(
            span,
            ExprKind::Unary {
                op,
                op_span: operator.span,
                operand,
            },
        ))
    }

    fn parse_dot(&mut self, left: NodeId, dot: Token) -> ParseResult<NodeId> {
        let member = self.consume_identifier()?;
        let span = self.cx.span(left).to(member.span);
        Ok(self.cx.alloc(
            span,
            ExprKind::Dot {
                dot_span: dot.span,
                lvalue: left,
                member,
                field: None,
                is_write: false,
            },
        ))
    }

    /// A call. When the callee is a member access the call becomes a method
    /// call: the access's lvalue is the receiver and the member name turns
    /// into a method reference to be bound during dot resolution.
    fn parse_func_call(&mut self, left: NodeId, open_paren: Token) -> ParseResult<NodeId> {
        let mut args = Vec::new();
        let close = match self.consume_optional(TokenKind::CloseParen) {
            Some(token) => token,
            None => loop {
                args.push(self.parse_expr(0)?);
                let token =
                    self.consume_either(TokenKind::Comma, TokenKind::CloseParen, "',' or ')'");
                if token.kind != TokenKind::Comma {
                    break token;
                }
            },
        };

        let span = self.cx.span(left).to(close.span);
        let (instance, callee) = match self.cx.kind(left) {
            ExprKind::Dot { lvalue, member, .. } => {
                let (lvalue, member) = (*lvalue, *member);
                let method_ref = self.cx.alloc(
                    member.span,
                    ExprKind::MethodRef {
                        name: member,
                        symbol: None,
                    },
                );
                (Some(lvalue), method_ref)
            }
            _ => (None, left),
        };

        Ok(self.cx.alloc(
            span,
            ExprKind::FuncCall {
                open_paren_span: open_paren.span,
                instance,
                callee,
                args,
            },
        ))
    }
}
