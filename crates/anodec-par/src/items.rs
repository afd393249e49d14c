//! Parselets for declarations, control flow and template forms.

use anodec_ast::{ExprKind, Ident, NodeId, Param, StorageKind, TemplateParam, VariableAccess};
use anodec_lex::{Token, TokenKind};

use crate::{ParseResult, Parser};

impl Parser<'_, '_, '_> {
    /// An identifier in expression position: a (possibly qualified)
    /// variable reference, or, when followed by `:`, a declaration.
    pub(crate) fn parse_variable_ref_or_decl(&mut self, token: Token) -> ParseResult<NodeId> {
        let name = self.parse_qualified_name(token)?;

        if name.len() == 1 && self.consume_optional(TokenKind::OpDef).is_some() {
            let type_ref = self.parse_type_ref()?;
            let span = name.span().to(self.cx.type_ref(type_ref).span);
            return Ok(self.cx.alloc(
                span,
                ExprKind::VariableDecl {
                    name: *name.front(),
                    type_ref,
                    access: VariableAccess::Read,
                    symbol: None,
                },
            ));
        }

        let span = name.span();
        Ok(self.cx.alloc(
            span,
            ExprKind::VariableRef {
                name,
                access: VariableAccess::Read,
                symbol: None,
            },
        ))
    }

    /// `{ stmt* }` with its own lexical scope.
    pub(crate) fn parse_compound(&mut self, open_curly: Token) -> ParseResult<NodeId> {
        let mut exprs = Vec::new();
        let close = loop {
            if let Some(close) = self.consume_optional(TokenKind::CloseCurly) {
                break close;
            }
            exprs.push(self.parse_expr_stmt()?);
        };
        let span = open_curly.span.to(close.span);
        Ok(self.cx.compound(span, StorageKind::Local, exprs))
    }

    /// `( expr )`.
    pub(crate) fn parse_parenthesized(&mut self) -> ParseResult<NodeId> {
        let expr = self.parse_expr(0)?;
        self.consume(TokenKind::CloseParen, "')'");
        Ok(expr)
    }

    /// `(? cond, then, else)`.
    pub(crate) fn parse_ternary(&mut self, opener: Token) -> ParseResult<NodeId> {
        let cond = self.parse_expr(0)?;
        self.consume(TokenKind::Comma, "','");
        let then = self.parse_expr(0)?;
        self.consume(TokenKind::Comma, "','");
        let els = self.parse_expr(0)?;
        let close = self.consume(TokenKind::CloseParen, "')'");

        let span = opener.span.to(close.span);
        Ok(self.cx.alloc(
            span,
            ExprKind::If {
                cond,
                then,
                els: Some(els),
            },
        ))
    }

    /// `cast<Type>(expr)`, an explicit cast.
    pub(crate) fn parse_cast(&mut self, cast_kw: Token) -> ParseResult<NodeId> {
        self.consume(TokenKind::OpLessThan, "'<'");
        let to = self.parse_type_ref()?;
        self.consume(TokenKind::OpGreaterThan, "'>'");
        self.consume(TokenKind::OpenParen, "'('");
        let value = self.parse_expr(0)?;
        let close = self.consume(TokenKind::CloseParen, "')'");

        let span = cast_kw.span.to(close.span);
        Ok(self.cx.alloc(
            span,
            ExprKind::Cast {
                to,
                value,
                kind: anodec_ast::CastKind::Explicit,
            },
        ))
    }

    /// `new<Type>()`, heap allocation of a class instance.
    pub(crate) fn parse_new(&mut self, new_kw: Token) -> ParseResult<NodeId> {
        self.consume(TokenKind::OpLessThan, "'<'");
        let type_ref = self.parse_type_ref()?;
        self.consume(TokenKind::OpGreaterThan, "'>'");
        self.consume(TokenKind::OpenParen, "'('");
        let close = self.consume(TokenKind::CloseParen, "')'");

        let span = new_kw.span.to(close.span);
        Ok(self.cx.alloc(span, ExprKind::New { type_ref }))
    }

    /// `if (cond) stmt [else stmt]`.
    pub(crate) fn parse_if(&mut self, if_kw: Token) -> ParseResult<NodeId> {
        self.consume(TokenKind::OpenParen, "'('");
        let cond = self.parse_expr(0)?;
        self.consume(TokenKind::CloseParen, "')'");

        let then = self.parse_expr_stmt()?;
        let els = if self.consume_optional(TokenKind::KwElse).is_some() {
            Some(self.parse_expr_stmt()?)
        } else {
            None
        };

        let end = els.unwrap_or(then);
        let span = if_kw.span.to(self.cx.span(end));
        Ok(self.cx.alloc(span, ExprKind::If { cond, then, els }))
    }

    /// `while (cond) stmt`.
    pub(crate) fn parse_while(&mut self, while_kw: Token) -> ParseResult<NodeId> {
        self.consume(TokenKind::OpenParen, "'('");
        let cond = self.parse_expr(0)?;
        self.consume(TokenKind::CloseParen, "')'");
        let body = self.parse_expr_stmt()?;

        let span = while_kw.span.to(self.cx.span(body));
        Ok(self.cx.alloc(span, ExprKind::While { cond, body }))
    }

    /// `assert(cond)`.
    pub(crate) fn parse_assert(&mut self, assert_kw: Token) -> ParseResult<NodeId> {
        self.consume(TokenKind::OpenParen, "'('");
        let cond = self.parse_expr(0)?;
        let close = self.consume(TokenKind::CloseParen, "')'");

        let span = assert_kw.span.to(close.span);
        Ok(self.cx.alloc(span, ExprKind::Assert { cond }))
    }

    /// `func name:Ret(param:Type, …) body`.
    pub(crate) fn parse_func_def(&mut self, func_kw: Token) -> ParseResult<NodeId> {
        let name = self.consume_identifier()?;
        self.consume(TokenKind::OpDef, "':'");
        let return_ref = self.parse_type_ref()?;
        self.consume(TokenKind::OpenParen, "'('");

        let mut params = Vec::new();
        if self.consume_optional(TokenKind::CloseParen).is_none() {
            loop {
                let param_name = self.consume_identifier()?;
                self.consume(TokenKind::OpDef, "':'");
                let type_ref = self.parse_type_ref()?;
                params.push(Param {
                    span: param_name.span.to(self.cx.type_ref(type_ref).span),
                    name: param_name,
                    type_ref,
                    symbol: None,
                });
                let token =
                    self.consume_either(TokenKind::Comma, TokenKind::CloseParen, "',' or ')'");
                if token.kind != TokenKind::Comma {
                    break;
                }
            }
        }

        let body = self.parse_expr_stmt()?;
        let span = func_kw.span.to(self.cx.span(body));
        Ok(self.cx.func_def(span, name, return_ref, params, body))
    }

    /// `class Name body` or `class Name<T, …> body`. The body is a
    /// compound whose scope has instance storage: its variables become the
    /// class's fields, its functions its methods.
    pub(crate) fn parse_class_def(&mut self, class_kw: Token) -> ParseResult<NodeId> {
        let name = self.consume_identifier()?;

        let mut template_params = Vec::new();
        if self.consume_optional(TokenKind::OpLessThan).is_some() {
            loop {
                let param = self.consume_identifier()?;
                template_params.push(TemplateParam {
                    span: param.span,
                    name: param,
                });
                let token = self.consume_either(
                    TokenKind::Comma,
                    TokenKind::OpGreaterThan,
                    "',' or '>'",
                );
                if token.kind != TokenKind::Comma {
                    break;
                }
            }
        }

        let open_curly = self.consume(TokenKind::OpenCurly, "'{'");
        let mut exprs = Vec::new();
        let close = loop {
            if let Some(close) = self.consume_optional(TokenKind::CloseCurly) {
                break close;
            }
            exprs.push(self.parse_expr_stmt()?);
        };
        let body_span = open_curly.span.to(close.span);
        let body = self.cx.compound(body_span, StorageKind::Instance, exprs);

        let span = class_kw.span.to(close.span);
        if template_params.is_empty() {
            Ok(self.cx.complete_class_def(span, name, Vec::new(), body))
        } else {
            Ok(self.cx.generic_class_def(span, name, template_params, body))
        }
    }

    /// `namespace a::b { stmt* }`. The body is an expression list; the
    /// namespace itself owns no lexical scope; its contents land in the
    /// namespace's symbol table chain.
    pub(crate) fn parse_namespace(&mut self, namespace_kw: Token) -> ParseResult<NodeId> {
        let first = self.consume(TokenKind::Id, "identifier");
        let name = self.parse_qualified_name(first)?;

        self.consume(TokenKind::OpenCurly, "'{'");
        let (exprs, close) = self.parse_expr_list_until_close_curly()?;

        let body_span = name.span().to(close.span);
        let body = self.cx.alloc(body_span, ExprKind::ExpressionList { exprs });
        let span = namespace_kw.span.to(close.span);
        Ok(self.cx.alloc(
            span,
            ExprKind::Namespace {
                name,
                body,
                scope: None,
            },
        ))
    }

    /// `template Name(T, …) { … }` (named) or `template (T, …) { … }`
    /// (anonymous).
    pub(crate) fn parse_template(&mut self, template_kw: Token) -> ParseResult<NodeId> {
        let name: Option<Ident> = match self.lexer.peek_token().kind {
            TokenKind::Id => Some(self.consume_identifier()?),
            _ => None,
        };

        self.consume(TokenKind::OpenParen, "'('");
        let mut params = Vec::new();
        if self.consume_optional(TokenKind::CloseParen).is_none() {
            loop {
                let param = self.consume_identifier()?;
                params.push(TemplateParam {
                    span: param.span,
                    name: param,
                });
                let token =
                    self.consume_either(TokenKind::Comma, TokenKind::CloseParen, "',' or ')'");
                if token.kind != TokenKind::Comma {
                    break;
                }
            }
        }

        self.consume(TokenKind::OpenCurly, "'{'");
        let (exprs, close) = self.parse_expr_list_until_close_curly()?;
        let body_span = template_kw.span.to(close.span);
        let body = self.cx.alloc(body_span, ExprKind::ExpressionList { exprs });

        let span = template_kw.span.to(close.span);
        Ok(match name {
            Some(name) => self
                .cx
                .alloc(span, ExprKind::NamedTemplate { name, params, body }),
            None => self
                .cx
                .alloc(span, ExprKind::AnonymousTemplate { params, body }),
        })
    }

    /// `expand Name<Type, …>`.
    pub(crate) fn parse_expand(&mut self, expand_kw: Token) -> ParseResult<NodeId> {
        let first = self.consume(TokenKind::Id, "identifier");
        let name = self.parse_qualified_name(first)?;

        self.consume(TokenKind::OpLessThan, "'<'");
        let mut type_args = Vec::new();
        let close = loop {
            type_args.push(self.parse_type_ref()?);
            let token = self.consume_either(
                TokenKind::Comma,
                TokenKind::OpGreaterThan,
                "',' or '>'",
            );
            if token.kind != TokenKind::Comma {
                break token;
            }
        };

        let span = expand_kw.span.to(close.span);
        Ok(self.cx.template_expansion(span, name, type_args))
    }

    fn parse_expr_list_until_close_curly(&mut self) -> ParseResult<(Vec<NodeId>, Token)> {
        let mut exprs = Vec::new();
        let close = loop {
            if let Some(close) = self.consume_optional(TokenKind::CloseCurly) {
                break close;
            }
            exprs.push(self.parse_expr_stmt()?);
        };
        Ok((exprs, close))
    }

}
