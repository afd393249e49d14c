//! anodec-par - Pratt parser for the anode language.
//!
//! The parser consumes tokens from [`anodec_lex::Lexer`] and produces AST
//! nodes into a shared [`AstContext`]. Expression parsing is Pratt-style:
//! prefix parselets build a left node from the current token, infix
//! parselets extend a parsed left operand, and a per-token precedence plus
//! associativity drives the binding loop.
//!
//! Statement termination: composite expressions (`{…}`, `if`, `while`,
//! `func`, `class`, `namespace`, `template`) need no trailing `;`; anything
//! else must end with one. If the parser reaches a hopeless state it bails
//! out with [`ParseAborted`], which the driver catches.

mod expr;
mod items;
mod types;

use anodec_ast::{AstContext, Ident, Module, QualifiedName, StorageKind};
use anodec_lex::{Lexer, Token, TokenKind};
use anodec_util::{ErrorKind, Name};

/// In-band signal that the current parse cannot continue. The diagnostics
/// describing why are already in the error stream.
#[derive(Debug)]
pub struct ParseAborted;

pub type ParseResult<T> = Result<T, ParseAborted>;

/// The parser for one module.
pub struct Parser<'a, 'e, 'c> {
    pub(crate) lexer: Lexer<'a, 'e>,
    pub(crate) cx: &'c mut AstContext,
}

impl<'a, 'e, 'c> Parser<'a, 'e, 'c> {
    pub fn new(lexer: Lexer<'a, 'e>, cx: &'c mut AstContext) -> Self {
        Self { lexer, cx }
    }

    /// Parse a whole module: expression statements until end of input. The
    /// module body is a compound with global storage.
    pub fn parse_module(&mut self, module_name: &str) -> ParseResult<Module> {
        let mut exprs = Vec::new();
        while !self.lexer.eof() {
            exprs.push(self.parse_expr_stmt()?);
        }

        let span = anodec_util::SourceSpan::any();
        let body = self.cx.compound(span, StorageKind::Global, exprs);
        Ok(Module::new(module_name.to_owned(), body))
    }

    /// Parse one expression statement, enforcing the termination rule.
    pub fn parse_expr_stmt(&mut self) -> ParseResult<anodec_ast::NodeId> {
        let composite = matches!(
            self.lexer.peek_token().kind,
            TokenKind::OpenCurly
                | TokenKind::KwIf
                | TokenKind::KwWhile
                | TokenKind::KwFunc
                | TokenKind::KwClass
                | TokenKind::KwNamespace
                | TokenKind::KwTemplate
        );

        let expr = self.parse_expr(0)?;

        if !composite {
            self.consume(TokenKind::EndOfStatement, "';'");
        }

        Ok(expr)
    }

    /// Consume the next token, reporting `UnexpectedToken` if it is not of
    /// the wanted kind. The token is consumed either way so parsing can
    /// continue.
    pub(crate) fn consume(&mut self, kind: TokenKind, expected: &str) -> Token {
        let token = self.lexer.next_token();
        if token.kind != kind {
            self.lexer.errors().error(
                ErrorKind::UnexpectedToken,
                token.span,
                format!("Expected {}", expected),
            );
        }
        token
    }

    /// Consume the next token if it matches one of two kinds; report
    /// `UnexpectedToken` otherwise.
    pub(crate) fn consume_either(
        &mut self,
        kind1: TokenKind,
        kind2: TokenKind,
        expected: &str,
    ) -> Token {
        let token = self.lexer.next_token();
        if token.kind != kind1 && token.kind != kind2 {
            self.lexer.errors().error(
                ErrorKind::UnexpectedToken,
                token.span,
                format!("Expected {}", expected),
            );
        }
        token
    }

    /// Consume the next token only when it matches.
    pub(crate) fn consume_optional(&mut self, kind: TokenKind) -> Option<Token> {
        if self.lexer.peek_token().kind == kind {
            Some(self.lexer.next_token())
        } else {
            None
        }
    }

    pub(crate) fn consume_identifier(&mut self) -> ParseResult<Ident> {
        let token = self.consume(TokenKind::Id, "identifier");
        if token.kind != TokenKind::Id {
            return Err(ParseAborted);
        }
        Ok(Ident::new(token.span, token.text))
    }

    /// `a` or `a::b::c`.
    pub(crate) fn parse_qualified_name(&mut self, first: Token) -> ParseResult<QualifiedName> {
        let mut parts = vec![Ident::new(first.span, first.text)];
        while self.consume_optional(TokenKind::OpNamespace).is_some() {
            parts.push(self.consume_identifier()?);
        }
        Ok(QualifiedName::new(parts))
    }

    pub(crate) fn surprise(&mut self, token: Token) -> ParseAborted {
        let text: Name = token.text;
        self.lexer.errors().error(
            ErrorKind::SurpriseToken,
            token.span,
            format!("The token '{}' came as a complete surprise to me.", text),
        );
        ParseAborted
    }
}

#[cfg(test)]
mod tests;
