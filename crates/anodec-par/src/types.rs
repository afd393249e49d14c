//! Type-reference parsing.
//!
//! Every type written in source becomes a resolution-deferred reference;
//! even the primitive keywords are resolved later, in the type-resolution
//! pass. Generic arguments nest: `Stack<Stack<float>>`.

use anodec_ast::TypeRefId;
use anodec_lex::TokenKind;

use crate::{ParseResult, Parser};

impl Parser<'_, '_, '_> {
    /// A type reference: `Name`, `a::b::Name`, optionally with generic
    /// arguments `Name<T, U<int>>`.
    pub(crate) fn parse_type_ref(&mut self) -> ParseResult<TypeRefId> {
        let first = self.consume(TokenKind::Id, "type identifier");
        let name = self.parse_qualified_name(first)?;
        let mut span = name.span();

        let mut args = Vec::new();
        if self.consume_optional(TokenKind::OpLessThan).is_some() {
            loop {
                args.push(self.parse_type_ref()?);
                let token = self.consume_either(
                    TokenKind::Comma,
                    TokenKind::OpGreaterThan,
                    "',' or '>'",
                );
                if token.kind != TokenKind::Comma {
                    span = span.to(token.span);
                    break;
                }
            }
        }

        Ok(self.cx.deferred_type_ref(span, name, args))
    }
}
