//! Tokens.

use anodec_util::{Name, SourceSpan};

/// Every kind of token the lexer produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    EndOfInput,
    /// Produced after an `UnexpectedCharacter` diagnostic so parsing can
    /// continue.
    Unexpected,
    EndOfStatement,

    // Operators
    OpNot,
    OpAdd,
    OpSub,
    OpMul,
    OpDiv,
    OpAssign,
    OpEq,
    OpNotEq,
    OpGreaterThan,
    OpLessThan,
    OpLessThanOrEqual,
    OpGreaterThanOrEqual,
    OpLogicalAnd,
    OpLogicalOr,
    OpDot,
    /// `:`, which introduces a type in declarations.
    OpDef,
    OpInc,
    OpDec,
    /// `(?`, which opens a ternary expression.
    OpCond,
    /// `::`
    OpNamespace,

    // Delimiters
    OpenParen,
    CloseParen,
    OpenCurly,
    CloseCurly,
    Comma,

    // Literals and identifiers
    Id,
    LiteralInt,
    LiteralFloat,

    // Keywords
    KwTrue,
    KwFalse,
    KwIf,
    KwElse,
    KwWhile,
    KwFunc,
    KwCast,
    KwNew,
    KwClass,
    KwAssert,
    KwAlias,
    KwExpand,
    KwTemplate,
    KwNamespace,
}

/// One token: kind, span, and the interned source text.
///
/// Literal tokens carry only their textual form; the numeric value is
/// computed on demand (the lexer has already validated it).
#[derive(Clone, Copy, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: SourceSpan,
    pub text: Name,
}

impl Token {
    pub fn new(kind: TokenKind, span: SourceSpan, text: Name) -> Self {
        Self { kind, span, text }
    }

    /// Value of a `LiteralInt` token.
    ///
    /// # Panics
    ///
    /// Panics if the token text is not a valid `i32`; the lexer rejects
    /// such tokens before they reach the parser.
    pub fn int_value(&self) -> i32 {
        self.text
            .as_str()
            .parse()
            .expect("lexer admitted an invalid int literal")
    }

    /// Value of a `LiteralFloat` token.
    pub fn float_value(&self) -> f32 {
        self.text
            .as_str()
            .parse()
            .expect("lexer admitted an invalid float literal")
    }

    /// Value of a `KwTrue`/`KwFalse` token.
    pub fn bool_value(&self) -> bool {
        self.kind == TokenKind::KwTrue
    }
}
