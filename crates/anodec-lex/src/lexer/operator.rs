//! Static tokens: operators and delimiters.
//!
//! Candidates for each leading character are listed longest first so that
//! `==` wins over `=`, `::` over `:`, `(?` over `(`, and so on. The `(#`
//! comment opener never reaches this table; trivia is discarded first.

use crate::token::TokenKind;

/// Candidate static tokens starting with `first`, longest first.
pub(crate) fn candidates(first: char) -> &'static [(&'static str, TokenKind)] {
    match first {
        '+' => &[("++", TokenKind::OpInc), ("+", TokenKind::OpAdd)],
        '-' => &[("--", TokenKind::OpDec), ("-", TokenKind::OpSub)],
        '*' => &[("*", TokenKind::OpMul)],
        '/' => &[("/", TokenKind::OpDiv)],
        '=' => &[("==", TokenKind::OpEq), ("=", TokenKind::OpAssign)],
        '!' => &[("!=", TokenKind::OpNotEq), ("!", TokenKind::OpNot)],
        '>' => &[
            (">=", TokenKind::OpGreaterThanOrEqual),
            (">", TokenKind::OpGreaterThan),
        ],
        '<' => &[
            ("<=", TokenKind::OpLessThanOrEqual),
            ("<", TokenKind::OpLessThan),
        ],
        '&' => &[("&&", TokenKind::OpLogicalAnd)],
        '|' => &[("||", TokenKind::OpLogicalOr)],
        '.' => &[(".", TokenKind::OpDot)],
        ':' => &[("::", TokenKind::OpNamespace), (":", TokenKind::OpDef)],
        ';' => &[(";", TokenKind::EndOfStatement)],
        ',' => &[(",", TokenKind::Comma)],
        '(' => &[("(?", TokenKind::OpCond), ("(", TokenKind::OpenParen)],
        ')' => &[(")", TokenKind::CloseParen)],
        '{' => &[("{", TokenKind::OpenCurly)],
        '}' => &[("}", TokenKind::CloseCurly)],
        _ => &[],
    }
}
