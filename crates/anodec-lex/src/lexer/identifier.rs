//! Identifiers and keywords.
//!
//! `[A-Za-z_][A-Za-z0-9_]*`; keywords are matched by table lookup after the
//! identifier is extracted.

use std::sync::LazyLock;

use anodec_util::FxHashMap;

use super::Lexer;
use crate::token::{Token, TokenKind};

static KEYWORDS: LazyLock<FxHashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    let mut map = FxHashMap::default();
    map.insert("true", TokenKind::KwTrue);
    map.insert("false", TokenKind::KwFalse);
    map.insert("if", TokenKind::KwIf);
    map.insert("else", TokenKind::KwElse);
    map.insert("while", TokenKind::KwWhile);
    map.insert("func", TokenKind::KwFunc);
    map.insert("cast", TokenKind::KwCast);
    map.insert("new", TokenKind::KwNew);
    map.insert("class", TokenKind::KwClass);
    map.insert("assert", TokenKind::KwAssert);
    map.insert("alias", TokenKind::KwAlias);
    map.insert("expand", TokenKind::KwExpand);
    map.insert("template", TokenKind::KwTemplate);
    map.insert("namespace", TokenKind::KwNamespace);
    map
});

pub(crate) fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub(crate) fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl Lexer<'_, '_> {
    pub(crate) fn extract_identifier_or_keyword(&mut self) -> Token {
        let mut id = String::new();
        id.push(self.reader.next().unwrap());
        while matches!(self.reader.peek(), Some(c) if is_identifier_continue(c)) {
            id.push(self.reader.next().unwrap());
        }

        match KEYWORDS.get(id.as_str()) {
            Some(kind) => self.token(*kind, &id),
            None => self.token(TokenKind::Id, &id),
        }
    }
}
