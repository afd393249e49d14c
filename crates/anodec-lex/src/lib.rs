//! anodec-lex - Lexer for the anode language.
//!
//! Turns source text into a lazy token stream:
//!
//! ```
//! use anodec_lex::{Lexer, TokenKind};
//! use anodec_util::{ErrorStream, Name};
//!
//! let mut errors = ErrorStream::new();
//! let mut lexer = Lexer::new(Name::intern("demo"), "foo:int = 1;", &mut errors);
//! assert_eq!(lexer.next_token().kind, TokenKind::Id);
//! assert_eq!(lexer.next_token().kind, TokenKind::OpDef);
//! ```

pub mod lexer;
pub mod reader;
pub mod token;

pub use lexer::Lexer;
pub use reader::SourceReader;
pub use token::{Token, TokenKind};

#[cfg(test)]
mod proptests {
    use super::*;
    use anodec_util::{ErrorStream, Name};
    use proptest::prelude::*;

    fn lex_kinds_texts(source: &str) -> Option<Vec<(TokenKind, String)>> {
        let mut errors = ErrorStream::new();
        let mut out = Vec::new();
        let mut lexer = Lexer::new(Name::intern("prop"), source, &mut errors);
        loop {
            let token = lexer.next_token();
            if token.kind == TokenKind::EndOfInput {
                break;
            }
            out.push((token.kind, token.text.as_str().to_owned()));
        }
        if errors.has_errors() {
            None
        } else {
            Some(out)
        }
    }

    proptest! {
        /// Joining token texts with single spaces re-lexes to the same
        /// sequence of kinds and texts.
        #[test]
        fn relex_round_trip(tokens in proptest::collection::vec(
            prop_oneof![
                "[a-z_][a-z0-9_]{0,6}".prop_map(|s| s),
                (0i32..100000).prop_map(|n| n.to_string()),
                (0u32..1000, 1u32..1000).prop_map(|(a, b)| format!("{}.{}", a, b)),
                Just("==".to_owned()),
                Just("+".to_owned()),
                Just("(".to_owned()),
                Just(")".to_owned()),
                Just(";".to_owned()),
            ],
            0..12,
        )) {
            let source = tokens.join(" ");
            let first = lex_kinds_texts(&source);
            prop_assume!(first.is_some());
            let first = first.unwrap();
            let joined = first
                .iter()
                .map(|(_, text)| text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let second = lex_kinds_texts(&joined).expect("re-lex failed");
            prop_assert_eq!(first, second);
        }
    }
}
