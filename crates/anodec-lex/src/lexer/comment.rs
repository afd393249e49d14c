//! Whitespace and comment handling.
//!
//! `#` comments run to end of line. `(# … #)` block comments nest, so the
//! scanner keeps a depth counter; hitting end of input with the counter
//! above zero is an `UnexpectedEofInMultilineComment` diagnostic.

use anodec_util::{ErrorKind, SourceSpan};

use super::Lexer;

impl Lexer<'_, '_> {
    /// Discard whitespace and comments until something token-worthy (or
    /// end of input) is next.
    pub(crate) fn discard_trivia(&mut self) {
        loop {
            if self.discard_line_comment() {
                continue;
            }
            if self.discard_block_comment() {
                continue;
            }
            if self.discard_whitespace() {
                continue;
            }
            break;
        }
    }

    fn discard_whitespace(&mut self) -> bool {
        let mut discarded = false;
        while matches!(self.reader.peek(), Some(c) if c.is_whitespace()) {
            self.reader.next();
            discarded = true;
        }
        discarded
    }

    fn discard_line_comment(&mut self) -> bool {
        if !self.reader.match_str("#") {
            return false;
        }
        while matches!(self.reader.peek(), Some(c) if c != '\n') {
            self.reader.next();
        }
        self.reader.next(); // the newline itself
        true
    }

    fn discard_block_comment(&mut self) -> bool {
        let start = self.reader.location();
        if !self.reader.match_str("(#") {
            return false;
        }

        let mut depth = 1;
        while depth > 0 {
            if self.reader.eof() {
                let span = SourceSpan::new(self.reader.input_name(), start, self.reader.location());
                self.errors.error(
                    ErrorKind::UnexpectedEofInMultilineComment,
                    span,
                    "Unexpected end-of-input within multi-line comment".to_owned(),
                );
                return true;
            }
            if self.reader.match_str("(#") {
                depth += 1;
                continue;
            }
            if self.reader.match_str("#)") {
                depth -= 1;
                continue;
            }
            self.reader.next();
        }
        true
    }
}
